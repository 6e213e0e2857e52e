pub mod app_state;
pub mod catalog;
pub mod config;
pub mod format;
pub mod formula;
pub mod logger;
