pub mod draft_store;
pub mod export;
pub mod service;
