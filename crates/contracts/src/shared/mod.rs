pub mod labor;
pub mod logger;
