pub mod aggregate;
pub mod dto;
pub mod item;
pub mod totals;
