pub mod common;
pub mod u501_price_item;
