pub mod u501_price_item;
