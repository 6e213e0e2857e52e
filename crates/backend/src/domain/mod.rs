pub mod a004_product;
pub mod a005_quote;
