pub mod a001_material;
pub mod a002_supplier;
pub mod a003_variant;
pub mod a004_product;
pub mod a005_quote;
pub mod common;
