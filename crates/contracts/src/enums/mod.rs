pub mod material_category;
pub mod material_type;
