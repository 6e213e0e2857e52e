use serde::{Deserialize, Serialize};

/// Материал изделия: определяет ставки работ и слот выбора цвета
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductMaterialType {
    Pvc,
    Aluminio,
}

impl ProductMaterialType {
    pub fn code(&self) -> &'static str {
        match self {
            ProductMaterialType::Pvc => "pvc",
            ProductMaterialType::Aluminio => "aluminio",
        }
    }

    /// Вид варианта (цвета), который выбирается для профиля этого изделия
    pub fn color_variant_kind(&self) -> VariantKind {
        match self {
            ProductMaterialType::Pvc => VariantKind::Pvc,
            ProductMaterialType::Aluminio => VariantKind::Aluminio,
        }
    }
}

/// Вид варианта: цвет ПВХ, цвет алюминия или тип стекла
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariantKind {
    Pvc,
    Aluminio,
    Vidrio,
}

impl VariantKind {
    pub fn code(&self) -> &'static str {
        match self {
            VariantKind::Pvc => "pvc",
            VariantKind::Aluminio => "aluminio",
            VariantKind::Vidrio => "vidrio",
        }
    }
}

impl std::fmt::Display for VariantKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::fmt::Display for ProductMaterialType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}
