use crate::domain::a001_material::aggregate::MaterialId;
use crate::domain::common::AggregateRoot;
use crate::enums::material_type::ProductMaterialType;
use serde::{Deserialize, Serialize};

crate::document_id!(
    /// ID изделия
    ProductId
);

/// Префикс переменных формул, ссылающихся на рассчитанное количество материала
pub const QUANTITY_VAR_PREFIX: &str = "cantidad_";

fn default_multiplicador() -> f64 {
    1.0
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// Изделие (окно, дверь, витраж)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    #[serde(rename = "_id", alias = "id")]
    pub id: ProductId,
    pub nombre: String,
    #[serde(default)]
    pub categoria: Option<String>,
    /// Определяет ставки изготовления/монтажа и слот цвета
    pub tipo: ProductMaterialType,
    #[serde(default)]
    pub precio_base: f64,
    #[serde(default)]
    pub imagen: Option<String>,
    #[serde(default)]
    pub svg: Option<String>,
}

impl Product {
    pub fn validate(&self) -> Result<(), String> {
        if self.nombre.trim().is_empty() {
            return Err("Nombre del producto no puede estar vacío".into());
        }
        if !self.precio_base.is_finite() || self.precio_base < 0.0 {
            return Err("Precio base inválido".into());
        }
        Ok(())
    }
}

// ============================================================================
// Bill of materials
// ============================================================================

/// Строка спецификации: связь изделие → материал с формулой количества
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BomLine {
    #[serde(alias = "material_id")]
    pub material: MaterialId,

    /// Формула количества (для зависимых строк не используется)
    #[serde(default)]
    pub formula: String,

    #[serde(default)]
    pub es_dependiente: bool,

    /// Материал, от количества которого считается эта строка
    #[serde(default)]
    pub material_dependencia: Option<MaterialId>,

    #[serde(default = "default_multiplicador")]
    pub multiplicador: f64,
}

impl BomLine {
    pub fn independent(material: impl Into<String>, formula: impl Into<String>) -> Self {
        Self {
            material: MaterialId::new(material),
            formula: formula.into(),
            es_dependiente: false,
            material_dependencia: None,
            multiplicador: 1.0,
        }
    }

    pub fn dependent(
        material: impl Into<String>,
        depends_on: impl Into<String>,
        multiplicador: f64,
    ) -> Self {
        Self {
            material: MaterialId::new(material),
            formula: String::new(),
            es_dependiente: true,
            material_dependencia: Some(MaterialId::new(depends_on)),
            multiplicador,
        }
    }

    /// Строка зависимая, если указан исходный материал
    pub fn dependency(&self) -> Option<&MaterialId> {
        self.material_dependencia
            .as_ref()
            .filter(|id| !id.as_str().trim().is_empty())
    }

    pub fn is_dependent(&self) -> bool {
        self.dependency().is_some()
    }
}

/// Имя переменной формулы с количеством материала
pub fn quantity_var(material: &MaterialId) -> String {
    format!("{}{}", QUANTITY_VAR_PREFIX, material.as_str())
}

impl AggregateRoot for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn description(&self) -> &str {
        &self.nombre
    }

    fn aggregate_index() -> &'static str {
        "a004"
    }

    fn collection_name() -> &'static str {
        "productos"
    }

    fn element_name() -> &'static str {
        "Producto"
    }

    fn list_name() -> &'static str {
        "Productos"
    }
}
