use crate::domain::common::AggregateRoot;
use crate::enums::material_type::VariantKind;
use serde::{Deserialize, Serialize};

crate::document_id!(
    /// ID варианта (цвет, тип стекла)
    VariantId
);

/// Вариант исполнения из справочника вариантов
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Variant {
    #[serde(rename = "_id", alias = "id")]
    pub id: VariantId,
    pub nombre: String,
    pub tipo: VariantKind,
    /// Код цвета (для цветов профиля)
    #[serde(default)]
    pub codigo: Option<String>,
}

impl AggregateRoot for Variant {
    type Id = VariantId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn description(&self) -> &str {
        &self.nombre
    }

    fn aggregate_index() -> &'static str {
        "a003"
    }

    fn collection_name() -> &'static str {
        "variantes"
    }

    fn element_name() -> &'static str {
        "Variante"
    }

    fn list_name() -> &'static str {
        "Variantes"
    }
}
