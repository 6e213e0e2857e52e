use crate::domain::common::AggregateRoot;
use serde::{Deserialize, Serialize};

crate::document_id!(
    /// ID поставщика
    SupplierId
);

fn default_true() -> bool {
    true
}

/// Поставщик материалов
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Supplier {
    #[serde(rename = "_id", alias = "id")]
    pub id: SupplierId,
    pub nombre: String,
    #[serde(default)]
    pub contacto: Option<String>,
    #[serde(default)]
    pub telefono: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default = "default_true")]
    pub activo: bool,
}

impl AggregateRoot for Supplier {
    type Id = SupplierId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn description(&self) -> &str {
        &self.nombre
    }

    fn aggregate_index() -> &'static str {
        "a002"
    }

    fn collection_name() -> &'static str {
        "proveedores"
    }

    fn element_name() -> &'static str {
        "Proveedor"
    }

    fn list_name() -> &'static str {
        "Proveedores"
    }
}
