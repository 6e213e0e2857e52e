use crate::domain::a002_supplier::aggregate::SupplierId;
use crate::domain::a003_variant::aggregate::VariantId;
use crate::domain::common::AggregateRoot;
use crate::enums::material_category::MaterialCategory;
use crate::enums::material_type::VariantKind;
use serde::{Deserialize, Serialize};

crate::document_id!(
    /// ID материала (`_id` документа)
    MaterialId
);

fn default_area_longitud() -> f64 {
    1.0
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// Материал каталога (профиль, стекло, фурнитура...)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Material {
    #[serde(rename = "_id", alias = "id")]
    pub id: MaterialId,

    pub nombre: String,

    #[serde(default)]
    pub categoria: MaterialCategory,

    /// Единица закупки (например, "barra")
    #[serde(default)]
    pub unidad_compra: Option<String>,

    /// Единица производства (например, "ml")
    #[serde(default)]
    pub unidad_produccion: Option<String>,

    /// Выход на единицу закупки: 6 погонных метров на одну штангу и т.п.
    #[serde(default = "default_area_longitud")]
    pub area_longitud: f64,

    #[serde(default)]
    pub proveedores: Vec<SupplierOffer>,

    #[serde(default)]
    pub tiene_variantes: bool,

    #[serde(default)]
    pub nombres_secundarios: Vec<String>,
}

/// Предложение поставщика (вложено в материал)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SupplierOffer {
    pub proveedor: SupplierId,

    /// Базовая цена за единицу закупки
    pub precio: f64,

    /// Скидка поставщика, %. Справочно, в расчёт не входит.
    #[serde(default)]
    pub descuento: f64,

    /// Налог поставщика, %. Справочно, в расчёт не входит.
    #[serde(default)]
    pub impuesto: f64,

    #[serde(default)]
    pub es_principal: bool,

    #[serde(default)]
    pub tipo_variante: Option<VariantKind>,

    #[serde(default)]
    pub variantes: Vec<VariantPriceAdjustment>,
}

/// Надбавка к цене за вариант (цвет, тип стекла)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VariantPriceAdjustment {
    pub variante: VariantId,
    #[serde(default)]
    pub precio_adicional: f64,
}

impl Material {
    /// Предложение конкретного поставщика
    pub fn offer_from(&self, supplier: &SupplierId) -> Option<&SupplierOffer> {
        self.proveedores.iter().find(|o| &o.proveedor == supplier)
    }

    /// Основное предложение: помеченное `es_principal`, иначе первое
    pub fn principal_offer(&self) -> Option<&SupplierOffer> {
        self.proveedores
            .iter()
            .find(|o| o.es_principal)
            .or_else(|| self.proveedores.first())
    }

    /// Совпадение имени с основным или дополнительным названием
    pub fn matches_name(&self, name: &str) -> bool {
        let needle = name.trim().to_lowercase();
        if needle.is_empty() {
            return false;
        }
        std::iter::once(&self.nombre)
            .chain(self.nombres_secundarios.iter())
            .any(|n| n.trim().to_lowercase() == needle)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.nombre.trim().is_empty() {
            return Err("Nombre del material no puede estar vacío".into());
        }
        if !self.area_longitud.is_finite() || self.area_longitud <= 0.0 {
            return Err(format!(
                "area_longitud debe ser mayor que 0 (material {})",
                self.id
            ));
        }
        if self.proveedores.iter().filter(|o| o.es_principal).count() > 1 {
            return Err("Solo un proveedor puede ser principal".into());
        }
        for offer in &self.proveedores {
            if !offer.precio.is_finite() || offer.precio < 0.0 {
                return Err(format!("Precio inválido del proveedor {}", offer.proveedor));
            }
        }
        Ok(())
    }
}

impl SupplierOffer {
    /// Надбавка за выбранный вариант
    pub fn adjustment_for(&self, variant: &VariantId) -> Option<f64> {
        self.variantes
            .iter()
            .find(|v| &v.variante == variant)
            .map(|v| v.precio_adicional)
    }
}

impl AggregateRoot for Material {
    type Id = MaterialId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn description(&self) -> &str {
        &self.nombre
    }

    fn aggregate_index() -> &'static str {
        "a001"
    }

    fn collection_name() -> &'static str {
        "materiales"
    }

    fn element_name() -> &'static str {
        "Material"
    }

    fn list_name() -> &'static str {
        "Materiales"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Material {
        serde_json::from_str(
            r#"{
                "_id": "m1",
                "nombre": "Perfil marco",
                "categoria": "perfil",
                "area_longitud": 6,
                "tiene_variantes": true,
                "nombres_secundarios": ["Marco PVC"],
                "proveedores": [
                    {"proveedor": "p1", "precio": 120.5},
                    {"proveedor": "p2", "precio": 110, "es_principal": true,
                     "tipo_variante": "pvc",
                     "variantes": [{"variante": "blanco", "precio_adicional": 15}]}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_deserialize_document_shape() {
        let m = sample();
        assert_eq!(m.id, MaterialId::new("m1"));
        assert_eq!(m.area_longitud, 6.0);
        assert_eq!(m.proveedores.len(), 2);
        assert!(m.validate().is_ok());
    }

    #[test]
    fn test_principal_offer_and_adjustment() {
        let m = sample();
        let principal = m.principal_offer().unwrap();
        assert_eq!(principal.proveedor, SupplierId::new("p2"));
        assert_eq!(principal.adjustment_for(&VariantId::new("blanco")), Some(15.0));
        assert_eq!(principal.adjustment_for(&VariantId::new("negro")), None);
    }

    #[test]
    fn test_matches_secondary_name_case_insensitive() {
        let m = sample();
        assert!(m.matches_name("  marco pvc "));
        assert!(!m.matches_name("marco"));
    }

    #[test]
    fn test_validate_rejects_zero_yield() {
        let mut m = sample();
        m.area_longitud = 0.0;
        assert!(m.validate().is_err());
    }

    #[test]
    fn test_metadata() {
        let m = sample();
        assert_eq!(Material::full_name(), "a001_materiales");
        assert_eq!(Material::list_name(), "Materiales");
        assert_eq!(m.description(), "Perfil marco");
        assert_eq!(m.id(), &MaterialId::new("m1"));
    }
}
