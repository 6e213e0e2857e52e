use crate::domain::a001_material::aggregate::MaterialId;
use crate::enums::material_type::ProductMaterialType;
use serde::{Deserialize, Serialize};

/// Ставка работ за м²
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaborRate {
    pub tarifa: f64,
    #[serde(default = "default_true")]
    pub activo: bool,
}

impl LaborRate {
    pub fn new(tarifa: f64) -> Self {
        Self {
            tarifa,
            activo: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Ставки по материалу изделия
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatesByMaterial {
    pub pvc: LaborRate,
    pub aluminio: LaborRate,
}

impl RatesByMaterial {
    pub fn for_type(&self, tipo: ProductMaterialType) -> &LaborRate {
        match tipo {
            ProductMaterialType::Pvc => &self.pvc,
            ProductMaterialType::Aluminio => &self.aluminio,
        }
    }
}

/// Правило для москитной сетки
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MeshParams {
    #[serde(default)]
    pub activo: bool,
    /// Материалы, наличие которых в спецификации включает работу по сетке
    #[serde(default)]
    pub materiales_contribuyen: Vec<MaterialId>,
    #[serde(default)]
    pub incluye_mano_obra: bool,
    #[serde(default)]
    pub tarifa_mano_obra: f64,
}

/// Параметры стоимости работ (конфигурация процесса)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaborParams {
    pub fabricacion: RatesByMaterial,
    pub instalacion: RatesByMaterial,
    #[serde(default)]
    pub malla: MeshParams,
}

impl Default for LaborParams {
    /// Значения по умолчанию, если конфигурация не загружена:
    /// изготовление ПВХ 400, алюминий 450; монтаж ПВХ 200, алюминий 250.
    fn default() -> Self {
        Self {
            fabricacion: RatesByMaterial {
                pvc: LaborRate::new(400.0),
                aluminio: LaborRate::new(450.0),
            },
            instalacion: RatesByMaterial {
                pvc: LaborRate::new(200.0),
                aluminio: LaborRate::new(250.0),
            },
            malla: MeshParams::default(),
        }
    }
}
