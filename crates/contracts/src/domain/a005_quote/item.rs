use crate::domain::a001_material::aggregate::MaterialId;
use crate::domain::a002_supplier::aggregate::SupplierId;
use crate::domain::a003_variant::aggregate::VariantId;
use crate::domain::a004_product::aggregate::ProductId;
use crate::enums::material_category::MaterialCategory;
use crate::enums::material_type::{ProductMaterialType, VariantKind};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::aggregate::QuoteGroupId;

/// ID позиции котировки
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuoteItemId(pub Uuid);

impl QuoteItemId {
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

// ============================================================================
// Входные данные позиции
// ============================================================================

/// Размеры изделия: свободные переменные формул
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Dimensions {
    /// Ширина, м
    pub ancho: f64,
    /// Высота, м
    pub alto: f64,
    #[serde(default)]
    pub division_horizontal: f64,
    #[serde(default)]
    pub division_vertical: f64,
    #[serde(default)]
    pub decorado_horizontal: f64,
    #[serde(default)]
    pub decorado_vertical: f64,
}

impl Dimensions {
    pub fn new(ancho: f64, alto: f64) -> Self {
        Self {
            ancho,
            alto,
            ..Default::default()
        }
    }

    /// Площадь, м²
    pub fn area(&self) -> f64 {
        self.ancho * self.alto
    }

    /// Пары (имя переменной формулы, значение)
    pub fn variables(&self) -> [(&'static str, f64); 6] {
        [
            ("ancho", self.ancho),
            ("alto", self.alto),
            ("divisionHorizontal", self.division_horizontal),
            ("divisionVertical", self.division_vertical),
            ("decoradoHorizontal", self.decorado_horizontal),
            ("decoradoVertical", self.decorado_vertical),
        ]
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.ancho.is_finite() || self.ancho <= 0.0 {
            return Err("Ancho debe ser mayor que 0".into());
        }
        if !self.alto.is_finite() || self.alto <= 0.0 {
            return Err("Alto debe ser mayor que 0".into());
        }
        let counts = [
            self.division_horizontal,
            self.division_vertical,
            self.decorado_horizontal,
            self.decorado_vertical,
        ];
        if counts.iter().any(|c| !c.is_finite() || *c < 0.0) {
            return Err("Divisiones y decorados no pueden ser negativos".into());
        }
        Ok(())
    }
}

/// Выбор вариантов: цвет профиля ПВХ/алюминия и тип стекла
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct VariantSelection {
    #[serde(default)]
    pub color_pvc: Option<VariantId>,
    #[serde(default)]
    pub color_aluminio: Option<VariantId>,
    #[serde(default)]
    pub tipo_vidrio: Option<VariantId>,
}

impl VariantSelection {
    /// Выбранный вариант для слота данного вида
    pub fn for_kind(&self, kind: VariantKind) -> Option<&VariantId> {
        match kind {
            VariantKind::Pvc => self.color_pvc.as_ref(),
            VariantKind::Aluminio => self.color_aluminio.as_ref(),
            VariantKind::Vidrio => self.tipo_vidrio.as_ref(),
        }
    }

    /// Все заполненные слоты
    pub fn selected(&self) -> Vec<(VariantKind, &VariantId)> {
        [VariantKind::Pvc, VariantKind::Aluminio, VariantKind::Vidrio]
            .into_iter()
            .filter_map(|k| self.for_kind(k).map(|id| (k, id)))
            .collect()
    }
}

/// Выбор поставщиков: стекло закупается отдельно от остальных материалов
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SupplierSelection {
    #[serde(default)]
    pub general: Option<SupplierId>,
    #[serde(default)]
    pub vidrio: Option<SupplierId>,
}

impl SupplierSelection {
    pub fn for_category(&self, category: MaterialCategory) -> Option<&SupplierId> {
        if category.is_glass() {
            self.vidrio.as_ref()
        } else {
            self.general.as_ref()
        }
    }
}

fn default_true() -> bool {
    true
}

/// Переключатели работ для позиции
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaborOptions {
    #[serde(default = "default_true")]
    pub instalacion: bool,
    #[serde(default = "default_true")]
    pub malla: bool,
}

impl Default for LaborOptions {
    fn default() -> Self {
        Self {
            instalacion: true,
            malla: true,
        }
    }
}

fn default_cantidad() -> f64 {
    1.0
}

/// Сохраняемые входные данные позиции: из них позиция пересчитывается
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemInputs {
    pub producto: ProductId,
    pub dimensiones: Dimensions,
    #[serde(default)]
    pub variantes: VariantSelection,
    #[serde(default)]
    pub proveedores: SupplierSelection,
    /// Наценка, %
    #[serde(default)]
    pub margen_ganancia: f64,
    #[serde(default = "default_cantidad")]
    pub cantidad: f64,
    #[serde(default)]
    pub mano_obra: LaborOptions,
}

impl ItemInputs {
    pub fn validate(&self) -> Result<(), String> {
        if self.producto.as_str().trim().is_empty() {
            return Err("Seleccione un producto".into());
        }
        self.dimensiones.validate()?;
        if !self.margen_ganancia.is_finite() || self.margen_ganancia < 0.0 {
            return Err("Margen de ganancia no puede ser negativo".into());
        }
        if !self.cantidad.is_finite() || self.cantidad <= 0.0 {
            return Err("Cantidad debe ser mayor que 0".into());
        }
        if self.proveedores.general.is_none() {
            return Err("Seleccione un proveedor general".into());
        }
        Ok(())
    }
}

// ============================================================================
// Результат расчёта
// ============================================================================

/// Рассчитанная строка материала
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialLine {
    pub material: MaterialId,
    pub nombre: String,
    pub categoria: MaterialCategory,
    pub formula: String,
    #[serde(default)]
    pub dependiente_de: Option<MaterialId>,
    /// Количество до деления на выход
    pub cantidad_bruta: f64,
    /// Количество в единицах закупки
    pub rendimiento: f64,
    #[serde(default)]
    pub proveedor: Option<SupplierId>,
    pub precio_unitario: f64,
    pub ajuste_variante: f64,
    pub costo: f64,
}

/// Стоимость работ
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct LaborCosts {
    pub fabricacion: f64,
    pub instalacion: f64,
    pub malla: f64,
    pub total: f64,
}

/// Итоги позиции
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct ItemTotals {
    pub subtotal: f64,
    pub ganancia: f64,
    pub total: f64,
}

/// Полная раскладка стоимости позиции
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub tipo_material: ProductMaterialType,
    pub materiales: Vec<MaterialLine>,
    pub total_materiales: f64,
    pub mano_obra: LaborCosts,
    pub totales: ItemTotals,
}

/// Предупреждение о целостности данных: расчёт продолжен с нулевым количеством
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tipo", rename_all = "snake_case")]
pub enum PricingWarning {
    InvalidFormula {
        material: MaterialId,
        formula: String,
        mensaje: String,
    },
    UnknownVariable {
        material: MaterialId,
        variable: String,
    },
    UnresolvedDependency {
        material: MaterialId,
        dependencia: MaterialId,
    },
    DependencyCycle {
        material: MaterialId,
    },
    UnknownMaterial {
        material: MaterialId,
    },
    MissingOffer {
        material: MaterialId,
        proveedor: Option<SupplierId>,
    },
    InvalidYield {
        material: MaterialId,
        area_longitud: f64,
    },
}

impl PricingWarning {
    pub fn material(&self) -> &MaterialId {
        match self {
            PricingWarning::InvalidFormula { material, .. }
            | PricingWarning::UnknownVariable { material, .. }
            | PricingWarning::UnresolvedDependency { material, .. }
            | PricingWarning::DependencyCycle { material }
            | PricingWarning::UnknownMaterial { material }
            | PricingWarning::MissingOffer { material, .. }
            | PricingWarning::InvalidYield { material, .. } => material,
        }
    }
}

impl std::fmt::Display for PricingWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PricingWarning::InvalidFormula {
                material,
                formula,
                mensaje,
            } => write!(f, "material {material}: invalid formula '{formula}': {mensaje}"),
            PricingWarning::UnknownVariable { material, variable } => {
                write!(f, "material {material}: unknown variable '{variable}' treated as 0")
            }
            PricingWarning::UnresolvedDependency {
                material,
                dependencia,
            } => write!(
                f,
                "material {material}: dependency {dependencia} was not resolved, quantity set to 0"
            ),
            PricingWarning::DependencyCycle { material } => {
                write!(f, "material {material}: dependency cycle, quantity set to 0")
            }
            PricingWarning::UnknownMaterial { material } => {
                write!(f, "material {material} not found in catalog")
            }
            PricingWarning::MissingOffer {
                material,
                proveedor,
            } => match proveedor {
                Some(p) => write!(f, "material {material}: no offer from supplier {p}"),
                None => write!(f, "material {material}: no supplier offers"),
            },
            PricingWarning::InvalidYield {
                material,
                area_longitud,
            } => write!(
                f,
                "material {material}: invalid area_longitud {area_longitud}, rendimiento set to 0"
            ),
        }
    }
}

/// Ссылка на изделие для отображения
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRef {
    pub id: ProductId,
    pub nombre: String,
}

/// Позиция котировки
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteItem {
    pub id: QuoteItemId,
    pub grupo: QuoteGroupId,
    pub producto: ProductRef,
    #[serde(default)]
    pub descripcion: Option<String>,
    pub entradas: ItemInputs,
    pub desglose: CostBreakdown,
    #[serde(default)]
    pub advertencias: Vec<PricingWarning>,
}

impl QuoteItem {
    pub fn total(&self) -> f64 {
        self.desglose.totales.total
    }

    /// Цена за единицу (итог, делённый на количество)
    pub fn unit_total(&self) -> f64 {
        if self.entradas.cantidad > 0.0 {
            self.desglose.totales.total / self.entradas.cantidad
        } else {
            0.0
        }
    }
}
