use std::collections::HashMap;

use contracts::domain::a001_material::aggregate::{Material, MaterialId};
use contracts::domain::a002_supplier::aggregate::{Supplier, SupplierId};
use contracts::domain::a003_variant::aggregate::{Variant, VariantId};
use contracts::domain::a004_product::aggregate::{BomLine, Product, ProductId};
use contracts::domain::common::AggregateRoot;
use contracts::shared::labor::LaborParams;

use super::{CatalogError, CatalogSource};

/// Всё, что нужно для расчёта одной позиции: загружается один раз на запрос
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    pub product: Product,
    pub bom: Vec<BomLine>,
    pub materials: HashMap<MaterialId, Material>,
    pub suppliers: HashMap<SupplierId, Supplier>,
    pub variants: HashMap<VariantId, Variant>,
    pub labor: LaborParams,
}

impl CatalogSnapshot {
    /// Собрать снимок из уже загруженных данных
    pub fn new(
        product: Product,
        bom: Vec<BomLine>,
        materials: Vec<Material>,
        suppliers: Vec<Supplier>,
        variants: Vec<Variant>,
        labor: LaborParams,
    ) -> Self {
        if let Err(e) = product.validate() {
            warn_invalid(&product, &e);
        }
        for material in &materials {
            if let Err(e) = material.validate() {
                warn_invalid(material, &e);
            }
        }

        Self {
            product,
            bom,
            materials: materials.into_iter().map(|m| (m.id.clone(), m)).collect(),
            suppliers: suppliers.into_iter().map(|s| (s.id.clone(), s)).collect(),
            variants: variants.into_iter().map(|v| (v.id.clone(), v)).collect(),
            labor,
        }
    }

    /// Есть ли в спецификации стекло
    pub fn bom_has_glass(&self) -> bool {
        self.bom.iter().any(|line| {
            self.materials
                .get(&line.material)
                .map(|m| m.categoria.is_glass())
                .unwrap_or(false)
        })
    }
}

/// Документ каталога не проходит проверку: расчёт продолжается, но
/// оператор должен увидеть запись в логе
fn warn_invalid<T: AggregateRoot>(doc: &T, error: &str)
where
    T::Id: std::fmt::Display,
{
    tracing::warn!(
        "{} {} ({}) [{}]: {}",
        T::element_name(),
        doc.id(),
        doc.description(),
        T::full_name(),
        error
    );
}

/// Изделие уже найдено, поэтому отсутствие его связанных данных
/// означает неполный каталог, а не ошибку клиента
fn incomplete(err: CatalogError) -> CatalogError {
    match err {
        CatalogError::NotFound { resource } => CatalogError::Incomplete { resource },
        other => other,
    }
}

/// Загрузить снимок каталога для изделия.
///
/// Запросы выполняются последовательно, без повторов. Отсутствующие
/// параметры работ заменяются `fallback_labor`. `NotFound` возвращается
/// только когда не найдено само изделие.
pub async fn load_snapshot(
    source: &dyn CatalogSource,
    product_id: &ProductId,
    fallback_labor: &LaborParams,
) -> Result<CatalogSnapshot, CatalogError> {
    let product = source.product(product_id).await?;
    let bom = source.bom(product_id).await.map_err(incomplete)?;
    let materials = source.materials().await.map_err(incomplete)?;
    let suppliers = source.suppliers().await.map_err(incomplete)?;
    let variants = source.variants().await.map_err(incomplete)?;
    let labor = match source.labor_params().await.map_err(incomplete)? {
        Some(labor) => labor,
        None => {
            tracing::debug!("Labor parameters not configured in catalog, using fallback");
            fallback_labor.clone()
        }
    };

    tracing::debug!(
        "Catalog snapshot for {}: {} BOM lines, {} {}",
        product_id,
        bom.len(),
        materials.len(),
        Material::list_name()
    );

    Ok(CatalogSnapshot::new(
        product, bom, materials, suppliers, variants, labor,
    ))
}
