use contracts::domain::a004_product::aggregate::ProductId;
use contracts::domain::a005_quote::item::{CostBreakdown, ItemInputs, PricingWarning, ProductRef};
use contracts::usecases::common::UseCaseError;

use super::aggregator::aggregate;
use super::labor::compute_labor;
use super::material_resolver::resolve;
use crate::shared::catalog::CatalogSnapshot;

/// Рассчитанная позиция без привязки к черновику
#[derive(Debug, Clone, PartialEq)]
pub struct PricedItem {
    pub producto: ProductRef,
    pub desglose: CostBreakdown,
    pub advertencias: Vec<PricingWarning>,
}

/// Проверить входные данные относительно снимка каталога.
///
/// При ошибке расчёт не выполняется.
pub fn validate_inputs(inputs: &ItemInputs, snapshot: &CatalogSnapshot) -> Result<(), UseCaseError> {
    inputs.validate().map_err(UseCaseError::validation)?;

    if inputs.producto != snapshot.product.id {
        return Err(UseCaseError::validation(format!(
            "Producto {} no coincide con el catálogo cargado",
            inputs.producto
        )));
    }

    if let Some(general) = &inputs.proveedores.general {
        if !snapshot.suppliers.contains_key(general) {
            return Err(UseCaseError::validation(format!(
                "Proveedor {} no encontrado",
                general
            )));
        }
    }

    match &inputs.proveedores.vidrio {
        Some(glass) if !snapshot.suppliers.contains_key(glass) => {
            return Err(UseCaseError::validation(format!(
                "Proveedor de vidrio {} no encontrado",
                glass
            )));
        }
        None if snapshot.bom_has_glass() => {
            return Err(UseCaseError::validation(
                "Seleccione un proveedor de vidrio",
            ));
        }
        _ => {}
    }

    for (kind, id) in inputs.variantes.selected() {
        let variant = snapshot.variants.get(id).ok_or_else(|| {
            UseCaseError::validation(format!("Variante {} no encontrada", id))
        })?;
        if variant.tipo != kind {
            return Err(UseCaseError::validation(format!(
                "Variante {} es de tipo {}, se esperaba {}",
                id, variant.tipo, kind
            )));
        }
    }

    Ok(())
}

/// Рассчитать позицию по снимку каталога (чистая функция)
pub fn price(inputs: &ItemInputs, snapshot: &CatalogSnapshot) -> Result<PricedItem, UseCaseError> {
    validate_inputs(inputs, snapshot)?;

    let product = &snapshot.product;
    let resolution = resolve(
        &snapshot.bom,
        &snapshot.materials,
        &inputs.dimensiones,
        &inputs.variantes,
        &inputs.proveedores,
        product.tipo,
    );
    let mano_obra = compute_labor(
        &inputs.dimensiones,
        product.tipo,
        &snapshot.labor,
        &inputs.mano_obra,
        &resolution.lines,
    );
    let totales = aggregate(
        resolution.total_materiales,
        &mano_obra,
        inputs.margen_ganancia,
        inputs.cantidad,
    );

    Ok(PricedItem {
        producto: product_ref(&product.id, &product.nombre),
        desglose: CostBreakdown {
            tipo_material: product.tipo,
            materiales: resolution.lines,
            total_materiales: resolution.total_materiales,
            mano_obra,
            totales,
        },
        advertencias: resolution.warnings,
    })
}

fn product_ref(id: &ProductId, nombre: &str) -> ProductRef {
    ProductRef {
        id: id.clone(),
        nombre: nombre.to_string(),
    }
}
