use contracts::domain::a005_quote::item::{Dimensions, LaborCosts, LaborOptions, MaterialLine};
use contracts::enums::material_type::ProductMaterialType;
use contracts::shared::labor::{LaborParams, LaborRate};

use super::aggregator::round_cents;

fn charge(area: f64, rate: &LaborRate) -> f64 {
    if rate.activo {
        round_cents(area * rate.tarifa)
    } else {
        0.0
    }
}

/// Стоимость работ: изготовление, монтаж и москитная сетка.
///
/// Все ставки берутся только из `params`; каждая составляющая округляется
/// до сентаво.
pub fn compute_labor(
    dimensions: &Dimensions,
    product_type: ProductMaterialType,
    params: &LaborParams,
    options: &LaborOptions,
    lines: &[MaterialLine],
) -> LaborCosts {
    let area = dimensions.area();

    let fabricacion = charge(area, params.fabricacion.for_type(product_type));
    let instalacion = if options.instalacion {
        charge(area, params.instalacion.for_type(product_type))
    } else {
        0.0
    };

    let mesh = &params.malla;
    let has_mesh_material = lines.iter().any(|line| {
        line.cantidad_bruta != 0.0 && mesh.materiales_contribuyen.contains(&line.material)
    });
    let malla = if mesh.activo && options.malla && has_mesh_material && mesh.incluye_mano_obra {
        round_cents(area * mesh.tarifa_mano_obra)
    } else {
        0.0
    };

    LaborCosts {
        fabricacion,
        instalacion,
        malla,
        total: round_cents(fabricacion + instalacion + malla),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::domain::a001_material::aggregate::MaterialId;
    use contracts::enums::material_category::MaterialCategory;
    use contracts::shared::labor::MeshParams;

    fn mesh_line(material: &str, cantidad: f64) -> MaterialLine {
        MaterialLine {
            material: MaterialId::new(material),
            nombre: material.into(),
            categoria: MaterialCategory::Malla,
            formula: "ancho * alto".into(),
            dependiente_de: None,
            cantidad_bruta: cantidad,
            rendimiento: cantidad,
            proveedor: None,
            precio_unitario: 0.0,
            ajuste_variante: 0.0,
            costo: 0.0,
        }
    }

    fn mesh_params() -> LaborParams {
        LaborParams {
            malla: MeshParams {
                activo: true,
                materiales_contribuyen: vec![MaterialId::new("malla")],
                incluye_mano_obra: true,
                tarifa_mano_obra: 80.0,
            },
            ..LaborParams::default()
        }
    }

    #[test]
    fn test_pvc_fabrication_rate() {
        let labor = compute_labor(
            &Dimensions::new(1.5, 2.0),
            ProductMaterialType::Pvc,
            &LaborParams::default(),
            &LaborOptions {
                instalacion: false,
                malla: false,
            },
            &[],
        );
        assert_eq!(labor.fabricacion, 1200.0);
        assert_eq!(labor.instalacion, 0.0);
        assert_eq!(labor.total, 1200.0);
    }

    #[test]
    fn test_installation_uses_product_type() {
        let labor = compute_labor(
            &Dimensions::new(2.0, 1.0),
            ProductMaterialType::Aluminio,
            &LaborParams::default(),
            &LaborOptions::default(),
            &[],
        );
        assert_eq!(labor.fabricacion, 900.0);
        assert_eq!(labor.instalacion, 500.0);
        assert_eq!(labor.malla, 0.0);
        assert_eq!(labor.total, 1400.0);
    }

    #[test]
    fn test_inactive_rate_is_not_charged() {
        let mut params = LaborParams::default();
        params.fabricacion.pvc.activo = false;
        let labor = compute_labor(
            &Dimensions::new(1.0, 1.0),
            ProductMaterialType::Pvc,
            &params,
            &LaborOptions::default(),
            &[],
        );
        assert_eq!(labor.fabricacion, 0.0);
        assert_eq!(labor.instalacion, 200.0);
    }

    #[test]
    fn test_mesh_requires_contributing_material() {
        let dims = Dimensions::new(1.0, 1.5);
        let params = mesh_params();

        let with_mesh = compute_labor(
            &dims,
            ProductMaterialType::Pvc,
            &params,
            &LaborOptions::default(),
            &[mesh_line("malla", 1.5)],
        );
        assert_eq!(with_mesh.malla, 120.0);

        let zero_quantity = compute_labor(
            &dims,
            ProductMaterialType::Pvc,
            &params,
            &LaborOptions::default(),
            &[mesh_line("malla", 0.0)],
        );
        assert_eq!(zero_quantity.malla, 0.0);

        let other_material = compute_labor(
            &dims,
            ProductMaterialType::Pvc,
            &params,
            &LaborOptions::default(),
            &[mesh_line("vidrio", 1.5)],
        );
        assert_eq!(other_material.malla, 0.0);

        let toggled_off = compute_labor(
            &dims,
            ProductMaterialType::Pvc,
            &params,
            &LaborOptions {
                instalacion: true,
                malla: false,
            },
            &[mesh_line("malla", 1.5)],
        );
        assert_eq!(toggled_off.malla, 0.0);
    }

    #[test]
    fn test_mesh_without_labor_flag() {
        let mut params = mesh_params();
        params.malla.incluye_mano_obra = false;
        let labor = compute_labor(
            &Dimensions::new(1.0, 1.0),
            ProductMaterialType::Pvc,
            &params,
            &LaborOptions::default(),
            &[mesh_line("malla", 1.0)],
        );
        assert_eq!(labor.malla, 0.0);
    }
}
