use std::collections::{HashMap, HashSet};

use contracts::domain::a001_material::aggregate::{Material, MaterialId, SupplierOffer};
use contracts::domain::a004_product::aggregate::BomLine;
use contracts::domain::a005_quote::item::{
    Dimensions, MaterialLine, PricingWarning, SupplierSelection, VariantSelection,
};
use contracts::enums::material_category::MaterialCategory;
use contracts::enums::material_type::{ProductMaterialType, VariantKind};

use super::aggregator::round_cents;
use super::bom_graph::{self, Step};
use crate::shared::formula::{Formula, FormulaError, Variables};

/// Результат разрешения спецификации
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialResolution {
    /// Строки в порядке спецификации
    pub lines: Vec<MaterialLine>,
    pub total_materiales: f64,
    pub warnings: Vec<PricingWarning>,
}

/// Рассчитать количество, выход и стоимость каждой строки спецификации.
///
/// Каталог не изменяется. Проблемы с данными не прерывают расчёт: строка
/// получает нулевое количество или цену, а в `warnings` добавляется
/// предупреждение.
pub fn resolve(
    lines: &[BomLine],
    materials: &HashMap<MaterialId, Material>,
    dimensions: &Dimensions,
    variants: &VariantSelection,
    suppliers: &SupplierSelection,
    product_type: ProductMaterialType,
) -> MaterialResolution {
    let formulas: Vec<Option<Result<Formula, FormulaError>>> = lines
        .iter()
        .map(|line| (!line.is_dependent()).then(|| Formula::parse(&line.formula)))
        .collect();
    let refs: Vec<Vec<MaterialId>> = formulas
        .iter()
        .map(|f| match f {
            Some(Ok(formula)) => bom_graph::quantity_refs(formula),
            _ => Vec::new(),
        })
        .collect();

    let in_bom: HashSet<&MaterialId> = lines.iter().map(|l| &l.material).collect();
    let mut variables = Variables::from_dimensions(dimensions);
    let mut quantities: HashMap<&MaterialId, f64> = HashMap::new();
    // Материалы, количество которых не удалось рассчитать
    let mut unresolved: HashSet<&MaterialId> = HashSet::new();
    let mut raw = vec![0.0; lines.len()];
    let mut line_warnings: Vec<Vec<PricingWarning>> = vec![Vec::new(); lines.len()];

    for step in bom_graph::plan(lines, &refs) {
        let i = step.index();
        let line = &lines[i];
        let warnings = &mut line_warnings[i];

        let quantity = match step {
            Step::Cycle(_) => {
                warnings.push(PricingWarning::DependencyCycle {
                    material: line.material.clone(),
                });
                unresolved.insert(&line.material);
                0.0
            }
            Step::Resolve(_) => match (line.dependency(), &formulas[i]) {
                (Some(dep), _) if !in_bom.contains(dep) || unresolved.contains(dep) => {
                    warnings.push(PricingWarning::UnresolvedDependency {
                        material: line.material.clone(),
                        dependencia: dep.clone(),
                    });
                    unresolved.insert(&line.material);
                    0.0
                }
                (Some(dep), _) => quantities.get(dep).copied().unwrap_or(0.0) * line.multiplicador,
                (None, Some(Ok(formula))) => match formula.eval(&variables) {
                    Ok(evaluation) => {
                        warnings.extend(evaluation.unknown_variables.into_iter().map(|variable| {
                            PricingWarning::UnknownVariable {
                                material: line.material.clone(),
                                variable,
                            }
                        }));
                        evaluation.value
                    }
                    Err(e) => {
                        warnings.push(invalid_formula(line, &e));
                        0.0
                    }
                },
                (None, Some(Err(e))) => {
                    warnings.push(invalid_formula(line, e));
                    0.0
                }
                (None, None) => 0.0,
            },
        };

        raw[i] = quantity;
        let total = quantities.entry(&line.material).or_insert(0.0);
        *total += quantity;
        variables.set_quantity(&line.material, *total);
    }

    let mut resolved = Vec::with_capacity(lines.len());
    let mut warnings = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        let mut line_warns = std::mem::take(&mut line_warnings[i]);
        let material_line = price_line(
            line,
            raw[i],
            materials.get(&line.material),
            variants,
            suppliers,
            product_type,
            &mut line_warns,
        );
        resolved.push(material_line);
        warnings.extend(line_warns);
    }

    let total_materiales = round_cents(resolved.iter().map(|l| l.costo).sum());
    MaterialResolution {
        lines: resolved,
        total_materiales,
        warnings,
    }
}

fn invalid_formula(line: &BomLine, error: &FormulaError) -> PricingWarning {
    PricingWarning::InvalidFormula {
        material: line.material.clone(),
        formula: line.formula.clone(),
        mensaje: error.to_string(),
    }
}

/// Выход, предложение поставщика, надбавка за вариант и стоимость строки
fn price_line(
    line: &BomLine,
    cantidad_bruta: f64,
    material: Option<&Material>,
    variants: &VariantSelection,
    suppliers: &SupplierSelection,
    product_type: ProductMaterialType,
    warnings: &mut Vec<PricingWarning>,
) -> MaterialLine {
    let mut out = MaterialLine {
        material: line.material.clone(),
        nombre: line.material.to_string(),
        categoria: MaterialCategory::Otro,
        formula: line.formula.clone(),
        dependiente_de: line.dependency().cloned(),
        cantidad_bruta,
        rendimiento: 0.0,
        proveedor: None,
        precio_unitario: 0.0,
        ajuste_variante: 0.0,
        costo: 0.0,
    };

    let Some(material) = material else {
        warnings.push(PricingWarning::UnknownMaterial {
            material: line.material.clone(),
        });
        return out;
    };
    out.nombre = material.nombre.clone();
    out.categoria = material.categoria;

    if material.area_longitud.is_finite() && material.area_longitud > 0.0 {
        out.rendimiento = cantidad_bruta / material.area_longitud;
    } else {
        warnings.push(PricingWarning::InvalidYield {
            material: material.id.clone(),
            area_longitud: material.area_longitud,
        });
    }

    let selected = suppliers.for_category(material.categoria);
    let offer = match selected.and_then(|s| material.offer_from(s)) {
        Some(offer) => Some(offer),
        None => {
            warnings.push(PricingWarning::MissingOffer {
                material: material.id.clone(),
                proveedor: selected.cloned(),
            });
            material.principal_offer()
        }
    };

    if let Some(offer) = offer {
        out.proveedor = Some(offer.proveedor.clone());
        out.precio_unitario = offer.precio;
        out.ajuste_variante = variant_surcharge(material, offer, variants, product_type);
    }

    out.costo = round_cents((out.precio_unitario + out.ajuste_variante) * out.rendimiento);
    out
}

/// Слот выбора варианта для материала
fn variant_slot(material: &Material, product_type: ProductMaterialType) -> VariantKind {
    if material.categoria.is_glass() {
        VariantKind::Vidrio
    } else {
        product_type.color_variant_kind()
    }
}

fn variant_surcharge(
    material: &Material,
    offer: &SupplierOffer,
    variants: &VariantSelection,
    product_type: ProductMaterialType,
) -> f64 {
    if !material.tiene_variantes || offer.variantes.is_empty() {
        return 0.0;
    }
    let slot = variant_slot(material, product_type);
    if offer.tipo_variante.is_some_and(|kind| kind != slot) {
        return 0.0;
    }
    variants
        .for_kind(slot)
        .and_then(|id| offer.adjustment_for(id))
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::domain::a001_material::aggregate::VariantPriceAdjustment;
    use contracts::domain::a002_supplier::aggregate::SupplierId;
    use contracts::domain::a003_variant::aggregate::VariantId;

    fn offer(supplier: &str, precio: f64) -> SupplierOffer {
        SupplierOffer {
            proveedor: SupplierId::new(supplier),
            precio,
            descuento: 0.0,
            impuesto: 0.0,
            es_principal: false,
            tipo_variante: None,
            variantes: Vec::new(),
        }
    }

    fn material(id: &str, categoria: MaterialCategory, area: f64, offers: Vec<SupplierOffer>) -> Material {
        Material {
            id: MaterialId::new(id),
            nombre: id.to_uppercase(),
            categoria,
            unidad_compra: None,
            unidad_produccion: None,
            area_longitud: area,
            proveedores: offers,
            tiene_variantes: false,
            nombres_secundarios: Vec::new(),
        }
    }

    fn catalog(items: Vec<Material>) -> HashMap<MaterialId, Material> {
        items.into_iter().map(|m| (m.id.clone(), m)).collect()
    }

    fn general(supplier: &str) -> SupplierSelection {
        SupplierSelection {
            general: Some(SupplierId::new(supplier)),
            vidrio: None,
        }
    }

    fn run(lines: &[BomLine], materials: &HashMap<MaterialId, Material>, dims: Dimensions) -> MaterialResolution {
        resolve(
            lines,
            materials,
            &dims,
            &VariantSelection::default(),
            &general("g"),
            ProductMaterialType::Pvc,
        )
    }

    #[test]
    fn test_area_formula_with_unit_yield() {
        let materials = catalog(vec![material("m", MaterialCategory::Perfil, 1.0, vec![offer("g", 100.0)])]);
        let res = run(&[BomLine::independent("m", "ancho * alto")], &materials, Dimensions::new(1.5, 2.0));

        let line = &res.lines[0];
        assert_eq!(line.cantidad_bruta, 3.0);
        assert_eq!(line.rendimiento, 3.0);
        assert_eq!(line.costo, 300.0);
        assert_eq!(res.total_materiales, 300.0);
        assert!(res.warnings.is_empty());
    }

    #[test]
    fn test_dependent_quantity_is_exact_product() {
        let materials = catalog(vec![
            material("a", MaterialCategory::Perfil, 1.0, vec![offer("g", 1.0)]),
            material("b", MaterialCategory::Sellador, 1.0, vec![offer("g", 1.0)]),
        ]);
        let lines = vec![
            BomLine::dependent("b", "a", 2.0),
            BomLine::independent("a", "8"),
        ];
        let res = run(&lines, &materials, Dimensions::new(1.0, 1.0));
        assert_eq!(res.lines[0].material.as_str(), "b");
        assert_eq!(res.lines[0].cantidad_bruta, 16.0);
        assert_eq!(res.lines[0].dependiente_de, Some(MaterialId::new("a")));
        assert_eq!(res.lines[1].cantidad_bruta, 8.0);
    }

    #[test]
    fn test_dependent_quantity_not_rounded() {
        let materials = catalog(vec![
            material("a", MaterialCategory::Perfil, 1.0, vec![offer("g", 1.0)]),
            material("b", MaterialCategory::Sellador, 1.0, vec![offer("g", 1.0)]),
        ]);
        let lines = vec![
            BomLine::independent("a", "ancho / 3"),
            BomLine::dependent("b", "a", 1.5),
        ];
        let res = run(&lines, &materials, Dimensions::new(1.0, 1.0));
        assert_eq!(res.lines[1].cantidad_bruta, (1.0 / 3.0) * 1.5);
    }

    #[test]
    fn test_quantity_reference_in_formula() {
        let materials = catalog(vec![
            material("perfil", MaterialCategory::Perfil, 6.0, vec![offer("g", 60.0)]),
            material("tornillo", MaterialCategory::Herraje, 1.0, vec![offer("g", 0.5)]),
        ]);
        let lines = vec![
            BomLine::independent("tornillo", "REDONDEAR.MAS(cantidad_perfil * 2; 0)"),
            BomLine::independent("perfil", "2 * (ancho + alto)"),
        ];
        let res = run(&lines, &materials, Dimensions::new(1.2, 1.0));
        assert!((res.lines[1].cantidad_bruta - 4.4).abs() < 1e-9);
        assert_eq!(res.lines[0].cantidad_bruta, 9.0);
        assert_eq!(res.lines[0].costo, 4.5);
        // 4.4 / 6 * 60 = 44
        assert_eq!(res.lines[1].costo, 44.0);
        assert!(res.warnings.is_empty());
    }

    #[test]
    fn test_reordering_independent_lines_keeps_total() {
        let materials = catalog(vec![
            material("a", MaterialCategory::Perfil, 6.0, vec![offer("g", 120.0)]),
            material("b", MaterialCategory::Herraje, 1.0, vec![offer("g", 3.33)]),
            material("c", MaterialCategory::Accesorio, 2.5, vec![offer("g", 17.0)]),
        ]);
        let mut lines = vec![
            BomLine::independent("a", "2 * (ancho + alto)"),
            BomLine::independent("b", "divisionVertical + 4"),
            BomLine::independent("c", "ancho * alto"),
        ];
        let mut dims = Dimensions::new(1.37, 2.11);
        dims.division_vertical = 2.0;

        let first = run(&lines, &materials, dims).total_materiales;
        lines.reverse();
        let second = run(&lines, &materials, dims).total_materiales;
        lines.swap(0, 1);
        let third = run(&lines, &materials, dims).total_materiales;
        assert_eq!(first, second);
        assert_eq!(first, third);
    }

    #[test]
    fn test_duplicate_material_lines_sum_for_dependency() {
        let materials = catalog(vec![
            material("a", MaterialCategory::Perfil, 1.0, vec![offer("g", 1.0)]),
            material("b", MaterialCategory::Sellador, 1.0, vec![offer("g", 1.0)]),
        ]);
        let lines = vec![
            BomLine::independent("a", "ancho"),
            BomLine::independent("a", "alto"),
            BomLine::dependent("b", "a", 2.0),
        ];
        let res = run(&lines, &materials, Dimensions::new(1.0, 2.0));
        assert_eq!(res.lines[2].cantidad_bruta, 6.0);
    }

    #[test]
    fn test_unresolved_dependency_and_cycle_warn_with_zero() {
        let materials = catalog(vec![
            material("a", MaterialCategory::Perfil, 1.0, vec![offer("g", 10.0)]),
            material("b", MaterialCategory::Perfil, 1.0, vec![offer("g", 10.0)]),
            material("c", MaterialCategory::Sellador, 1.0, vec![offer("g", 10.0)]),
        ]);
        let lines = vec![
            BomLine::dependent("a", "b", 1.0),
            BomLine::dependent("b", "a", 1.0),
            BomLine::dependent("c", "inexistente", 2.0),
        ];
        let res = run(&lines, &materials, Dimensions::new(1.0, 1.0));
        assert!(res.lines.iter().all(|l| l.cantidad_bruta == 0.0));
        assert_eq!(res.total_materiales, 0.0);
        assert!(res.warnings.contains(&PricingWarning::DependencyCycle {
            material: MaterialId::new("a")
        }));
        assert!(res.warnings.contains(&PricingWarning::UnresolvedDependency {
            material: MaterialId::new("c"),
            dependencia: MaterialId::new("inexistente"),
        }));
    }

    #[test]
    fn test_dependents_after_cycle_are_reported() {
        let materials = catalog(vec![
            material("a", MaterialCategory::Perfil, 1.0, vec![offer("g", 10.0)]),
            material("b", MaterialCategory::Perfil, 1.0, vec![offer("g", 10.0)]),
            material("c", MaterialCategory::Sellador, 1.0, vec![offer("g", 10.0)]),
            material("d", MaterialCategory::Sellador, 1.0, vec![offer("g", 10.0)]),
            material("e", MaterialCategory::Herraje, 1.0, vec![offer("g", 1.0)]),
        ]);
        let lines = vec![
            BomLine::dependent("a", "b", 1.0),
            BomLine::dependent("b", "a", 1.0),
            BomLine::dependent("c", "a", 2.0),
            BomLine::dependent("d", "c", 3.0),
            BomLine::independent("e", "4"),
        ];
        let res = run(&lines, &materials, Dimensions::new(1.0, 1.0));

        assert_eq!(res.lines[2].cantidad_bruta, 0.0);
        assert_eq!(res.lines[3].cantidad_bruta, 0.0);
        assert!(res.warnings.contains(&PricingWarning::UnresolvedDependency {
            material: MaterialId::new("c"),
            dependencia: MaterialId::new("a"),
        }));
        assert!(res.warnings.contains(&PricingWarning::UnresolvedDependency {
            material: MaterialId::new("d"),
            dependencia: MaterialId::new("c"),
        }));
        // Независимая строка не затронута
        assert_eq!(res.lines[4].cantidad_bruta, 4.0);
        assert_eq!(res.total_materiales, 4.0);
    }

    #[test]
    fn test_invalid_formula_is_a_warning_not_a_fallback() {
        let materials = catalog(vec![material("m", MaterialCategory::Perfil, 1.0, vec![offer("g", 100.0)])]);
        let res = run(&[BomLine::independent("m", "ancho * (alto")], &materials, Dimensions::new(2.0, 2.0));
        assert_eq!(res.lines[0].cantidad_bruta, 0.0);
        assert_eq!(res.lines[0].costo, 0.0);
        assert!(matches!(res.warnings[0], PricingWarning::InvalidFormula { .. }));
    }

    #[test]
    fn test_unknown_variable_is_zero_and_reported() {
        let materials = catalog(vec![material("m", MaterialCategory::Perfil, 1.0, vec![offer("g", 10.0)])]);
        let res = run(&[BomLine::independent("m", "ancho + profundidad")], &materials, Dimensions::new(2.0, 1.0));
        assert_eq!(res.lines[0].cantidad_bruta, 2.0);
        assert_eq!(
            res.warnings,
            vec![PricingWarning::UnknownVariable {
                material: MaterialId::new("m"),
                variable: "profundidad".into(),
            }]
        );
    }

    #[test]
    fn test_unknown_material_costs_nothing() {
        let res = run(&[BomLine::independent("fantasma", "ancho")], &HashMap::new(), Dimensions::new(2.0, 1.0));
        assert_eq!(res.lines[0].costo, 0.0);
        assert_eq!(res.lines[0].cantidad_bruta, 2.0);
        assert!(matches!(res.warnings[0], PricingWarning::UnknownMaterial { .. }));
    }

    #[test]
    fn test_invalid_yield() {
        let materials = catalog(vec![material("m", MaterialCategory::Perfil, 0.0, vec![offer("g", 10.0)])]);
        let res = run(&[BomLine::independent("m", "ancho")], &materials, Dimensions::new(2.0, 1.0));
        assert_eq!(res.lines[0].rendimiento, 0.0);
        assert!(matches!(res.warnings[0], PricingWarning::InvalidYield { .. }));
    }

    #[test]
    fn test_glass_uses_glass_supplier_and_glass_variant() {
        let mut glass_offer = offer("v", 40.0);
        glass_offer.variantes = vec![VariantPriceAdjustment {
            variante: VariantId::new("templado"),
            precio_adicional: 25.0,
        }];
        let mut glass = material("vidrio", MaterialCategory::Vidrio, 1.0, vec![offer("g", 999.0), glass_offer]);
        glass.tiene_variantes = true;
        let materials = catalog(vec![glass]);

        let selection = VariantSelection {
            tipo_vidrio: Some(VariantId::new("templado")),
            ..Default::default()
        };
        let suppliers = SupplierSelection {
            general: Some(SupplierId::new("g")),
            vidrio: Some(SupplierId::new("v")),
        };
        let res = resolve(
            &[BomLine::independent("vidrio", "ancho * alto")],
            &materials,
            &Dimensions::new(1.0, 2.0),
            &selection,
            &suppliers,
            ProductMaterialType::Aluminio,
        );
        let line = &res.lines[0];
        assert_eq!(line.proveedor, Some(SupplierId::new("v")));
        assert_eq!(line.precio_unitario, 40.0);
        assert_eq!(line.ajuste_variante, 25.0);
        assert_eq!(line.costo, 130.0);
    }

    #[test]
    fn test_color_surcharge_follows_product_type() {
        let mut profile_offer = offer("g", 100.0);
        profile_offer.tipo_variante = Some(VariantKind::Pvc);
        profile_offer.variantes = vec![VariantPriceAdjustment {
            variante: VariantId::new("nogal"),
            precio_adicional: 12.0,
        }];
        let mut profile = material("perfil", MaterialCategory::Perfil, 1.0, vec![profile_offer]);
        profile.tiene_variantes = true;
        let materials = catalog(vec![profile]);

        let selection = VariantSelection {
            color_pvc: Some(VariantId::new("nogal")),
            color_aluminio: Some(VariantId::new("nogal")),
            tipo_vidrio: None,
        };
        let lines = [BomLine::independent("perfil", "1")];
        let dims = Dimensions::new(1.0, 1.0);

        let pvc = resolve(&lines, &materials, &dims, &selection, &general("g"), ProductMaterialType::Pvc);
        assert_eq!(pvc.lines[0].ajuste_variante, 12.0);
        assert_eq!(pvc.total_materiales, 112.0);

        // Предложение объявлено для ПВХ: для алюминиевого изделия надбавки нет
        let alu = resolve(&lines, &materials, &dims, &selection, &general("g"), ProductMaterialType::Aluminio);
        assert_eq!(alu.lines[0].ajuste_variante, 0.0);
    }

    #[test]
    fn test_missing_offer_falls_back_to_principal() {
        let mut principal = offer("p", 20.0);
        principal.es_principal = true;
        let materials = catalog(vec![material(
            "m",
            MaterialCategory::Herraje,
            1.0,
            vec![offer("x", 30.0), principal],
        )]);
        let res = run(&[BomLine::independent("m", "2")], &materials, Dimensions::new(1.0, 1.0));
        assert_eq!(res.lines[0].proveedor, Some(SupplierId::new("p")));
        assert_eq!(res.lines[0].costo, 40.0);
        assert_eq!(
            res.warnings,
            vec![PricingWarning::MissingOffer {
                material: MaterialId::new("m"),
                proveedor: Some(SupplierId::new("g")),
            }]
        );
    }

    #[test]
    fn test_no_offers_prices_at_zero() {
        let materials = catalog(vec![material("m", MaterialCategory::Herraje, 1.0, Vec::new())]);
        let res = run(&[BomLine::independent("m", "2")], &materials, Dimensions::new(1.0, 1.0));
        assert_eq!(res.lines[0].precio_unitario, 0.0);
        assert_eq!(res.lines[0].proveedor, None);
        assert_eq!(res.warnings.len(), 1);
    }

    #[test]
    fn test_catalog_is_not_mutated() {
        let materials = catalog(vec![material("m", MaterialCategory::Perfil, 2.0, vec![offer("g", 10.0)])]);
        let before = materials.clone();
        let _ = run(&[BomLine::independent("m", "ancho")], &materials, Dimensions::new(3.0, 1.0));
        assert_eq!(materials, before);
    }
}
