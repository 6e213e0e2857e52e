use contracts::domain::a005_quote::aggregate::QuoteDraft;
use contracts::domain::a005_quote::item::{ItemTotals, LaborCosts, QuoteItem};
use contracts::domain::a005_quote::totals::{GroupTotals, QuoteTotals};

/// Округление до сентаво, половина от нуля.
///
/// Значения, отличающиеся от половины сентаво лишь погрешностью
/// представления (1.005 и т.п.), тоже округляются от нуля.
pub fn round_cents(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let scaled = value * 100.0;
    let fraction = (scaled - scaled.trunc()).abs();
    let rounded = if (fraction - 0.5).abs() < 1e-7 {
        scaled.trunc() + scaled.signum()
    } else {
        scaled.round()
    };
    rounded / 100.0
}

/// Итоги позиции: материалы + работы, наценка, количество
pub fn aggregate(
    materials_cost: f64,
    labor: &LaborCosts,
    margin_percent: f64,
    quantity: f64,
) -> ItemTotals {
    let subtotal =
        round_cents(materials_cost + labor.fabricacion + labor.instalacion + labor.malla);
    let ganancia = round_cents(subtotal * margin_percent / 100.0);
    let total = round_cents((subtotal + ganancia) * quantity);
    ItemTotals {
        subtotal,
        ganancia,
        total,
    }
}

/// Итоги котировки с налогом
pub fn quote_totals(items: &[QuoteItem], tax_rate: f64) -> QuoteTotals {
    let subtotal = round_cents(items.iter().map(QuoteItem::total).sum());
    let impuesto = round_cents(subtotal * tax_rate);
    QuoteTotals {
        subtotal,
        impuesto,
        total: round_cents(subtotal + impuesto),
        tasa_impuesto: tax_rate,
    }
}

/// Итоги по группам в порядке групп черновика
pub fn group_totals(draft: &QuoteDraft) -> Vec<GroupTotals> {
    draft
        .grupos
        .iter()
        .map(|group| {
            let (count, sum) = draft
                .items_in_group(group.id)
                .fold((0usize, 0.0), |(n, s), item| (n + 1, s + item.total()));
            GroupTotals {
                grupo: group.id,
                nombre: group.nombre.clone(),
                items: count,
                subtotal: round_cents(sum),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_labor() -> LaborCosts {
        LaborCosts::default()
    }

    #[test]
    fn test_round_cents_half_away_from_zero() {
        assert_eq!(round_cents(1.005), 1.01);
        assert_eq!(round_cents(2.675), 2.68);
        assert_eq!(round_cents(-2.345), -2.35);
        assert_eq!(round_cents(2.344), 2.34);
        assert_eq!(round_cents(0.125), 0.13);
        assert_eq!(round_cents(f64::NAN), 0.0);
    }

    #[test]
    fn test_margin_and_quantity() {
        let totals = aggregate(1000.0, &no_labor(), 30.0, 1.0);
        assert_eq!(totals.subtotal, 1000.0);
        assert_eq!(totals.ganancia, 300.0);
        assert_eq!(totals.total, 1300.0);

        let labor = LaborCosts {
            fabricacion: 400.0,
            instalacion: 200.0,
            malla: 0.0,
            total: 600.0,
        };
        let totals = aggregate(250.0, &labor, 10.0, 3.0);
        assert_eq!(totals.subtotal, 850.0);
        assert_eq!(totals.ganancia, 85.0);
        assert_eq!(totals.total, 2805.0);
    }

    #[test]
    fn test_total_increases_with_margin_step_of_one_cent_of_ganancia() {
        // строго растёт, если шаг наценки меняет ganancia хотя бы на 0.01
        let mut previous = f64::MIN;
        for margin in [0.0, 5.0, 12.5, 30.0, 45.0, 100.0] {
            let total = aggregate(873.41, &no_labor(), margin, 2.0).total;
            assert!(total > previous, "margin {margin}: {total} <= {previous}");
            previous = total;
        }
    }

    #[test]
    fn test_sub_cent_margin_step_does_not_decrease_total() {
        let base = aggregate(1000.0, &no_labor(), 30.0, 1.0).total;
        let tiny = aggregate(1000.0, &no_labor(), 30.0001, 1.0).total;
        assert_eq!(base, 1300.0);
        assert!(tiny >= base);
    }

    #[test]
    fn test_quote_tax_from_rate() {
        let mut draft = QuoteDraft::new();
        let group = draft.default_group().unwrap();
        draft.items.push(test_item(group, 1300.0));
        draft.items.push(test_item(group, 195.5));

        let totals = quote_totals(&draft.items[..1], 0.15);
        assert_eq!(totals.subtotal, 1300.0);
        assert_eq!(totals.impuesto, 195.0);
        assert_eq!(totals.total, 1495.0);

        let totals = quote_totals(&draft.items, 0.0);
        assert_eq!(totals.subtotal, 1495.5);
        assert_eq!(totals.impuesto, 0.0);
        assert_eq!(totals.total, 1495.5);
    }

    #[test]
    fn test_group_totals() {
        let mut draft = QuoteDraft::new();
        let general = draft.default_group().unwrap();
        let second = draft.add_group("Segundo piso").unwrap();
        draft.items.push(test_item(general, 100.0));
        draft.items.push(test_item(second, 40.25));
        draft.items.push(test_item(general, 0.5));

        let groups = group_totals(&draft);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].nombre, "General");
        assert_eq!(groups[0].items, 2);
        assert_eq!(groups[0].subtotal, 100.5);
        assert_eq!(groups[1].subtotal, 40.25);
    }

    fn test_item(
        grupo: contracts::domain::a005_quote::aggregate::QuoteGroupId,
        total: f64,
    ) -> QuoteItem {
        use contracts::domain::a004_product::aggregate::ProductId;
        use contracts::domain::a005_quote::item::*;
        use contracts::enums::material_type::ProductMaterialType;

        QuoteItem {
            id: QuoteItemId::new_v4(),
            grupo,
            producto: ProductRef {
                id: ProductId::new("p"),
                nombre: "Producto".into(),
            },
            descripcion: None,
            entradas: ItemInputs {
                producto: ProductId::new("p"),
                dimensiones: Dimensions::new(1.0, 1.0),
                variantes: VariantSelection::default(),
                proveedores: SupplierSelection::default(),
                margen_ganancia: 0.0,
                cantidad: 1.0,
                mano_obra: LaborOptions::default(),
            },
            desglose: CostBreakdown {
                tipo_material: ProductMaterialType::Pvc,
                materiales: Vec::new(),
                total_materiales: total,
                mano_obra: LaborCosts::default(),
                totales: ItemTotals {
                    subtotal: total,
                    ganancia: 0.0,
                    total,
                },
            },
            advertencias: Vec::new(),
        }
    }
}
