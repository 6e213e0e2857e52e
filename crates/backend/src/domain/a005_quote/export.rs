use anyhow::Result;
use contracts::domain::a005_quote::aggregate::QuoteDraft;

use crate::shared::format::format_amount;
use crate::usecases::u501_price_item::aggregator::{quote_totals, round_cents};

const HEADERS: [&str; 8] = [
    "grupo",
    "producto",
    "descripcion",
    "ancho",
    "alto",
    "cantidad",
    "precio_unitario",
    "total",
];

/// Выгрузка черновика в CSV: позиции в порядке групп, затем итоги
pub fn to_csv(draft: &QuoteDraft, tax_rate: f64) -> Result<String> {
    let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(HEADERS)?;

    for group in &draft.grupos {
        for item in draft.items_in_group(group.id) {
            let dims = &item.entradas.dimensiones;
            writer.write_record([
                group.nombre.clone(),
                item.producto.nombre.clone(),
                item.descripcion.clone().unwrap_or_default(),
                dims.ancho.to_string(),
                dims.alto.to_string(),
                item.entradas.cantidad.to_string(),
                format_amount(item.unit_total()),
                format_amount(item.total()),
            ])?;
        }
    }

    let totals = quote_totals(&draft.items, tax_rate);
    let tax_label = format!("ISV {}%", round_cents(tax_rate * 100.0));
    for (label, amount) in [
        ("Subtotal", totals.subtotal),
        (tax_label.as_str(), totals.impuesto),
        ("Total", totals.total),
    ] {
        let amount = format_amount(amount);
        writer.write_record(["", "", "", "", "", "", label, amount.as_str()])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("CSV flush failed: {}", e))?;
    Ok(String::from_utf8(bytes)?)
}
