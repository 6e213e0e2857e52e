use serde::{Deserialize, Serialize};

use super::aggregate::{QuoteDraftId, QuoteGroupId};

/// Итоги котировки с налогом
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct QuoteTotals {
    pub subtotal: f64,
    pub impuesto: f64,
    pub total: f64,
    /// Ставка налога, доля (0.15 = 15%)
    pub tasa_impuesto: f64,
}

/// Итоги по группе (без налога)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupTotals {
    pub grupo: QuoteGroupId,
    pub nombre: String,
    pub items: usize,
    pub subtotal: f64,
}

/// Сводка черновика для представления
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteSummary {
    pub cotizacion: QuoteDraftId,
    pub totales: QuoteTotals,
    pub grupos: Vec<GroupTotals>,
    /// Позиции, рассчитанные с предупреждениями
    pub items_con_advertencias: usize,
}
