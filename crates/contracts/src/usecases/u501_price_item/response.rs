use crate::domain::a005_quote::item::QuoteItem;
use serde::{Deserialize, Serialize};

/// Результат расчёта позиции
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceItemResponse {
    pub item: QuoteItem,
    /// Расчёт выполнен с предупреждениями о данных
    pub con_advertencias: bool,
}
