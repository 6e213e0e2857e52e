use crate::domain::a005_quote::aggregate::QuoteGroupId;
use crate::domain::a005_quote::item::ItemInputs;
use serde::{Deserialize, Serialize};

/// Запрос на расчёт одной позиции котировки
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceItemRequest {
    #[serde(flatten)]
    pub entradas: ItemInputs,

    /// Группа в черновике (при добавлении позиции в черновик)
    #[serde(default)]
    pub grupo: Option<QuoteGroupId>,

    #[serde(default)]
    pub descripcion: Option<String>,
}
