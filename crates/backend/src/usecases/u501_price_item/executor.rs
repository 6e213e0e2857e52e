use std::sync::Arc;

use contracts::domain::a004_product::aggregate::ProductId;
use contracts::domain::a005_quote::aggregate::QuoteGroupId;
use contracts::domain::a005_quote::item::{ItemInputs, QuoteItem, QuoteItemId};
use contracts::shared::labor::LaborParams;
use contracts::usecases::common::{UseCaseError, UseCaseMetadata};
use contracts::usecases::u501_price_item::{PriceItemRequest, PriceItemResponse};

use super::pricing::{self, PricedItem};
use crate::shared::catalog::{load_snapshot, CatalogError, CatalogSnapshot, CatalogSource};
use crate::shared::format::format_money;
use crate::shared::logger;

/// Executor для UseCase расчёта позиции котировки
#[derive(Clone)]
pub struct PriceItemExecutor {
    catalog: Arc<dyn CatalogSource>,
    fallback_labor: LaborParams,
}

impl UseCaseMetadata for PriceItemExecutor {
    fn usecase_index() -> &'static str {
        "u501"
    }

    fn usecase_name() -> &'static str {
        "price_item"
    }

    fn display_name() -> &'static str {
        "Calcular precio de item"
    }

    fn description() -> &'static str {
        "Materiales, mano de obra, ganancia y total de un item de cotización"
    }
}

/// Ошибка каталога в терминах UseCase.
///
/// Отсутствующее изделие считается ошибкой входных данных, остальное
/// является сбоем внешней системы.
fn catalog_error(product: &ProductId, error: CatalogError) -> UseCaseError {
    match error {
        CatalogError::NotFound { .. } => {
            UseCaseError::validation(format!("Producto {} no encontrado", product))
        }
        other => {
            tracing::error!("Catalog request failed for product {}: {}", product, other);
            UseCaseError::external("No se pudo cargar el catálogo").with_details(other.to_string())
        }
    }
}

impl PriceItemExecutor {
    pub fn new(catalog: Arc<dyn CatalogSource>, fallback_labor: LaborParams) -> Self {
        Self {
            catalog,
            fallback_labor,
        }
    }

    /// Загрузить каталог для изделия (последовательно, без повторов)
    pub async fn load(&self, product: &ProductId) -> Result<CatalogSnapshot, UseCaseError> {
        load_snapshot(self.catalog.as_ref(), product, &self.fallback_labor)
            .await
            .map_err(|e| catalog_error(product, e))
    }

    /// Рассчитать позицию: проверка, загрузка каталога, расчёт
    pub async fn price(&self, inputs: &ItemInputs) -> Result<PricedItem, UseCaseError> {
        inputs.validate().map_err(UseCaseError::validation)?;

        let snapshot = self.load(&inputs.producto).await?;
        let priced = pricing::price(inputs, &snapshot)?;

        for warning in &priced.advertencias {
            logger::log(
                "pricing",
                &format!("product {}: {}", inputs.producto, warning),
            );
        }
        tracing::info!(
            "{}: product {} priced at {} ({} warnings)",
            Self::full_name(),
            inputs.producto,
            format_money(priced.desglose.totales.total),
            priced.advertencias.len()
        );

        Ok(priced)
    }

    /// Рассчитать и собрать позицию черновика.
    ///
    /// `id` передаётся при пересчёте существующей позиции.
    pub async fn build_item(
        &self,
        inputs: ItemInputs,
        grupo: QuoteGroupId,
        descripcion: Option<String>,
        id: Option<QuoteItemId>,
    ) -> Result<QuoteItem, UseCaseError> {
        let priced = self.price(&inputs).await?;
        Ok(QuoteItem {
            id: id.unwrap_or_else(QuoteItemId::new_v4),
            grupo,
            producto: priced.producto,
            descripcion,
            entradas: inputs,
            desglose: priced.desglose,
            advertencias: priced.advertencias,
        })
    }

    /// Расчёт позиции вне черновика
    pub async fn execute(&self, request: PriceItemRequest) -> Result<PriceItemResponse, UseCaseError> {
        // Позиция без черновика получает нулевую группу
        let grupo = request.grupo.unwrap_or(QuoteGroupId(uuid::Uuid::nil()));
        let item = self
            .build_item(request.entradas, grupo, request.descripcion, None)
            .await?;
        Ok(PriceItemResponse {
            con_advertencias: !item.advertencias.is_empty(),
            item,
        })
    }
}
