use std::sync::Arc;

use contracts::usecases::common::UseCaseError;
use once_cell::sync::OnceCell;

use super::catalog::CatalogSource;
use super::config::Config;
use crate::domain::a005_quote::draft_store::DraftStore;
use crate::usecases::u501_price_item::PriceItemExecutor;

/// Общее состояние сервера, создаётся один раз при старте
pub struct AppState {
    pub config: Config,
    pub catalog: Arc<dyn CatalogSource>,
    pub drafts: DraftStore,
}

static APP_STATE: OnceCell<AppState> = OnceCell::new();

pub fn initialize(state: AppState) -> anyhow::Result<()> {
    APP_STATE
        .set(state)
        .map_err(|_| anyhow::anyhow!("Application state already initialized"))
}

pub fn get() -> Result<&'static AppState, UseCaseError> {
    APP_STATE
        .get()
        .ok_or_else(|| UseCaseError::internal("Application state has not been initialized"))
}

impl AppState {
    pub fn price_item_executor(&self) -> PriceItemExecutor {
        PriceItemExecutor::new(self.catalog.clone(), self.config.fallback_labor())
    }

    pub fn tax_rate(&self) -> f64 {
        self.config.pricing.tax_rate
    }
}
