use axum::Json;
use contracts::shared::labor::LaborParams;
use contracts::usecases::common::UseCaseError;

use super::ApiResult;
use crate::shared::app_state;

/// GET /api/labor-params
///
/// Параметры из каталога, иначе из конфигурации.
pub async fn get_effective() -> ApiResult<LaborParams> {
    let state = app_state::get()?;
    let params = state.catalog.labor_params().await.map_err(|e| {
        UseCaseError::external("No se pudo cargar la configuración de mano de obra")
            .with_details(e.to_string())
    })?;
    Ok(Json(params.unwrap_or_else(|| state.config.fallback_labor())))
}
