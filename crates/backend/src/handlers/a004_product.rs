use axum::Json;
use contracts::domain::a004_product::validation::{ValidateBomRequest, ValidateBomResponse};
use contracts::usecases::common::UseCaseError;

use super::ApiResult;
use crate::domain::a004_product::service;
use crate::shared::app_state;

/// POST /api/a004/product/bom/validate
///
/// Нормализует ссылки на зависимости и проверяет спецификацию по каталогу
/// материалов.
pub async fn validate_bom(Json(request): Json<ValidateBomRequest>) -> ApiResult<ValidateBomResponse> {
    let state = app_state::get()?;
    let materials = state.catalog.materials().await.map_err(|e| {
        UseCaseError::external("No se pudo cargar el catálogo de materiales")
            .with_details(e.to_string())
    })?;

    let (lineas, reescrituras) = service::normalize_dependency_refs(request.lineas, &materials);
    let validation = service::validate_bom(&lineas, &materials);
    if !validation.is_valid() {
        tracing::info!("BOM rejected with {} issues", validation.issues.len());
    }

    Ok(Json(ValidateBomResponse {
        valido: validation.is_valid(),
        lineas,
        reescrituras,
        problemas: validation.issues,
    }))
}
