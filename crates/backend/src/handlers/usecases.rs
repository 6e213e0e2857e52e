use axum::Json;
use contracts::usecases::u501_price_item::{PriceItemRequest, PriceItemResponse};

use super::ApiResult;
use crate::shared::app_state;

// ============================================================================
// UseCase u501: Price item
// ============================================================================

/// POST /api/u501/price-item
pub async fn u501_price_item(Json(request): Json<PriceItemRequest>) -> ApiResult<PriceItemResponse> {
    let state = app_state::get()?;
    let response = state.price_item_executor().execute(request).await?;
    Ok(Json(response))
}
