use axum::extract::Path;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use contracts::domain::a005_quote::aggregate::{
    QuoteDraft, QuoteDraftId, QuoteDraftListItem, QuoteGroupId, QuoteGroupPatch,
};
use contracts::domain::a005_quote::dto::{
    AddGroupRequest, CreateDraftRequest, MoveItemRequest, SetClientRequest,
};
use contracts::domain::a005_quote::item::QuoteItemId;
use contracts::domain::a005_quote::totals::QuoteSummary;
use contracts::domain::common::AggregateId;
use contracts::usecases::common::UseCaseError;
use contracts::usecases::u501_price_item::{PriceItemRequest, PriceItemResponse};

use super::{ApiError, ApiResult};
use crate::domain::a005_quote::{export, service};
use crate::shared::app_state;

fn parse_draft_id(id: &str) -> Result<QuoteDraftId, ApiError> {
    QuoteDraftId::from_string(id).map_err(|e| ApiError(UseCaseError::validation(e)))
}

fn parse_uuid(id: &str) -> Result<uuid::Uuid, ApiError> {
    uuid::Uuid::parse_str(id)
        .map_err(|e| ApiError(UseCaseError::validation(format!("Invalid UUID: {}", e))))
}

/// Загрузить черновик, изменить и сохранить
async fn mutate<F>(id: &str, change: F) -> ApiResult<QuoteDraft>
where
    F: FnOnce(&mut QuoteDraft) -> Result<(), String>,
{
    let state = app_state::get()?;
    let mut draft = state.drafts.load(&parse_draft_id(id)?).await?;
    change(&mut draft).map_err(UseCaseError::validation)?;
    state.drafts.save(&mut draft).await?;
    Ok(Json(draft))
}

/// POST /api/a005/quote/draft
pub async fn create(body: Option<Json<CreateDraftRequest>>) -> ApiResult<QuoteDraft> {
    let state = app_state::get()?;
    let request = body.map(|Json(r)| r).unwrap_or_default();

    let mut draft = QuoteDraft::new();
    draft.set_client(request.cliente);
    draft.notas = request.notas;
    state.drafts.save(&mut draft).await?;

    tracing::info!("Draft {} created", draft.to_string_id());
    Ok(Json(draft))
}

/// GET /api/a005/quote/draft
pub async fn list_all() -> ApiResult<Vec<QuoteDraftListItem>> {
    let state = app_state::get()?;
    Ok(Json(state.drafts.list().await?))
}

/// GET /api/a005/quote/draft/:id
pub async fn get_by_id(Path(id): Path<String>) -> ApiResult<QuoteDraft> {
    let state = app_state::get()?;
    Ok(Json(state.drafts.load(&parse_draft_id(&id)?).await?))
}

/// PUT /api/a005/quote/draft/:id
///
/// Сохраняет черновик целиком; версия должна совпадать с сохранённой.
/// Позиции пересчитываются по каталогу перед сохранением.
pub async fn update(Path(id): Path<String>, Json(mut draft): Json<QuoteDraft>) -> ApiResult<QuoteDraft> {
    let state = app_state::get()?;
    if parse_draft_id(&id)? != draft.id {
        return Err(UseCaseError::validation("ID de la cotización no coincide").into());
    }
    service::prepare_replacement(&mut draft, &state.price_item_executor()).await?;
    state.drafts.save(&mut draft).await?;
    Ok(Json(draft))
}

/// DELETE /api/a005/quote/draft/:id
pub async fn delete(Path(id): Path<String>) -> Result<StatusCode, ApiError> {
    let state = app_state::get()?;
    if state.drafts.delete(&parse_draft_id(&id)?).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(UseCaseError::not_found(format!("Cotización {} no encontrada", id)).into())
    }
}

/// PUT /api/a005/quote/draft/:id/client
pub async fn set_client(Path(id): Path<String>, Json(req): Json<SetClientRequest>) -> ApiResult<QuoteDraft> {
    mutate(&id, |draft| {
        draft.set_client(req.cliente);
        Ok(())
    })
    .await
}

/// POST /api/a005/quote/draft/:id/items
pub async fn add_item(
    Path(id): Path<String>,
    Json(request): Json<PriceItemRequest>,
) -> ApiResult<PriceItemResponse> {
    let state = app_state::get()?;
    let mut draft = state.drafts.load(&parse_draft_id(&id)?).await?;

    let executor = state.price_item_executor();
    let item = service::add_priced_item(&mut draft, request, &executor).await?;
    state.drafts.save(&mut draft).await?;

    Ok(Json(PriceItemResponse {
        con_advertencias: !item.advertencias.is_empty(),
        item,
    }))
}

/// DELETE /api/a005/quote/draft/:id/items/:item_id
pub async fn remove_item(Path((id, item_id)): Path<(String, String)>) -> ApiResult<QuoteDraft> {
    let item_id = QuoteItemId(parse_uuid(&item_id)?);
    mutate(&id, |draft| draft.remove_item(item_id).map(|_| ())).await
}

/// POST /api/a005/quote/draft/:id/items/:item_id/duplicate
pub async fn duplicate_item(Path((id, item_id)): Path<(String, String)>) -> ApiResult<QuoteDraft> {
    let item_id = QuoteItemId(parse_uuid(&item_id)?);
    mutate(&id, |draft| draft.duplicate_item(item_id).map(|_| ())).await
}

/// POST /api/a005/quote/draft/:id/items/:item_id/move
pub async fn move_item(
    Path((id, item_id)): Path<(String, String)>,
    Json(req): Json<MoveItemRequest>,
) -> ApiResult<QuoteDraft> {
    let item_id = QuoteItemId(parse_uuid(&item_id)?);
    mutate(&id, |draft| draft.move_item(item_id, req.grupo)).await
}

/// POST /api/a005/quote/draft/:id/groups
pub async fn add_group(Path(id): Path<String>, Json(req): Json<AddGroupRequest>) -> ApiResult<QuoteDraft> {
    mutate(&id, |draft| {
        let group = draft.add_group(req.nombre)?;
        if req.descripcion.is_some() {
            draft.update_group(
                group,
                QuoteGroupPatch {
                    descripcion: req.descripcion,
                    ..Default::default()
                },
            )?;
        }
        Ok(())
    })
    .await
}

/// PUT /api/a005/quote/draft/:id/groups/:group_id
pub async fn update_group(
    Path((id, group_id)): Path<(String, String)>,
    Json(patch): Json<QuoteGroupPatch>,
) -> ApiResult<QuoteDraft> {
    let group_id = QuoteGroupId(parse_uuid(&group_id)?);
    mutate(&id, |draft| draft.update_group(group_id, patch)).await
}

/// DELETE /api/a005/quote/draft/:id/groups/:group_id
pub async fn remove_group(Path((id, group_id)): Path<(String, String)>) -> ApiResult<QuoteDraft> {
    let group_id = QuoteGroupId(parse_uuid(&group_id)?);
    mutate(&id, |draft| draft.remove_group(group_id)).await
}

/// POST /api/a005/quote/draft/:id/reprice
pub async fn reprice(Path(id): Path<String>) -> ApiResult<QuoteDraft> {
    let state = app_state::get()?;
    let mut draft = state.drafts.load(&parse_draft_id(&id)?).await?;

    let count = service::reprice_draft(&mut draft, &state.price_item_executor()).await?;
    state.drafts.save(&mut draft).await?;

    tracing::info!("Draft {}: {} items repriced", draft.to_string_id(), count);
    Ok(Json(draft))
}

/// GET /api/a005/quote/draft/:id/summary
pub async fn summary(Path(id): Path<String>) -> ApiResult<QuoteSummary> {
    let state = app_state::get()?;
    let draft = state.drafts.load(&parse_draft_id(&id)?).await?;
    Ok(Json(service::summary(&draft, state.tax_rate())))
}

/// GET /api/a005/quote/draft/:id/export.csv
pub async fn export_csv(Path(id): Path<String>) -> Result<impl IntoResponse, ApiError> {
    let state = app_state::get()?;
    let draft = state.drafts.load(&parse_draft_id(&id)?).await?;
    let csv = export::to_csv(&draft, state.tax_rate())?;

    let disposition = format!("attachment; filename=\"cotizacion-{}.csv\"", draft.to_string_id());
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    ))
}
