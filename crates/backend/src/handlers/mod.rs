pub mod a004_product;
pub mod a005_quote;
pub mod formula;
pub mod labor_params;
pub mod logs;
pub mod usecases;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use contracts::usecases::common::UseCaseError;

use crate::domain::a005_quote::draft_store::DraftStoreError;

/// Ошибка API: `UseCaseError` в теле и HTTP-статус по коду ошибки
#[derive(Debug)]
pub struct ApiError(pub UseCaseError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0.code.as_str() {
            UseCaseError::VALIDATION => StatusCode::BAD_REQUEST,
            UseCaseError::NOT_FOUND => StatusCode::NOT_FOUND,
            UseCaseError::CONFLICT => StatusCode::CONFLICT,
            UseCaseError::EXTERNAL => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self.0);
        }
        (status, Json(self.0)).into_response()
    }
}

impl From<UseCaseError> for ApiError {
    fn from(err: UseCaseError) -> Self {
        ApiError(err)
    }
}

impl From<DraftStoreError> for ApiError {
    fn from(err: DraftStoreError) -> Self {
        let mapped = match &err {
            DraftStoreError::NotFound(id) => {
                UseCaseError::not_found(format!("Cotización {} no encontrada", id))
            }
            DraftStoreError::VersionConflict { .. } => {
                UseCaseError::conflict("La cotización fue modificada, recárguela")
                    .with_details(err.to_string())
            }
            DraftStoreError::Io { .. } | DraftStoreError::Json { .. } => {
                UseCaseError::internal(err.to_string())
            }
        };
        ApiError(mapped)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError(UseCaseError::from(err))
    }
}

pub type ApiResult<T> = Result<Json<T>, ApiError>;
