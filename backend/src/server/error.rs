use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::DataError;

/// Body of every failed request
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

/// A core error on its way out as an HTTP response
#[derive(Debug)]
pub struct ApiError(pub DataError);

impl From<DataError> for ApiError {
    fn from(err: DataError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            DataError::NotFound { .. } | DataError::VersionNotFound { .. } => StatusCode::NOT_FOUND,
            DataError::Conflict(_) => StatusCode::CONFLICT,
            DataError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            DataError::StoreUnavailable(_) | DataError::LockTimeout => StatusCode::SERVICE_UNAVAILABLE,
            DataError::Serialization(_) | DataError::CacheFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("Request failed: {}", self.0);
        } else {
            log::debug!("Request rejected: {}", self.0);
        }

        let body = ErrorResponse {
            success: false,
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<Json<T>, ApiError>;
