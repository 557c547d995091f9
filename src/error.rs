use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use validator::ValidationErrors;

use crate::{
    auth_service::AuthError,
    validation::{FieldErrors, field_errors},
};

/// ApiError
///
/// Everything a handler can fail with. Store errors never appear here: the
/// repository layer has already logged them and degraded to an empty result.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Form input rejected; rendered inline per field.
    #[error("validation failed")]
    Validation(FieldErrors),
    /// The auth provider refused the request; rendered as a toast message.
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("not found")]
    NotFound,
    #[error("unauthorized")]
    Unauthorized,
    /// The data source did not accept a write. Details were logged where it happened.
    #[error("the record could not be saved")]
    NotSaved,
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(field_errors(&errors))
    }
}

/// ErrorBody
///
/// JSON error envelope shared by every API route.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldErrors>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, fields) = match &self {
            ApiError::Validation(fields) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation",
                Some(fields.clone()),
            ),
            ApiError::Auth(e) => (e.status_code(), "auth", None),
            ApiError::NotFound => (StatusCode::NOT_FOUND, "not_found", None),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None),
            ApiError::NotSaved => (StatusCode::SERVICE_UNAVAILABLE, "not_saved", None),
        };

        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
        } else {
            tracing::debug!("request rejected: {}", self);
        }

        let body = ErrorBody {
            error,
            message: self.to_string(),
            fields,
        };
        (status, Json(body)).into_response()
    }
}
