//! Handler-boundary error type.
//!
//! Every failure leaves a handler as an [`ApiError`] and is rendered as
//! `{"error": "<message>"}` with a status code per variant. Store failures
//! are logged with their cause; the response only names the operation.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::{error, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Failed to {operation}")]
    Store {
        operation: &'static str,
        target: Option<Uuid>,
        #[source]
        source: anyhow::Error,
    },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// `map_err` adapter turning a data-layer error into [`ApiError::Store`].
pub(super) fn store_error(
    operation: &'static str,
    target: Option<Uuid>,
) -> impl FnOnce(anyhow::Error) -> ApiError {
    move |source| ApiError::Store {
        operation,
        target,
        source,
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Store {
                operation,
                target,
                source,
            } => match target {
                Some(id) => error!(operation, record_id = %id, error = %format!("{source:#}"), "store operation failed"),
                None => error!(operation, error = %format!("{source:#}"), "store operation failed"),
            },
            other => warn!(status = status.as_u16(), error = %other, "request rejected"),
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}
