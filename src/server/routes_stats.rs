//! `GET /stats`: catalog totals shown on the landing pages.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use std::sync::Arc;

use super::error::{store_error, ApiError};
use super::AppState;

pub(super) async fn handler_stats(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let stats = state
        .db
        .get_stats()
        .await
        .map_err(store_error("fetch catalog stats", None))?;
    Ok(Json(stats))
}
