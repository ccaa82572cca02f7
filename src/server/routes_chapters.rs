//! Chapter API: list, create, read, full update, delete.
//!
//! | Endpoint | Success |
//! |----------|---------|
//! | `GET /chapters` | chapters by `order`, each with `_count.problems` |
//! | `POST /chapters` | 201 + created chapter |
//! | `GET /chapters/{id}` | chapter + problems by `problemNumber` |
//! | `PUT /chapters/{id}` | updated chapter |
//! | `DELETE /chapters/{id}` | confirmation message; 409 while problems remain |

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path as AxumPath, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use std::sync::Arc;
use tracing::info;

use super::error::{store_error, ApiError};
use super::{parse_id, AppState};
use crate::db::{ChapterDeletion, ChapterUpdate, NewChapter};

pub(super) async fn handler_chapters_list(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let chapters = state
        .db
        .list_chapters()
        .await
        .map_err(store_error("fetch chapters", None))?;
    Ok(Json(chapters))
}

pub(super) async fn handler_chapters_create(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewChapter>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    let chapter = state
        .db
        .create_chapter(&payload)
        .await
        .map_err(store_error("create chapter", None))?;
    state.metrics.record_mutation("chapter", "create");
    info!(chapter_id = %chapter.id, order = chapter.order, "chapter created");
    Ok((StatusCode::CREATED, Json(chapter)))
}

pub(super) async fn handler_chapter_get(
    State(state): State<Arc<AppState>>,
    AxumPath(raw_id): AxumPath<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&raw_id).ok_or(ApiError::NotFound("Chapter"))?;
    match state
        .db
        .get_chapter_detail(id)
        .await
        .map_err(store_error("fetch chapter", Some(id)))?
    {
        Some(chapter) => Ok(Json(chapter)),
        None => Err(ApiError::NotFound("Chapter")),
    }
}

pub(super) async fn handler_chapter_update(
    State(state): State<Arc<AppState>>,
    AxumPath(raw_id): AxumPath<String>,
    payload: Result<Json<ChapterUpdate>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&raw_id).ok_or(ApiError::NotFound("Chapter"))?;
    let Json(payload) = payload?;
    let chapter = state
        .db
        .update_chapter(id, &payload)
        .await
        .map_err(store_error("update chapter", Some(id)))?
        .ok_or(ApiError::NotFound("Chapter"))?;
    state.metrics.record_mutation("chapter", "update");
    info!(chapter_id = %id, "chapter updated");
    Ok(Json(chapter))
}

pub(super) async fn handler_chapter_delete(
    State(state): State<Arc<AppState>>,
    AxumPath(raw_id): AxumPath<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&raw_id).ok_or(ApiError::NotFound("Chapter"))?;
    match state
        .db
        .delete_chapter(id)
        .await
        .map_err(store_error("delete chapter", Some(id)))?
    {
        ChapterDeletion::Deleted => {
            state.metrics.record_mutation("chapter", "delete");
            info!(chapter_id = %id, "chapter deleted");
            Ok(Json(
                serde_json::json!({ "message": "Chapter deleted successfully" }),
            ))
        }
        ChapterDeletion::NotFound => Err(ApiError::NotFound("Chapter")),
        ChapterDeletion::HasProblems(count) => Err(ApiError::Conflict(format!(
            "Chapter still has {} problem{}; delete them first",
            count,
            if count == 1 { "" } else { "s" }
        ))),
    }
}
