//! Problem API: filtered list, create, read, partial update, delete.
//!
//! `GET /problems` accepts `chapterId`, `search` and `difficulty`. Unknown
//! difficulties are ignored rather than rejected, so `?difficulty=BOGUS`
//! lists everything.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path as AxumPath, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use std::sync::Arc;
use tracing::info;

use super::error::{store_error, ApiError};
use super::{parse_id, AppState};
use crate::db::{NewProblem, ProblemFilter, ProblemQuery, ProblemUpdate};

fn check_duration(duration: Option<i32>) -> Result<(), ApiError> {
    match duration {
        Some(d) if d < 0 => Err(ApiError::BadRequest(
            "duration must be a non-negative number of seconds".to_string(),
        )),
        _ => Ok(()),
    }
}

pub(super) async fn handler_problems_list(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ProblemQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query?;
    let filter = ProblemFilter::from(query);
    let problems = state
        .db
        .list_problems(&filter)
        .await
        .map_err(store_error("fetch problems", filter.chapter_id))?;
    Ok(Json(problems))
}

pub(super) async fn handler_problems_create(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewProblem>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    check_duration(payload.duration)?;
    let problem = state
        .db
        .create_problem(&payload)
        .await
        .map_err(store_error("create problem", Some(payload.chapter_id)))?
        .ok_or_else(|| {
            ApiError::BadRequest(format!("Chapter {} does not exist", payload.chapter_id))
        })?;
    state.metrics.record_mutation("problem", "create");
    info!(
        problem_id = %problem.problem.id,
        chapter_id = %payload.chapter_id,
        problem_number = payload.problem_number,
        "problem created"
    );
    Ok((StatusCode::CREATED, Json(problem)))
}

pub(super) async fn handler_problem_get(
    State(state): State<Arc<AppState>>,
    AxumPath(raw_id): AxumPath<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&raw_id).ok_or(ApiError::NotFound("Problem"))?;
    let problem = state
        .db
        .get_problem(id)
        .await
        .map_err(store_error("fetch problem", Some(id)))?
        .ok_or(ApiError::NotFound("Problem"))?;
    Ok(Json(problem))
}

pub(super) async fn handler_problem_update(
    State(state): State<Arc<AppState>>,
    AxumPath(raw_id): AxumPath<String>,
    payload: Result<Json<ProblemUpdate>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&raw_id).ok_or(ApiError::NotFound("Problem"))?;
    let Json(payload) = payload?;
    check_duration(payload.duration.flatten())?;
    let problem = state
        .db
        .update_problem(id, &payload)
        .await
        .map_err(store_error("update problem", Some(id)))?
        .ok_or(ApiError::NotFound("Problem"))?;
    state.metrics.record_mutation("problem", "update");
    info!(problem_id = %id, status = ?problem.problem.status, "problem updated");
    Ok(Json(problem))
}

pub(super) async fn handler_problem_delete(
    State(state): State<Arc<AppState>>,
    AxumPath(raw_id): AxumPath<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&raw_id).ok_or(ApiError::NotFound("Problem"))?;
    let deleted = state
        .db
        .delete_problem(id)
        .await
        .map_err(store_error("delete problem", Some(id)))?;
    if !deleted {
        return Err(ApiError::NotFound("Problem"));
    }
    state.metrics.record_mutation("problem", "delete");
    info!(problem_id = %id, "problem deleted");
    Ok(Json(
        serde_json::json!({ "message": "Problem deleted successfully" }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_must_not_be_negative() {
        assert!(check_duration(None).is_ok());
        assert!(check_duration(Some(0)).is_ok());
        assert!(check_duration(Some(480)).is_ok());
        assert!(matches!(check_duration(Some(-1)), Err(ApiError::BadRequest(_))));
    }
}
