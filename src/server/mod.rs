//! # Server: HTTP API for the Chapter and Problem Catalog
//!
//! Runs an Axum server exposing CRUD endpoints for chapters and problems,
//! catalog stats, and health/metrics probes. Handlers are stateless; the only
//! shared state is the connection pool and the metrics registry in
//! [`AppState`], created once at startup.
//!
//! Catalog routes are served both at the root (`/chapters`) and under `/api`
//! (`/api/chapters`), the paths the web frontend calls.

mod error;
mod routes_chapters;
mod routes_health;
mod routes_problems;
mod routes_stats;

pub use error::ApiError;

use crate::{db, prom_metrics};
use anyhow::Result;
use axum::extract::Request;
use axum::middleware::Next;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, Instrument};
use uuid::Uuid;

pub struct AppState {
    pub db: db::Database,
    pub metrics: prom_metrics::Metrics,
}

impl AppState {
    pub fn with_db(db: db::Database) -> Arc<Self> {
        Arc::new(AppState {
            db,
            metrics: prom_metrics::Metrics::new(),
        })
    }
}

/// Parse a record id from the path. Anything that is not a UUID cannot name
/// a record, so callers answer 404 rather than 400.
fn parse_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw).ok()
}

/// Records request duration into the Prometheus histogram, generates (or
/// propagates) a request ID, and wraps the request in a tracing span.
async fn metrics_middleware(
    axum::extract::State(state): axum::extract::State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> axum::response::Response {
    let request_id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let method = req.method().to_string();
    let raw_path = req.uri().path().to_string();
    let norm_path = normalize_path(&raw_path);
    let start = Instant::now();

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        path = %raw_path,
    );
    let mut response = next.run(req).instrument(span).await;

    state
        .metrics
        .http_request_duration
        .get_or_create(&prom_metrics::HttpLabel {
            method,
            path: norm_path,
        })
        .observe(start.elapsed().as_secs_f64());

    if let Ok(value) = request_id.parse() {
        response.headers_mut().insert("x-request-id", value);
    }
    response
}

/// Collapse the id segment after `chapters`/`problems` into `:id` so the
/// histogram gets one series per route, not per record.
fn normalize_path(path: &str) -> String {
    let mut previous = "";
    path.split('/')
        .map(|seg| {
            let out = if !seg.is_empty() && matches!(previous, "chapters" | "problems") {
                ":id"
            } else {
                seg
            };
            previous = seg;
            out
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn catalog_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/chapters",
            get(routes_chapters::handler_chapters_list).post(routes_chapters::handler_chapters_create),
        )
        .route(
            "/chapters/{id}",
            get(routes_chapters::handler_chapter_get)
                .put(routes_chapters::handler_chapter_update)
                .delete(routes_chapters::handler_chapter_delete),
        )
        .route(
            "/problems",
            get(routes_problems::handler_problems_list).post(routes_problems::handler_problems_create),
        )
        .route(
            "/problems/{id}",
            get(routes_problems::handler_problem_get)
                .put(routes_problems::handler_problem_update)
                .delete(routes_problems::handler_problem_delete),
        )
        .route("/stats", get(routes_stats::handler_stats))
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(catalog_routes())
        .nest("/api", catalog_routes())
        .route("/healthz", get(routes_health::handler_healthz))
        .route("/readyz", get(routes_health::handler_readyz))
        .route("/metrics", get(routes_health::handler_metrics))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(CatchPanicLayer::new())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            metrics_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(1024 * 1024))
        .with_state(state)
}

/// Serve the API on `bind:port` until Ctrl+C or SIGTERM.
pub async fn run(bind: &str, port: u16, database: db::Database) -> Result<()> {
    let state = AppState::with_db(database);
    let app = build_router(state);

    let address = format!("{}:{}", bind, port);
    let listener = TcpListener::bind(&address).await?;
    info!(%address, "catalog API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if signal::ctrl_c().await.is_ok() {
            info!("received Ctrl+C, shutting down");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                info!("received terminate signal, shutting down");
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_path_preserves_collection_routes() {
        assert_eq!(normalize_path("/chapters"), "/chapters");
        assert_eq!(normalize_path("/api/problems"), "/api/problems");
        assert_eq!(normalize_path("/metrics"), "/metrics");
    }

    #[test]
    fn normalize_path_collapses_record_ids() {
        assert_eq!(
            normalize_path("/chapters/550e8400-e29b-41d4-a716-446655440000"),
            "/chapters/:id"
        );
        assert_eq!(normalize_path("/api/problems/not-a-uuid"), "/api/problems/:id");
    }

    #[test]
    fn normalize_path_handles_empty_and_root() {
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path(""), "");
        assert_eq!(normalize_path("/chapters/"), "/chapters/");
    }

    #[test]
    fn parse_id_accepts_only_uuids() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string()), Some(id));
        assert_eq!(parse_id("42"), None);
        assert_eq!(parse_id("clx0abc123"), None);
    }
}
