//! Participant-facing routes.
//!
//! The request layer stays thin: handlers translate HTTP into pool
//! operations and pool results into JSON. Capacity exhaustion maps to 503
//! with a structured body the frontend can render; validation and
//! not-found errors map to 400/404.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::{ConnectInfo, Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use serde::Deserialize;
use tracing::error;

use account_pool::{AccountPool, Assignment, Error as PoolError};
use lab_cache::CacheStore;
use metrics_exporter_prometheus::PrometheusHandle;

use crate::config::EventConfig;
use crate::metrics;

/// Shared application state accessible from all handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<AccountPool>,
    pub store: Arc<dyn CacheStore>,
    pub event: EventConfig,
    pub prometheus: PrometheusHandle,
}

/// Build the participant-facing router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/accounts/assign", post(assign_handler))
        .route("/accounts/{username}/valid", get(valid_handler))
        .with_state(state)
}

/// JSON response tuple in the shape axum renders directly.
pub(crate) fn json(
    status: StatusCode,
    body: serde_json::Value,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        body.to_string(),
    )
}

/// Map a pool error onto an HTTP response.
pub(crate) fn error_response(
    err: &PoolError,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    let status = match err {
        PoolError::Validation(_) => StatusCode::BAD_REQUEST,
        PoolError::NotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!(error = %err, "request failed");
    }
    json(status, serde_json::json!({ "error": err.to_string() }))
}

/// Request body for the assign endpoint.
#[derive(Debug, Deserialize)]
struct AssignRequest {
    email: String,
}

/// POST /accounts/assign — hand the participant an account.
///
/// Re-entry applies: an email that already holds an account gets the same
/// one back. An exhausted pool is a 503 with pool counts, not an error.
async fn assign_handler(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    axum::Json(body): axum::Json<AssignRequest>,
) -> impl IntoResponse {
    let ip = client_ip(&headers, addr);

    match state.pool.get_and_assign(&ip, &body.email).await {
        Ok(Assignment::Assigned(account)) => {
            metrics::record_assignment("assigned");
            if let Ok(summary) = state.pool.summary().await {
                metrics::set_pool_gauges(&summary);
            }
            json(StatusCode::OK, serde_json::json!({ "account": account }))
        }
        Ok(Assignment::NoCapacity) => {
            metrics::record_assignment("no_capacity");
            let pool = state.pool.summary().await.unwrap_or_default();
            json(
                StatusCode::SERVICE_UNAVAILABLE,
                serde_json::json!({
                    "error": {
                        "type": "no_capacity",
                        "message": "All lab accounts are assigned or disabled",
                        "pool": pool
                    }
                }),
            )
        }
        Err(err) => {
            metrics::record_assignment("error");
            error_response(&err)
        }
    }
}

/// GET /accounts/{username}/valid — is an issued assignment still honored?
async fn valid_handler(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> impl IntoResponse {
    match state.pool.is_assignment_valid(&username).await {
        Ok(valid) => json(
            StatusCode::OK,
            serde_json::json!({ "username": username, "valid": valid }),
        ),
        Err(err) => error_response(&err),
    }
}

/// GET /health — cache reachability plus pool counts.
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let cache_ok = state.store.health_check().await.unwrap_or(false);

    match state.pool.summary().await {
        Ok(summary) if cache_ok => {
            metrics::set_pool_gauges(&summary);
            let capacity = if summary.assignable > 0 {
                "available"
            } else {
                "exhausted"
            };
            json(
                StatusCode::OK,
                serde_json::json!({
                    "status": "ok",
                    "event": state.event.title,
                    "cache": "connected",
                    "capacity": capacity,
                    "pool": summary
                }),
            )
        }
        _ => json(
            StatusCode::SERVICE_UNAVAILABLE,
            serde_json::json!({
                "status": "unhealthy",
                "cache": if cache_ok { "connected" } else { "unreachable" }
            }),
        ),
    }
}

/// GET /metrics — Prometheus text exposition format.
async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(
            header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        state.prometheus.render(),
    )
}

/// Caller IP: first x-forwarded-for hop if present, else the socket peer.
fn client_ip(headers: &HeaderMap, addr: SocketAddr) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| addr.ip().to_string())
}
