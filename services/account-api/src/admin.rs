//! Admin API for pool management
//!
//! Caller authentication is handled upstream (event gateway); these routes
//! assume a trusted operator.
//!
//! Endpoints:
//! - GET  /admin/accounts                       — every account's state
//! - GET  /admin/pool                           — pool summary counts
//! - POST /admin/accounts/{username}/unassign   — free an account
//! - POST /admin/accounts/{username}/block      — take an account out of rotation
//! - POST /admin/accounts/{username}/unblock    — return an account to rotation

use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use tracing::info;

use account_pool::AccountPool;

use crate::metrics;
use crate::routes::{error_response, json};

/// Shared state for admin API handlers.
#[derive(Clone)]
pub struct AdminState {
    pool: Arc<AccountPool>,
}

impl AdminState {
    pub fn new(pool: Arc<AccountPool>) -> Self {
        Self { pool }
    }
}

/// Build the admin axum router.
pub fn build_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/admin/accounts", get(list_accounts))
        .route("/admin/pool", get(pool_status))
        .route("/admin/accounts/{username}/unassign", post(unassign_account))
        .route("/admin/accounts/{username}/block", post(block_account))
        .route("/admin/accounts/{username}/unblock", post(unblock_account))
        .with_state(state)
}

/// GET /admin/accounts — list all accounts with their current state.
async fn list_accounts(State(state): State<AdminState>) -> impl IntoResponse {
    match state.pool.list_all().await {
        Ok(accounts) => json(StatusCode::OK, serde_json::json!({ "accounts": accounts })),
        Err(err) => error_response(&err),
    }
}

/// GET /admin/pool — pool summary counts.
async fn pool_status(State(state): State<AdminState>) -> impl IntoResponse {
    match state.pool.summary().await {
        Ok(summary) => {
            metrics::set_pool_gauges(&summary);
            json(StatusCode::OK, serde_json::json!({ "pool": summary }))
        }
        Err(err) => error_response(&err),
    }
}

/// POST /admin/accounts/{username}/unassign — free the account.
async fn unassign_account(
    State(state): State<AdminState>,
    Path(username): Path<String>,
) -> impl IntoResponse {
    match state.pool.unassign(&username).await {
        Ok(()) => {
            info!(username, "admin unassigned account");
            metrics::record_admin_action("unassign");
            json(
                StatusCode::OK,
                serde_json::json!({ "username": username, "status": "unassigned" }),
            )
        }
        Err(err) => error_response(&err),
    }
}

/// POST /admin/accounts/{username}/block — disable the account.
async fn block_account(
    State(state): State<AdminState>,
    Path(username): Path<String>,
) -> impl IntoResponse {
    match state.pool.block(&username).await {
        Ok(()) => {
            info!(username, "admin blocked account");
            metrics::record_admin_action("block");
            json(
                StatusCode::OK,
                serde_json::json!({ "username": username, "status": "blocked" }),
            )
        }
        Err(err) => error_response(&err),
    }
}

/// POST /admin/accounts/{username}/unblock — re-enable the account.
async fn unblock_account(
    State(state): State<AdminState>,
    Path(username): Path<String>,
) -> impl IntoResponse {
    match state.pool.unblock(&username).await {
        Ok(()) => {
            info!(username, "admin unblocked account");
            metrics::record_admin_action("unblock");
            json(
                StatusCode::OK,
                serde_json::json!({ "username": username, "status": "unblocked" }),
            )
        }
        Err(err) => error_response(&err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use lab_cache::{CacheStore, MemoryStore};
    use lab_credentials::PasswordSource;
    use tower::ServiceExt;

    async fn test_admin_app(count: usize) -> (Router, Arc<AccountPool>) {
        let store: Arc<dyn CacheStore> = Arc::new(MemoryStore::new());
        let pool = Arc::new(
            AccountPool::generate(
                store,
                &PasswordSource::empty(),
                &account_pool::PoolSettings {
                    count,
                    prefix: "player".into(),
                    pad_zeroes: false,
                    blocklist: vec![],
                },
            )
            .await
            .unwrap(),
        );
        (build_admin_router(AdminState::new(pool.clone())), pool)
    }

    fn post(uri: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn list_accounts_returns_every_record() {
        let (app, _) = test_admin_app(3).await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/admin/accounts")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        let accounts = body["accounts"].as_array().unwrap();
        assert_eq!(accounts.len(), 3);
        assert_eq!(accounts[0]["username"], "player1");
    }

    #[tokio::test]
    async fn block_takes_account_out_of_rotation() {
        let (app, pool) = test_admin_app(2).await;

        let response = app.oneshot(post("/admin/accounts/player1/block")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let states = pool.list_all().await.unwrap();
        assert!(states[0].disabled);
    }

    #[tokio::test]
    async fn unblock_reverses_block() {
        let (app, pool) = test_admin_app(2).await;

        app.clone()
            .oneshot(post("/admin/accounts/player1/block"))
            .await
            .unwrap();
        app.oneshot(post("/admin/accounts/player1/unblock"))
            .await
            .unwrap();

        let states = pool.list_all().await.unwrap();
        assert!(!states[0].disabled);
    }

    #[tokio::test]
    async fn unassign_frees_an_assigned_account() {
        let (app, pool) = test_admin_app(2).await;
        pool.get_and_assign("1.2.3.4", "a@x.com").await.unwrap();

        let response = app
            .oneshot(post("/admin/accounts/player1/unassign"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let states = pool.list_all().await.unwrap();
        assert!(!states[0].is_assigned());
    }

    #[tokio::test]
    async fn unknown_username_is_a_404() {
        let (app, _) = test_admin_app(1).await;

        for uri in [
            "/admin/accounts/ghost/unassign",
            "/admin/accounts/ghost/block",
            "/admin/accounts/ghost/unblock",
        ] {
            let response = app.clone().oneshot(post(uri)).await.unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "uri {uri}");
        }
    }

    #[tokio::test]
    async fn pool_status_reports_counts() {
        let (app, pool) = test_admin_app(3).await;
        pool.get_and_assign("1.2.3.4", "a@x.com").await.unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/admin/pool")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["pool"]["total"], 3);
        assert_eq!(body["pool"]["assigned"], 1);
        assert_eq!(body["pool"]["assignable"], 2);
    }
}
