//! Health check handlers and response types.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::constants::HEALTH_CHECK_TIMEOUT_SECS;
use crate::state::AppState;

const NOT_CONFIGURED: &str = "not_configured";

/// Run an async check with timeout; returns "healthy", "timeout", or "{prefix}: {error}".
async fn run_check<F, E>(timeout: Duration, f: F, error_prefix: &str) -> String
where
    F: Future<Output = Result<(), E>>,
    E: Display,
{
    match tokio::time::timeout(timeout, f).await {
        Ok(Ok(())) => "healthy".to_string(),
        Ok(Err(e)) => format!("{}: {}", error_prefix, e),
        Err(_) => "timeout".to_string(),
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthCheckResponse {
    pub status: String,
    pub database: String,
    pub storage: String,
}

async fn check_database(state: &AppState, timeout: Duration) -> String {
    match &state.db_pool {
        Some(pool) => {
            run_check(
                timeout,
                async { sqlx::query("SELECT 1").execute(pool).await.map(drop) },
                "unhealthy",
            )
            .await
        }
        None => NOT_CONFIGURED.to_string(),
    }
}

async fn check_storage(state: &AppState, timeout: Duration) -> String {
    let base_dir = state.diary.images().base_dir().to_path_buf();
    run_check(
        timeout,
        async move {
            let metadata = tokio::fs::metadata(&base_dir).await?;
            if metadata.is_dir() {
                Ok(())
            } else {
                Err(std::io::Error::other(format!(
                    "{} is not a directory",
                    base_dir.display()
                )))
            }
        },
        "degraded",
    )
    .await
}

fn is_up(status: &str) -> bool {
    status == "healthy" || status == NOT_CONFIGURED
}

/// Liveness check - process is running.
#[utoipa::path(
    get,
    path = "/live",
    tag = "health",
    responses((status = 200, description = "Process is running"))
)]
pub async fn liveness_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "alive" })),
    )
}

/// Readiness check - the database accepts queries.
#[utoipa::path(
    get,
    path = "/ready",
    tag = "health",
    responses(
        (status = 200, description = "Ready to serve traffic"),
        (status = 503, description = "Database unavailable")
    )
)]
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let timeout = Duration::from_secs(HEALTH_CHECK_TIMEOUT_SECS);
    let database = check_database(&state, timeout).await;

    let ready = is_up(&database);
    if !ready {
        tracing::error!(database = %database, "Database readiness check failed");
    }

    let status_code = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(serde_json::json!({
            "status": if ready { "ready" } else { "not_ready" },
            "database": database,
        })),
    )
}

/// Full health check (database and image directory).
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "All dependencies healthy", body = HealthCheckResponse),
        (status = 503, description = "A dependency is unhealthy", body = HealthCheckResponse)
    )
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let timeout = Duration::from_secs(HEALTH_CHECK_TIMEOUT_SECS);

    let database = check_database(&state, timeout).await;
    let storage = check_storage(&state, timeout).await;
    let healthy = is_up(&database) && is_up(&storage);

    let response = HealthCheckResponse {
        status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
        database,
        storage,
    };

    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response))
}
