use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing, Json, Router,
};
use portfolio_core_health_contracts::HealthFeatureService;
use serde::Serialize;

pub fn router(service: Arc<impl HealthFeatureService>) -> Router<()> {
    Router::new()
        .route("/health", routing::get(health))
        .with_state(service)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    /// Uptime in seconds.
    uptime: f64,
    email: bool,
}

async fn health(service: State<Arc<impl HealthFeatureService>>) -> Response {
    let health = service.get_status().await;

    let (status, code) = if health.is_healthy() {
        ("ok", StatusCode::OK)
    } else {
        ("unavailable", StatusCode::SERVICE_UNAVAILABLE)
    };

    let response = HealthResponse {
        status,
        uptime: health.uptime.as_secs_f64(),
        email: health.email,
    };

    (code, Json(response)).into_response()
}
