use crate::state::AppState;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
