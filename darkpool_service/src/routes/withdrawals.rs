use crate::auth::{AuthenticatedUser, ErrorResponse};
use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Extension, Json, Router};
use darkpool_core::message::Message;
use darkpool_core::order::Asset;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

pub fn withdrawal_routes() -> Router<AppState> {
    Router::new().route("/", post(request_withdrawal))
}

#[derive(Debug, Deserialize)]
pub struct WithdrawalRequest {
    asset: String,
    amount: String,
}

#[derive(Debug, Serialize)]
pub struct WithdrawalAck {
    message_id: Uuid,
}

async fn request_withdrawal(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Json(req): Json<WithdrawalRequest>,
) -> Result<Json<WithdrawalAck>, (StatusCode, Json<ErrorResponse>)> {
    let asset = Asset::from_str(&req.asset).map_err(|_| {
        (StatusCode::BAD_REQUEST, Json(ErrorResponse { error: format!("unknown asset: {}", req.asset) }))
    })?;
    let amount = rust_decimal::Decimal::from_str(&req.amount).map_err(|_| {
        (StatusCode::BAD_REQUEST, Json(ErrorResponse { error: format!("invalid decimal: {}", req.amount) }))
    })?;

    let message = Message::withdraw(Uuid::new_v4(), user, asset, amount, now());
    let message_id = message.id;
    state.handler.lock().await.intake(message.clone());
    state.messages.push(message).map_err(|_| {
        (StatusCode::SERVICE_UNAVAILABLE, Json(ErrorResponse { error: "message queue closed".into() }))
    })?;

    Ok(Json(WithdrawalAck { message_id }))
}

fn now() -> i64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs() as i64).unwrap_or(0)
}
