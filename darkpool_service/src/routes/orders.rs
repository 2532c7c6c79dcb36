use crate::auth::{AuthenticatedUser, ErrorResponse};
use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Extension, Json, Router};
use darkpool_core::message::Message;
use darkpool_core::order::{OrderId, Side};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

pub fn order_routes() -> Router<AppState> {
    Router::new().route("/", post(submit_order)).route("/cancel", post(cancel_order))
}

#[derive(Debug, Deserialize)]
pub struct OrderRequest {
    side: String,
    price: String,
    quantity: String,
}

#[derive(Debug, Serialize)]
pub struct OrderAck {
    message_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct CancelRequest {
    order_id: String,
}

async fn submit_order(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Json(req): Json<OrderRequest>,
) -> Result<Json<OrderAck>, (StatusCode, Json<ErrorResponse>)> {
    let side = match req.side.as_str() {
        "buy" => Side::Buy,
        "sell" => Side::Sell,
        other => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse { error: format!("unknown side: {other}") }),
            ))
        }
    };

    let message = Message::order(Uuid::new_v4(), user, side, parse_decimal(&req.price)?, parse_decimal(&req.quantity)?, now());
    enqueue(&state, message).await
}

async fn cancel_order(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Json(req): Json<CancelRequest>,
) -> Result<Json<OrderAck>, (StatusCode, Json<ErrorResponse>)> {
    let order_id: OrderId = OrderId::from_str(&req.order_id).map_err(|_| {
        (StatusCode::BAD_REQUEST, Json(ErrorResponse { error: "invalid order_id".into() }))
    })?;

    let message = Message::cancel(Uuid::new_v4(), user, order_id, now());
    enqueue(&state, message).await
}

async fn enqueue(state: &AppState, message: Message) -> Result<Json<OrderAck>, (StatusCode, Json<ErrorResponse>)> {
    let message_id = message.id;
    state.handler.lock().await.intake(message.clone());
    state.messages.push(message).map_err(|_| {
        (StatusCode::SERVICE_UNAVAILABLE, Json(ErrorResponse { error: "message queue closed".into() }))
    })?;
    Ok(Json(OrderAck { message_id }))
}

fn parse_decimal(s: &str) -> Result<rust_decimal::Decimal, (StatusCode, Json<ErrorResponse>)> {
    rust_decimal::Decimal::from_str(s).map_err(|_| {
        (StatusCode::BAD_REQUEST, Json(ErrorResponse { error: format!("invalid decimal: {s}") }))
    })
}

fn now() -> i64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs() as i64).unwrap_or(0)
}
