use crate::auth::ErrorResponse;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use darkpool_core::message::{MessageId, MessageKind, MessageStatus};
use darkpool_core::order::Asset;
use rust_decimal::Decimal;
use serde::Serialize;

pub fn status_routes() -> Router<AppState> {
    Router::new()
        .route("/:message_id", get(get_message_status))
        .route("/balances/:user", get(get_balance))
}

#[derive(Debug, Serialize)]
pub struct MessageStatusResponse {
    message_id: MessageId,
    kind: MessageKind,
    status: MessageStatus,
    rejection_reason: Option<String>,
    created_at: i64,
    processed_at: Option<i64>,
    order_id: Option<String>,
    trades_count: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    user: String,
    asset_a_available: Decimal,
    asset_a_liability: Decimal,
    asset_b_available: Decimal,
    asset_b_liability: Decimal,
}

async fn get_message_status(
    State(state): State<AppState>,
    Path(message_id): Path<MessageId>,
) -> Result<Json<MessageStatusResponse>, (StatusCode, Json<ErrorResponse>)> {
    let handler = state.handler.lock().await;
    let message = handler
        .store()
        .get(message_id)
        .ok_or_else(|| (StatusCode::NOT_FOUND, Json(ErrorResponse { error: format!("message not found: {message_id}") })))?;

    Ok(Json(MessageStatusResponse {
        message_id: message.id,
        kind: message.kind(),
        status: message.status,
        rejection_reason: message.rejection_reason.clone(),
        created_at: message.created_at,
        processed_at: message.processed_at,
        order_id: message.order_id.map(|id| id.to_string()),
        trades_count: (message.trades_count > 0).then_some(message.trades_count),
    }))
}

async fn get_balance(State(state): State<AppState>, Path(user): Path<String>) -> Json<BalanceResponse> {
    let handler = state.handler.lock().await;
    let ledger = handler.ledger();
    Json(BalanceResponse {
        asset_a_available: ledger.available(&user, Asset::A),
        asset_a_liability: ledger.liability(&user, Asset::A),
        asset_b_available: ledger.available(&user, Asset::B),
        asset_b_liability: ledger.liability(&user, Asset::B),
        user,
    })
}
