//! Trait boundary between the engine and the blockchain. `darkpool_core`
//! depends only on these interfaces; `darkpool_chain` supplies the concrete
//! Soroban-speaking implementations plus a mock pair used in engine tests.
//! Wire/XDR encoding is deliberately not this crate's concern.

use crate::handler::MessageHandler;
use crate::message::Message;
use crate::order::{AccountId, Asset};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// A confirmed on-chain deposit into the custodial contract, as observed by
/// a `DepositEventSource`. `event_id` is whatever the source uses to
/// deduplicate (e.g. `"{ledger}-{tx_hash}-{index}"`) and is opaque to the
/// engine beyond equality/hashing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositEvent {
    pub event_id: String,
    pub user: AccountId,
    pub asset: Asset,
    pub amount: Decimal,
    pub ledger: i64,
    pub tx_hash: String,
}

/// Polled by `DepositListener` on a fixed interval starting from a cursor.
/// Implementations must be safe to call repeatedly with the same cursor and
/// must never return the same `event_id` for two logically distinct
/// deposits.
#[async_trait]
pub trait DepositEventSource: Send + Sync {
    async fn poll_since(&self, cursor: i64) -> anyhow::Result<Vec<DepositEvent>>;
}

/// Outbound submission surface. Implementations own nonce-plumbing at the
/// transport level (e.g. internal retry against a single RPC endpoint) but
/// must report success/failure exactly once per call — `ActionHandler` does
/// not retry on its own.
#[async_trait]
pub trait TransactionSubmitter: Send + Sync {
    async fn submit_withdrawal(&self, nonce: u64, user: &str, asset: Asset, amount: Decimal) -> anyhow::Result<String>;

    #[allow(clippy::too_many_arguments)]
    async fn submit_settlement(
        &self,
        nonce: u64,
        trade_id: Uuid,
        buyer: &str,
        seller: &str,
        amount_a: Decimal,
        amount_b: Decimal,
    ) -> anyhow::Result<String>;
}

/// Store-then-enqueue boundary for sources that originate `Message`s outside
/// the HTTP layer, namely `DepositListener`. Calling `intake` must happen
/// before the message is pushed onto the message queue so a status lookup
/// can never race a message that is enqueued but not yet in `MessageStore`.
#[async_trait]
pub trait MessageIntake: Send + Sync {
    async fn intake(&self, message: Message);
}

#[async_trait]
impl<T: MessageIntake + ?Sized> MessageIntake for Arc<T> {
    async fn intake(&self, message: Message) {
        (**self).intake(message).await
    }
}

#[async_trait]
impl MessageIntake for Mutex<MessageHandler> {
    async fn intake(&self, message: Message) {
        self.lock().await.intake(message);
    }
}
