use crate::order::{AccountId, Asset, OrderId, Price, Quantity, Side};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type MessageId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Deposit,
    Order,
    Cancel,
    Withdraw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Pending,
    Processing,
    Accepted,
    Rejected,
}

/// The kind-specific request payload carried by a `Message`. `Deposit`
/// additionally records the chain ledger height and transaction hash the
/// event was observed at, since a deposit Message is evidence of an
/// already-confirmed on-chain transfer rather than a user request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MessagePayload {
    Deposit {
        asset: String,
        amount: String,
        ledger: i64,
        tx_hash: String,
    },
    Order {
        side: String,
        price: String,
        quantity: String,
    },
    Cancel {
        order_id: String,
    },
    Withdraw {
        asset: String,
        amount: String,
    },
}

impl MessagePayload {
    pub fn kind(&self) -> MessageKind {
        match self {
            MessagePayload::Deposit { .. } => MessageKind::Deposit,
            MessagePayload::Order { .. } => MessageKind::Order,
            MessagePayload::Cancel { .. } => MessageKind::Cancel,
            MessagePayload::Withdraw { .. } => MessageKind::Withdraw,
        }
    }
}

/// Inbound work item. Status transitions are monotonic and linear:
/// PENDING -> PROCESSING -> (ACCEPTED | REJECTED). Terminal states are
/// immutable once set — only `MessageHandler` (and, for the initial PENDING
/// insert, the HTTP layer or `DepositListener`) ever writes one of these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub user: AccountId,
    pub payload: MessagePayload,
    pub status: MessageStatus,
    pub rejection_reason: Option<String>,
    pub order_id: Option<OrderId>,
    pub trades_count: u32,
    pub created_at: i64,
    pub processed_at: Option<i64>,
}

impl Message {
    pub fn new(id: MessageId, user: AccountId, payload: MessagePayload, created_at: i64) -> Self {
        Self {
            id,
            user,
            payload,
            status: MessageStatus::Pending,
            rejection_reason: None,
            order_id: None,
            trades_count: 0,
            created_at,
            processed_at: None,
        }
    }

    pub fn kind(&self) -> MessageKind {
        self.payload.kind()
    }

    pub fn mark_processing(&mut self) {
        self.status = MessageStatus::Processing;
    }

    pub fn accept(&mut self, now: i64) {
        self.status = MessageStatus::Accepted;
        self.processed_at = Some(now);
    }

    pub fn reject(&mut self, reason: impl Into<String>, now: i64) {
        self.status = MessageStatus::Rejected;
        self.rejection_reason = Some(reason.into());
        self.processed_at = Some(now);
    }

    pub fn deposit(id: MessageId, user: AccountId, asset: Asset, amount: Quantity, ledger: i64, tx_hash: String, now: i64) -> Self {
        Self::new(
            id,
            user,
            MessagePayload::Deposit {
                asset: asset.to_string(),
                amount: amount.to_string(),
                ledger,
                tx_hash,
            },
            now,
        )
    }

    pub fn order(id: MessageId, user: AccountId, side: Side, price: Price, quantity: Quantity, now: i64) -> Self {
        Self::new(
            id,
            user,
            MessagePayload::Order {
                side: side.to_string(),
                price: price.to_string(),
                quantity: quantity.to_string(),
            },
            now,
        )
    }

    pub fn cancel(id: MessageId, user: AccountId, order_id: OrderId, now: i64) -> Self {
        Self::new(id, user, MessagePayload::Cancel { order_id: order_id.to_string() }, now)
    }

    pub fn withdraw(id: MessageId, user: AccountId, asset: Asset, amount: Quantity, now: i64) -> Self {
        Self::new(
            id,
            user,
            MessagePayload::Withdraw {
                asset: asset.to_string(),
                amount: amount.to_string(),
            },
            now,
        )
    }
}
