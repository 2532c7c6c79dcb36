use crate::order::{AccountId, Asset, Quantity};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ActionId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Withdrawal,
    Settlement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
    Pending,
    Submitting,
    Confirmed,
    Failed,
}

/// Outbound on-chain effect the `MessageHandler` hands to `ActionHandler`.
/// `Settlement` carries both legs of a trade so the submitter can build a
/// single atomic on-chain transfer; `Withdrawal` carries one user/asset leg.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionPayload {
    Withdrawal {
        user: AccountId,
        asset: String,
        amount: String,
    },
    Settlement {
        trade_id: Uuid,
        buyer: AccountId,
        seller: AccountId,
        amount_a: String,
        amount_b: String,
    },
}

impl ActionPayload {
    pub fn kind(&self) -> ActionKind {
        match self {
            ActionPayload::Withdrawal { .. } => ActionKind::Withdrawal,
            ActionPayload::Settlement { .. } => ActionKind::Settlement,
        }
    }
}

/// An on-chain submission in flight. `nonce` is assigned by `ActionHandler`
/// immediately before submission and is only ever consumed (incremented)
/// once that submission is reported successful — a failed submission leaves
/// the nonce counter untouched so the next attempt reuses it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    pub id: ActionId,
    pub payload: ActionPayload,
    pub status: ActionStatus,
    pub nonce: Option<u64>,
    pub tx_hash: Option<String>,
    pub failure_reason: Option<String>,
    pub created_at: i64,
    pub completed_at: Option<i64>,
}

impl Action {
    fn new(id: ActionId, payload: ActionPayload, created_at: i64) -> Self {
        Self {
            id,
            payload,
            status: ActionStatus::Pending,
            nonce: None,
            tx_hash: None,
            failure_reason: None,
            created_at,
            completed_at: None,
        }
    }

    pub fn kind(&self) -> ActionKind {
        self.payload.kind()
    }

    pub fn withdrawal(id: ActionId, user: AccountId, asset: Asset, amount: Quantity, now: i64) -> Self {
        Self::new(
            id,
            ActionPayload::Withdrawal {
                user,
                asset: asset.to_string(),
                amount: amount.to_string(),
            },
            now,
        )
    }

    pub fn settlement(
        id: ActionId,
        trade_id: Uuid,
        buyer: AccountId,
        seller: AccountId,
        amount_a: Quantity,
        amount_b: Quantity,
        now: i64,
    ) -> Self {
        Self::new(
            id,
            ActionPayload::Settlement {
                trade_id,
                buyer,
                seller,
                amount_a: amount_a.to_string(),
                amount_b: amount_b.to_string(),
            },
            now,
        )
    }

    pub fn begin_submission(&mut self, nonce: u64) {
        self.status = ActionStatus::Submitting;
        self.nonce = Some(nonce);
    }

    pub fn confirm(&mut self, tx_hash: String, now: i64) {
        self.status = ActionStatus::Confirmed;
        self.tx_hash = Some(tx_hash);
        self.completed_at = Some(now);
    }

    pub fn fail(&mut self, reason: impl Into<String>, now: i64) {
        self.status = ActionStatus::Failed;
        self.failure_reason = Some(reason.into());
        self.completed_at = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn withdrawal_lifecycle() {
        let mut action = Action::withdrawal(Uuid::new_v4(), "alice".into(), Asset::A, dec!(10), 0);
        assert_eq!(action.kind(), ActionKind::Withdrawal);
        assert_eq!(action.status, ActionStatus::Pending);
        action.begin_submission(7);
        assert_eq!(action.nonce, Some(7));
        action.confirm("deadbeef".into(), 1);
        assert_eq!(action.status, ActionStatus::Confirmed);
    }

    #[test]
    fn failed_submission_keeps_nonce_for_inspection() {
        let mut action = Action::withdrawal(Uuid::new_v4(), "alice".into(), Asset::A, dec!(10), 0);
        action.begin_submission(3);
        action.fail("rpc timeout", 1);
        assert_eq!(action.status, ActionStatus::Failed);
        assert_eq!(action.nonce, Some(3));
    }
}
