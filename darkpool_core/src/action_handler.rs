use crate::action::{Action, ActionPayload};
use crate::chain::TransactionSubmitter;
use crate::order::Asset;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// Sole writer of `Action.nonce` and every terminal `Action` field. Owns the
/// monotonic nonce counter used for on-chain submission ordering: the nonce
/// is assigned right before a submit call and only advances once that call
/// reports success, so a failed attempt leaves the next Action free to reuse
/// it (single-attempt-by-default — any retrying happens inside the
/// submitter, below the nonce boundary). A submission that neither succeeds
/// nor fails within `submit_timeout` is treated the same as a failure: the
/// nonce is left for reuse rather than left hanging forever.
pub struct ActionHandler<S: TransactionSubmitter + ?Sized> {
    submitter: Arc<S>,
    next_nonce: u64,
    submit_timeout: Duration,
}

impl<S: TransactionSubmitter + ?Sized> ActionHandler<S> {
    pub fn new(submitter: Arc<S>, starting_nonce: u64, submit_timeout: Duration) -> Self {
        Self {
            submitter,
            next_nonce: starting_nonce,
            submit_timeout,
        }
    }

    pub fn next_nonce(&self) -> u64 {
        self.next_nonce
    }

    pub async fn submit(&mut self, mut action: Action, now: i64) -> Action {
        let nonce = self.next_nonce;
        action.begin_submission(nonce);

        let call = match &action.payload {
            ActionPayload::Withdrawal { user, asset, amount } => {
                let asset = Asset::from_str(asset).expect("validated at message-handling time");
                let amount = amount.parse().expect("validated at message-handling time");
                self.submitter.submit_withdrawal(nonce, user, asset, amount)
            }
            ActionPayload::Settlement {
                trade_id,
                buyer,
                seller,
                amount_a,
                amount_b,
            } => {
                let amount_a = amount_a.parse().expect("validated at message-handling time");
                let amount_b = amount_b.parse().expect("validated at message-handling time");
                self.submitter.submit_settlement(nonce, *trade_id, buyer, seller, amount_a, amount_b)
            }
        };

        let result = match tokio::time::timeout(self.submit_timeout, call).await {
            Ok(r) => r,
            Err(_) => Err(anyhow::anyhow!("action submission exceeded {:?} timeout", self.submit_timeout)),
        };

        match result {
            Ok(tx_hash) => {
                self.next_nonce += 1;
                action.confirm(tx_hash, now);
            }
            Err(e) => {
                action.fail(e.to_string(), now);
            }
        }
        action
    }
}
