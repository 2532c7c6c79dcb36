//! In-process stand-ins for both chain traits, used by integration tests and
//! local/dev runs where no Soroban RPC endpoint is configured.

use async_trait::async_trait;
use darkpool_core::chain::{DepositEvent, DepositEventSource, TransactionSubmitter};
use darkpool_core::order::Asset;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

/// Returns a fake tx hash without submitting anywhere.
#[derive(Default)]
pub struct MockTransactionSubmitter {
    tx_count: AtomicU64,
}

#[async_trait]
impl TransactionSubmitter for MockTransactionSubmitter {
    async fn submit_withdrawal(&self, nonce: u64, user: &str, asset: Asset, amount: Decimal) -> anyhow::Result<String> {
        let n = self.tx_count.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!(nonce, user, %asset, %amount, "mock withdrawal submitted");
        Ok(format!("mock_withdraw_tx_{n}"))
    }

    async fn submit_settlement(
        &self,
        nonce: u64,
        trade_id: Uuid,
        buyer: &str,
        seller: &str,
        amount_a: Decimal,
        amount_b: Decimal,
    ) -> anyhow::Result<String> {
        let n = self.tx_count.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!(nonce, %trade_id, buyer, seller, %amount_a, %amount_b, "mock settlement submitted");
        Ok(format!("mock_settle_tx_{n}"))
    }
}

/// Hands back a fixed, pre-seeded queue of deposit events on the first poll
/// and nothing thereafter.
pub struct MockDepositSource {
    pending: Mutex<Vec<DepositEvent>>,
}

impl MockDepositSource {
    pub fn new(events: Vec<DepositEvent>) -> Self {
        Self { pending: Mutex::new(events) }
    }
}

#[async_trait]
impl DepositEventSource for MockDepositSource {
    async fn poll_since(&self, _cursor: i64) -> anyhow::Result<Vec<DepositEvent>> {
        Ok(self.pending.lock().unwrap().drain(..).collect())
    }
}
