//! HTTP-facing `TransactionSubmitter` that calls a Soroban RPC sidecar. The
//! custodial contract's XDR encoding is out of scope here — the sidecar
//! accepts plain JSON and does the envelope-building itself.

use async_trait::async_trait;
use darkpool_core::chain::TransactionSubmitter;
use darkpool_core::order::Asset;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, warn};
use uuid::Uuid;

const MAX_RETRIES: u32 = 3;
const BASE_RETRY_DELAY_MS: u64 = 50;
const SUBMIT_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Serialize)]
struct WithdrawalRequest {
    nonce: u64,
    user: String,
    asset: String,
    amount: Decimal,
}

#[derive(Debug, Serialize)]
struct SettlementRequest {
    nonce: u64,
    trade_id: Uuid,
    buyer: String,
    seller: String,
    amount_a: Decimal,
    amount_b: Decimal,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    tx_hash: String,
}

/// Talks to the Soroban RPC sidecar over HTTP. Retries idempotently on
/// network errors and 5xx responses with exponential backoff, but a single
/// `submit_*` call still resolves to exactly one `Ok`/`Err` — from
/// `ActionHandler`'s perspective the nonce is consumed at most once either
/// way.
pub struct RpcSubmitter {
    client: Client,
    rpc_url: String,
    contract_id: String,
}

impl RpcSubmitter {
    pub fn new(rpc_url: String, contract_id: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_millis(SUBMIT_TIMEOUT_MS))
            .build()
            .expect("failed to build reqwest client");
        Self { client, rpc_url, contract_id }
    }

    async fn post_with_retry(&self, path: &str, body: &impl Serialize) -> anyhow::Result<String> {
        let url = format!("{}/{}/{}", self.rpc_url, self.contract_id, path);
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            match self.client.post(&url).json(body).send().await {
                Ok(response) if response.status().is_success() => {
                    let parsed: SubmitResponse = response.json().await?;
                    return Ok(parsed.tx_hash);
                }
                Ok(response) => {
                    let status = response.status();
                    if status.is_server_error() && attempts < MAX_RETRIES {
                        let delay = Duration::from_millis(BASE_RETRY_DELAY_MS * 2u64.pow(attempts - 1));
                        warn!(%status, attempts, "submission failed, retrying in {:?}", delay);
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    let body = response.text().await.unwrap_or_default();
                    error!(%status, %body, "submission failed permanently");
                    anyhow::bail!("submission failed: {status} {body}");
                }
                Err(e) => {
                    if attempts < MAX_RETRIES {
                        let delay = Duration::from_millis(BASE_RETRY_DELAY_MS * 2u64.pow(attempts - 1));
                        warn!(error = %e, attempts, "network error, retrying in {:?}", delay);
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    error!(error = %e, "submission failed permanently after retries");
                    return Err(e.into());
                }
            }
        }
    }
}

#[async_trait]
impl TransactionSubmitter for RpcSubmitter {
    async fn submit_withdrawal(&self, nonce: u64, user: &str, asset: Asset, amount: Decimal) -> anyhow::Result<String> {
        let req = WithdrawalRequest {
            nonce,
            user: user.to_string(),
            asset: asset.to_string(),
            amount,
        };
        self.post_with_retry("withdraw", &req).await
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
        let req = SettlementRequest {
            nonce,
            trade_id,
            buyer: buyer.to_string(),
            seller: seller.to_string(),
            amount_a,
            amount_b,
        };
        self.post_with_retry("settle", &req).await
    }
}
