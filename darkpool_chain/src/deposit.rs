//! `DepositEventSource` backed by the same RPC sidecar `RpcSubmitter` talks
//! to. The sidecar is expected to have already decoded Soroban event XDR
//! into plain JSON — this crate never touches ScVal/XDR directly.

use async_trait::async_trait;
use darkpool_core::chain::{DepositEvent, DepositEventSource};
use darkpool_core::order::Asset;
use reqwest::Client;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct RawDepositEvent {
    id: String,
    user: String,
    asset: String,
    amount: String,
    ledger: i64,
    tx_hash: String,
}

pub struct RpcDepositSource {
    client: Client,
    rpc_url: String,
    contract_id: String,
}

impl RpcDepositSource {
    pub fn new(rpc_url: String, contract_id: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("failed to build reqwest client");
        Self { client, rpc_url, contract_id }
    }
}

#[async_trait]
impl DepositEventSource for RpcDepositSource {
    async fn poll_since(&self, cursor: i64) -> anyhow::Result<Vec<DepositEvent>> {
        let url = format!("{}/{}/events?start_ledger={cursor}&limit=100", self.rpc_url, self.contract_id);
        let raw: Vec<RawDepositEvent> = self.client.get(&url).send().await?.json().await?;

        raw.into_iter()
            .map(|e| {
                let asset = Asset::from_str(&e.asset).map_err(|_| anyhow::anyhow!("unknown asset in deposit event: {}", e.asset))?;
                let amount = e.amount.parse().map_err(|_| anyhow::anyhow!("invalid amount in deposit event: {}", e.amount))?;
                Ok(DepositEvent {
                    event_id: e.id,
                    user: e.user,
                    asset,
                    amount,
                    ledger: e.ledger,
                    tx_hash: e.tx_hash,
                })
            })
            .collect()
    }
}
