use std::env;
use std::time::Duration;

/// Process configuration, loaded once at startup from the environment (see
/// `.env` support via `dotenvy`). Every field has the default documented
/// here; only `orderbook_contract_id` has no sane default and startup fails
/// without it.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub orderbook_contract_id: String,
    pub soroban_rpc_url: String,
    pub admin_secret_key: Option<String>,
    pub deposit_poll_interval: Duration,
    pub starting_ledger: Option<i64>,
    pub action_submit_timeout: Duration,
    pub signature_validity: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let orderbook_contract_id = env::var("ORDERBOOK_CONTRACT_ID")
            .map_err(|_| anyhow::anyhow!("ORDERBOOK_CONTRACT_ID must be set"))?;

        Ok(Self {
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            orderbook_contract_id,
            soroban_rpc_url: env::var("SOROBAN_RPC_URL")
                .unwrap_or_else(|_| "https://soroban-testnet.stellar.org".to_string()),
            admin_secret_key: env::var("ADMIN_SECRET_KEY").ok(),
            deposit_poll_interval: Duration::from_secs(env_u64("DEPOSIT_POLL_INTERVAL_SECS", 5)),
            starting_ledger: env::var("STARTING_LEDGER").ok().and_then(|v| v.parse().ok()),
            action_submit_timeout: Duration::from_secs(env_u64("ACTION_SUBMIT_TIMEOUT_SECS", 60)),
            signature_validity: Duration::from_secs(env_u64("SIGNATURE_VALIDITY_SECS", 300)),
        })
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}
