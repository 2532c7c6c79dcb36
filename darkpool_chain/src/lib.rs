//! Chain-facing adapters: a Soroban RPC submitter/deposit source pair, a
//! deposit-event polling loop, and in-process mocks for tests. Everything in
//! here implements the traits declared in `darkpool_core::chain` — XDR/
//! Soroban wire encoding lives in the RPC sidecar, not this crate.

pub mod deposit;
pub mod listener;
pub mod mock;
pub mod submitter;

pub use deposit::RpcDepositSource;
pub use listener::DepositListener;
pub use mock::{MockDepositSource, MockTransactionSubmitter};
pub use submitter::RpcSubmitter;
