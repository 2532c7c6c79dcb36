use rust_decimal::Decimal;
use thiserror::Error;

/// Rejection-reason taxonomy. Every variant's `Display` is used verbatim as a
/// `Message` or `Action`'s rejection reason — these strings are user-facing,
/// not just for logs, so they stay plain and specific.
#[derive(Debug, Error, Clone)]
pub enum EngineError {
    #[error("{0}")]
    Validation(String),

    #[error("user not found - deposit first")]
    AccountNotFound,

    #[error("insufficient balance: available {available}, required {required}")]
    InsufficientFunds { available: Decimal, required: Decimal },

    #[error("cannot cancel another user's order")]
    Ownership,

    #[error("order not found: {0}")]
    OrderNotFound(String),

    #[error("message not found: {0}")]
    MessageNotFound(String),

    #[error("chain submission failed: {0}")]
    Submission(String),

    #[error("internal error: {0}")]
    Internal(String),
}
