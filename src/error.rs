use thiserror::Error;

use crate::models::order::OrderId;

#[derive(Error, Debug)]
pub enum ExecError {
    /// Malformed or out-of-range caller input. Local, never retried,
    /// surfaced before any gateway call.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A single gateway call failed (rejected request, network/API error).
    #[error("Gateway error: {0}")]
    Gateway(String),

    /// The exchange answered but refused the order itself.
    #[error("Order rejected: {0}")]
    OrderRejected(String),

    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// Plan derivation failed (degenerate chunk/level quantity). Fatal to
    /// the whole run, raised before any gateway call is attempted.
    #[error("Strategy aborted: {0}")]
    StrategyAbort(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
