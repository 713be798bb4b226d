//! Order execution engine for USDT-margined futures.
//!
//! Translates trading intents (market, limit, stop, synthetic OCO, TWAP,
//! grid) into validated exchange API calls, tracks their outcomes and
//! reports execution summaries. The gateway is a capability trait; mock
//! and real connectors are injected at the composition root.

pub mod config;
pub mod error;
pub mod exchange;
pub mod models;
pub mod strategies;
pub mod utils;
pub mod validate;

pub use crate::error::ExecError;
pub use crate::exchange::traits::Exchange;
pub use crate::models::order::{
    OrderId, OrderRecord, OrderRequest, OrderSide, OrderStatus, OrderType, TimeInForce,
};
pub use crate::models::summary::{
    ExecutionOutcome, ExecutionSummary, GridOrder, GridPlacement, GridSnapshot,
};
pub use crate::strategies::{GridExecutor, GridPlan, TwapExecutor, TwapPlan};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result type alias
pub type Result<T> = std::result::Result<T, ExecError>;
