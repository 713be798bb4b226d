//! Time-weighted order execution.
//!
//! Splits a total quantity into equal-sized timed chunks and issues one
//! market order per chunk, sleeping between issuances. A failed chunk is
//! logged and skipped; the run always ends with an execution summary.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::RwLock;
use tokio::time::{sleep, Instant};

use crate::error::ExecError;
use crate::exchange::traits::Exchange;
use crate::models::order::{OrderRecord, OrderRequest, OrderSide};
use crate::models::summary::ExecutionSummary;
use crate::strategies::StopToken;
use crate::utils::round_quantity;
use crate::validate;

/// Derived chunk schedule for one TWAP run.
#[derive(Debug, Clone, PartialEq)]
pub struct TwapPlan {
    pub total_quantity: f64,
    pub chunk_count: u32,
    /// total_quantity / chunk_count, rounded to 6 decimal places.
    pub chunk_quantity: f64,
    /// Time between chunk issuances, at least one second.
    pub interval: Duration,
    pub duration: Duration,
}

impl TwapPlan {
    pub fn derive(
        total_quantity: f64,
        duration_minutes: u64,
        chunk_count: u32,
    ) -> Result<Self, ExecError> {
        validate::validate_twap_bounds(duration_minutes, chunk_count)?;
        if total_quantity <= 0.0 {
            return Err(ExecError::Validation(
                "total quantity must be positive".to_string(),
            ));
        }

        let chunk_quantity = round_quantity(total_quantity / chunk_count as f64);
        if chunk_quantity <= 0.0 {
            return Err(ExecError::StrategyAbort(
                "chunk quantity is too small".to_string(),
            ));
        }

        let interval_secs = (duration_minutes * 60 / chunk_count as u64).max(1);

        Ok(TwapPlan {
            total_quantity,
            chunk_count,
            chunk_quantity,
            interval: Duration::from_secs(interval_secs),
            duration: Duration::from_secs(duration_minutes * 60),
        })
    }
}

/// TWAP execution engine. Owns its run state for the duration of one
/// `execute` call; the gateway is injected at construction.
pub struct TwapExecutor {
    exchange: Arc<RwLock<dyn Exchange>>,
    symbol: String,
    side: OrderSide,
    plan: TwapPlan,
    /// Reserved for a future limit-style TWAP; unused by execution today.
    #[allow(dead_code)]
    price_limit: Option<f64>,
}

impl TwapExecutor {
    pub fn new(
        exchange: Arc<RwLock<dyn Exchange>>,
        symbol: impl Into<String>,
        side: OrderSide,
        plan: TwapPlan,
    ) -> Self {
        TwapExecutor {
            exchange,
            symbol: symbol.into(),
            side,
            plan,
            price_limit: None,
        }
    }

    pub fn with_price_limit(mut self, price_limit: f64) -> Self {
        self.price_limit = Some(price_limit);
        self
    }

    pub fn plan(&self) -> &TwapPlan {
        &self.plan
    }

    /// Run the strategy to completion.
    pub async fn execute(&self) -> Result<ExecutionSummary, ExecError> {
        self.execute_until(StopToken::none()).await
    }

    /// Run the strategy until completion, deadline, or an external stop.
    /// An early stop is a normal terminal condition and still yields a
    /// summary over whatever was issued.
    pub async fn execute_until(
        &self,
        mut stop: StopToken,
    ) -> Result<ExecutionSummary, ExecError> {
        log::info!(
            "[TWAP] starting {} {} {} over {:?} in {} chunks of {}",
            self.side,
            self.plan.total_quantity,
            self.symbol,
            self.plan.duration,
            self.plan.chunk_count,
            self.plan.chunk_quantity,
        );

        let started_at = Utc::now();
        let start = Instant::now();
        let deadline = start + self.plan.duration;

        let mut orders: Vec<OrderRecord> = Vec::new();
        let mut executed_quantity = 0.0;

        for i in 0..self.plan.chunk_count {
            if stop.is_stopped() {
                log::warn!("[TWAP] stop requested after {} chunks", i);
                break;
            }
            if Instant::now() >= deadline {
                log::warn!("[TWAP] time limit reached after {} chunks", i);
                break;
            }

            let remaining = round_quantity(self.plan.total_quantity - executed_quantity);
            if remaining <= 0.0 {
                log::info!("[TWAP] target quantity reached after {} chunks", i);
                break;
            }

            // The last chunk absorbs rounding drift; every chunk is capped
            // at what is still outstanding.
            let quantity = if i == self.plan.chunk_count - 1 {
                remaining
            } else {
                self.plan.chunk_quantity.min(remaining)
            };

            log::info!(
                "[TWAP {}/{}] placing {} {} {}",
                i + 1,
                self.plan.chunk_count,
                self.side,
                quantity,
                self.symbol,
            );

            let request = OrderRequest::market(&self.symbol, self.side, quantity);
            let result = {
                let mut exchange = self.exchange.write().await;
                exchange.create_order(request).await
            };

            match result {
                Ok(record) => {
                    log::info!(
                        "[TWAP {}/{}] order {} {:?}",
                        i + 1,
                        self.plan.chunk_count,
                        record.order_id,
                        record.status,
                    );
                    executed_quantity = round_quantity(executed_quantity + record.quantity);
                    orders.push(record);
                }
                // A failed chunk is independent of its siblings: skip it and
                // keep going.
                Err(e) => {
                    log::error!(
                        "[TWAP {}/{}] chunk failed: {}",
                        i + 1,
                        self.plan.chunk_count,
                        e,
                    );
                }
            }

            if i + 1 < self.plan.chunk_count {
                tokio::select! {
                    _ = sleep(self.plan.interval) => {}
                    _ = stop.stopped() => {
                        log::warn!("[TWAP] stop requested during inter-chunk wait");
                        break;
                    }
                }
            }
        }

        let completion_ratio = if self.plan.total_quantity > 0.0 {
            executed_quantity / self.plan.total_quantity * 100.0
        } else {
            0.0
        };

        let summary = ExecutionSummary {
            orders,
            executed_quantity,
            target_quantity: self.plan.total_quantity,
            completion_ratio,
            started_at,
            finished_at: Utc::now(),
            elapsed: start.elapsed(),
        };

        log::info!(
            "[TWAP] done: {} orders, {}/{} executed ({:.2}%)",
            summary.orders.len(),
            summary.executed_quantity,
            summary.target_quantity,
            summary.completion_ratio,
        );

        Ok(summary)
    }
}
