//! Grid order placement, monitoring and cancellation.
//!
//! A grid run places one GTC limit order per evenly spaced price level
//! across a range. Placement, monitoring and cancellation are independent
//! operations over the same order set; failures of individual orders never
//! abort the pass they occur in.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::RwLock;
use tokio::time::{sleep, Instant};

use crate::error::ExecError;
use crate::exchange::traits::Exchange;
use crate::models::order::{OrderId, OrderRecord, OrderRequest, OrderSide};
use crate::models::summary::{GridOrder, GridPlacement, GridSnapshot};
use crate::strategies::StopToken;
use crate::utils::{round_price, round_quantity};
use crate::validate;

/// Pause between consecutive level placements, throttling request rate.
const PLACEMENT_THROTTLE: Duration = Duration::from_millis(100);
/// Fixed polling period of the monitoring loop.
const MONITOR_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Price levels and per-level quantity for one grid run.
#[derive(Debug, Clone, PartialEq)]
pub struct GridPlan {
    pub lower_price: f64,
    pub upper_price: f64,
    pub level_count: u32,
    /// level_count evenly spaced prices from lower to upper inclusive,
    /// each rounded to 2 decimal places.
    pub prices: Vec<f64>,
    /// total_quantity / level_count, rounded to 6 decimal places.
    pub quantity_per_level: f64,
}

impl GridPlan {
    pub fn derive(
        total_quantity: f64,
        upper_price: f64,
        lower_price: f64,
        level_count: u32,
    ) -> Result<Self, ExecError> {
        validate::validate_grid_bounds(lower_price, upper_price, level_count)?;
        if total_quantity <= 0.0 {
            return Err(ExecError::Validation(
                "total quantity must be positive".to_string(),
            ));
        }

        let quantity_per_level = round_quantity(total_quantity / level_count as f64);
        if quantity_per_level <= 0.0 {
            return Err(ExecError::StrategyAbort(
                "quantity per grid level is too small".to_string(),
            ));
        }

        let step = (upper_price - lower_price) / (level_count - 1) as f64;
        let prices = (0..level_count)
            .map(|i| round_price(lower_price + i as f64 * step))
            .collect();

        Ok(GridPlan {
            lower_price,
            upper_price,
            level_count,
            prices,
            quantity_per_level,
        })
    }
}

/// Grid execution engine over an injected gateway.
pub struct GridExecutor {
    exchange: Arc<RwLock<dyn Exchange>>,
    symbol: String,
    side: OrderSide,
}

impl GridExecutor {
    pub fn new(
        exchange: Arc<RwLock<dyn Exchange>>,
        symbol: impl Into<String>,
        side: OrderSide,
    ) -> Self {
        GridExecutor {
            exchange,
            symbol: symbol.into(),
            side,
        }
    }

    /// Place one limit order per level. A level that fails is logged and
    /// skipped; the placement summary reflects what actually rested.
    pub async fn place(&self, plan: &GridPlan) -> Result<GridPlacement, ExecError> {
        log::info!(
            "[GRID] placing {} levels of {} {} {} across {}..{}",
            plan.level_count,
            self.side,
            plan.quantity_per_level,
            self.symbol,
            plan.lower_price,
            plan.upper_price,
        );

        let mut orders: Vec<GridOrder> = Vec::new();

        for (i, &price) in plan.prices.iter().enumerate() {
            let level = i + 1;
            log::info!(
                "[GRID {}/{}] placing {} {} {} @ {}",
                level,
                plan.level_count,
                self.side,
                plan.quantity_per_level,
                self.symbol,
                price,
            );

            let request =
                OrderRequest::limit(&self.symbol, self.side, plan.quantity_per_level, price);
            let result = {
                let mut exchange = self.exchange.write().await;
                exchange.create_order(request).await
            };

            match result {
                Ok(record) => {
                    log::info!(
                        "[GRID {}/{}] order {} resting",
                        level,
                        plan.level_count,
                        record.order_id,
                    );
                    orders.push(GridOrder {
                        level,
                        price,
                        record,
                    });
                }
                Err(e) => {
                    log::error!("[GRID {}/{}] level failed: {}", level, plan.level_count, e);
                }
            }

            if level < plan.prices.len() {
                sleep(PLACEMENT_THROTTLE).await;
            }
        }

        let successful = orders.len();
        let placement_ratio = successful as f64 / plan.level_count as f64 * 100.0;
        let total_quantity_placed = round_quantity(successful as f64 * plan.quantity_per_level);
        let price_range = match (orders.first(), orders.last()) {
            (Some(first), Some(last)) => Some((first.price, last.price)),
            _ => None,
        };

        log::info!(
            "[GRID] placed {}/{} orders ({:.2}%)",
            successful,
            plan.level_count,
            placement_ratio,
        );

        Ok(GridPlacement {
            orders,
            total_levels: plan.level_count as usize,
            quantity_per_level: plan.quantity_per_level,
            placement_ratio,
            total_quantity_placed,
            price_range,
        })
    }

    /// Poll the given orders on a fixed period until the duration elapses,
    /// emitting one snapshot per poll.
    pub async fn monitor(
        &self,
        order_ids: &[OrderId],
        duration_minutes: u64,
    ) -> Result<Vec<GridSnapshot>, ExecError> {
        self.monitor_until(order_ids, duration_minutes, StopToken::none())
            .await
    }

    /// Monitoring loop with an external stop. Per-order query failures are
    /// logged and that order is left out of the current snapshot.
    pub async fn monitor_until(
        &self,
        order_ids: &[OrderId],
        duration_minutes: u64,
        mut stop: StopToken,
    ) -> Result<Vec<GridSnapshot>, ExecError> {
        log::info!(
            "[GRID MONITOR] watching {} orders on {} for {} minutes",
            order_ids.len(),
            self.symbol,
            duration_minutes,
        );

        let deadline = Instant::now() + Duration::from_secs(duration_minutes * 60);
        let mut snapshots = Vec::new();

        while Instant::now() < deadline && !stop.is_stopped() {
            let mut records = Vec::with_capacity(order_ids.len());
            for order_id in order_ids {
                let result = {
                    let exchange = self.exchange.read().await;
                    exchange.get_order(&self.symbol, order_id).await
                };
                match result {
                    Ok(record) => records.push(record),
                    Err(e) => {
                        log::error!("[GRID MONITOR] query for {} failed: {}", order_id, e);
                    }
                }
            }

            let snapshot = GridSnapshot::classify(Utc::now(), order_ids.len(), &records);
            log::info!(
                "[GRID MONITOR] filled: {}, pending: {}, total: {}",
                snapshot.filled,
                snapshot.pending,
                snapshot.total,
            );
            snapshots.push(snapshot);

            tokio::select! {
                _ = sleep(MONITOR_POLL_INTERVAL) => {}
                _ = stop.stopped() => {
                    log::warn!("[GRID MONITOR] stop requested");
                    break;
                }
            }
        }

        log::info!("[GRID MONITOR] finished after {} polls", snapshots.len());
        Ok(snapshots)
    }

    /// Cancel each order independently; one failure does not block the
    /// others. Returns the records of the orders that were cancelled.
    pub async fn cancel_all(&self, order_ids: &[OrderId]) -> Vec<OrderRecord> {
        log::info!(
            "[GRID CANCEL] cancelling {} orders on {}",
            order_ids.len(),
            self.symbol,
        );

        let mut cancelled = Vec::new();
        for order_id in order_ids {
            let result = {
                let mut exchange = self.exchange.write().await;
                exchange.cancel_order(&self.symbol, order_id).await
            };
            match result {
                Ok(record) => {
                    log::info!("[GRID CANCEL] order {} cancelled", order_id);
                    cancelled.push(record);
                }
                Err(e) => {
                    log::error!("[GRID CANCEL] order {} failed: {}", order_id, e);
                }
            }
        }

        log::info!(
            "[GRID CANCEL] cancelled {}/{} orders",
            cancelled.len(),
            order_ids.len(),
        );
        cancelled
    }
}
