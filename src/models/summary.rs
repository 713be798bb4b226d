//! Result structures returned by the executors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::models::order::{OrderRecord, OrderStatus};

/// Coarse classification of a finished run for reporting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ExecutionOutcome {
    FullyExecuted,
    PartiallyExecuted,
    NothingExecuted,
}

/// Final report of a TWAP run. Always produced on loop exit, including
/// early exit by deadline or partial gateway failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionSummary {
    pub orders: Vec<OrderRecord>,
    pub executed_quantity: f64,
    pub target_quantity: f64,
    /// Percentage of the target actually issued, 0 when the target is 0.
    pub completion_ratio: f64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed: Duration,
}

impl ExecutionSummary {
    pub fn outcome(&self) -> ExecutionOutcome {
        if self.orders.is_empty() {
            ExecutionOutcome::NothingExecuted
        } else if self.completion_ratio >= 100.0 {
            ExecutionOutcome::FullyExecuted
        } else {
            ExecutionOutcome::PartiallyExecuted
        }
    }
}

/// One placed grid order, keyed by its 1-based level index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridOrder {
    pub level: usize,
    pub price: f64,
    pub record: OrderRecord,
}

/// Report of a grid placement pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridPlacement {
    pub orders: Vec<GridOrder>,
    pub total_levels: usize,
    pub quantity_per_level: f64,
    /// Percentage of levels that got a resting order.
    pub placement_ratio: f64,
    pub total_quantity_placed: f64,
    /// Lowest and highest price actually placed, if anything was placed.
    pub price_range: Option<(f64, f64)>,
}

impl GridPlacement {
    pub fn successful_orders(&self) -> usize {
        self.orders.len()
    }

    pub fn outcome(&self) -> ExecutionOutcome {
        if self.orders.is_empty() {
            ExecutionOutcome::NothingExecuted
        } else if self.orders.len() == self.total_levels {
            ExecutionOutcome::FullyExecuted
        } else {
            ExecutionOutcome::PartiallyExecuted
        }
    }
}

/// One monitoring poll over a set of grid orders. Orders whose status query
/// failed in this poll are excluded from both buckets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridSnapshot {
    pub taken_at: DateTime<Utc>,
    pub filled: usize,
    pub pending: usize,
    pub total: usize,
}

impl GridSnapshot {
    pub fn classify(taken_at: DateTime<Utc>, total: usize, records: &[OrderRecord]) -> Self {
        let mut filled = 0;
        let mut pending = 0;
        for record in records {
            match record.status {
                OrderStatus::Filled => filled += 1,
                s if s.is_open() => pending += 1,
                _ => {}
            }
        }
        GridSnapshot {
            taken_at,
            filled,
            pending,
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::order::{OrderId, OrderRecord, OrderSide, OrderType};

    fn record(status: OrderStatus) -> OrderRecord {
        OrderRecord {
            order_id: OrderId("t-1".to_string()),
            symbol: "BTCUSDT".to_string(),
            side: OrderSide::Buy,
            order_type: OrderType::Limit,
            quantity: 1.0,
            price: Some(100.0),
            status,
            created_at: 0,
        }
    }

    #[test]
    fn snapshot_buckets_filled_and_open() {
        let records = vec![
            record(OrderStatus::Filled),
            record(OrderStatus::New),
            record(OrderStatus::PartiallyFilled),
            record(OrderStatus::Canceled),
        ];
        let snapshot = GridSnapshot::classify(Utc::now(), 5, &records);
        assert_eq!(snapshot.filled, 1);
        assert_eq!(snapshot.pending, 2);
        assert_eq!(snapshot.total, 5);
    }

    #[test]
    fn summary_outcome_classification() {
        let mut summary = ExecutionSummary {
            orders: vec![record(OrderStatus::Filled)],
            executed_quantity: 1.0,
            target_quantity: 1.0,
            completion_ratio: 100.0,
            started_at: Utc::now(),
            finished_at: Utc::now(),
            elapsed: Duration::from_secs(0),
        };
        assert_eq!(summary.outcome(), ExecutionOutcome::FullyExecuted);

        summary.completion_ratio = 60.0;
        assert_eq!(summary.outcome(), ExecutionOutcome::PartiallyExecuted);

        summary.orders.clear();
        assert_eq!(summary.outcome(), ExecutionOutcome::NothingExecuted);
    }
}
