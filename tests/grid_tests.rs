//! Grid executor tests against the mock exchange.

use std::sync::Arc;

use tokio::sync::RwLock;

use xExec::exchange::{Exchange, MockExchange};
use xExec::models::order::{OrderId, OrderSide, OrderStatus, OrderType};
use xExec::models::summary::ExecutionOutcome;
use xExec::strategies::{GridExecutor, GridPlan};

fn mock_pair() -> (Arc<RwLock<MockExchange>>, Arc<RwLock<dyn Exchange>>) {
    let mock = Arc::new(RwLock::new(MockExchange::new()));
    let exchange: Arc<RwLock<dyn Exchange>> = mock.clone();
    (mock, exchange)
}

#[tokio::test(start_paused = true)]
async fn placement_rests_one_limit_order_per_level() {
    let (_, exchange) = mock_pair();
    let plan = GridPlan::derive(5.0, 110.0, 100.0, 3).unwrap();
    let executor = GridExecutor::new(exchange, "ETHUSDT", OrderSide::Sell);

    let placement = executor.place(&plan).await.unwrap();

    assert_eq!(placement.successful_orders(), 3);
    assert_eq!(placement.total_levels, 3);
    assert!((placement.placement_ratio - 100.0).abs() < 1e-9);
    assert_eq!(placement.price_range, Some((100.0, 110.0)));
    assert!((placement.total_quantity_placed - 5.000001).abs() < 1e-9);
    assert_eq!(placement.outcome(), ExecutionOutcome::FullyExecuted);

    for (i, order) in placement.orders.iter().enumerate() {
        assert_eq!(order.level, i + 1);
        assert_eq!(order.price, plan.prices[i]);
        assert_eq!(order.record.order_type, OrderType::Limit);
        assert_eq!(order.record.status, OrderStatus::New);
        assert!((order.record.quantity - 1.666667).abs() < 1e-9);
    }
}

#[tokio::test(start_paused = true)]
async fn failed_levels_are_skipped_not_fatal() {
    let (mock, exchange) = mock_pair();
    mock.write().await.fail_create_on(&[2]);

    let plan = GridPlan::derive(3.0, 110.0, 100.0, 3).unwrap();
    let executor = GridExecutor::new(exchange, "ETHUSDT", OrderSide::Buy);

    let placement = executor.place(&plan).await.unwrap();

    assert_eq!(placement.successful_orders(), 2);
    assert!((placement.placement_ratio - 200.0 / 3.0).abs() < 1e-6);
    assert_eq!(placement.outcome(), ExecutionOutcome::PartiallyExecuted);

    // The surviving orders keep their original level indexes.
    let levels: Vec<usize> = placement.orders.iter().map(|o| o.level).collect();
    assert_eq!(levels, vec![1, 3]);
}

#[tokio::test(start_paused = true)]
async fn monitor_snapshots_classify_fills_and_exclude_failures() {
    let (mock, exchange) = mock_pair();
    let plan = GridPlan::derive(3.0, 110.0, 100.0, 3).unwrap();
    let executor = GridExecutor::new(exchange, "ETHUSDT", OrderSide::Sell);

    let placement = executor.place(&plan).await.unwrap();
    let order_ids: Vec<OrderId> = placement
        .orders
        .iter()
        .map(|o| o.record.order_id.clone())
        .collect();

    {
        let mut mock = mock.write().await;
        mock.set_status(&order_ids[0], OrderStatus::Filled);
        mock.fail_get_of(order_ids[2].clone());
    }

    let snapshots = executor.monitor(&order_ids, 1).await.unwrap();

    // One poll at t=0 and one at t=30 inside the one-minute bound.
    assert_eq!(snapshots.len(), 2);
    for snapshot in &snapshots {
        assert_eq!(snapshot.filled, 1);
        assert_eq!(snapshot.pending, 1);
        assert_eq!(snapshot.total, 3);
    }
}

#[tokio::test(start_paused = true)]
async fn cancel_all_tolerates_individual_failures() {
    let (mock, exchange) = mock_pair();
    let plan = GridPlan::derive(3.0, 110.0, 100.0, 3).unwrap();
    let executor = GridExecutor::new(exchange, "ETHUSDT", OrderSide::Sell);

    let placement = executor.place(&plan).await.unwrap();
    let order_ids: Vec<OrderId> = placement
        .orders
        .iter()
        .map(|o| o.record.order_id.clone())
        .collect();

    mock.write().await.fail_cancel_of(order_ids[1].clone());

    let cancelled = executor.cancel_all(&order_ids).await;

    assert_eq!(cancelled.len(), 2);
    for record in &cancelled {
        assert_eq!(record.status, OrderStatus::Canceled);
    }

    // The failed cancellation leaves exactly one order on the book.
    let open = mock.read().await.open_orders(Some("ETHUSDT")).await.unwrap();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].order_id, order_ids[1]);
}
