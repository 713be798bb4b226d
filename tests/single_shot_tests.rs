//! Single-shot order strategy tests against the mock exchange.

use std::sync::Arc;

use tokio::sync::RwLock;

use xExec::error::ExecError;
use xExec::exchange::{Exchange, MockExchange};
use xExec::models::order::{OrderSide, OrderStatus, OrderType, TimeInForce};
use xExec::strategies::{
    cancel_orders, order_statuses, place_limit_order, place_market_order, place_oco_order,
    place_stop_limit_order, place_stop_market_order,
};

fn mock_pair() -> (Arc<RwLock<MockExchange>>, Arc<RwLock<dyn Exchange>>) {
    let mock = Arc::new(RwLock::new(MockExchange::new()));
    let exchange: Arc<RwLock<dyn Exchange>> = mock.clone();
    (mock, exchange)
}

#[tokio::test]
async fn market_order_fills_immediately() {
    let (_, exchange) = mock_pair();
    let record = place_market_order(&exchange, "btcusdt", OrderSide::Buy, 0.5)
        .await
        .unwrap();

    assert_eq!(record.symbol, "BTCUSDT");
    assert_eq!(record.order_type, OrderType::Market);
    assert_eq!(record.status, OrderStatus::Filled);
}

#[tokio::test]
async fn limit_order_rests_with_time_in_force() {
    let (_, exchange) = mock_pair();
    let record = place_limit_order(
        &exchange,
        "BTCUSDT",
        OrderSide::Sell,
        0.5,
        52_000.0,
        TimeInForce::Gtc,
    )
    .await
    .unwrap();

    assert_eq!(record.status, OrderStatus::New);
    assert_eq!(record.price, Some(52_000.0));
}

#[tokio::test]
async fn stop_limit_rejects_inverted_trigger() {
    let (mock, exchange) = mock_pair();

    // Buy trigger below the limit price never fires before execution.
    let result =
        place_stop_limit_order(&exchange, "BTCUSDT", OrderSide::Buy, 0.5, 49_000.0, 50_000.0)
            .await;
    assert!(matches!(result, Err(ExecError::Validation(_))));

    // Rejected before any gateway call.
    assert_eq!(mock.read().await.create_calls(), 0);

    let record =
        place_stop_limit_order(&exchange, "BTCUSDT", OrderSide::Buy, 0.5, 51_000.0, 50_000.0)
            .await
            .unwrap();
    assert_eq!(record.order_type, OrderType::StopLimit);
    assert_eq!(record.status, OrderStatus::New);
}

#[tokio::test]
async fn stop_market_requires_positive_trigger() {
    let (_, exchange) = mock_pair();
    let result = place_stop_market_order(&exchange, "BTCUSDT", OrderSide::Sell, 0.5, 0.0).await;
    assert!(matches!(result, Err(ExecError::Validation(_))));

    let record = place_stop_market_order(&exchange, "BTCUSDT", OrderSide::Sell, 0.5, 48_000.0)
        .await
        .unwrap();
    assert_eq!(record.order_type, OrderType::StopMarket);
}

#[tokio::test]
async fn oco_places_both_legs() {
    let (_, exchange) = mock_pair();
    let pair = place_oco_order(
        &exchange,
        "BTCUSDT",
        OrderSide::Sell,
        1.0,
        100.0,
        90.0,
        110.0,
    )
    .await
    .unwrap();

    assert_eq!(pair.limit_order.order_type, OrderType::Limit);
    assert_eq!(pair.stop_order.order_type, OrderType::StopLimit);
    assert_ne!(pair.limit_order.order_id, pair.stop_order.order_id);
}

#[tokio::test]
async fn oco_rejects_bad_price_ordering_before_any_call() {
    let (mock, exchange) = mock_pair();
    let result = place_oco_order(
        &exchange,
        "BTCUSDT",
        OrderSide::Sell,
        1.0,
        100.0,
        95.0,
        90.0,
    )
    .await;

    assert!(matches!(result, Err(ExecError::Validation(_))));
    assert_eq!(mock.read().await.create_calls(), 0);
}

#[tokio::test]
async fn oco_unwinds_the_limit_leg_when_the_stop_leg_fails() {
    let (mock, exchange) = mock_pair();
    mock.write().await.fail_create_on(&[2]);

    let result = place_oco_order(
        &exchange,
        "BTCUSDT",
        OrderSide::Sell,
        1.0,
        100.0,
        90.0,
        110.0,
    )
    .await;
    assert!(result.is_err());

    // The resting limit leg was cancelled on the way out.
    let open = mock.read().await.open_orders(Some("BTCUSDT")).await.unwrap();
    assert!(open.is_empty());
}

#[tokio::test]
async fn bulk_cancel_and_status_tolerate_failures() {
    let (mock, exchange) = mock_pair();

    let first = place_limit_order(
        &exchange,
        "BTCUSDT",
        OrderSide::Buy,
        0.5,
        45_000.0,
        TimeInForce::Gtc,
    )
    .await
    .unwrap();
    let second = place_limit_order(
        &exchange,
        "BTCUSDT",
        OrderSide::Buy,
        0.5,
        44_000.0,
        TimeInForce::Gtc,
    )
    .await
    .unwrap();

    mock.write().await.fail_get_of(second.order_id.clone());
    let ids = vec![first.order_id.clone(), second.order_id.clone()];

    let records = order_statuses(&exchange, "BTCUSDT", &ids).await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].order_id, first.order_id);

    mock.write().await.fail_cancel_of(second.order_id.clone());
    let cancelled = cancel_orders(&exchange, "BTCUSDT", &ids).await;
    assert_eq!(cancelled.len(), 1);
    assert_eq!(cancelled[0].status, OrderStatus::Canceled);
}
