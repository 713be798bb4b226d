//! Single-shot order strategies.
//!
//! Market, limit, stop-limit, stop-market and the synthetic OCO each
//! validate once, issue one (or two) gateway calls and return the raw
//! record(s). Unlike the iterative strategies, the first gateway failure
//! aborts the operation.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::error::ExecError;
use crate::exchange::traits::Exchange;
use crate::models::order::{OrderId, OrderRecord, OrderRequest, OrderSide, TimeInForce};
use crate::validate;

/// The two legs of a synthetic one-cancels-other order. The exchange has no
/// native OCO for futures, so this is two independent resting orders; the
/// caller is responsible for cancelling the surviving leg after a fill.
#[derive(Debug, Clone)]
pub struct OcoPair {
    pub limit_order: OrderRecord,
    pub stop_order: OrderRecord,
}

fn check_quantity(quantity: f64) -> Result<(), ExecError> {
    if quantity > 0.0 && quantity.is_finite() {
        Ok(())
    } else {
        Err(ExecError::Validation(format!(
            "invalid quantity: {}",
            quantity
        )))
    }
}

pub async fn place_market_order(
    exchange: &Arc<RwLock<dyn Exchange>>,
    symbol: &str,
    side: OrderSide,
    quantity: f64,
) -> Result<OrderRecord, ExecError> {
    let symbol = validate::validate_symbol(symbol)?;
    check_quantity(quantity)?;

    log::info!("[MARKET] {} {} {}", side, quantity, symbol);
    let mut exchange = exchange.write().await;
    exchange
        .create_order(OrderRequest::market(symbol, side, quantity))
        .await
}

pub async fn place_limit_order(
    exchange: &Arc<RwLock<dyn Exchange>>,
    symbol: &str,
    side: OrderSide,
    quantity: f64,
    price: f64,
    time_in_force: TimeInForce,
) -> Result<OrderRecord, ExecError> {
    let symbol = validate::validate_symbol(symbol)?;
    check_quantity(quantity)?;
    if price <= 0.0 {
        return Err(ExecError::Validation(format!("invalid price: {}", price)));
    }

    log::info!("[LIMIT] {} {} {} @ {}", side, quantity, symbol, price);
    let mut exchange = exchange.write().await;
    exchange
        .create_order(
            OrderRequest::limit(symbol, side, quantity, price).with_time_in_force(time_in_force),
        )
        .await
}

pub async fn place_stop_limit_order(
    exchange: &Arc<RwLock<dyn Exchange>>,
    symbol: &str,
    side: OrderSide,
    quantity: f64,
    stop_price: f64,
    limit_price: f64,
) -> Result<OrderRecord, ExecError> {
    let symbol = validate::validate_symbol(symbol)?;
    check_quantity(quantity)?;
    validate::validate_stop_limit_prices(side, stop_price, limit_price)?;

    log::info!(
        "[STOP-LIMIT] {} {} {} stop {} limit {}",
        side,
        quantity,
        symbol,
        stop_price,
        limit_price,
    );
    let mut exchange = exchange.write().await;
    exchange
        .create_order(OrderRequest::stop_limit(
            symbol,
            side,
            quantity,
            stop_price,
            limit_price,
        ))
        .await
}

pub async fn place_stop_market_order(
    exchange: &Arc<RwLock<dyn Exchange>>,
    symbol: &str,
    side: OrderSide,
    quantity: f64,
    stop_price: f64,
) -> Result<OrderRecord, ExecError> {
    let symbol = validate::validate_symbol(symbol)?;
    check_quantity(quantity)?;
    if stop_price <= 0.0 {
        return Err(ExecError::Validation(format!(
            "invalid stop price: {}",
            stop_price
        )));
    }

    log::info!(
        "[STOP-MARKET] {} {} {} stop {}",
        side,
        quantity,
        symbol,
        stop_price,
    );
    let mut exchange = exchange.write().await;
    exchange
        .create_order(OrderRequest::stop_market(symbol, side, quantity, stop_price))
        .await
}

/// Place the two legs of a synthetic OCO sequentially. If the stop leg
/// fails after the limit leg rested, the limit leg is cancelled on a best
/// effort basis before the error is returned, so no half-armed pair is
/// silently left on the book.
pub async fn place_oco_order(
    exchange: &Arc<RwLock<dyn Exchange>>,
    symbol: &str,
    side: OrderSide,
    quantity: f64,
    price: f64,
    stop_price: f64,
    stop_limit_price: f64,
) -> Result<OcoPair, ExecError> {
    let symbol = validate::validate_symbol(symbol)?;
    check_quantity(quantity)?;
    validate::validate_oco_prices(side, price, stop_price, stop_limit_price)?;

    log::info!(
        "[OCO] {} {} {} limit {} stop {} stop-limit {}",
        side,
        quantity,
        symbol,
        price,
        stop_price,
        stop_limit_price,
    );

    let limit_order = {
        let mut exchange = exchange.write().await;
        exchange
            .create_order(OrderRequest::limit(&symbol, side, quantity, price))
            .await?
    };

    let stop_result = {
        let mut exchange = exchange.write().await;
        exchange
            .create_order(OrderRequest::stop_limit(
                &symbol,
                side,
                quantity,
                stop_price,
                stop_limit_price,
            ))
            .await
    };

    match stop_result {
        Ok(stop_order) => {
            log::info!(
                "[OCO] placed: limit {} / stop {}",
                limit_order.order_id,
                stop_order.order_id,
            );
            Ok(OcoPair {
                limit_order,
                stop_order,
            })
        }
        Err(e) => {
            log::error!(
                "[OCO] stop leg failed, cancelling limit leg {}: {}",
                limit_order.order_id,
                e,
            );
            let mut exchange = exchange.write().await;
            if let Err(cancel_err) = exchange.cancel_order(&symbol, &limit_order.order_id).await {
                log::error!(
                    "[OCO] cancel of limit leg {} also failed: {}",
                    limit_order.order_id,
                    cancel_err,
                );
            }
            Err(e)
        }
    }
}

/// Cancel a set of orders independently, returning those that cancelled.
pub async fn cancel_orders(
    exchange: &Arc<RwLock<dyn Exchange>>,
    symbol: &str,
    order_ids: &[OrderId],
) -> Vec<OrderRecord> {
    let mut cancelled = Vec::new();
    for order_id in order_ids {
        let result = {
            let mut exchange = exchange.write().await;
            exchange.cancel_order(symbol, order_id).await
        };
        match result {
            Ok(record) => {
                log::info!("[CANCEL] order {} cancelled", order_id);
                cancelled.push(record);
            }
            Err(e) => {
                log::error!("[CANCEL] order {} failed: {}", order_id, e);
            }
        }
    }
    cancelled
}

/// Query a set of orders independently, returning the records that could
/// be fetched.
pub async fn order_statuses(
    exchange: &Arc<RwLock<dyn Exchange>>,
    symbol: &str,
    order_ids: &[OrderId],
) -> Vec<OrderRecord> {
    let mut records = Vec::new();
    for order_id in order_ids {
        let result = {
            let exchange = exchange.read().await;
            exchange.get_order(symbol, order_id).await
        };
        match result {
            Ok(record) => records.push(record),
            Err(e) => {
                log::error!("[STATUS] order {} failed: {}", order_id, e);
            }
        }
    }
    records
}
