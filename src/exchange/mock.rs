use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use rand::Rng;

use crate::error::ExecError;
use crate::exchange::traits::Exchange;
use crate::models::order::{OrderId, OrderRecord, OrderRequest, OrderStatus, OrderType};
use crate::utils::current_timestamp_ms;

/// A deterministic in-memory implementation of the Exchange trait for
/// testing and dry runs. Market orders fill immediately at a jittered mark
/// price, limit and stop orders rest as New. Individual calls can be made
/// to fail so partial-failure handling in the executors is testable.
pub struct MockExchange {
    orders: HashMap<OrderId, OrderRecord>,
    mark_prices: HashMap<String, f64>,
    order_seq: u64,
    create_calls: u64,
    fail_creates: HashSet<u64>,
    fail_cancels: HashSet<OrderId>,
    fail_gets: HashSet<OrderId>,
}

impl MockExchange {
    pub fn new() -> Self {
        let mut mark_prices = HashMap::new();
        mark_prices.insert("BTCUSDT".to_string(), 50_000.0);
        mark_prices.insert("ETHUSDT".to_string(), 3_000.0);

        MockExchange {
            orders: HashMap::new(),
            mark_prices,
            order_seq: 0,
            create_calls: 0,
            fail_creates: HashSet::new(),
            fail_cancels: HashSet::new(),
            fail_gets: HashSet::new(),
        }
    }

    pub fn with_mark_price(mut self, symbol: impl Into<String>, price: f64) -> Self {
        self.mark_prices.insert(symbol.into(), price);
        self
    }

    /// Make the n-th create_order call fail (1-based call numbers).
    pub fn fail_create_on(&mut self, calls: &[u64]) {
        self.fail_creates.extend(calls.iter().copied());
    }

    /// Make cancellation of a given order fail.
    pub fn fail_cancel_of(&mut self, order_id: OrderId) {
        self.fail_cancels.insert(order_id);
    }

    /// Make status queries for a given order fail.
    pub fn fail_get_of(&mut self, order_id: OrderId) {
        self.fail_gets.insert(order_id);
    }

    /// Force an order into a status, simulating a fill seen by a later poll.
    pub fn set_status(&mut self, order_id: &OrderId, status: OrderStatus) {
        if let Some(record) = self.orders.get_mut(order_id) {
            record.status = status;
        }
    }

    pub fn create_calls(&self) -> u64 {
        self.create_calls
    }

    fn next_id(&mut self) -> OrderId {
        self.order_seq += 1;
        OrderId(format!("mock-{}", self.order_seq))
    }

    fn mark_price(&self, symbol: &str) -> f64 {
        let base = self.mark_prices.get(symbol).copied().unwrap_or(100.0);
        let jitter = rand::thread_rng().gen_range(-0.0005..0.0005);
        base * (1.0 + jitter)
    }
}

impl Default for MockExchange {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Exchange for MockExchange {
    async fn create_order(&mut self, request: OrderRequest) -> Result<OrderRecord, ExecError> {
        self.create_calls += 1;
        if self.fail_creates.contains(&self.create_calls) {
            return Err(ExecError::Gateway(format!(
                "injected create failure on call {}",
                self.create_calls
            )));
        }

        let order_id = self.next_id();
        let (status, price) = match request.order_type {
            OrderType::Market => (OrderStatus::Filled, Some(self.mark_price(&request.symbol))),
            _ => (OrderStatus::New, request.price),
        };

        let record = OrderRecord {
            order_id: order_id.clone(),
            symbol: request.symbol,
            side: request.side,
            order_type: request.order_type,
            quantity: request.quantity,
            price,
            status,
            created_at: current_timestamp_ms(),
        };

        self.orders.insert(order_id, record.clone());
        Ok(record)
    }

    async fn get_order(&self, symbol: &str, order_id: &OrderId) -> Result<OrderRecord, ExecError> {
        if self.fail_gets.contains(order_id) {
            return Err(ExecError::Gateway(format!(
                "injected query failure for {}",
                order_id
            )));
        }
        match self.orders.get(order_id) {
            Some(record) if record.symbol == symbol => Ok(record.clone()),
            _ => Err(ExecError::OrderNotFound(order_id.clone())),
        }
    }

    async fn cancel_order(
        &mut self,
        symbol: &str,
        order_id: &OrderId,
    ) -> Result<OrderRecord, ExecError> {
        if self.fail_cancels.contains(order_id) {
            return Err(ExecError::Gateway(format!(
                "injected cancel failure for {}",
                order_id
            )));
        }
        match self.orders.get_mut(order_id) {
            Some(record) if record.symbol == symbol => {
                if record.status.is_open() {
                    record.status = OrderStatus::Canceled;
                }
                Ok(record.clone())
            }
            _ => Err(ExecError::OrderNotFound(order_id.clone())),
        }
    }

    async fn open_orders(&self, symbol: Option<&str>) -> Result<Vec<OrderRecord>, ExecError> {
        let open = self
            .orders
            .values()
            .filter(|record| record.status.is_open())
            .filter(|record| symbol.map_or(true, |s| record.symbol == s))
            .cloned()
            .collect();
        Ok(open)
    }
}
