use async_trait::async_trait;

use crate::error::ExecError;
use crate::models::order::{OrderId, OrderRecord, OrderRequest};

/// The `Exchange` trait is the gateway capability consumed by every
/// execution strategy. Implemented by the real futures connector and by the
/// in-memory mock; the choice is injected at the composition root.
#[async_trait]
pub trait Exchange: Send + Sync {
    /// Submit a new order. A returned record means the exchange accepted it.
    async fn create_order(&mut self, request: OrderRequest) -> Result<OrderRecord, ExecError>;

    /// Query the current state of an order.
    async fn get_order(&self, symbol: &str, order_id: &OrderId) -> Result<OrderRecord, ExecError>;

    /// Cancel an order, returning its record after cancellation.
    async fn cancel_order(
        &mut self,
        symbol: &str,
        order_id: &OrderId,
    ) -> Result<OrderRecord, ExecError>;

    /// List open orders, optionally restricted to one symbol.
    async fn open_orders(&self, symbol: Option<&str>) -> Result<Vec<OrderRecord>, ExecError>;
}
