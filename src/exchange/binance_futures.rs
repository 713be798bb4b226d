use async_trait::async_trait;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::ExecError;
use crate::exchange::traits::Exchange;
use crate::models::order::{OrderId, OrderRecord, OrderSide, OrderStatus, OrderType};
use crate::models::order::OrderRequest;
use crate::utils::current_timestamp_ms;

type HmacSha256 = Hmac<Sha256>;

/// Binance USDT-M Futures REST connector, limited to the order endpoints
/// the executors need.
pub struct BinanceFuturesExchange {
    base_url: String,
    api_key: String,
    api_secret: String,
    http: reqwest::Client,
}

impl BinanceFuturesExchange {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        BinanceFuturesExchange {
            base_url: base_url.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            http: reqwest::Client::new(),
        }
    }

    fn sign(&self, query: &str) -> String {
        // HMAC-SHA256 accepts keys of any length, so this cannot fail.
        let mut mac = HmacSha256::new_from_slice(self.api_secret.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(query.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    async fn signed_request(
        &self,
        method: reqwest::Method,
        path: &str,
        mut params: Vec<String>,
    ) -> Result<serde_json::Value, ExecError> {
        params.push(format!("timestamp={}", current_timestamp_ms()));
        let query = params.join("&");
        let signature = self.sign(&query);
        let url = format!("{}{}?{}&signature={}", self.base_url, path, query, signature);

        let response = self
            .http
            .request(method, url)
            .header("X-MBX-APIKEY", &self.api_key)
            .send()
            .await
            .map_err(|e| ExecError::Gateway(format!("{} http error: {}", path, e)))?;

        let status = response.status();
        let json = response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| ExecError::Gateway(format!("{} parse error: {}", path, e)))?;

        if !status.is_success() {
            let msg = json
                .get("msg")
                .and_then(|v| v.as_str())
                .unwrap_or("no error message");
            return Err(ExecError::OrderRejected(format!(
                "{} failed ({}): {}",
                path, status, msg
            )));
        }

        Ok(json)
    }

    fn str_number(value: &serde_json::Value, field: &str) -> Option<f64> {
        value
            .get(field)
            .and_then(|v| v.as_str())
            .and_then(|s| s.parse::<f64>().ok())
    }

    fn record_from_json(value: &serde_json::Value) -> Result<OrderRecord, ExecError> {
        let order_id = value
            .get("orderId")
            .and_then(|v| v.as_i64())
            .ok_or_else(|| ExecError::Gateway("missing orderId in response".to_string()))?;

        let symbol = value
            .get("symbol")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        let side = match value.get("side").and_then(|v| v.as_str()) {
            Some("SELL") => OrderSide::Sell,
            _ => OrderSide::Buy,
        };

        let order_type = match value.get("type").and_then(|v| v.as_str()) {
            Some("LIMIT") => OrderType::Limit,
            Some("STOP") => OrderType::StopLimit,
            Some("STOP_MARKET") => OrderType::StopMarket,
            _ => OrderType::Market,
        };

        let quantity = Self::str_number(value, "origQty").unwrap_or(0.0);
        let price = Self::str_number(value, "price").filter(|p| *p > 0.0);
        let status = value
            .get("status")
            .and_then(|v| v.as_str())
            .map(OrderStatus::from_exchange_str)
            .unwrap_or(OrderStatus::Unknown);
        let created_at = value
            .get("updateTime")
            .and_then(|v| v.as_i64())
            .unwrap_or_else(current_timestamp_ms);

        Ok(OrderRecord {
            order_id: OrderId(order_id.to_string()),
            symbol,
            side,
            order_type,
            quantity,
            price,
            status,
            created_at,
        })
    }
}

#[async_trait]
impl Exchange for BinanceFuturesExchange {
    async fn create_order(&mut self, request: OrderRequest) -> Result<OrderRecord, ExecError> {
        let mut params = vec![
            format!("symbol={}", request.symbol),
            format!("side={}", request.side.as_exchange_str()),
            format!("type={}", request.order_type.as_exchange_str()),
            format!("quantity={}", request.quantity),
            format!("newClientOrderId=xexec-{}", uuid::Uuid::new_v4().simple()),
        ];
        if let Some(price) = request.price {
            params.push(format!("price={}", price));
        }
        if let Some(stop_price) = request.stop_price {
            params.push(format!("stopPrice={}", stop_price));
        }
        if let Some(tif) = request.time_in_force {
            params.push(format!("timeInForce={}", tif.as_exchange_str()));
        }

        let json = self
            .signed_request(reqwest::Method::POST, "/fapi/v1/order", params)
            .await?;
        Self::record_from_json(&json)
    }

    async fn get_order(&self, symbol: &str, order_id: &OrderId) -> Result<OrderRecord, ExecError> {
        let params = vec![
            format!("symbol={}", symbol),
            format!("orderId={}", order_id),
        ];
        let json = self
            .signed_request(reqwest::Method::GET, "/fapi/v1/order", params)
            .await?;
        Self::record_from_json(&json)
    }

    async fn cancel_order(
        &mut self,
        symbol: &str,
        order_id: &OrderId,
    ) -> Result<OrderRecord, ExecError> {
        let params = vec![
            format!("symbol={}", symbol),
            format!("orderId={}", order_id),
        ];
        let json = self
            .signed_request(reqwest::Method::DELETE, "/fapi/v1/order", params)
            .await?;
        Self::record_from_json(&json)
    }

    async fn open_orders(&self, symbol: Option<&str>) -> Result<Vec<OrderRecord>, ExecError> {
        let mut params = Vec::new();
        if let Some(symbol) = symbol {
            params.push(format!("symbol={}", symbol));
        }
        let json = self
            .signed_request(reqwest::Method::GET, "/fapi/v1/openOrders", params)
            .await?;

        let rows = json
            .as_array()
            .ok_or_else(|| ExecError::Gateway("openOrders: expected an array".to_string()))?;
        rows.iter().map(Self::record_from_json).collect()
    }
}
