pub mod binance_futures;
pub mod mock;
pub mod traits;

pub use binance_futures::BinanceFuturesExchange;
pub use mock::MockExchange;
pub use traits::Exchange;
