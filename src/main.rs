use std::sync::Arc;

use tokio::sync::RwLock;

use xExec::config::Config;
use xExec::exchange::{BinanceFuturesExchange, Exchange, MockExchange};
use xExec::models::order::OrderId;
use xExec::strategies::{
    self, stop_pair, GridExecutor, GridPlan, TwapExecutor, TwapPlan,
};
use xExec::utils::logging;
use xExec::validate;

const DEFAULT_BASE_URL: &str = "https://fapi.binance.com";

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::load()?;
    logging::init(&config.logging.level)?;

    let exchange = build_exchange(&config)?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    match args.as_slice() {
        ["market", symbol, side, quantity] => {
            let symbol = validate::validate_symbol(symbol)?;
            let side = validate::validate_side(side)?;
            let quantity = validate::validate_quantity(quantity)?;
            let record =
                strategies::place_market_order(&exchange, &symbol, side, quantity).await?;
            println!("order {} {:?}", record.order_id, record.status);
        }
        ["limit", symbol, side, quantity, price] => {
            let symbol = validate::validate_symbol(symbol)?;
            let side = validate::validate_side(side)?;
            let quantity = validate::validate_quantity(quantity)?;
            let price = validate::validate_price(price)?;
            let record = strategies::place_limit_order(
                &exchange,
                &symbol,
                side,
                quantity,
                price,
                xExec::TimeInForce::Gtc,
            )
            .await?;
            println!("order {} {:?}", record.order_id, record.status);
        }
        ["stop-limit", symbol, side, quantity, stop_price, limit_price] => {
            let args = validate::validate_stop_limit_args(
                symbol, side, quantity, stop_price, limit_price,
            )?;
            let record = strategies::place_stop_limit_order(
                &exchange,
                &args.symbol,
                args.side,
                args.quantity,
                args.stop_price,
                args.limit_price,
            )
            .await?;
            println!("order {} {:?}", record.order_id, record.status);
        }
        ["stop-market", symbol, side, quantity, stop_price] => {
            let args = validate::validate_stop_market_args(symbol, side, quantity, stop_price)?;
            let record = strategies::place_stop_market_order(
                &exchange,
                &args.symbol,
                args.side,
                args.quantity,
                args.stop_price,
            )
            .await?;
            println!("order {} {:?}", record.order_id, record.status);
        }
        ["oco", symbol, side, quantity, price, stop_price, stop_limit_price] => {
            let args = validate::validate_oco_args(
                symbol,
                side,
                quantity,
                price,
                stop_price,
                stop_limit_price,
            )?;
            let pair = strategies::place_oco_order(
                &exchange,
                &args.symbol,
                args.side,
                args.quantity,
                args.price,
                args.stop_price,
                args.stop_limit_price,
            )
            .await?;
            println!(
                "limit leg {} / stop leg {}",
                pair.limit_order.order_id, pair.stop_order.order_id
            );
        }
        ["twap", symbol, side, quantity, duration_minutes, chunks] => {
            let args =
                validate::validate_twap_args(symbol, side, quantity, duration_minutes, chunks)?;
            let plan =
                TwapPlan::derive(args.total_quantity, args.duration_minutes, args.chunk_count)?;
            let executor = TwapExecutor::new(exchange, &args.symbol, args.side, plan);

            let (handle, token) = stop_pair();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    log::warn!("Ctrl-C received, stopping TWAP run");
                    handle.stop();
                }
            });

            let summary = executor.execute_until(token).await?;
            println!("TWAP execution summary");
            println!("  orders:            {}", summary.orders.len());
            println!("  executed quantity: {}", summary.executed_quantity);
            println!("  target quantity:   {}", summary.target_quantity);
            println!("  completion ratio:  {:.2}%", summary.completion_ratio);
            println!("  elapsed:           {:?}", summary.elapsed);
            println!("  outcome:           {:?}", summary.outcome());
        }
        ["grid", "place", symbol, side, quantity, upper, lower, levels] => {
            let args = validate::validate_grid_args(symbol, side, quantity, upper, lower, levels)?;
            let plan = GridPlan::derive(
                args.total_quantity,
                args.upper_price,
                args.lower_price,
                args.level_count,
            )?;
            let executor = GridExecutor::new(exchange, &args.symbol, args.side);
            let placement = executor.place(&plan).await?;

            println!("Grid placement summary");
            println!("  levels:             {}", placement.total_levels);
            println!("  successful orders:  {}", placement.successful_orders());
            println!("  placement ratio:    {:.2}%", placement.placement_ratio);
            println!("  quantity per level: {}", placement.quantity_per_level);
            println!("  quantity placed:    {}", placement.total_quantity_placed);
            if let Some((low, high)) = placement.price_range {
                println!("  price range:        {} - {}", low, high);
            }
            for order in &placement.orders {
                println!(
                    "  level {} @ {} -> {}",
                    order.level, order.price, order.record.order_id
                );
            }
        }
        ["grid", "monitor", symbol, duration_minutes, ids @ ..] if !ids.is_empty() => {
            let symbol = validate::validate_symbol(symbol)?;
            let duration_minutes: u64 = duration_minutes.parse()?;
            let order_ids: Vec<OrderId> =
                ids.iter().map(|id| OrderId(id.to_string())).collect();

            // Side is irrelevant for monitoring; the executor only queries.
            let executor = GridExecutor::new(exchange, &symbol, xExec::OrderSide::Buy);

            let (handle, token) = stop_pair();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    log::warn!("Ctrl-C received, stopping grid monitor");
                    handle.stop();
                }
            });

            let snapshots = executor
                .monitor_until(&order_ids, duration_minutes, token)
                .await?;
            for snapshot in &snapshots {
                println!(
                    "{}  filled: {}  pending: {}  total: {}",
                    snapshot.taken_at.format("%H:%M:%S"),
                    snapshot.filled,
                    snapshot.pending,
                    snapshot.total
                );
            }
        }
        ["grid", "cancel", symbol, ids @ ..] if !ids.is_empty() => {
            let symbol = validate::validate_symbol(symbol)?;
            let order_ids: Vec<OrderId> =
                ids.iter().map(|id| OrderId(id.to_string())).collect();
            let executor = GridExecutor::new(exchange, &symbol, xExec::OrderSide::Buy);
            let cancelled = executor.cancel_all(&order_ids).await;
            println!("{}/{} orders cancelled", cancelled.len(), order_ids.len());
        }
        _ => {
            print_usage();
        }
    }

    Ok(())
}

fn build_exchange(config: &Config) -> Result<Arc<RwLock<dyn Exchange>>, anyhow::Error> {
    if config.exchange.use_mock {
        log::info!("using mock exchange");
        return Ok(Arc::new(RwLock::new(MockExchange::new())));
    }

    let api_key = config
        .exchange
        .api_key
        .clone()
        .ok_or_else(|| anyhow::anyhow!("EXCHANGE_API_KEY is required for live trading"))?;
    let api_secret = config
        .exchange
        .api_secret
        .clone()
        .ok_or_else(|| anyhow::anyhow!("EXCHANGE_API_SECRET is required for live trading"))?;
    let base_url = config
        .exchange
        .base_url
        .clone()
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    log::info!("using live exchange at {}", base_url);
    Ok(Arc::new(RwLock::new(BinanceFuturesExchange::new(
        base_url, api_key, api_secret,
    ))))
}

fn print_usage() {
    println!("xExec {}", xExec::VERSION);
    println!();
    println!("usage:");
    println!("  xExec market      SYMBOL SIDE QTY");
    println!("  xExec limit       SYMBOL SIDE QTY PRICE");
    println!("  xExec stop-limit  SYMBOL SIDE QTY STOP_PRICE LIMIT_PRICE");
    println!("  xExec stop-market SYMBOL SIDE QTY STOP_PRICE");
    println!("  xExec oco         SYMBOL SIDE QTY PRICE STOP_PRICE STOP_LIMIT_PRICE");
    println!("  xExec twap        SYMBOL SIDE QTY DURATION_MIN CHUNKS");
    println!("  xExec grid place   SYMBOL SIDE QTY UPPER LOWER LEVELS");
    println!("  xExec grid monitor SYMBOL DURATION_MIN ORDER_ID...");
    println!("  xExec grid cancel  SYMBOL ORDER_ID...");
}
