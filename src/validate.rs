//! Input validation and canonicalization.
//!
//! Everything here is pure and local: a failed check returns
//! `ExecError::Validation` immediately and never reaches the gateway.
//! Validating the same raw input twice yields identical canonical output.

use crate::error::ExecError;
use crate::models::order::{OrderSide, TimeInForce};

const MAX_TWAP_CHUNKS: u32 = 100;
const MIN_GRID_LEVELS: u32 = 2;
const MAX_GRID_LEVELS: u32 = 50;

/// Canonical TWAP parameter set.
#[derive(Debug, Clone, PartialEq)]
pub struct TwapArgs {
    pub symbol: String,
    pub side: OrderSide,
    pub total_quantity: f64,
    pub duration_minutes: u64,
    pub chunk_count: u32,
}

/// Canonical grid parameter set.
#[derive(Debug, Clone, PartialEq)]
pub struct GridArgs {
    pub symbol: String,
    pub side: OrderSide,
    pub total_quantity: f64,
    pub upper_price: f64,
    pub lower_price: f64,
    pub level_count: u32,
}

/// Canonical stop-limit parameter set.
#[derive(Debug, Clone, PartialEq)]
pub struct StopLimitArgs {
    pub symbol: String,
    pub side: OrderSide,
    pub quantity: f64,
    pub stop_price: f64,
    pub limit_price: f64,
}

/// Canonical stop-market parameter set.
#[derive(Debug, Clone, PartialEq)]
pub struct StopMarketArgs {
    pub symbol: String,
    pub side: OrderSide,
    pub quantity: f64,
    pub stop_price: f64,
}

/// Canonical OCO parameter set (limit leg + stop-limit leg).
#[derive(Debug, Clone, PartialEq)]
pub struct OcoArgs {
    pub symbol: String,
    pub side: OrderSide,
    pub quantity: f64,
    pub price: f64,
    pub stop_price: f64,
    pub stop_limit_price: f64,
}

/// Symbol: 2..=20 ASCII letters/digits, canonicalized to uppercase.
pub fn validate_symbol(raw: &str) -> Result<String, ExecError> {
    let symbol = raw.trim().to_uppercase();
    let valid = (2..=20).contains(&symbol.len())
        && symbol
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit());
    if valid {
        Ok(symbol)
    } else {
        Err(ExecError::Validation(format!("invalid symbol: {}", raw)))
    }
}

/// Side: case-insensitive BUY or SELL.
pub fn validate_side(raw: &str) -> Result<OrderSide, ExecError> {
    match raw.trim().to_uppercase().as_str() {
        "BUY" => Ok(OrderSide::Buy),
        "SELL" => Ok(OrderSide::Sell),
        _ => Err(ExecError::Validation(
            "order side must be BUY or SELL".to_string(),
        )),
    }
}

/// Quantity: must parse as a number and be strictly positive.
pub fn validate_quantity(raw: &str) -> Result<f64, ExecError> {
    let quantity: f64 = raw
        .trim()
        .parse()
        .map_err(|_| ExecError::Validation(format!("invalid quantity: {}", raw)))?;
    if quantity > 0.0 && quantity.is_finite() {
        Ok(quantity)
    } else {
        Err(ExecError::Validation(format!("invalid quantity: {}", raw)))
    }
}

/// Price: must parse as a number and be strictly positive.
pub fn validate_price(raw: &str) -> Result<f64, ExecError> {
    let price: f64 = raw
        .trim()
        .parse()
        .map_err(|_| ExecError::Validation(format!("invalid price: {}", raw)))?;
    if price > 0.0 && price.is_finite() {
        Ok(price)
    } else {
        Err(ExecError::Validation(format!("invalid price: {}", raw)))
    }
}

pub fn validate_time_in_force(raw: &str) -> Result<TimeInForce, ExecError> {
    match raw.trim().to_uppercase().as_str() {
        "GTC" => Ok(TimeInForce::Gtc),
        "IOC" => Ok(TimeInForce::Ioc),
        "FOK" => Ok(TimeInForce::Fok),
        _ => Err(ExecError::Validation(format!(
            "time in force must be GTC, IOC or FOK, got {}",
            raw
        ))),
    }
}

fn parse_integer(raw: &str, what: &str) -> Result<u64, ExecError> {
    raw.trim()
        .parse()
        .map_err(|_| ExecError::Validation(format!("invalid {}: {}", what, raw)))
}

/// TWAP bounds: positive duration, 1..=100 chunks.
pub fn validate_twap_bounds(duration_minutes: u64, chunk_count: u32) -> Result<(), ExecError> {
    if duration_minutes == 0 {
        return Err(ExecError::Validation("duration must be positive".to_string()));
    }
    if chunk_count == 0 || chunk_count > MAX_TWAP_CHUNKS {
        return Err(ExecError::Validation(format!(
            "number of chunks must be between 1 and {}",
            MAX_TWAP_CHUNKS
        )));
    }
    Ok(())
}

/// Grid bounds: upper strictly above lower, 2..=50 levels.
pub fn validate_grid_bounds(
    lower_price: f64,
    upper_price: f64,
    level_count: u32,
) -> Result<(), ExecError> {
    if upper_price <= lower_price {
        return Err(ExecError::Validation(
            "upper price must be higher than lower price".to_string(),
        ));
    }
    if !(MIN_GRID_LEVELS..=MAX_GRID_LEVELS).contains(&level_count) {
        return Err(ExecError::Validation(format!(
            "grid levels must be between {} and {}",
            MIN_GRID_LEVELS, MAX_GRID_LEVELS
        )));
    }
    Ok(())
}

/// Stop-limit ordering: the trigger sits on the adverse side of the
/// execution price. Buy triggers above its limit, sell below.
pub fn validate_stop_limit_prices(
    side: OrderSide,
    stop_price: f64,
    limit_price: f64,
) -> Result<(), ExecError> {
    let ok = match side {
        OrderSide::Buy => stop_price > limit_price,
        OrderSide::Sell => stop_price < limit_price,
    };
    if ok {
        Ok(())
    } else {
        Err(ExecError::Validation(format!(
            "for {} orders the stop price must be on the adverse side of the limit price",
            side
        )))
    }
}

/// OCO ordering: SELL wants stop < limit < stop-limit, BUY the mirror image.
pub fn validate_oco_prices(
    side: OrderSide,
    price: f64,
    stop_price: f64,
    stop_limit_price: f64,
) -> Result<(), ExecError> {
    let ok = match side {
        OrderSide::Sell => stop_price < price && price < stop_limit_price,
        OrderSide::Buy => stop_limit_price < price && price < stop_price,
    };
    if ok {
        Ok(())
    } else {
        let expected = match side {
            OrderSide::Sell => "stop_price < limit_price < stop_limit_price",
            OrderSide::Buy => "stop_limit_price < limit_price < stop_price",
        };
        Err(ExecError::Validation(format!(
            "for {} orders: {}",
            side, expected
        )))
    }
}

/// Canonicalize raw TWAP arguments.
pub fn validate_twap_args(
    symbol: &str,
    side: &str,
    total_quantity: &str,
    duration_minutes: &str,
    chunk_count: &str,
) -> Result<TwapArgs, ExecError> {
    let symbol = validate_symbol(symbol)?;
    let side = validate_side(side)?;
    let total_quantity = validate_quantity(total_quantity)?;
    let duration_minutes = parse_integer(duration_minutes, "duration")?;
    let chunk_count = parse_integer(chunk_count, "chunk count")? as u32;
    validate_twap_bounds(duration_minutes, chunk_count)?;
    Ok(TwapArgs {
        symbol,
        side,
        total_quantity,
        duration_minutes,
        chunk_count,
    })
}

/// Canonicalize raw grid arguments.
pub fn validate_grid_args(
    symbol: &str,
    side: &str,
    total_quantity: &str,
    upper_price: &str,
    lower_price: &str,
    level_count: &str,
) -> Result<GridArgs, ExecError> {
    let symbol = validate_symbol(symbol)?;
    let side = validate_side(side)?;
    let total_quantity = validate_quantity(total_quantity)?;
    let upper_price = validate_price(upper_price)?;
    let lower_price = validate_price(lower_price)?;
    let level_count = parse_integer(level_count, "grid levels")? as u32;
    validate_grid_bounds(lower_price, upper_price, level_count)?;
    Ok(GridArgs {
        symbol,
        side,
        total_quantity,
        upper_price,
        lower_price,
        level_count,
    })
}

/// Canonicalize raw stop-limit arguments.
pub fn validate_stop_limit_args(
    symbol: &str,
    side: &str,
    quantity: &str,
    stop_price: &str,
    limit_price: &str,
) -> Result<StopLimitArgs, ExecError> {
    let symbol = validate_symbol(symbol)?;
    let side = validate_side(side)?;
    let quantity = validate_quantity(quantity)?;
    let stop_price = validate_price(stop_price)?;
    let limit_price = validate_price(limit_price)?;
    validate_stop_limit_prices(side, stop_price, limit_price)?;
    Ok(StopLimitArgs {
        symbol,
        side,
        quantity,
        stop_price,
        limit_price,
    })
}

/// Canonicalize raw stop-market arguments.
pub fn validate_stop_market_args(
    symbol: &str,
    side: &str,
    quantity: &str,
    stop_price: &str,
) -> Result<StopMarketArgs, ExecError> {
    Ok(StopMarketArgs {
        symbol: validate_symbol(symbol)?,
        side: validate_side(side)?,
        quantity: validate_quantity(quantity)?,
        stop_price: validate_price(stop_price)?,
    })
}

/// Canonicalize raw OCO arguments.
pub fn validate_oco_args(
    symbol: &str,
    side: &str,
    quantity: &str,
    price: &str,
    stop_price: &str,
    stop_limit_price: &str,
) -> Result<OcoArgs, ExecError> {
    let symbol = validate_symbol(symbol)?;
    let side = validate_side(side)?;
    let quantity = validate_quantity(quantity)?;
    let price = validate_price(price)?;
    let stop_price = validate_price(stop_price)?;
    let stop_limit_price = validate_price(stop_limit_price)?;
    validate_oco_prices(side, price, stop_price, stop_limit_price)?;
    Ok(OcoArgs {
        symbol,
        side,
        quantity,
        price,
        stop_price,
        stop_limit_price,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("btcusdt", "BTCUSDT")]
    #[case("  ethusdt ", "ETHUSDT")]
    #[case("1000PEPEUSDT", "1000PEPEUSDT")]
    fn symbol_is_canonicalized(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(validate_symbol(raw).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("B")]
    #[case("BTC-USDT")]
    #[case("AVERYLONGSYMBOLNAMEXX")]
    fn bad_symbol_is_rejected(#[case] raw: &str) {
        assert!(validate_symbol(raw).is_err());
    }

    #[rstest]
    #[case("buy", OrderSide::Buy)]
    #[case("SELL", OrderSide::Sell)]
    #[case("Sell", OrderSide::Sell)]
    fn side_is_canonicalized(#[case] raw: &str, #[case] expected: OrderSide) {
        assert_eq!(validate_side(raw).unwrap(), expected);
    }

    #[test]
    fn side_rejects_other_values() {
        assert!(validate_side("hold").is_err());
    }

    #[rstest]
    #[case("0")]
    #[case("-1.5")]
    #[case("abc")]
    #[case("inf")]
    fn non_positive_quantity_is_rejected(#[case] raw: &str) {
        assert!(validate_quantity(raw).is_err());
    }

    #[test]
    fn quantity_parses_decimals() {
        assert_eq!(validate_quantity("0.25").unwrap(), 0.25);
    }

    #[test]
    fn validation_is_idempotent() {
        let once = validate_twap_args("btcusdt", "buy", "1.0", "10", "5").unwrap();
        let twice = validate_twap_args("btcusdt", "buy", "1.0", "10", "5").unwrap();
        assert_eq!(once, twice);
        assert_eq!(once.symbol, "BTCUSDT");
        assert_eq!(once.side, OrderSide::Buy);
    }

    #[rstest]
    #[case(0, 5)]
    #[case(10, 0)]
    #[case(10, 101)]
    fn twap_bounds_are_enforced(#[case] duration: u64, #[case] chunks: u32) {
        assert!(validate_twap_bounds(duration, chunks).is_err());
    }

    #[test]
    fn twap_bounds_accept_limits() {
        assert!(validate_twap_bounds(1, 1).is_ok());
        assert!(validate_twap_bounds(1, 100).is_ok());
    }

    #[rstest]
    #[case(100.0, 100.0, 5)]
    #[case(110.0, 100.0, 5)]
    #[case(100.0, 110.0, 1)]
    #[case(100.0, 110.0, 51)]
    fn grid_bounds_are_enforced(#[case] lower: f64, #[case] upper: f64, #[case] levels: u32) {
        assert!(validate_grid_bounds(lower, upper, levels).is_err());
    }

    #[test]
    fn stop_limit_ordering_per_side() {
        // Buy triggers above the limit price.
        assert!(validate_stop_limit_prices(OrderSide::Buy, 105.0, 100.0).is_ok());
        assert!(validate_stop_limit_prices(OrderSide::Buy, 95.0, 100.0).is_err());
        // Sell triggers below it.
        assert!(validate_stop_limit_prices(OrderSide::Sell, 95.0, 100.0).is_ok());
        assert!(validate_stop_limit_prices(OrderSide::Sell, 105.0, 100.0).is_err());
    }

    #[test]
    fn oco_sell_ordering() {
        assert!(validate_oco_prices(OrderSide::Sell, 100.0, 90.0, 110.0).is_ok());
        // stop above the limit violates the sell ordering
        assert!(validate_oco_prices(OrderSide::Sell, 100.0, 95.0, 90.0).is_err());
    }

    #[test]
    fn oco_buy_ordering() {
        assert!(validate_oco_prices(OrderSide::Buy, 100.0, 110.0, 90.0).is_ok());
        assert!(validate_oco_prices(OrderSide::Buy, 100.0, 90.0, 110.0).is_err());
    }

    #[test]
    fn composite_grid_args_are_canonicalized() {
        let args = validate_grid_args("ethusdt", "sell", "5.0", "110", "100", "3").unwrap();
        assert_eq!(args.symbol, "ETHUSDT");
        assert_eq!(args.side, OrderSide::Sell);
        assert_eq!(args.level_count, 3);
    }
}
