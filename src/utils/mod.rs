//! Shared numeric and time helpers.

pub mod logging;

use chrono::{DateTime, TimeZone, Utc};

/// Round a quantity to 6 decimal places, enough for the common contracts.
pub fn round_quantity(quantity: f64) -> f64 {
    (quantity * 1_000_000.0).round() / 1_000_000.0
}

/// Round a price to 2 decimal places.
pub fn round_price(price: f64) -> f64 {
    (price * 100.0).round() / 100.0
}

/// Current time as a millisecond timestamp.
pub fn current_timestamp_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Millisecond timestamp to DateTime<Utc>.
pub fn timestamp_to_datetime(timestamp_ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(timestamp_ms)
        .single()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantity_rounds_to_six_places() {
        assert_eq!(round_quantity(1.0 / 3.0), 0.333333);
        assert_eq!(round_quantity(5.0 / 3.0), 1.666667);
    }

    #[test]
    fn price_rounds_to_two_places() {
        assert_eq!(round_price(104.6789), 104.68);
        assert_eq!(round_price(100.0), 100.0);
    }

    #[test]
    fn timestamp_round_trip() {
        let now = current_timestamp_ms();
        assert_eq!(timestamp_to_datetime(now).timestamp_millis(), now);
    }
}
