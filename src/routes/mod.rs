//! Route handlers

pub mod admin;
pub mod calculator;
pub mod invoice;
pub mod vouchers;

use axum::{extract::State, Json};
use rust_decimal::Decimal;
use serde_json::{json, Value};

use crate::pricing::round_money;
use crate::AppState;

/// Liveness endpoint with cache statistics
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "cache": state.cache.stats(),
    }))
}

/// Format an amount for display, trailing zeros trimmed
pub(crate) fn format_money(amount: Decimal, currency: &str) -> String {
    format!("{} {}", round_money(amount, 2).normalize(), currency)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_money_trims_trailing_zeros() {
        assert_eq!(format_money(dec!(1300.00), "CZK"), "1300 CZK");
        assert_eq!(format_money(dec!(33.50), "CZK"), "33.5 CZK");
    }
}
