//! Response DTOs for pricing API endpoints.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use super::calculators::round_money;
use super::models::QuoteTotals;

/// Money value for JSON responses
#[derive(Debug, Clone, Serialize)]
pub struct MoneyResponse {
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub currency: String,
}

impl MoneyResponse {
    /// Wrap an amount rounded to whole display money (2 places)
    pub fn new(amount: Decimal, currency: &str) -> Self {
        Self {
            amount: round_money(amount, 2),
            currency: currency.to_string(),
        }
    }
}

/// Response for a quote computation
#[derive(Debug, Serialize)]
pub struct QuoteTotalsResponse {
    pub subtotal: MoneyResponse,
    pub discount_amount: MoneyResponse,
    pub extras_total: MoneyResponse,
    pub final_total: MoneyResponse,
}

impl QuoteTotalsResponse {
    pub fn from_totals(totals: &QuoteTotals, currency: &str) -> Self {
        Self {
            subtotal: MoneyResponse::new(totals.subtotal, currency),
            discount_amount: MoneyResponse::new(totals.discount_amount, currency),
            extras_total: MoneyResponse::new(totals.extras_total, currency),
            final_total: MoneyResponse::new(totals.final_total, currency),
        }
    }
}

/// Response after saving a quote
#[derive(Debug, Serialize)]
pub struct SavedQuoteCreatedResponse {
    pub id: Uuid,
}

/// One row of the saved-quote listing
#[derive(Debug, Serialize)]
pub struct SavedQuoteSummaryResponse {
    pub id: Uuid,
    pub customer_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub final_total: MoneyResponse,
}

/// Full saved quote, selection included, for reloading into the calculator
#[derive(Debug, Serialize)]
pub struct SavedQuoteResponse {
    pub id: Uuid,
    pub customer_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub selection: super::models::Selection,
    pub totals: QuoteTotalsResponse,
}
