//! Request DTOs for pricing API endpoints.

use serde::Deserialize;

use super::models::Selection;

/// Request to compute totals for the current selection
#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    pub selection: Selection,
}

/// Request to save the current selection as a quote
#[derive(Debug, Deserialize)]
pub struct SaveQuoteRequest {
    #[serde(default)]
    pub customer_name: Option<String>,
    pub selection: Selection,
}

/// Query parameters for the saved-quote listing
#[derive(Debug, Deserialize)]
pub struct QuoteListQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    50
}
