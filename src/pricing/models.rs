//! Selection state and saved-quote models for the price calculator.
//!
//! A `Selection` is the transient per-quote state; saved quotes persist it
//! verbatim as a JSONB snapshot and reload it wholesale.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::HashMap;
use uuid::Uuid;

/// Vehicle size chosen for the quote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CarSize {
    #[default]
    M,
    Xl,
}

/// Package state captured at selection time.
///
/// The stored price is what the customer was shown; later catalog edits do
/// not retroactively change an open or saved quote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageSnapshot {
    pub price: Decimal,
}

/// A manual charge added on top of the quote (never discounted)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtraCharge {
    pub description: String,
    pub amount: Decimal,
}

/// The transient user choices forming one quote
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Selection {
    /// Selected service ids; duplicates have no extra effect
    #[serde(default)]
    pub service_ids: Vec<Uuid>,
    /// Chosen variant per variant-bearing service
    #[serde(default)]
    pub variants: HashMap<Uuid, Uuid>,
    /// Hours per hourly service; absent defaults to 1
    #[serde(default)]
    pub hours: HashMap<Uuid, Decimal>,
    /// Selected packages with their price snapshots, keyed by package id
    #[serde(default)]
    pub packages: HashMap<Uuid, PackageSnapshot>,
    #[serde(default)]
    pub car_size: CarSize,
    /// Percentage discount, clamped to [0, 100] by the engine
    #[serde(default)]
    pub discount_pct: Decimal,
    #[serde(default)]
    pub extra_charges: Vec<ExtraCharge>,
}

/// Computed totals for a selection, full precision
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuoteTotals {
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub extras_total: Decimal,
    pub final_total: Decimal,
}

/// Saved quote from the saved_quotes table
#[derive(Debug, Clone, FromRow)]
pub struct SavedQuoteRow {
    pub id: Uuid,
    pub customer_name: Option<String>,
    pub selection: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Saved quote with its selection snapshot parsed
#[derive(Debug, Clone, Serialize)]
pub struct SavedQuote {
    pub id: Uuid,
    pub customer_name: Option<String>,
    pub selection: Selection,
    pub created_at: DateTime<Utc>,
}

impl SavedQuoteRow {
    /// Parse the JSONB snapshot into a selection.
    ///
    /// Rows whose snapshot no longer deserializes are skipped rather than
    /// failing a listing.
    pub fn parse(self) -> Option<SavedQuote> {
        let selection: Selection = serde_json::from_value(self.selection).ok()?;
        Some(SavedQuote {
            id: self.id,
            customer_name: self.customer_name,
            selection,
            created_at: self.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_selection_snapshot_round_trip() {
        let service_id = Uuid::new_v4();
        let package_id = Uuid::new_v4();
        let mut selection = Selection {
            service_ids: vec![service_id],
            car_size: CarSize::Xl,
            discount_pct: dec!(15),
            ..Default::default()
        };
        selection.hours.insert(service_id, dec!(2.5));
        selection
            .packages
            .insert(package_id, PackageSnapshot { price: dec!(4990) });
        selection.extra_charges.push(ExtraCharge {
            description: "Pet hair removal".to_string(),
            amount: dec!(300),
        });

        let json = serde_json::to_value(&selection).unwrap();
        let back: Selection = serde_json::from_value(json).unwrap();

        assert_eq!(back.service_ids, vec![service_id]);
        assert_eq!(back.hours.get(&service_id), Some(&dec!(2.5)));
        assert_eq!(back.packages.get(&package_id).unwrap().price, dec!(4990));
        assert_eq!(back.car_size, CarSize::Xl);
        assert_eq!(back.discount_pct, dec!(15));
        assert_eq!(back.extra_charges.len(), 1);
    }

    #[test]
    fn test_car_size_wire_format() {
        assert_eq!(serde_json::to_string(&CarSize::Xl).unwrap(), r#""XL""#);
        assert_eq!(serde_json::to_string(&CarSize::M).unwrap(), r#""M""#);
    }

    #[test]
    fn test_empty_selection_deserializes_from_empty_object() {
        let selection: Selection = serde_json::from_str("{}").unwrap();
        assert!(selection.service_ids.is_empty());
        assert_eq!(selection.car_size, CarSize::M);
        assert_eq!(selection.discount_pct, Decimal::ZERO);
    }
}
