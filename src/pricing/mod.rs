//! Pricing engine module.
//!
//! Pure quote math over catalog snapshots, plus saved-quote persistence.
//! The calculator UI calls this on every selection change.

pub mod calculators;
pub mod models;
pub mod queries;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod services;

// Re-export commonly used items
pub use calculators::{compute_totals, package_discount_pct, round_money, XL_MARKUP};
pub use models::{CarSize, ExtraCharge, PackageSnapshot, QuoteTotals, SavedQuote, Selection};
pub use routes::router;
