//! Gift voucher model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A gift voucher for either a fixed amount or a package.
///
/// Exactly one of `amount`/`package_id` is set (enforced by the schema).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Voucher {
    pub id: Uuid,
    pub code: String,
    pub amount: Option<Decimal>,
    pub package_id: Option<Uuid>,
    pub recipient: String,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub redeemed_at: Option<DateTime<Utc>>,
}

impl Voucher {
    /// Derive the printed redemption code from the voucher id.
    ///
    /// Ten hex characters of the id are enough to be unguessable at this
    /// scale while staying typeable from a printed voucher.
    pub fn code_for(id: Uuid) -> String {
        id.simple().to_string()[..10].to_uppercase()
    }

    pub fn is_redeemed(&self) -> bool {
        self.redeemed_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_is_stable_per_id() {
        let id = Uuid::new_v4();
        assert_eq!(Voucher::code_for(id), Voucher::code_for(id));
    }

    #[test]
    fn test_code_shape() {
        let code = Voucher::code_for(Uuid::new_v4());
        assert_eq!(code.len(), 10);
        assert!(code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }
}
