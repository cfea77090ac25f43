//! Site settings singleton

use serde::Serialize;
use sqlx::FromRow;

/// Studio-wide settings used in page and invoice headers
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SiteSettings {
    pub studio_name: String,
    pub currency: String,
    pub contact_line: String,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            studio_name: "Shine Detailing".to_string(),
            currency: "CZK".to_string(),
            contact_line: String::new(),
        }
    }
}
