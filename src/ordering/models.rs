//! Persistence models for display ordering.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Which kind of sibling group a rank map orders.
///
/// Scope plus a group key addresses one persisted map: e.g. scope
/// `services` with the subcategory name as the group, or scope
/// `subcategories` with the main category as the group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderScope {
    Categories,
    Subcategories,
    Services,
    Packages,
    Products,
    TaskItems,
}

impl OrderScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderScope::Categories => "categories",
            OrderScope::Subcategories => "subcategories",
            OrderScope::Services => "services",
            OrderScope::Packages => "packages",
            OrderScope::Products => "products",
            OrderScope::TaskItems => "task_items",
        }
    }
}

/// Scopes that have a single global group
pub const GLOBAL_GROUP: &str = "_";

/// Rank row from the display_orders table
#[derive(Debug, Clone, FromRow)]
pub struct DisplayOrderRow {
    pub item_key: String,
    pub rank: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_wire_format_matches_column_values() {
        let json = serde_json::to_string(&OrderScope::TaskItems).unwrap();
        assert_eq!(json, r#""task_items""#);
        assert_eq!(OrderScope::TaskItems.as_str(), "task_items");
    }
}
