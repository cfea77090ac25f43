//! Request DTOs for ordering API endpoints.

use serde::Deserialize;

use super::calculators::MoveDirection;
use super::models::OrderScope;

/// Request to move one item up or down within its sibling group.
///
/// `keys` is the sequence the caller currently displays; `index` addresses
/// the item to move within it.
#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    pub scope: OrderScope,
    #[serde(default = "default_group")]
    pub group: String,
    pub keys: Vec<String>,
    pub index: usize,
    pub direction: MoveDirection,
}

fn default_group() -> String {
    super::models::GLOBAL_GROUP.to_string()
}

/// Query parameters to fetch one rank map
#[derive(Debug, Deserialize)]
pub struct OrderMapQuery {
    pub scope: OrderScope,
    #[serde(default = "default_group")]
    pub group: String,
}
