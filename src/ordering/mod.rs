//! Display-order engine.
//!
//! Maintains a total order over each sibling group (categories,
//! subcategories, services, packages, products, task items) as a persisted
//! rank map, and computes the new map after single adjacent-swap moves.

pub mod calculators;
pub mod models;
pub mod queries;
pub mod requests;
pub mod routes;
pub mod services;

// Re-export commonly used items
pub use calculators::{derive_sequence, move_adjacent, MoveDirection, OrderMap};
pub use models::{OrderScope, GLOBAL_GROUP};
pub use routes::router;
