//! Ordering API route handlers

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};

use crate::error::Result;
use crate::AppState;

use super::calculators::OrderMap;
use super::requests::{MoveRequest, OrderMapQuery};
use super::services;

/// Build the ordering API router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/order", get(order_map))
        .route("/api/order/move", post(apply_move))
}

/// Fetch the rank map for one (scope, group)
async fn order_map(
    State(state): State<AppState>,
    Query(query): Query<OrderMapQuery>,
) -> Result<Json<OrderMap>> {
    let map = services::order_map(&state.db, &state.cache, query.scope, &query.group).await?;
    Ok(Json((*map).clone()))
}

/// Apply one adjacent move and return the new rank map
async fn apply_move(
    State(state): State<AppState>,
    Json(request): Json<MoveRequest>,
) -> Result<Json<OrderMap>> {
    let next = services::apply_move(&state.db, &state.cache, &request).await?;
    Ok(Json(next))
}
