//! Ordering service functions with database access.
//!
//! Thin orchestration around the pure calculators: load the current rank
//! map, compute the next one, persist it, refresh the cache.

use sqlx::PgPool;
use std::sync::Arc;

use crate::cache::AppCache;
use crate::error::Result;

use super::calculators::{move_adjacent, OrderMap};
use super::models::OrderScope;
use super::queries;
use super::requests::MoveRequest;

/// Resolve the rank map for a (scope, group), cache-first
pub async fn order_map(
    pool: &PgPool,
    cache: &AppCache,
    scope: OrderScope,
    group: &str,
) -> Result<Arc<OrderMap>> {
    let cache_key = AppCache::order_key(scope.as_str(), group);
    if let Some(cached) = cache.orders.get(&cache_key).await {
        return Ok(cached);
    }

    let map = Arc::new(queries::get_order_map(pool, scope, group).await?);
    cache.orders.insert(cache_key, map.clone()).await;
    Ok(map)
}

/// Apply one adjacent move and persist the resulting map.
///
/// Boundary moves are no-ops by contract; they still return the current map
/// so the caller can re-render from it.
pub async fn apply_move(pool: &PgPool, cache: &AppCache, request: &MoveRequest) -> Result<OrderMap> {
    let current = order_map(pool, cache, request.scope, &request.group).await?;
    let next = move_adjacent(&current, &request.keys, request.index, request.direction);

    if next != *current {
        queries::replace_order_map(pool, request.scope, &request.group, &next).await?;
        let cache_key = AppCache::order_key(request.scope.as_str(), &request.group);
        cache.orders.insert(cache_key, Arc::new(next.clone())).await;
        tracing::debug!(
            scope = request.scope.as_str(),
            group = %request.group,
            "display order updated"
        );
    }

    Ok(next)
}
