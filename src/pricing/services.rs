//! Pricing service functions with database access.
//!
//! These resolve catalog snapshots (cache-first) and orchestrate the pure
//! calculators plus saved-quote persistence.

use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::cache::AppCache;
use crate::error::Result;
use crate::models::CatalogSnapshot;

use super::calculators::compute_totals;
use super::models::{QuoteTotals, SavedQuote, Selection};
use super::queries;

/// Resolve the current catalog snapshot, cache-first.
///
/// The snapshot is the singleton the calculator prices against; catalog
/// edits invalidate it so the next request reloads.
pub async fn catalog_snapshot(pool: &PgPool, cache: &AppCache) -> Result<Arc<CatalogSnapshot>> {
    if let Some(cached) = cache.catalog.get(AppCache::CATALOG_KEY).await {
        tracing::debug!("Cache HIT for catalog snapshot");
        return Ok(cached);
    }

    tracing::debug!("Cache MISS for catalog snapshot");
    let snapshot = Arc::new(queries::load_catalog_snapshot(pool).await?);
    cache
        .catalog
        .insert(AppCache::CATALOG_KEY.to_string(), snapshot.clone())
        .await;
    Ok(snapshot)
}

/// Compute totals for a selection against the current catalog
pub async fn quote_totals(
    pool: &PgPool,
    cache: &AppCache,
    selection: &Selection,
) -> Result<QuoteTotals> {
    let snapshot = catalog_snapshot(pool, cache).await?;
    Ok(compute_totals(selection, &snapshot))
}

/// Save a selection snapshot as a quote and return its id
pub async fn save_quote(
    pool: &PgPool,
    customer_name: Option<&str>,
    selection: &Selection,
) -> Result<Uuid> {
    let id = queries::insert_quote(pool, customer_name, selection).await?;
    tracing::info!(quote_id = %id, "quote saved");
    Ok(id)
}

/// List saved quotes, newest first
pub async fn list_quotes(pool: &PgPool, limit: i64) -> Result<Vec<SavedQuote>> {
    queries::list_quotes(pool, limit).await
}

/// Load a saved quote for reloading into the calculator
pub async fn get_quote(pool: &PgPool, id: Uuid) -> Result<SavedQuote> {
    queries::get_quote(pool, id).await
}

/// Soft-delete a saved quote
pub async fn delete_quote(pool: &PgPool, id: Uuid) -> Result<()> {
    queries::delete_quote(pool, id).await?;
    tracing::info!(quote_id = %id, "quote deleted");
    Ok(())
}
