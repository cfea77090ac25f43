//! In-memory caching using moka
//!
//! Provides application-level caching for the catalog snapshot, display
//! orders, and site settings. The catalog changes only through the back
//! office, so the calculator's keystroke path can live off the cache.

use moka::future::Cache;
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{info, warn};

use crate::models::{CatalogSnapshot, SiteSettings};
use crate::ordering::OrderMap;
use crate::pricing::queries as pricing_queries;

/// Application cache holding the catalog snapshot, rank maps, and settings
#[derive(Clone)]
pub struct AppCache {
    /// Catalog snapshot (singleton under CATALOG_KEY)
    pub catalog: Cache<String, Arc<CatalogSnapshot>>,
    /// Display-order maps ("scope:group" -> OrderMap)
    pub orders: Cache<String, Arc<OrderMap>>,
    /// Site settings (singleton under SETTINGS_KEY)
    pub settings: Cache<String, Arc<SiteSettings>>,
}

impl AppCache {
    pub const CATALOG_KEY: &'static str = "catalog";
    pub const SETTINGS_KEY: &'static str = "settings";

    /// Create a new cache instance with configured TTLs
    pub fn new() -> Self {
        Self {
            // Catalog snapshot: 1 entry, 10 min TTL; invalidated on every
            // catalog write, so the TTL only bounds staleness across
            // instances
            catalog: Cache::builder()
                .max_capacity(1)
                .time_to_live(Duration::from_secs(10 * 60))
                .build(),

            // Display orders: one entry per sibling group, 30 min TTL
            orders: Cache::builder()
                .max_capacity(200)
                .time_to_live(Duration::from_secs(30 * 60))
                .time_to_idle(Duration::from_secs(10 * 60))
                .build(),

            // Site settings: 1 entry, 30 min TTL
            settings: Cache::builder()
                .max_capacity(1)
                .time_to_live(Duration::from_secs(30 * 60))
                .build(),
        }
    }

    /// Get cache statistics for the health endpoint
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            catalog_cached: self.catalog.entry_count() > 0,
            orders_size: self.orders.entry_count(),
            settings_cached: self.settings.entry_count() > 0,
        }
    }

    /// Invalidate everything
    pub fn invalidate_all(&self) {
        self.catalog.invalidate_all();
        self.orders.invalidate_all();
        self.settings.invalidate_all();
        info!("All caches invalidated");
    }

    /// Invalidate the catalog snapshot after a catalog write
    pub async fn invalidate_catalog(&self) {
        self.catalog.invalidate(Self::CATALOG_KEY).await;
        info!("Catalog snapshot invalidated");
    }

    /// Generate cache key for a display-order map
    pub fn order_key(scope: &str, group: &str) -> String {
        format!("{}:{}", scope, group)
    }
}

impl Default for AppCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics for the health endpoint
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub catalog_cached: bool,
    pub orders_size: u64,
    pub settings_cached: bool,
}

/// Start background cache warmer
///
/// Warms the cache on startup and refreshes every 10 minutes.
pub async fn start_cache_warmer(cache: AppCache, db: PgPool) {
    // Initial warm-up
    warm_cache(&cache, &db).await;

    // Periodic refresh every 10 minutes
    let mut interval = interval(Duration::from_secs(10 * 60));
    loop {
        interval.tick().await;
        warm_cache(&cache, &db).await;
    }
}

/// Warm the cache with the data every calculator request needs
async fn warm_cache(cache: &AppCache, db: &PgPool) {
    info!("Starting cache warm-up...");

    match crate::db::queries::get_site_settings(db).await {
        Ok(settings) => {
            cache
                .settings
                .insert(AppCache::SETTINGS_KEY.to_string(), Arc::new(settings))
                .await;
        }
        Err(e) => warn!("Failed to warm settings cache: {}", e),
    }

    match pricing_queries::load_catalog_snapshot(db).await {
        Ok(snapshot) => {
            cache
                .catalog
                .insert(AppCache::CATALOG_KEY.to_string(), Arc::new(snapshot))
                .await;
        }
        Err(e) => warn!("Failed to warm catalog cache: {}", e),
    }

    info!("Cache warm-up complete. Stats: {:?}", cache.stats());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_key_format() {
        assert_eq!(AppCache::order_key("services", "exterior/Wheels"), "services:exterior/Wheels");
    }
}
