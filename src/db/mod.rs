//! Database access layer

pub mod queries;

pub use queries::*;

use sqlx::PgPool;
use std::sync::Arc;

use crate::cache::AppCache;
use crate::error::Result;
use crate::models::SiteSettings;

/// Resolve site settings, cache-first
pub async fn site_settings(pool: &PgPool, cache: &AppCache) -> Result<Arc<SiteSettings>> {
    if let Some(cached) = cache.settings.get(AppCache::SETTINGS_KEY).await {
        return Ok(cached);
    }

    let settings = Arc::new(queries::get_site_settings(pool).await?);
    cache
        .settings
        .insert(AppCache::SETTINGS_KEY.to_string(), settings.clone())
        .await;
    Ok(settings)
}
