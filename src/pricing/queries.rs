//! Database queries for the pricing engine and saved quotes.

use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{
    CatalogSnapshot, Package, PackageRow, PackageServiceRow, ServiceRow, ServiceVariant, VariantRow,
};

use super::models::{SavedQuote, SavedQuoteRow, Selection};

/// Load the full catalog snapshot used by the calculator.
///
/// Rows that fail to parse (unknown kind, missing price for their kind) are
/// dropped from the snapshot; a stale row must not take the calculator down.
pub async fn load_catalog_snapshot(pool: &PgPool) -> Result<CatalogSnapshot> {
    let service_rows = sqlx::query_as::<_, ServiceRow>(
        r#"
        SELECT id, name, main_category, subcategory, kind, price, hourly_rate, created_at
        FROM services
        WHERE deleted_at IS NULL
        ORDER BY created_at
        "#,
    )
    .fetch_all(pool)
    .await?;

    let variant_rows = sqlx::query_as::<_, VariantRow>(
        r#"
        SELECT id, service_id, name, price, position
        FROM service_variants
        WHERE deleted_at IS NULL
        ORDER BY position, name
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut variants_by_service: HashMap<Uuid, Vec<ServiceVariant>> = HashMap::new();
    for row in variant_rows {
        variants_by_service
            .entry(row.service_id)
            .or_default()
            .push(ServiceVariant {
                id: row.id,
                name: row.name,
                price: row.price,
            });
    }

    let services = service_rows
        .into_iter()
        .filter_map(|row| {
            let variants = variants_by_service.remove(&row.id).unwrap_or_default();
            row.parse(variants)
        })
        .collect();

    let package_rows = sqlx::query_as::<_, PackageRow>(
        r#"
        SELECT id, name, price
        FROM packages
        WHERE deleted_at IS NULL
        ORDER BY name
        "#,
    )
    .fetch_all(pool)
    .await?;

    let member_rows = sqlx::query_as::<_, PackageServiceRow>(
        r#"
        SELECT package_id, service_id, position
        FROM package_services
        ORDER BY position
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut members_by_package: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for row in member_rows {
        members_by_package
            .entry(row.package_id)
            .or_default()
            .push(row.service_id);
    }

    let packages = package_rows
        .into_iter()
        .map(|row| Package {
            service_ids: members_by_package.remove(&row.id).unwrap_or_default(),
            id: row.id,
            name: row.name,
            price: row.price,
        })
        .collect();

    Ok(CatalogSnapshot::new(services, packages))
}

/// Persist a selection snapshot as a saved quote
pub async fn insert_quote(
    pool: &PgPool,
    customer_name: Option<&str>,
    selection: &Selection,
) -> Result<Uuid> {
    let snapshot = serde_json::to_value(selection)
        .map_err(|e| AppError::Internal(format!("selection snapshot: {}", e)))?;

    let id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO saved_quotes (customer_name, selection)
        VALUES ($1, $2)
        RETURNING id
        "#,
    )
    .bind(customer_name)
    .bind(snapshot)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// List saved quotes, newest first
pub async fn list_quotes(pool: &PgPool, limit: i64) -> Result<Vec<SavedQuote>> {
    let rows = sqlx::query_as::<_, SavedQuoteRow>(
        r#"
        SELECT id, customer_name, selection, created_at
        FROM saved_quotes
        WHERE deleted_at IS NULL
        ORDER BY created_at DESC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().filter_map(SavedQuoteRow::parse).collect())
}

/// Get a saved quote by id
pub async fn get_quote(pool: &PgPool, id: Uuid) -> Result<SavedQuote> {
    let row = sqlx::query_as::<_, SavedQuoteRow>(
        r#"
        SELECT id, customer_name, selection, created_at
        FROM saved_quotes
        WHERE id = $1
          AND deleted_at IS NULL
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound)?;

    row.parse().ok_or(AppError::NotFound)
}

/// Soft-delete a saved quote
pub async fn delete_quote(pool: &PgPool, id: Uuid) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE saved_quotes
        SET deleted_at = now()
        WHERE id = $1
          AND deleted_at IS NULL
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}
