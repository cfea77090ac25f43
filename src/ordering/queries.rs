//! Database queries for display ordering.

use sqlx::PgPool;

use crate::error::Result;

use super::calculators::OrderMap;
use super::models::{DisplayOrderRow, OrderScope};

/// Load the rank map for one (scope, group)
pub async fn get_order_map(pool: &PgPool, scope: OrderScope, group: &str) -> Result<OrderMap> {
    let rows = sqlx::query_as::<_, DisplayOrderRow>(
        r#"
        SELECT item_key, rank
        FROM display_orders
        WHERE scope = $1 AND group_key = $2
        "#,
    )
    .bind(scope.as_str())
    .bind(group)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| (r.item_key, r.rank)).collect())
}

/// Replace the rank map for one (scope, group) atomically.
///
/// Last writer wins; concurrent editors of the same group converge on
/// whichever full map lands last.
pub async fn replace_order_map(
    pool: &PgPool,
    scope: OrderScope,
    group: &str,
    order: &OrderMap,
) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        DELETE FROM display_orders
        WHERE scope = $1 AND group_key = $2
        "#,
    )
    .bind(scope.as_str())
    .bind(group)
    .execute(&mut *tx)
    .await?;

    for (item_key, rank) in order {
        sqlx::query(
            r#"
            INSERT INTO display_orders (scope, group_key, item_key, rank)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(scope.as_str())
        .bind(group)
        .bind(item_key)
        .bind(rank)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}
