//! Database queries for catalog management, settings, tasks, and vouchers.

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Product, SiteSettings, TaskItem, TaskList, Voucher};

/// Get site settings, falling back to defaults when the row is absent
pub async fn get_site_settings(pool: &PgPool) -> Result<SiteSettings> {
    let settings = sqlx::query_as::<_, SiteSettings>(
        r#"
        SELECT studio_name, currency, contact_line
        FROM site_settings
        LIMIT 1
        "#,
    )
    .fetch_optional(pool)
    .await?
    .unwrap_or_default();

    Ok(settings)
}

// ==================== services ====================

/// Insert a service; `price`/`hourly_rate` apply per kind
pub async fn insert_service(
    pool: &PgPool,
    name: &str,
    main_category: &str,
    subcategory: Option<&str>,
    kind: &str,
    price: Option<Decimal>,
    hourly_rate: Option<Decimal>,
) -> Result<Uuid> {
    let id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO services (name, main_category, subcategory, kind, price, hourly_rate)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        "#,
    )
    .bind(name)
    .bind(main_category)
    .bind(subcategory)
    .bind(kind)
    .bind(price)
    .bind(hourly_rate)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Update a service's mutable fields in place
pub async fn update_service(
    pool: &PgPool,
    id: Uuid,
    name: &str,
    subcategory: Option<&str>,
    price: Option<Decimal>,
    hourly_rate: Option<Decimal>,
) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE services
        SET name = $2, subcategory = $3, price = $4, hourly_rate = $5
        WHERE id = $1
          AND deleted_at IS NULL
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(subcategory)
    .bind(price)
    .bind(hourly_rate)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

/// Soft-delete a service and its variants
pub async fn delete_service(pool: &PgPool, id: Uuid) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query("UPDATE service_variants SET deleted_at = now() WHERE service_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let result = sqlx::query(
        "UPDATE services SET deleted_at = now() WHERE id = $1 AND deleted_at IS NULL",
    )
    .bind(id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

/// Add a variant to a variant-bearing service
pub async fn insert_variant(
    pool: &PgPool,
    service_id: Uuid,
    name: &str,
    price: Decimal,
    position: i32,
) -> Result<Uuid> {
    let id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO service_variants (service_id, name, price, position)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(service_id)
    .bind(name)
    .bind(price)
    .bind(position)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Soft-delete a variant
pub async fn delete_variant(pool: &PgPool, id: Uuid) -> Result<()> {
    let result = sqlx::query(
        "UPDATE service_variants SET deleted_at = now() WHERE id = $1 AND deleted_at IS NULL",
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

// ==================== packages ====================

/// Insert a package with its member services
pub async fn insert_package(
    pool: &PgPool,
    name: &str,
    price: Decimal,
    service_ids: &[Uuid],
) -> Result<Uuid> {
    let mut tx = pool.begin().await?;

    let id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO packages (name, price)
        VALUES ($1, $2)
        RETURNING id
        "#,
    )
    .bind(name)
    .bind(price)
    .fetch_one(&mut *tx)
    .await?;

    for (position, service_id) in service_ids.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO package_services (package_id, service_id, position)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(id)
        .bind(service_id)
        .bind(position as i32)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(id)
}

/// Update a package's name, price, and member set
pub async fn update_package(
    pool: &PgPool,
    id: Uuid,
    name: &str,
    price: Decimal,
    service_ids: &[Uuid],
) -> Result<()> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        r#"
        UPDATE packages
        SET name = $2, price = $3
        WHERE id = $1
          AND deleted_at IS NULL
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(price)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    sqlx::query("DELETE FROM package_services WHERE package_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    for (position, service_id) in service_ids.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO package_services (package_id, service_id, position)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(id)
        .bind(service_id)
        .bind(position as i32)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Soft-delete a package
pub async fn delete_package(pool: &PgPool, id: Uuid) -> Result<()> {
    let result = sqlx::query(
        "UPDATE packages SET deleted_at = now() WHERE id = $1 AND deleted_at IS NULL",
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

// ==================== products ====================

/// List active products
pub async fn get_products(pool: &PgPool) -> Result<Vec<Product>> {
    let products = sqlx::query_as::<_, Product>(
        r#"
        SELECT id, name, price, note
        FROM products
        WHERE deleted_at IS NULL
        ORDER BY name
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(products)
}

/// Insert a product
pub async fn insert_product(
    pool: &PgPool,
    name: &str,
    price: Decimal,
    note: Option<&str>,
) -> Result<Uuid> {
    let id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO products (name, price, note)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(name)
    .bind(price)
    .bind(note)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Soft-delete a product
pub async fn delete_product(pool: &PgPool, id: Uuid) -> Result<()> {
    let result = sqlx::query(
        "UPDATE products SET deleted_at = now() WHERE id = $1 AND deleted_at IS NULL",
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

// ==================== task checklists ====================

/// List task lists with their items, items ordered by position
pub async fn get_task_lists(pool: &PgPool) -> Result<Vec<(TaskList, Vec<TaskItem>)>> {
    let lists = sqlx::query_as::<_, TaskList>(
        r#"
        SELECT id, name
        FROM task_lists
        WHERE deleted_at IS NULL
        ORDER BY name
        "#,
    )
    .fetch_all(pool)
    .await?;

    let items = sqlx::query_as::<_, TaskItem>(
        r#"
        SELECT id, list_id, label, position, done
        FROM task_items
        WHERE deleted_at IS NULL
        ORDER BY position, label
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(lists
        .into_iter()
        .map(|list| {
            let list_items = items.iter().filter(|i| i.list_id == list.id).cloned().collect();
            (list, list_items)
        })
        .collect())
}

/// Create a task list
pub async fn insert_task_list(pool: &PgPool, name: &str) -> Result<Uuid> {
    let id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO task_lists (name)
        VALUES ($1)
        RETURNING id
        "#,
    )
    .bind(name)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Add an item at the end of a task list
pub async fn insert_task_item(pool: &PgPool, list_id: Uuid, label: &str) -> Result<Uuid> {
    let id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO task_items (list_id, label, position)
        VALUES ($1, $2, COALESCE(
            (SELECT MAX(position) + 1 FROM task_items WHERE list_id = $1 AND deleted_at IS NULL),
            0))
        RETURNING id
        "#,
    )
    .bind(list_id)
    .bind(label)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Flip an item's done flag
pub async fn toggle_task_item(pool: &PgPool, id: Uuid) -> Result<()> {
    let result = sqlx::query(
        "UPDATE task_items SET done = NOT done WHERE id = $1 AND deleted_at IS NULL",
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

/// Soft-delete a task item
pub async fn delete_task_item(pool: &PgPool, id: Uuid) -> Result<()> {
    let result = sqlx::query(
        "UPDATE task_items SET deleted_at = now() WHERE id = $1 AND deleted_at IS NULL",
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

// ==================== vouchers ====================

/// Mint a voucher; exactly one of amount/package applies
pub async fn insert_voucher(
    pool: &PgPool,
    amount: Option<Decimal>,
    package_id: Option<Uuid>,
    recipient: &str,
    message: Option<&str>,
) -> Result<Voucher> {
    let id = Uuid::new_v4();
    let code = Voucher::code_for(id);

    let voucher = sqlx::query_as::<_, Voucher>(
        r#"
        INSERT INTO vouchers (id, code, amount, package_id, recipient, message)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, code, amount, package_id, recipient, message, created_at, redeemed_at
        "#,
    )
    .bind(id)
    .bind(code)
    .bind(amount)
    .bind(package_id)
    .bind(recipient)
    .bind(message)
    .fetch_one(pool)
    .await?;

    Ok(voucher)
}

/// Get a voucher by id
pub async fn get_voucher(pool: &PgPool, id: Uuid) -> Result<Voucher> {
    sqlx::query_as::<_, Voucher>(
        r#"
        SELECT id, code, amount, package_id, recipient, message, created_at, redeemed_at
        FROM vouchers
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound)
}

/// List vouchers, newest first
pub async fn get_vouchers(pool: &PgPool) -> Result<Vec<Voucher>> {
    let vouchers = sqlx::query_as::<_, Voucher>(
        r#"
        SELECT id, code, amount, package_id, recipient, message, created_at, redeemed_at
        FROM vouchers
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(vouchers)
}

/// Mark a voucher redeemed; already-redeemed vouchers are rejected
pub async fn redeem_voucher(pool: &PgPool, id: Uuid) -> Result<()> {
    let result = sqlx::query(
        "UPDATE vouchers SET redeemed_at = now() WHERE id = $1 AND redeemed_at IS NULL",
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::BadRequest("Voucher already redeemed or unknown".to_string()));
    }
    Ok(())
}
