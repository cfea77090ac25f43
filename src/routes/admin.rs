//! Back-office route handlers: catalog, products, task checklists.
//!
//! All mutations go through plain HTML forms and redirect back to their
//! page; catalog writes invalidate the snapshot cache.

use askama::Template;
use axum::{
    extract::{Path, State},
    response::{Html, Redirect},
    routing::{get, post},
    Form, Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::ServiceKind;
use crate::pricing::services as pricing_services;
use crate::{db, AppState};

use super::format_money;

/// Build the back-office router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin", get(index))
        .route("/admin/services", get(services_page).post(create_service))
        .route("/admin/services/:id", post(update_service))
        .route("/admin/services/:id/delete", post(delete_service))
        .route("/admin/variants", post(create_variant))
        .route("/admin/variants/:id/delete", post(delete_variant))
        .route("/admin/packages", get(packages_page).post(create_package))
        .route("/admin/packages/:id", post(update_package))
        .route("/admin/packages/:id/delete", post(delete_package))
        .route("/admin/products", get(products_page).post(create_product))
        .route("/admin/products/:id/delete", post(delete_product))
        .route("/admin/tasks", get(tasks_page).post(create_task_list))
        .route("/admin/tasks/items", post(create_task_item))
        .route("/admin/tasks/items/:id/toggle", post(toggle_task_item))
        .route("/admin/tasks/items/:id/delete", post(delete_task_item))
}

/// Admin hub template
#[derive(Template)]
#[template(path = "admin/index.html")]
struct AdminIndexTemplate {
    studio_name: String,
}

async fn index(State(state): State<AppState>) -> Result<Html<String>> {
    let settings = db::site_settings(&state.db, &state.cache).await?;
    let template = AdminIndexTemplate {
        studio_name: settings.studio_name.clone(),
    };
    Ok(Html(template.render()?))
}

// ==================== services ====================

struct AdminVariantView {
    id: String,
    name: String,
    price_label: String,
}

struct AdminServiceView {
    id: String,
    name: String,
    category: String,
    subcategory: String,
    subcategory_value: String,
    kind_label: String,
    price_label: String,
    price_value: String,
    rate_value: String,
    has_variants: bool,
    variants: Vec<AdminVariantView>,
}

/// Service management template
#[derive(Template)]
#[template(path = "admin/services.html")]
struct AdminServicesTemplate {
    services: Vec<AdminServiceView>,
}

async fn services_page(State(state): State<AppState>) -> Result<Html<String>> {
    let settings = db::site_settings(&state.db, &state.cache).await?;
    let snapshot = pricing_services::catalog_snapshot(&state.db, &state.cache).await?;
    let currency = &settings.currency;

    let services = snapshot
        .services()
        .map(|s| {
            let (kind_label, price_label, price_value, rate_value, variants) = match &s.kind {
                ServiceKind::Flat { price } => (
                    "flat".to_string(),
                    format_money(*price, currency),
                    price.normalize().to_string(),
                    String::new(),
                    vec![],
                ),
                ServiceKind::Hourly { rate_per_hour } => (
                    "hourly".to_string(),
                    format!("{} / h", format_money(*rate_per_hour, currency)),
                    String::new(),
                    rate_per_hour.normalize().to_string(),
                    vec![],
                ),
                ServiceKind::Variants { options } => (
                    "variants".to_string(),
                    String::new(),
                    String::new(),
                    String::new(),
                    options
                        .iter()
                        .map(|v| AdminVariantView {
                            id: v.id.to_string(),
                            name: v.name.clone(),
                            price_label: format_money(v.price, currency),
                        })
                        .collect(),
                ),
            };
            AdminServiceView {
                id: s.id.to_string(),
                name: s.name.clone(),
                category: s.main_category.as_str().to_string(),
                subcategory: s.subcategory_label().to_string(),
                subcategory_value: s.subcategory.clone().unwrap_or_default(),
                has_variants: !variants.is_empty(),
                kind_label,
                price_label,
                price_value,
                rate_value,
                variants,
            }
        })
        .collect();

    let template = AdminServicesTemplate { services };
    Ok(Html(template.render()?))
}

#[derive(Debug, Deserialize)]
struct ServiceForm {
    name: String,
    main_category: String,
    #[serde(default)]
    subcategory: Option<String>,
    kind: String,
    #[serde(default)]
    price: Option<String>,
    #[serde(default)]
    hourly_rate: Option<String>,
}

async fn create_service(
    State(state): State<AppState>,
    Form(form): Form<ServiceForm>,
) -> Result<Redirect> {
    let price = parse_money(form.price.as_deref())?;
    let hourly_rate = parse_money(form.hourly_rate.as_deref())?;
    match form.kind.as_str() {
        "flat" if price.is_none() => {
            return Err(AppError::BadRequest("flat service needs a price".to_string()))
        }
        "hourly" if hourly_rate.is_none() => {
            return Err(AppError::BadRequest("hourly service needs a rate".to_string()))
        }
        "flat" | "hourly" | "variants" => {}
        other => return Err(AppError::BadRequest(format!("unknown kind '{}'", other))),
    }

    db::insert_service(
        &state.db,
        form.name.trim(),
        &form.main_category,
        blank_to_none(form.subcategory.as_deref()),
        &form.kind,
        price,
        hourly_rate,
    )
    .await?;
    state.cache.invalidate_catalog().await;

    Ok(Redirect::to("/admin/services"))
}

#[derive(Debug, Deserialize)]
struct ServiceUpdateForm {
    name: String,
    #[serde(default)]
    subcategory: Option<String>,
    #[serde(default)]
    price: Option<String>,
    #[serde(default)]
    hourly_rate: Option<String>,
}

async fn update_service(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Form(form): Form<ServiceUpdateForm>,
) -> Result<Redirect> {
    db::update_service(
        &state.db,
        id,
        form.name.trim(),
        blank_to_none(form.subcategory.as_deref()),
        parse_money(form.price.as_deref())?,
        parse_money(form.hourly_rate.as_deref())?,
    )
    .await?;
    state.cache.invalidate_catalog().await;

    Ok(Redirect::to("/admin/services"))
}

async fn delete_service(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Redirect> {
    db::delete_service(&state.db, id).await?;
    state.cache.invalidate_catalog().await;
    Ok(Redirect::to("/admin/services"))
}

#[derive(Debug, Deserialize)]
struct VariantForm {
    service_id: Uuid,
    name: String,
    price: String,
    #[serde(default)]
    position: Option<i32>,
}

async fn create_variant(
    State(state): State<AppState>,
    Form(form): Form<VariantForm>,
) -> Result<Redirect> {
    let price = parse_money(Some(form.price.as_str()))?
        .ok_or_else(|| AppError::BadRequest("variant needs a price".to_string()))?;
    db::insert_variant(
        &state.db,
        form.service_id,
        form.name.trim(),
        price,
        form.position.unwrap_or(0),
    )
    .await?;
    state.cache.invalidate_catalog().await;

    Ok(Redirect::to("/admin/services"))
}

async fn delete_variant(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Redirect> {
    db::delete_variant(&state.db, id).await?;
    state.cache.invalidate_catalog().await;
    Ok(Redirect::to("/admin/services"))
}

// ==================== packages ====================

struct AdminPackageView {
    id: String,
    name: String,
    price_label: String,
    price_value: String,
    service_ids_value: String,
    service_names: Vec<String>,
}

/// Package management template
#[derive(Template)]
#[template(path = "admin/packages.html")]
struct AdminPackagesTemplate {
    packages: Vec<AdminPackageView>,
}

async fn packages_page(State(state): State<AppState>) -> Result<Html<String>> {
    let settings = db::site_settings(&state.db, &state.cache).await?;
    let snapshot = pricing_services::catalog_snapshot(&state.db, &state.cache).await?;

    let packages = snapshot
        .packages()
        .map(|p| AdminPackageView {
            id: p.id.to_string(),
            name: p.name.clone(),
            price_label: format_money(p.price, &settings.currency),
            price_value: p.price.normalize().to_string(),
            service_ids_value: p
                .service_ids
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(", "),
            service_names: p
                .service_ids
                .iter()
                .filter_map(|id| snapshot.service(*id))
                .map(|s| s.name.clone())
                .collect(),
        })
        .collect();

    let template = AdminPackagesTemplate { packages };
    Ok(Html(template.render()?))
}

#[derive(Debug, Deserialize)]
struct PackageForm {
    name: String,
    price: String,
    /// Comma- or newline-separated service ids
    #[serde(default)]
    service_ids: Option<String>,
}

async fn create_package(
    State(state): State<AppState>,
    Form(form): Form<PackageForm>,
) -> Result<Redirect> {
    let price = parse_money(Some(form.price.as_str()))?
        .ok_or_else(|| AppError::BadRequest("package needs a price".to_string()))?;
    let service_ids = parse_id_list(form.service_ids.as_deref())?;

    db::insert_package(&state.db, form.name.trim(), price, &service_ids).await?;
    state.cache.invalidate_catalog().await;

    Ok(Redirect::to("/admin/packages"))
}

async fn update_package(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Form(form): Form<PackageForm>,
) -> Result<Redirect> {
    let price = parse_money(Some(form.price.as_str()))?
        .ok_or_else(|| AppError::BadRequest("package needs a price".to_string()))?;
    let service_ids = parse_id_list(form.service_ids.as_deref())?;

    db::update_package(&state.db, id, form.name.trim(), price, &service_ids).await?;
    state.cache.invalidate_catalog().await;

    Ok(Redirect::to("/admin/packages"))
}

async fn delete_package(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Redirect> {
    db::delete_package(&state.db, id).await?;
    state.cache.invalidate_catalog().await;
    Ok(Redirect::to("/admin/packages"))
}

// ==================== products ====================

struct AdminProductView {
    id: String,
    name: String,
    price_label: String,
    note: String,
}

/// Product management template
#[derive(Template)]
#[template(path = "admin/products.html")]
struct AdminProductsTemplate {
    products: Vec<AdminProductView>,
}

async fn products_page(State(state): State<AppState>) -> Result<Html<String>> {
    let settings = db::site_settings(&state.db, &state.cache).await?;
    let products = db::get_products(&state.db)
        .await?
        .into_iter()
        .map(|p| AdminProductView {
            id: p.id.to_string(),
            name: p.name,
            price_label: format_money(p.price, &settings.currency),
            note: p.note.unwrap_or_default(),
        })
        .collect();

    let template = AdminProductsTemplate { products };
    Ok(Html(template.render()?))
}

#[derive(Debug, Deserialize)]
struct ProductForm {
    name: String,
    price: String,
    #[serde(default)]
    note: Option<String>,
}

async fn create_product(
    State(state): State<AppState>,
    Form(form): Form<ProductForm>,
) -> Result<Redirect> {
    let price = parse_money(Some(form.price.as_str()))?
        .ok_or_else(|| AppError::BadRequest("product needs a price".to_string()))?;
    db::insert_product(&state.db, form.name.trim(), price, blank_to_none(form.note.as_deref()))
        .await?;
    Ok(Redirect::to("/admin/products"))
}

async fn delete_product(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Redirect> {
    db::delete_product(&state.db, id).await?;
    Ok(Redirect::to("/admin/products"))
}

// ==================== task checklists ====================

struct TaskItemView {
    id: String,
    label: String,
    done: bool,
}

struct TaskListView {
    id: String,
    name: String,
    items: Vec<TaskItemView>,
}

/// Task checklist template
#[derive(Template)]
#[template(path = "admin/tasks.html")]
struct AdminTasksTemplate {
    lists: Vec<TaskListView>,
}

async fn tasks_page(State(state): State<AppState>) -> Result<Html<String>> {
    let lists = db::get_task_lists(&state.db)
        .await?
        .into_iter()
        .map(|(list, items)| TaskListView {
            id: list.id.to_string(),
            name: list.name,
            items: items
                .into_iter()
                .map(|i| TaskItemView {
                    id: i.id.to_string(),
                    label: i.label,
                    done: i.done,
                })
                .collect(),
        })
        .collect();

    let template = AdminTasksTemplate { lists };
    Ok(Html(template.render()?))
}

#[derive(Debug, Deserialize)]
struct TaskListForm {
    name: String,
}

async fn create_task_list(
    State(state): State<AppState>,
    Form(form): Form<TaskListForm>,
) -> Result<Redirect> {
    db::insert_task_list(&state.db, form.name.trim()).await?;
    Ok(Redirect::to("/admin/tasks"))
}

#[derive(Debug, Deserialize)]
struct TaskItemForm {
    list_id: Uuid,
    label: String,
}

async fn create_task_item(
    State(state): State<AppState>,
    Form(form): Form<TaskItemForm>,
) -> Result<Redirect> {
    db::insert_task_item(&state.db, form.list_id, form.label.trim()).await?;
    Ok(Redirect::to("/admin/tasks"))
}

async fn toggle_task_item(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Redirect> {
    db::toggle_task_item(&state.db, id).await?;
    Ok(Redirect::to("/admin/tasks"))
}

async fn delete_task_item(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Redirect> {
    db::delete_task_item(&state.db, id).await?;
    Ok(Redirect::to("/admin/tasks"))
}

// ==================== form helpers ====================

/// Parse an optional money field; blank counts as absent
fn parse_money(value: Option<&str>) -> Result<Option<Decimal>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => Decimal::from_str(raw)
            .map(Some)
            .map_err(|_| AppError::BadRequest(format!("'{}' is not a valid amount", raw))),
    }
}

fn blank_to_none(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Parse a comma/newline separated list of uuids
fn parse_id_list(value: Option<&str>) -> Result<Vec<Uuid>> {
    let Some(raw) = value else {
        return Ok(vec![]);
    };

    raw.split(|c| c == ',' || c == '\n')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            Uuid::parse_str(s).map_err(|_| AppError::BadRequest(format!("'{}' is not an id", s)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_money() {
        assert_eq!(parse_money(Some("350")).unwrap(), Some(dec!(350)));
        assert_eq!(parse_money(Some("  ")).unwrap(), None);
        assert_eq!(parse_money(None).unwrap(), None);
        assert!(parse_money(Some("abc")).is_err());
    }

    #[test]
    fn test_parse_id_list() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let raw = format!("{}, {}\n", a, b);
        assert_eq!(parse_id_list(Some(&raw)).unwrap(), vec![a, b]);
        assert!(parse_id_list(Some("nope")).is_err());
        assert!(parse_id_list(None).unwrap().is_empty());
    }
}
