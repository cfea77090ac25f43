//! Printable invoice and price list handlers

use askama::Template;
use axum::{
    extract::{Path, State},
    response::Html,
};
use rust_decimal::Decimal;
use std::collections::HashSet;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{CatalogSnapshot, ServiceKind};
use crate::pricing::calculators::{compute_totals, service_contribution};
use crate::pricing::models::{CarSize, Selection};
use crate::pricing::services as pricing_services;
use crate::{db, AppState};

use super::calculator::{catalog_view, package_views, CategoryView, PackageView};
use super::format_money;

/// One line of the printable invoice
struct InvoiceLine {
    label: String,
    detail: String,
    has_detail: bool,
    amount_label: String,
}

/// Invoice template
#[derive(Template)]
#[template(path = "invoice.html")]
struct InvoiceTemplate {
    studio_name: String,
    contact_line: String,
    customer_name: String,
    has_customer: bool,
    created_label: String,
    lines: Vec<InvoiceLine>,
    extra_lines: Vec<InvoiceLine>,
    is_xl: bool,
    subtotal_label: String,
    discount_label: String,
    has_discount: bool,
    total_label: String,
}

/// Printable invoice for a saved quote
pub async fn invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Html<String>> {
    let settings = db::site_settings(&state.db, &state.cache).await?;
    let snapshot = pricing_services::catalog_snapshot(&state.db, &state.cache).await?;
    let quote = pricing_services::get_quote(&state.db, id).await?;

    let totals = compute_totals(&quote.selection, &snapshot);
    let currency = &settings.currency;

    let template = InvoiceTemplate {
        studio_name: settings.studio_name.clone(),
        contact_line: settings.contact_line.clone(),
        has_customer: quote.customer_name.is_some(),
        customer_name: quote.customer_name.unwrap_or_default(),
        created_label: quote.created_at.format("%Y-%m-%d").to_string(),
        lines: selection_lines(&quote.selection, &snapshot, currency),
        extra_lines: quote
            .selection
            .extra_charges
            .iter()
            .filter(|c| c.amount > Decimal::ZERO)
            .map(|c| InvoiceLine {
                label: c.description.clone(),
                detail: String::new(),
                has_detail: false,
                amount_label: format_money(c.amount, currency),
            })
            .collect(),
        is_xl: quote.selection.car_size == CarSize::Xl,
        subtotal_label: format_money(totals.subtotal, currency),
        discount_label: format!(
            "-{} ({}%)",
            format_money(totals.discount_amount, currency),
            quote.selection.discount_pct.normalize()
        ),
        has_discount: totals.discount_amount > Decimal::ZERO,
        total_label: format_money(totals.final_total, currency),
    };

    Ok(Html(template.render()?))
}

/// Build the per-service and per-package invoice lines
fn selection_lines(
    selection: &Selection,
    snapshot: &CatalogSnapshot,
    currency: &str,
) -> Vec<InvoiceLine> {
    let mut lines = Vec::new();
    let mut seen = HashSet::new();

    for id in &selection.service_ids {
        if !seen.insert(*id) {
            continue;
        }
        let Some(service) = snapshot.service(*id) else {
            continue;
        };

        let detail = match &service.kind {
            ServiceKind::Flat { .. } => String::new(),
            ServiceKind::Hourly { rate_per_hour } => {
                let hours = selection
                    .hours
                    .get(id)
                    .copied()
                    .unwrap_or(Decimal::ONE)
                    .max(Decimal::ZERO);
                format!(
                    "{} h x {}",
                    hours.normalize(),
                    format_money(*rate_per_hour, currency)
                )
            }
            ServiceKind::Variants { .. } => selection
                .variants
                .get(id)
                .and_then(|vid| service.variant(*vid))
                .map(|v| v.name.clone())
                .unwrap_or_default(),
        };

        lines.push(InvoiceLine {
            label: service.name.clone(),
            has_detail: !detail.is_empty(),
            detail,
            amount_label: format_money(service_contribution(service, selection), currency),
        });
    }

    // deterministic package order on the printout
    let mut package_lines: Vec<_> = selection
        .packages
        .iter()
        .map(|(id, snap)| {
            let name = snapshot
                .package(*id)
                .map(|p| p.name.clone())
                .unwrap_or_else(|| "Package".to_string());
            (name, snap.price)
        })
        .collect();
    package_lines.sort_by(|a, b| a.0.cmp(&b.0));

    for (name, price) in package_lines {
        lines.push(InvoiceLine {
            label: name,
            detail: "package".to_string(),
            has_detail: true,
            amount_label: format_money(price.max(Decimal::ZERO), currency),
        });
    }

    lines
}

/// Price list template
#[derive(Template)]
#[template(path = "price_list.html")]
struct PriceListTemplate {
    studio_name: String,
    contact_line: String,
    categories: Vec<CategoryView>,
    packages: Vec<PackageView>,
    has_packages: bool,
    products: Vec<ProductView>,
    has_products: bool,
}

struct ProductView {
    name: String,
    price_label: String,
    note: String,
    has_note: bool,
}

/// Printable price list: services, packages, products
pub async fn price_list(State(state): State<AppState>) -> Result<Html<String>> {
    let settings = db::site_settings(&state.db, &state.cache).await?;
    let snapshot = pricing_services::catalog_snapshot(&state.db, &state.cache).await?;

    let categories = catalog_view(&state, &snapshot, &settings).await?;
    let packages = package_views(&state, &snapshot, &settings).await?;
    let products: Vec<ProductView> = db::get_products(&state.db)
        .await?
        .into_iter()
        .map(|p| ProductView {
            name: p.name,
            price_label: format_money(p.price, &settings.currency),
            has_note: p.note.is_some(),
            note: p.note.unwrap_or_default(),
        })
        .collect();

    let template = PriceListTemplate {
        studio_name: settings.studio_name.clone(),
        contact_line: settings.contact_line.clone(),
        categories,
        has_packages: !packages.is_empty(),
        packages,
        has_products: !products.is_empty(),
        products,
    };

    Ok(Html(template.render()?))
}
