//! Calculator page handler
//!
//! Renders the customer-facing calculator: the full catalog grouped by
//! category, subcategory, and service, ordered via the display-order maps.

use askama::Template;
use axum::{extract::State, response::Html};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::error::Result;
use crate::models::{CatalogSnapshot, MainCategory, Service, ServiceKind, SiteSettings};
use crate::ordering::{self, derive_sequence, OrderScope, GLOBAL_GROUP};
use crate::pricing::{package_discount_pct, services as pricing_services};
use crate::{db, AppState};

use super::format_money;

/// One service as rendered in catalog listings
pub(crate) struct ServiceView {
    pub id: String,
    pub name: String,
    pub price_label: String,
    pub is_hourly: bool,
    pub has_variants: bool,
    pub variants: Vec<VariantView>,
}

pub(crate) struct VariantView {
    pub id: String,
    pub name: String,
    pub price_label: String,
}

pub(crate) struct SubcategoryView {
    pub name: String,
    pub services: Vec<ServiceView>,
}

pub(crate) struct CategoryView {
    pub key: String,
    pub title: String,
    pub subcategories: Vec<SubcategoryView>,
}

pub(crate) struct PackageView {
    pub id: String,
    pub name: String,
    pub price_label: String,
    pub discount_label: String,
    pub has_discount: bool,
    pub service_names: Vec<String>,
}

/// Calculator page template
#[derive(Template)]
#[template(path = "calculator.html")]
struct CalculatorTemplate {
    studio_name: String,
    categories: Vec<CategoryView>,
    packages: Vec<PackageView>,
    has_packages: bool,
}

/// Calculator page
pub async fn home(State(state): State<AppState>) -> Result<Html<String>> {
    let settings = db::site_settings(&state.db, &state.cache).await?;
    let snapshot = pricing_services::catalog_snapshot(&state.db, &state.cache).await?;

    let categories = catalog_view(&state, &snapshot, &settings).await?;
    let packages = package_views(&state, &snapshot, &settings).await?;

    let template = CalculatorTemplate {
        studio_name: settings.studio_name.clone(),
        has_packages: !packages.is_empty(),
        categories,
        packages,
    };

    Ok(Html(template.render()?))
}

/// Build the ordered category -> subcategory -> service tree.
///
/// Shared with the printable price list. Grouping uses a BTreeMap so the
/// pre-rank baseline is alphabetical and deterministic.
pub(crate) async fn catalog_view(
    state: &AppState,
    snapshot: &CatalogSnapshot,
    settings: &SiteSettings,
) -> Result<Vec<CategoryView>> {
    let category_order = ordering::services::order_map(
        &state.db,
        &state.cache,
        OrderScope::Categories,
        GLOBAL_GROUP,
    )
    .await?;

    let category_keys: Vec<String> = MainCategory::ALL
        .iter()
        .map(|c| c.as_str().to_string())
        .collect();
    let ordered_categories = derive_sequence(&category_order, category_keys, |k| k.clone());

    let mut categories = Vec::new();
    for key in ordered_categories {
        let Some(category) = MainCategory::parse(&key) else {
            continue;
        };

        let mut by_subcategory: BTreeMap<String, Vec<&Service>> = BTreeMap::new();
        for service in snapshot.services().filter(|s| s.main_category == category) {
            by_subcategory
                .entry(service.subcategory_label().to_string())
                .or_default()
                .push(service);
        }

        let subcategory_order = ordering::services::order_map(
            &state.db,
            &state.cache,
            OrderScope::Subcategories,
            category.as_str(),
        )
        .await?;
        let grouped: Vec<(String, Vec<&Service>)> = by_subcategory.into_iter().collect();
        let ordered_groups = derive_sequence(&subcategory_order, grouped, |g| g.0.clone());

        let mut subcategories = Vec::new();
        for (name, services) in ordered_groups {
            let service_order = ordering::services::order_map(
                &state.db,
                &state.cache,
                OrderScope::Services,
                &service_group(category, &name),
            )
            .await?;
            let ordered = derive_sequence(&service_order, services, |s| s.id.to_string());

            subcategories.push(SubcategoryView {
                name,
                services: ordered
                    .into_iter()
                    .map(|s| service_view(s, &settings.currency))
                    .collect(),
            });
        }

        categories.push(CategoryView {
            key: category.as_str().to_string(),
            title: category_title(category),
            subcategories,
        });
    }

    Ok(categories)
}

/// Build the ordered package cards with derived discount labels
pub(crate) async fn package_views(
    state: &AppState,
    snapshot: &CatalogSnapshot,
    settings: &SiteSettings,
) -> Result<Vec<PackageView>> {
    let package_order = ordering::services::order_map(
        &state.db,
        &state.cache,
        OrderScope::Packages,
        GLOBAL_GROUP,
    )
    .await?;

    let packages: Vec<_> = snapshot.packages().collect();
    let ordered = derive_sequence(&package_order, packages, |p| p.id.to_string());

    Ok(ordered
        .into_iter()
        .map(|package| {
            let services_sum = snapshot.package_services_sum(package);
            let discount = package_discount_pct(package.price, services_sum);
            PackageView {
                id: package.id.to_string(),
                name: package.name.clone(),
                price_label: format_money(package.price, &settings.currency),
                discount_label: format!("-{}%", discount),
                has_discount: discount > Decimal::ZERO,
                service_names: package
                    .service_ids
                    .iter()
                    .filter_map(|id| snapshot.service(*id))
                    .map(|s| s.name.clone())
                    .collect(),
            }
        })
        .collect())
}

/// Group key for ordering services within one subcategory
pub(crate) fn service_group(category: MainCategory, subcategory: &str) -> String {
    format!("{}/{}", category.as_str(), subcategory)
}

fn category_title(category: MainCategory) -> String {
    match category {
        MainCategory::Interior => "Interior".to_string(),
        MainCategory::Exterior => "Exterior".to_string(),
    }
}

fn service_view(service: &Service, currency: &str) -> ServiceView {
    let (price_label, is_hourly, has_variants, variants) = match &service.kind {
        ServiceKind::Flat { price } => (format_money(*price, currency), false, false, vec![]),
        ServiceKind::Hourly { rate_per_hour } => (
            format!("{} / h", format_money(*rate_per_hour, currency)),
            true,
            false,
            vec![],
        ),
        ServiceKind::Variants { options } => {
            let from = options.iter().map(|v| v.price).min().unwrap_or_default();
            (
                format!("from {}", format_money(from, currency)),
                false,
                true,
                options
                    .iter()
                    .map(|v| VariantView {
                        id: v.id.to_string(),
                        name: v.name.clone(),
                        price_label: format_money(v.price, currency),
                    })
                    .collect(),
            )
        }
    };

    ServiceView {
        id: service.id.to_string(),
        name: service.name.clone(),
        price_label,
        is_hourly,
        has_variants,
        variants,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_group_key() {
        assert_eq!(
            service_group(MainCategory::Exterior, "Wheels"),
            "exterior/Wheels"
        );
    }
}
