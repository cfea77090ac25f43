//! Catalog models: services, variants, packages, products, task checklists.
//!
//! Database rows are plain structs with sqlx's FromRow derive; they parse
//! into the domain types consumed by the calculator and the templates.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::HashMap;
use uuid::Uuid;

/// Display bucket for services without a subcategory
pub const FALLBACK_SUBCATEGORY: &str = "Other";

/// Top-level catalog a service lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MainCategory {
    Interior,
    Exterior,
}

impl MainCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            MainCategory::Interior => "interior",
            MainCategory::Exterior => "exterior",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "interior" => Some(MainCategory::Interior),
            "exterior" => Some(MainCategory::Exterior),
            _ => None,
        }
    }

    pub const ALL: [MainCategory; 2] = [MainCategory::Interior, MainCategory::Exterior];
}

/// A mutually-exclusive priced sub-choice of a service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceVariant {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
}

/// How a service is priced.
///
/// Exactly one pricing mode applies to a service; the row-level flag
/// combination is rejected at parse time rather than checked on every
/// calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ServiceKind {
    Flat { price: Decimal },
    Hourly { rate_per_hour: Decimal },
    Variants { options: Vec<ServiceVariant> },
}

/// A single priceable catalog line item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: Uuid,
    pub name: String,
    pub main_category: MainCategory,
    pub subcategory: Option<String>,
    #[serde(flatten)]
    pub kind: ServiceKind,
}

impl Service {
    /// Subcategory label for display grouping, with the fallback bucket
    pub fn subcategory_label(&self) -> &str {
        self.subcategory.as_deref().unwrap_or(FALLBACK_SUBCATEGORY)
    }

    /// Variant lookup; `None` for non-variant services or unknown ids
    pub fn variant(&self, variant_id: Uuid) -> Option<&ServiceVariant> {
        match &self.kind {
            ServiceKind::Variants { options } => options.iter().find(|v| v.id == variant_id),
            _ => None,
        }
    }
}

/// A fixed-price bundle referencing services by id.
///
/// Identity is the id; `name` is a mutable display attribute. The bundle
/// price is independent of the included services' sum.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Package {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub service_ids: Vec<Uuid>,
}

/// Retail product listed on the price list
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub note: Option<String>,
}

/// A named checklist of work steps for staff
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TaskList {
    pub id: Uuid,
    pub name: String,
}

/// One checkable step within a task list
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TaskItem {
    pub id: Uuid,
    pub list_id: Uuid,
    pub label: String,
    pub position: i32,
    pub done: bool,
}

/// Immutable catalog snapshot passed into the pricing and ordering cores.
///
/// The calculator never reads live store state; handlers resolve a snapshot
/// (usually from cache) and hand it down explicitly. Load order is
/// preserved: it is the tie-break baseline for display ordering.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    services: Vec<Service>,
    packages: Vec<Package>,
    service_index: HashMap<Uuid, usize>,
    package_index: HashMap<Uuid, usize>,
}

impl CatalogSnapshot {
    pub fn new(services: Vec<Service>, packages: Vec<Package>) -> Self {
        let service_index = services.iter().enumerate().map(|(i, s)| (s.id, i)).collect();
        let package_index = packages.iter().enumerate().map(|(i, p)| (p.id, i)).collect();
        Self {
            services,
            packages,
            service_index,
            package_index,
        }
    }

    pub fn service(&self, id: Uuid) -> Option<&Service> {
        self.service_index.get(&id).map(|&i| &self.services[i])
    }

    pub fn package(&self, id: Uuid) -> Option<&Package> {
        self.package_index.get(&id).map(|&i| &self.packages[i])
    }

    pub fn services(&self) -> impl Iterator<Item = &Service> {
        self.services.iter()
    }

    pub fn packages(&self) -> impl Iterator<Item = &Package> {
        self.packages.iter()
    }

    /// Sum of the catalog prices of a package's member services.
    ///
    /// Hourly members contribute one hour of their rate; variant members
    /// contribute their cheapest option. Missing references contribute 0.
    pub fn package_services_sum(&self, package: &Package) -> Decimal {
        package
            .service_ids
            .iter()
            .filter_map(|id| self.service(*id))
            .map(|s| match &s.kind {
                ServiceKind::Flat { price } => *price,
                ServiceKind::Hourly { rate_per_hour } => *rate_per_hour,
                ServiceKind::Variants { options } => {
                    options.iter().map(|v| v.price).min().unwrap_or(Decimal::ZERO)
                }
            })
            .sum()
    }
}

/// Service row from the services table
#[derive(Debug, Clone, FromRow)]
pub struct ServiceRow {
    pub id: Uuid,
    pub name: String,
    pub main_category: String,
    pub subcategory: Option<String>,
    pub kind: String,
    pub price: Option<Decimal>,
    pub hourly_rate: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}

impl ServiceRow {
    /// Parse the row into a domain service, attaching its variants.
    ///
    /// Rows with an unknown category/kind or a missing price column for
    /// their kind are skipped (returns `None`) rather than failing the
    /// whole snapshot load.
    pub fn parse(self, variants: Vec<ServiceVariant>) -> Option<Service> {
        let main_category = MainCategory::parse(&self.main_category)?;
        let kind = match self.kind.as_str() {
            "flat" => ServiceKind::Flat { price: self.price? },
            "hourly" => ServiceKind::Hourly {
                rate_per_hour: self.hourly_rate?,
            },
            "variants" => ServiceKind::Variants { options: variants },
            _ => return None,
        };

        Some(Service {
            id: self.id,
            name: self.name,
            main_category,
            subcategory: self.subcategory.filter(|s| !s.trim().is_empty()),
            kind,
        })
    }
}

/// Variant row from the service_variants table
#[derive(Debug, Clone, FromRow)]
pub struct VariantRow {
    pub id: Uuid,
    pub service_id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub position: i32,
}

/// Package row; member ids are loaded separately from package_services
#[derive(Debug, Clone, FromRow)]
pub struct PackageRow {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
}

/// Membership row from package_services
#[derive(Debug, Clone, FromRow)]
pub struct PackageServiceRow {
    pub package_id: Uuid,
    pub service_id: Uuid,
    pub position: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn flat_row(kind: &str) -> ServiceRow {
        ServiceRow {
            id: Uuid::new_v4(),
            name: "Wheel cleaning".to_string(),
            main_category: "exterior".to_string(),
            subcategory: Some("Wheels".to_string()),
            kind: kind.to_string(),
            price: Some(dec!(350)),
            hourly_rate: Some(dec!(500)),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_parse_flat_service() {
        let service = flat_row("flat").parse(vec![]).unwrap();
        match service.kind {
            ServiceKind::Flat { price } => assert_eq!(price, dec!(350)),
            _ => panic!("expected flat kind"),
        }
    }

    #[test]
    fn test_parse_unknown_kind_skipped() {
        assert!(flat_row("bundle").parse(vec![]).is_none());
    }

    #[test]
    fn test_parse_blank_subcategory_falls_back() {
        let mut row = flat_row("flat");
        row.subcategory = Some("   ".to_string());
        let service = row.parse(vec![]).unwrap();
        assert_eq!(service.subcategory_label(), FALLBACK_SUBCATEGORY);
    }

    #[test]
    fn test_variant_lookup() {
        let variant_id = Uuid::new_v4();
        let service = Service {
            id: Uuid::new_v4(),
            name: "Ceramic coating".to_string(),
            main_category: MainCategory::Exterior,
            subcategory: None,
            kind: ServiceKind::Variants {
                options: vec![ServiceVariant {
                    id: variant_id,
                    name: "One layer".to_string(),
                    price: dec!(2000),
                }],
            },
        };

        assert_eq!(service.variant(variant_id).unwrap().price, dec!(2000));
        assert!(service.variant(Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_package_services_sum_skips_missing() {
        let known = flat_row("flat").parse(vec![]).unwrap();
        let known_id = known.id;
        let snapshot = CatalogSnapshot::new(vec![known], vec![]);

        let package = Package {
            id: Uuid::new_v4(),
            name: "Spring bundle".to_string(),
            price: dec!(300),
            service_ids: vec![known_id, Uuid::new_v4()],
        };

        assert_eq!(snapshot.package_services_sum(&package), dec!(350));
    }
}
