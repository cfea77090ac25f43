//! Domain models

pub mod catalog;
pub mod settings;
pub mod voucher;

pub use catalog::{
    CatalogSnapshot, MainCategory, Package, PackageRow, PackageServiceRow, Product, Service,
    ServiceKind, ServiceRow, ServiceVariant, TaskItem, TaskList, VariantRow, FALLBACK_SUBCATEGORY,
};
pub use settings::SiteSettings;
pub use voucher::Voucher;
