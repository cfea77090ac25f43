//! Price calculator and back office for the Shine Detailing studio.
//!
//! Axum web application: a customer-facing price calculator backed by a
//! pure pricing engine, staff catalog management, printable invoices and
//! price lists, and gift vouchers.

use axum::{routing::get, Router};
use sqlx::PgPool;
use tower_http::{compression::CompressionLayer, services::ServeDir, trace::TraceLayer};

pub mod cache;
pub mod db;
pub mod error;
pub mod models;
pub mod ordering;
pub mod pricing;
pub mod routes;

pub use cache::AppCache;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub cache: AppCache,
}

/// Build the full application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::calculator::home))
        .route("/price-list", get(routes::invoice::price_list))
        .route("/quotes/:id/invoice", get(routes::invoice::invoice))
        .route("/health", get(routes::health))
        .merge(routes::admin::router())
        .merge(routes::vouchers::router())
        .merge(pricing::router())
        .merge(ordering::router())
        .nest_service("/static", ServeDir::new("static"))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .with_state(state)
}
