//! Pricing API route handlers

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::db;
use crate::error::Result;
use crate::AppState;

use super::calculators::compute_totals;
use super::requests::{QuoteListQuery, QuoteRequest, SaveQuoteRequest};
use super::responses::{
    MoneyResponse, QuoteTotalsResponse, SavedQuoteCreatedResponse, SavedQuoteResponse,
    SavedQuoteSummaryResponse,
};
use super::services;

/// Build the pricing API router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/quote", post(compute))
        .route("/api/quotes", post(save).get(list))
        .route("/api/quotes/:id", get(get_one).delete(delete_one))
}

/// Compute totals for the posted selection.
///
/// This is the keystroke path: every toggle in the calculator posts here,
/// so it must stay on the cached snapshot.
async fn compute(
    State(state): State<AppState>,
    Json(request): Json<QuoteRequest>,
) -> Result<Json<QuoteTotalsResponse>> {
    let settings = db::site_settings(&state.db, &state.cache).await?;
    let totals = services::quote_totals(&state.db, &state.cache, &request.selection).await?;
    Ok(Json(QuoteTotalsResponse::from_totals(
        &totals,
        &settings.currency,
    )))
}

/// Save the posted selection as a quote
async fn save(
    State(state): State<AppState>,
    Json(request): Json<SaveQuoteRequest>,
) -> Result<Json<SavedQuoteCreatedResponse>> {
    let id = services::save_quote(
        &state.db,
        request.customer_name.as_deref(),
        &request.selection,
    )
    .await?;
    Ok(Json(SavedQuoteCreatedResponse { id }))
}

/// List saved quotes with their totals under the current catalog
async fn list(
    State(state): State<AppState>,
    Query(query): Query<QuoteListQuery>,
) -> Result<Json<Vec<SavedQuoteSummaryResponse>>> {
    let settings = db::site_settings(&state.db, &state.cache).await?;
    let snapshot = services::catalog_snapshot(&state.db, &state.cache).await?;
    let quotes = services::list_quotes(&state.db, query.limit.clamp(1, 200)).await?;

    let summaries = quotes
        .into_iter()
        .map(|quote| {
            let totals = compute_totals(&quote.selection, &snapshot);
            SavedQuoteSummaryResponse {
                id: quote.id,
                customer_name: quote.customer_name,
                created_at: quote.created_at,
                final_total: MoneyResponse::new(totals.final_total, &settings.currency),
            }
        })
        .collect();

    Ok(Json(summaries))
}

/// Fetch one saved quote, selection included, for reloading
async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SavedQuoteResponse>> {
    let settings = db::site_settings(&state.db, &state.cache).await?;
    let snapshot = services::catalog_snapshot(&state.db, &state.cache).await?;
    let quote = services::get_quote(&state.db, id).await?;
    let totals = compute_totals(&quote.selection, &snapshot);

    Ok(Json(SavedQuoteResponse {
        id: quote.id,
        customer_name: quote.customer_name,
        created_at: quote.created_at,
        totals: QuoteTotalsResponse::from_totals(&totals, &settings.currency),
        selection: quote.selection,
    }))
}

/// Soft-delete one saved quote
async fn delete_one(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<()> {
    services::delete_quote(&state.db, id).await
}
