//! Gift voucher route handlers
//!
//! Vouchers carry either a fixed amount or a package; the printable page
//! embeds the redemption code as a QR data URI.

use askama::Template;
use axum::{
    extract::{Path, State},
    response::{Html, Redirect},
    routing::{get, post},
    Form, Router,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::ImageEncoder;
use qrcode::QrCode;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::{db, AppState};

use super::format_money;

/// Build the voucher router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/vouchers", get(list).post(create))
        .route("/vouchers/new", get(new_form))
        .route("/vouchers/:id", get(show))
        .route("/vouchers/:id/redeem", post(redeem))
}

struct VoucherRowView {
    id: String,
    code: String,
    recipient: String,
    value_label: String,
    redeemed: bool,
}

/// Voucher listing template
#[derive(Template)]
#[template(path = "vouchers/list.html")]
struct VoucherListTemplate {
    vouchers: Vec<VoucherRowView>,
}

async fn list(State(state): State<AppState>) -> Result<Html<String>> {
    let settings = db::site_settings(&state.db, &state.cache).await?;
    let snapshot =
        crate::pricing::services::catalog_snapshot(&state.db, &state.cache).await?;

    let vouchers = db::get_vouchers(&state.db)
        .await?
        .into_iter()
        .map(|v| {
            let value_label = voucher_value_label(
                v.amount,
                v.package_id.and_then(|id| snapshot.package(id)).map(|p| p.name.clone()),
                &settings.currency,
            );
            VoucherRowView {
                id: v.id.to_string(),
                code: v.code.clone(),
                recipient: v.recipient.clone(),
                redeemed: v.is_redeemed(),
                value_label,
            }
        })
        .collect();

    let template = VoucherListTemplate { vouchers };
    Ok(Html(template.render()?))
}

struct PackageOptionView {
    id: String,
    label: String,
}

/// Voucher creation form template
#[derive(Template)]
#[template(path = "vouchers/new.html")]
struct VoucherNewTemplate {
    packages: Vec<PackageOptionView>,
}

async fn new_form(State(state): State<AppState>) -> Result<Html<String>> {
    let settings = db::site_settings(&state.db, &state.cache).await?;
    let snapshot =
        crate::pricing::services::catalog_snapshot(&state.db, &state.cache).await?;

    let packages = snapshot
        .packages()
        .map(|p| PackageOptionView {
            id: p.id.to_string(),
            label: format!("{} ({})", p.name, format_money(p.price, &settings.currency)),
        })
        .collect();

    let template = VoucherNewTemplate { packages };
    Ok(Html(template.render()?))
}

#[derive(Debug, Deserialize)]
struct VoucherForm {
    recipient: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    amount: Option<String>,
    #[serde(default)]
    package_id: Option<String>,
}

async fn create(
    State(state): State<AppState>,
    Form(form): Form<VoucherForm>,
) -> Result<Redirect> {
    let amount = match form.amount.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(
            Decimal::from_str(raw)
                .map_err(|_| AppError::BadRequest(format!("'{}' is not a valid amount", raw)))?,
        ),
    };
    let package_id = match form.package_id.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(
            Uuid::parse_str(raw)
                .map_err(|_| AppError::BadRequest("unknown package".to_string()))?,
        ),
    };

    if amount.is_some() == package_id.is_some() {
        return Err(AppError::BadRequest(
            "choose either an amount or a package".to_string(),
        ));
    }

    let voucher = db::insert_voucher(
        &state.db,
        amount,
        package_id,
        form.recipient.trim(),
        form.message.as_deref().map(str::trim).filter(|s| !s.is_empty()),
    )
    .await?;
    tracing::info!(voucher_id = %voucher.id, "voucher created");

    Ok(Redirect::to(&format!("/vouchers/{}", voucher.id)))
}

/// Printable voucher template
#[derive(Template)]
#[template(path = "vouchers/show.html")]
struct VoucherShowTemplate {
    studio_name: String,
    contact_line: String,
    voucher_id: String,
    code: String,
    recipient: String,
    message: String,
    has_message: bool,
    value_label: String,
    qr_data_uri: String,
    redeemed: bool,
}

async fn show(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Html<String>> {
    let settings = db::site_settings(&state.db, &state.cache).await?;
    let snapshot =
        crate::pricing::services::catalog_snapshot(&state.db, &state.cache).await?;
    let voucher = db::get_voucher(&state.db, id).await?;

    let value_label = voucher_value_label(
        voucher.amount,
        voucher
            .package_id
            .and_then(|pid| snapshot.package(pid))
            .map(|p| p.name.clone()),
        &settings.currency,
    );

    let template = VoucherShowTemplate {
        studio_name: settings.studio_name.clone(),
        contact_line: settings.contact_line.clone(),
        voucher_id: voucher.id.to_string(),
        qr_data_uri: qr_data_uri(&voucher.code)?,
        code: voucher.code,
        recipient: voucher.recipient,
        has_message: voucher.message.is_some(),
        message: voucher.message.unwrap_or_default(),
        redeemed: voucher.redeemed_at.is_some(),
        value_label,
    };

    Ok(Html(template.render()?))
}

async fn redeem(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Redirect> {
    db::redeem_voucher(&state.db, id).await?;
    tracing::info!(voucher_id = %id, "voucher redeemed");
    Ok(Redirect::to(&format!("/vouchers/{}", id)))
}

fn voucher_value_label(
    amount: Option<Decimal>,
    package_name: Option<String>,
    currency: &str,
) -> String {
    match (amount, package_name) {
        (Some(amount), _) => format_money(amount, currency),
        (None, Some(name)) => name,
        (None, None) => "Package no longer available".to_string(),
    }
}

/// Render a code as a PNG QR data URI for inline embedding
fn qr_data_uri(code: &str) -> Result<String> {
    let qr = QrCode::new(code.as_bytes())
        .map_err(|e| AppError::Internal(format!("QR encoding: {}", e)))?;
    let img = qr
        .render::<image::Luma<u8>>()
        .min_dimensions(240, 240)
        .build();

    let mut png = Vec::new();
    image::codecs::png::PngEncoder::new(&mut png)
        .write_image(
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::L8,
        )
        .map_err(|e| AppError::Internal(format!("PNG encoding: {}", e)))?;

    Ok(format!("data:image/png;base64,{}", BASE64.encode(&png)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_qr_data_uri_shape() {
        let uri = qr_data_uri("AB12CD34EF").unwrap();
        assert!(uri.starts_with("data:image/png;base64,"));
        assert!(uri.len() > 100);
    }

    #[test]
    fn test_voucher_value_label() {
        assert_eq!(voucher_value_label(Some(dec!(1500)), None, "CZK"), "1500 CZK");
        assert_eq!(
            voucher_value_label(None, Some("Winter package".to_string()), "CZK"),
            "Winter package"
        );
    }
}
