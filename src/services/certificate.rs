//! Certificate of authenticity for a sold artwork.

use askama::Template;
use sha2::{Digest, Sha256};

use crate::error::{AppError, AppResult};

#[derive(Template)]
#[template(path = "certificate.html")]
pub struct CertificateTemplate {
    pub gallery_name: String,
    pub title: String,
    pub artist_name: String,
    pub year: String,
    pub medium: String,
    pub dimensions: String,
    pub buyer_name: String,
    pub purchase_date: String,
    pub certificate_number: String,
    pub verification_code: String,
}

pub struct CertificateInput<'a> {
    pub gallery_name: &'a str,
    pub order_id: &'a str,
    pub artwork_id: &'a str,
    pub price_cents: i64,
    pub title: &'a str,
    pub artist_name: &'a str,
    pub year: Option<i64>,
    pub medium: Option<&'a str>,
    pub dimensions: Option<String>,
    pub buyer_name: &'a str,
    /// Unix seconds of the order.
    pub purchased_ts: i64,
}

/// First 16 hex characters of SHA-256 over `order_id:artwork_id:price_cents`.
pub fn verification_code(order_id: &str, artwork_id: &str, price_cents: i64) -> String {
    let digest = Sha256::digest(format!("{order_id}:{artwork_id}:{price_cents}").as_bytes());
    hex::encode(digest)[..16].to_string()
}

pub fn certificate_number(code: &str) -> String {
    format!("COA-{}", code[..8].to_uppercase())
}

pub fn render(input: CertificateInput<'_>) -> AppResult<String> {
    let code = verification_code(input.order_id, input.artwork_id, input.price_cents);
    let purchase_date = chrono::DateTime::from_timestamp(input.purchased_ts, 0)
        .map(|d| d.format("%B %-d, %Y").to_string())
        .unwrap_or_default();

    let template = CertificateTemplate {
        gallery_name: input.gallery_name.to_string(),
        title: input.title.to_string(),
        artist_name: input.artist_name.to_string(),
        year: input.year.map(|y| y.to_string()).unwrap_or_default(),
        medium: input.medium.unwrap_or_default().to_string(),
        dimensions: input.dimensions.unwrap_or_default(),
        buyer_name: input.buyer_name.to_string(),
        purchase_date,
        certificate_number: certificate_number(&code),
        verification_code: code,
    };

    template
        .render()
        .map_err(|e| AppError::Internal(format!("Failed to render certificate: {}", e)))
}
