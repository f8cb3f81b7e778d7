use libsql::Connection;
use serde::{Deserialize, Serialize};

use crate::db::{fetch_optional, now_ts};
use crate::error::{AppError, AppResult};

pub struct Setting;

impl Setting {
    pub async fn get(conn: &Connection, key: &str) -> AppResult<Option<String>> {
        fetch_optional(
            conn,
            "SELECT value FROM site_settings WHERE key = ?",
            [key],
            |row| row.get(0),
        )
        .await
    }

    pub async fn set(conn: &Connection, key: &str, value: &str) -> AppResult<()> {
        conn.execute(
            "INSERT OR REPLACE INTO site_settings (key, value, updated_ts) VALUES (?, ?, ?)",
            libsql::params![key.to_string(), value.to_string(), now_ts()],
        )
        .await?;

        Ok(())
    }

    pub async fn get_site_settings(conn: &Connection) -> AppResult<SiteSettings> {
        let defaults = SiteSettings::default();

        Ok(SiteSettings {
            gallery_name: Self::get(conn, "gallery_name").await?.unwrap_or(defaults.gallery_name),
            contact_email: Self::get(conn, "contact_email")
                .await?
                .filter(|s| !s.is_empty())
                .or(defaults.contact_email),
            commission_percent: Self::get(conn, "commission_percent")
                .await?
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.commission_percent),
            currency: Self::get(conn, "currency").await?.unwrap_or(defaults.currency),
        })
    }

    /// Validates every field before writing any, then stores them together.
    pub async fn update_site_settings(conn: &Connection, data: UpdateSiteSettings) -> AppResult<SiteSettings> {
        let mut changes: Vec<(&str, String)> = Vec::new();

        if let Some(name) = data.gallery_name {
            let name = name.trim();
            if name.is_empty() {
                return Err(AppError::BadRequest("Gallery name must not be empty".to_string()));
            }
            changes.push(("gallery_name", name.to_string()));
        }
        if let Some(email) = data.contact_email {
            changes.push(("contact_email", email.trim().to_string()));
        }
        if let Some(percent) = data.commission_percent {
            if !(0..=100).contains(&percent) {
                return Err(AppError::BadRequest(
                    "Commission must be between 0 and 100 percent".to_string(),
                ));
            }
            changes.push(("commission_percent", percent.to_string()));
        }
        if let Some(currency) = data.currency {
            let currency = currency.trim().to_uppercase();
            if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(AppError::BadRequest("Currency must be a 3-letter ISO code".to_string()));
            }
            changes.push(("currency", currency));
        }

        let tx = conn.transaction().await?;
        for (key, value) in &changes {
            Self::set(&tx, key, value).await?;
        }
        tx.commit().await?;

        Self::get_site_settings(conn).await
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteSettings {
    pub gallery_name: String,
    pub contact_email: Option<String>,
    pub commission_percent: i64,
    pub currency: String,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            gallery_name: "Art Gallery".to_string(),
            contact_email: None,
            commission_percent: 20,
            currency: "USD".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateSiteSettings {
    pub gallery_name: Option<String>,
    pub contact_email: Option<String>,
    pub commission_percent: Option<i64>,
    pub currency: Option<String>,
}
