use chrono::NaiveDate;
use libsql::params::Params;
use libsql::{Connection, Value};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::{fetch_all, fetch_optional, now_ts};
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exhibition {
    pub id: String,
    pub artist_id: String,
    pub title: String,
    pub description: Option<String>,
    pub venue: Option<String>,
    pub starts_on: String,
    pub ends_on: String,
    pub created_ts: i64,
    pub updated_ts: i64,
}

const COLUMNS: &str =
    "e.id, e.artist_id, e.title, e.description, e.venue, e.starts_on, e.ends_on, e.created_ts, e.updated_ts";

impl Exhibition {
    fn from_row(row: &libsql::Row) -> Result<Self, libsql::Error> {
        Ok(Self {
            id: row.get(0)?,
            artist_id: row.get(1)?,
            title: row.get(2)?,
            description: row.get(3)?,
            venue: row.get(4)?,
            starts_on: row.get(5)?,
            ends_on: row.get(6)?,
            created_ts: row.get(7)?,
            updated_ts: row.get(8)?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateExhibition {
    pub title: String,
    pub description: Option<String>,
    pub venue: Option<String>,
    pub starts_on: String,
    pub ends_on: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateExhibition {
    pub title: Option<String>,
    pub description: Option<String>,
    pub venue: Option<String>,
    pub starts_on: Option<String>,
    pub ends_on: Option<String>,
}

/// Parses both ISO dates and checks the range is not inverted.
fn validate_dates(starts_on: &str, ends_on: &str) -> AppResult<(NaiveDate, NaiveDate)> {
    let parse = |field: &str, value: &str| {
        NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
            .map_err(|_| AppError::BadRequest(format!("{field} must be a YYYY-MM-DD date")))
    };
    let start = parse("starts_on", starts_on)?;
    let end = parse("ends_on", ends_on)?;
    if end < start {
        return Err(AppError::BadRequest("ends_on must not be before starts_on".to_string()));
    }
    Ok((start, end))
}

impl Exhibition {
    pub async fn find_by_id(conn: &Connection, id: &str) -> AppResult<Option<Self>> {
        fetch_optional(
            conn,
            &format!("SELECT {COLUMNS} FROM exhibitions e WHERE e.id = ?"),
            [id],
            Self::from_row,
        )
        .await
    }

    pub async fn create(conn: &Connection, artist_id: &str, data: CreateExhibition) -> AppResult<Self> {
        let title = data.title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::BadRequest("Title is required".to_string()));
        }
        let (start, end) = validate_dates(&data.starts_on, &data.ends_on)?;

        let id = Uuid::new_v4().to_string();
        let now = now_ts();
        conn.execute(
            "INSERT INTO exhibitions (id, artist_id, title, description, venue, starts_on, ends_on, created_ts, updated_ts) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            libsql::params![
                id.clone(),
                artist_id.to_string(),
                title,
                data.description,
                data.venue,
                start.to_string(),
                end.to_string(),
                now,
                now
            ],
        )
        .await?;

        Self::find_by_id(conn, &id)
            .await?
            .ok_or_else(|| AppError::Internal("Failed to create exhibition".to_string()))
    }

    pub async fn update(conn: &Connection, id: &str, data: UpdateExhibition) -> AppResult<Self> {
        let current = Self::find_by_id(conn, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Exhibition not found".to_string()))?;

        let title = data.title.map(|t| t.trim().to_string()).unwrap_or(current.title);
        if title.is_empty() {
            return Err(AppError::BadRequest("Title is required".to_string()));
        }
        let description = data.description.or(current.description);
        let venue = data.venue.or(current.venue);
        let (start, end) = validate_dates(
            data.starts_on.as_deref().unwrap_or(&current.starts_on),
            data.ends_on.as_deref().unwrap_or(&current.ends_on),
        )?;

        conn.execute(
            "UPDATE exhibitions SET title = ?, description = ?, venue = ?, starts_on = ?, ends_on = ?, updated_ts = ? WHERE id = ?",
            libsql::params![title, description, venue, start.to_string(), end.to_string(), now_ts(), id.to_string()],
        )
        .await?;

        Self::find_by_id(conn, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Exhibition not found".to_string()))
    }

    pub async fn delete(conn: &Connection, id: &str) -> AppResult<()> {
        conn.execute("DELETE FROM exhibitions WHERE id = ?", [id]).await?;
        Ok(())
    }

    pub async fn list_by_artist(conn: &Connection, artist_id: &str) -> AppResult<Vec<Self>> {
        fetch_all(
            conn,
            &format!("SELECT {COLUMNS} FROM exhibitions e WHERE e.artist_id = ? ORDER BY e.starts_on DESC"),
            [artist_id],
            Self::from_row,
        )
        .await
    }

    /// Public listing. `artist_slug` narrows to one artist; `current_only` drops exhibitions already over.
    pub async fn list_public(
        conn: &Connection,
        artist_slug: Option<&str>,
        current_only: bool,
    ) -> AppResult<Vec<(Self, String, String)>> {
        let mut sql = format!(
            "SELECT {COLUMNS}, a.display_name, a.slug FROM exhibitions e \
             JOIN artist_profiles a ON a.id = e.artist_id WHERE 1 = 1"
        );
        let mut params = Vec::new();

        if let Some(slug) = artist_slug {
            sql.push_str(" AND a.slug = ?");
            params.push(Value::Text(slug.to_string()));
        }
        if current_only {
            sql.push_str(" AND e.ends_on >= ?");
            params.push(Value::Text(chrono::Utc::now().date_naive().to_string()));
        }
        sql.push_str(" ORDER BY e.starts_on ASC");

        fetch_all(conn, &sql, Params::Positional(params), |row| {
            Ok((Exhibition::from_row(row)?, row.get(9)?, row.get(10)?))
        })
        .await
    }
}
