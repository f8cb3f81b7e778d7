use libsql::Connection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::{fetch_all, fetch_optional, now_ts};
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    pub artwork_id: String,
    pub user_id: String,
    pub rating: i64,
    pub comment: Option<String>,
    pub created_ts: i64,
}

impl Review {
    fn from_row(row: &libsql::Row) -> Result<Self, libsql::Error> {
        Ok(Self {
            id: row.get(0)?,
            artwork_id: row.get(1)?,
            user_id: row.get(2)?,
            rating: row.get(3)?,
            comment: row.get(4)?,
            created_ts: row.get(5)?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateReview {
    pub artwork_id: String,
    pub rating: i64,
    pub comment: Option<String>,
}

/// A review with its author's display name.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewWithAuthor {
    pub id: String,
    pub rating: i64,
    pub comment: Option<String>,
    pub author: String,
    pub created_ts: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RatingSummary {
    pub average_rating: Option<f64>,
    pub count: i64,
}

impl Review {
    pub async fn find_by_id(conn: &Connection, id: &str) -> AppResult<Option<Self>> {
        fetch_optional(
            conn,
            "SELECT id, artwork_id, user_id, rating, comment, created_ts FROM reviews WHERE id = ?",
            [id],
            Self::from_row,
        )
        .await
    }

    pub async fn create(conn: &Connection, user_id: &str, data: CreateReview) -> AppResult<Self> {
        if !(1..=5).contains(&data.rating) {
            return Err(AppError::BadRequest("Rating must be between 1 and 5".to_string()));
        }

        let id = Uuid::new_v4().to_string();
        let comment = data.comment.map(|c| c.trim().to_string()).filter(|c| !c.is_empty());
        // The (user_id, artwork_id) unique key decides between concurrent duplicates
        let inserted = conn
            .execute(
                "INSERT INTO reviews (id, artwork_id, user_id, rating, comment, created_ts) VALUES (?, ?, ?, ?, ?, ?) \
                 ON CONFLICT (user_id, artwork_id) DO NOTHING",
                libsql::params![id.clone(), data.artwork_id, user_id.to_string(), data.rating, comment, now_ts()],
            )
            .await?;
        if inserted == 0 {
            return Err(AppError::Conflict("You have already reviewed this artwork".to_string()));
        }

        Self::find_by_id(conn, &id)
            .await?
            .ok_or_else(|| AppError::Internal("Failed to create review".to_string()))
    }

    pub async fn list_for_artwork(conn: &Connection, artwork_id: &str) -> AppResult<Vec<ReviewWithAuthor>> {
        fetch_all(
            conn,
            r#"
            SELECT r.id, r.rating, r.comment, COALESCE(u.name, 'Collector'), r.created_ts
            FROM reviews r JOIN users u ON u.id = r.user_id
            WHERE r.artwork_id = ?
            ORDER BY r.created_ts DESC
            "#,
            [artwork_id],
            |row| {
                Ok(ReviewWithAuthor {
                    id: row.get(0)?,
                    rating: row.get(1)?,
                    comment: row.get(2)?,
                    author: row.get(3)?,
                    created_ts: row.get(4)?,
                })
            },
        )
        .await
    }

    pub async fn summary_for_artwork(conn: &Connection, artwork_id: &str) -> AppResult<RatingSummary> {
        let summary = fetch_optional(
            conn,
            "SELECT AVG(rating), COUNT(*) FROM reviews WHERE artwork_id = ?",
            [artwork_id],
            |row| {
                Ok(RatingSummary {
                    average_rating: row.get(0)?,
                    count: row.get(1)?,
                })
            },
        )
        .await?;

        Ok(summary.unwrap_or(RatingSummary {
            average_rating: None,
            count: 0,
        }))
    }

    pub async fn delete(conn: &Connection, id: &str) -> AppResult<()> {
        conn.execute("DELETE FROM reviews WHERE id = ?", [id]).await?;
        Ok(())
    }
}
