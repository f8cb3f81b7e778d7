use libsql::Connection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::{fetch_all, fetch_i64, now_ts};
use crate::error::AppResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    OrderPlaced,
    OrderStatus,
    NewMessage,
    NewReview,
    ArtworkModerated,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::OrderPlaced => "order_placed",
            NotificationKind::OrderStatus => "order_status",
            NotificationKind::NewMessage => "new_message",
            NotificationKind::NewReview => "new_review",
            NotificationKind::ArtworkModerated => "artwork_moderated",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    pub kind: String,
    pub title: String,
    pub body: String,
    pub link: Option<String>,
    pub is_read: bool,
    pub created_ts: i64,
}

impl Notification {
    /// Record a notification for a user
    pub async fn create(
        conn: &Connection,
        user_id: &str,
        kind: NotificationKind,
        title: &str,
        body: &str,
        link: Option<String>,
    ) -> AppResult<Self> {
        let id = Uuid::new_v4().to_string();
        let now = now_ts();

        conn.execute(
            "INSERT INTO notifications (id, user_id, kind, title, body, link, is_read, created_ts) VALUES (?, ?, ?, ?, ?, ?, 0, ?)",
            libsql::params![id.clone(), user_id.to_string(), kind.as_str(), title.to_string(), body.to_string(), link.clone(), now],
        )
        .await?;

        Ok(Self {
            id,
            user_id: user_id.to_string(),
            kind: kind.as_str().to_string(),
            title: title.to_string(),
            body: body.to_string(),
            link,
            is_read: false,
            created_ts: now,
        })
    }

    /// Newest first
    pub async fn list_for_user(
        conn: &Connection,
        user_id: &str,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<Self>> {
        let unread_clause = if unread_only { " AND is_read = 0" } else { "" };
        fetch_all(
            conn,
            &format!(
                "SELECT id, user_id, kind, title, body, link, is_read, created_ts FROM notifications \
                 WHERE user_id = ?{unread_clause} ORDER BY created_ts DESC, rowid DESC LIMIT ? OFFSET ?"
            ),
            libsql::params![user_id.to_string(), limit, offset],
            Self::from_row,
        )
        .await
    }

    /// Mark one of the user's notifications read. Returns false if it does not exist.
    pub async fn mark_read(conn: &Connection, id: &str, user_id: &str) -> AppResult<bool> {
        let changed = conn
            .execute(
                "UPDATE notifications SET is_read = 1 WHERE id = ? AND user_id = ?",
                [id, user_id],
            )
            .await?;
        Ok(changed > 0)
    }

    pub async fn mark_all_read(conn: &Connection, user_id: &str) -> AppResult<u64> {
        let changed = conn
            .execute(
                "UPDATE notifications SET is_read = 1 WHERE user_id = ? AND is_read = 0",
                [user_id],
            )
            .await?;
        Ok(changed)
    }

    pub async fn unread_count(conn: &Connection, user_id: &str) -> AppResult<i64> {
        fetch_i64(
            conn,
            "SELECT COUNT(*) FROM notifications WHERE user_id = ? AND is_read = 0",
            [user_id],
        )
        .await
    }

    pub async fn delete(conn: &Connection, id: &str, user_id: &str) -> AppResult<bool> {
        let changed = conn
            .execute(
                "DELETE FROM notifications WHERE id = ? AND user_id = ?",
                [id, user_id],
            )
            .await?;
        Ok(changed > 0)
    }

    fn from_row(row: &libsql::Row) -> Result<Self, libsql::Error> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            kind: row.get(2)?,
            title: row.get(3)?,
            body: row.get(4)?,
            link: row.get(5)?,
            is_read: row.get::<i64>(6)? != 0,
            created_ts: row.get(7)?,
        })
    }
}
