use libsql::Connection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::{fetch_all, fetch_i64, fetch_optional, now_ts};
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub sender_id: String,
    pub recipient_id: String,
    pub artwork_id: Option<String>,
    pub subject: String,
    pub body: String,
    pub is_read: bool,
    pub created_ts: i64,
}

const COLUMNS: &str = "id, sender_id, recipient_id, artwork_id, subject, body, is_read, created_ts";

impl Message {
    fn from_row(row: &libsql::Row) -> Result<Self, libsql::Error> {
        Ok(Self {
            id: row.get(0)?,
            sender_id: row.get(1)?,
            recipient_id: row.get(2)?,
            artwork_id: row.get(3)?,
            subject: row.get(4)?,
            body: row.get(5)?,
            is_read: row.get::<i64>(6)? != 0,
            created_ts: row.get(7)?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct SendMessage {
    pub recipient_id: String,
    pub artwork_id: Option<String>,
    pub subject: String,
    pub body: String,
}

impl Message {
    pub async fn find_by_id(conn: &Connection, id: &str) -> AppResult<Option<Self>> {
        fetch_optional(
            conn,
            &format!("SELECT {COLUMNS} FROM messages WHERE id = ?"),
            [id],
            Self::from_row,
        )
        .await
    }

    pub async fn send(conn: &Connection, sender_id: &str, data: SendMessage) -> AppResult<Self> {
        if sender_id == data.recipient_id {
            return Err(AppError::BadRequest("You cannot message yourself".to_string()));
        }
        let subject = data.subject.trim().to_string();
        let body = data.body.trim().to_string();
        if subject.is_empty() || body.is_empty() {
            return Err(AppError::BadRequest("Subject and body are required".to_string()));
        }

        let id = Uuid::new_v4().to_string();
        conn.execute(
            "INSERT INTO messages (id, sender_id, recipient_id, artwork_id, subject, body, is_read, created_ts) VALUES (?, ?, ?, ?, ?, ?, 0, ?)",
            libsql::params![id.clone(), sender_id.to_string(), data.recipient_id, data.artwork_id, subject, body, now_ts()],
        )
        .await?;

        Self::find_by_id(conn, &id)
            .await?
            .ok_or_else(|| AppError::Internal("Failed to send message".to_string()))
    }

    pub async fn inbox(conn: &Connection, user_id: &str) -> AppResult<Vec<Self>> {
        fetch_all(
            conn,
            &format!("SELECT {COLUMNS} FROM messages WHERE recipient_id = ? ORDER BY created_ts DESC, rowid DESC"),
            [user_id],
            Self::from_row,
        )
        .await
    }

    pub async fn sent(conn: &Connection, user_id: &str) -> AppResult<Vec<Self>> {
        fetch_all(
            conn,
            &format!("SELECT {COLUMNS} FROM messages WHERE sender_id = ? ORDER BY created_ts DESC, rowid DESC"),
            [user_id],
            Self::from_row,
        )
        .await
    }

    /// Only the recipient can mark a message read. Returns false if no such message.
    pub async fn mark_read(conn: &Connection, id: &str, recipient_id: &str) -> AppResult<bool> {
        let changed = conn
            .execute(
                "UPDATE messages SET is_read = 1 WHERE id = ? AND recipient_id = ?",
                [id, recipient_id],
            )
            .await?;
        Ok(changed > 0)
    }

    pub async fn unread_count(conn: &Connection, user_id: &str) -> AppResult<i64> {
        fetch_i64(
            conn,
            "SELECT COUNT(*) FROM messages WHERE recipient_id = ? AND is_read = 0",
            [user_id],
        )
        .await
    }
}
