use libsql::Connection;

use crate::db::{fetch_i64, now_ts};
use crate::error::AppResult;

pub struct Favorite;

impl Favorite {
    pub async fn exists(conn: &Connection, user_id: &str, artwork_id: &str) -> AppResult<bool> {
        let count = fetch_i64(
            conn,
            "SELECT COUNT(*) FROM favorites WHERE user_id = ? AND artwork_id = ?",
            [user_id, artwork_id],
        )
        .await?;
        Ok(count > 0)
    }

    /// Adds the favorite if absent, removes it otherwise. Returns whether it is now a favorite.
    pub async fn toggle(conn: &Connection, user_id: &str, artwork_id: &str) -> AppResult<bool> {
        if Self::exists(conn, user_id, artwork_id).await? {
            conn.execute(
                "DELETE FROM favorites WHERE user_id = ? AND artwork_id = ?",
                [user_id, artwork_id],
            )
            .await?;
            Ok(false)
        } else {
            conn.execute(
                "INSERT OR IGNORE INTO favorites (user_id, artwork_id, created_ts) VALUES (?, ?, ?)",
                libsql::params![user_id.to_string(), artwork_id.to_string(), now_ts()],
            )
            .await?;
            Ok(true)
        }
    }

    pub async fn artwork_ids(conn: &Connection, user_id: &str) -> AppResult<Vec<String>> {
        crate::db::fetch_all(
            conn,
            "SELECT artwork_id FROM favorites WHERE user_id = ? ORDER BY created_ts DESC",
            [user_id],
            |row| row.get(0),
        )
        .await
    }
}
