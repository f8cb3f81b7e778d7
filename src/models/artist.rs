use libsql::Connection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::{fetch_all, fetch_optional, now_ts};
use crate::error::{AppError, AppResult};
use crate::services::slug::{unique_slug, SlugTable};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtistProfile {
    pub id: String,
    pub user_id: String,
    pub display_name: String,
    pub slug: String,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub avatar_path: Option<String>,
    pub created_ts: i64,
    pub updated_ts: i64,
}

const COLUMNS: &str =
    "id, user_id, display_name, slug, bio, location, website, avatar_path, created_ts, updated_ts";

impl ArtistProfile {
    fn from_row(row: &libsql::Row) -> Result<Self, libsql::Error> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            display_name: row.get(2)?,
            slug: row.get(3)?,
            bio: row.get(4)?,
            location: row.get(5)?,
            website: row.get(6)?,
            avatar_path: row.get(7)?,
            created_ts: row.get(8)?,
            updated_ts: row.get(9)?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateArtistProfile {
    pub display_name: String,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateArtistProfile {
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
}

/// Directory entry with the number of artworks currently for sale.
#[derive(Debug, Clone, Serialize)]
pub struct ArtistSummary {
    pub id: String,
    pub display_name: String,
    pub slug: String,
    pub location: Option<String>,
    pub avatar_path: Option<String>,
    pub available_artworks: i64,
}

impl ArtistProfile {
    pub async fn find_by_id(conn: &Connection, id: &str) -> AppResult<Option<Self>> {
        fetch_optional(
            conn,
            &format!("SELECT {COLUMNS} FROM artist_profiles WHERE id = ?"),
            [id],
            Self::from_row,
        )
        .await
    }

    pub async fn find_by_user(conn: &Connection, user_id: &str) -> AppResult<Option<Self>> {
        fetch_optional(
            conn,
            &format!("SELECT {COLUMNS} FROM artist_profiles WHERE user_id = ?"),
            [user_id],
            Self::from_row,
        )
        .await
    }

    pub async fn find_by_slug(conn: &Connection, slug: &str) -> AppResult<Option<Self>> {
        fetch_optional(
            conn,
            &format!("SELECT {COLUMNS} FROM artist_profiles WHERE slug = ?"),
            [slug],
            Self::from_row,
        )
        .await
    }

    pub async fn create(conn: &Connection, user_id: &str, data: CreateArtistProfile) -> AppResult<Self> {
        let display_name = data.display_name.trim().to_string();
        if display_name.is_empty() {
            return Err(AppError::BadRequest("Display name is required".to_string()));
        }
        if Self::find_by_user(conn, user_id).await?.is_some() {
            return Err(AppError::Conflict("Artist profile already exists".to_string()));
        }

        let id = Uuid::new_v4().to_string();
        let slug = unique_slug(conn, SlugTable::Artists, &display_name).await?;
        let now = now_ts();

        conn.execute(
            "INSERT INTO artist_profiles (id, user_id, display_name, slug, bio, location, website, created_ts, updated_ts) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            libsql::params![id.clone(), user_id.to_string(), display_name, slug, data.bio, data.location, data.website, now, now],
        )
        .await?;

        Self::find_by_id(conn, &id)
            .await?
            .ok_or_else(|| AppError::Internal("Failed to create artist profile".to_string()))
    }

    /// The slug is fixed at creation so existing links keep working.
    pub async fn update(conn: &Connection, id: &str, data: UpdateArtistProfile) -> AppResult<Self> {
        let current = Self::find_by_id(conn, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Artist not found".to_string()))?;

        let display_name = match data.display_name.map(|n| n.trim().to_string()) {
            Some(n) if n.is_empty() => {
                return Err(AppError::BadRequest("Display name is required".to_string()))
            }
            Some(n) => n,
            None => current.display_name,
        };
        let bio = data.bio.or(current.bio);
        let location = data.location.or(current.location);
        let website = data.website.or(current.website);

        conn.execute(
            "UPDATE artist_profiles SET display_name = ?, bio = ?, location = ?, website = ?, updated_ts = ? WHERE id = ?",
            libsql::params![display_name, bio, location, website, now_ts(), id.to_string()],
        )
        .await?;

        Self::find_by_id(conn, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Artist not found".to_string()))
    }

    pub async fn set_avatar(conn: &Connection, id: &str, avatar_path: &str) -> AppResult<Self> {
        conn.execute(
            "UPDATE artist_profiles SET avatar_path = ?, updated_ts = ? WHERE id = ?",
            libsql::params![avatar_path.to_string(), now_ts(), id.to_string()],
        )
        .await?;

        Self::find_by_id(conn, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Artist not found".to_string()))
    }

    pub async fn list_directory(conn: &Connection) -> AppResult<Vec<ArtistSummary>> {
        fetch_all(
            conn,
            r#"
            SELECT a.id, a.display_name, a.slug, a.location, a.avatar_path,
                   (SELECT COUNT(*) FROM artworks w WHERE w.artist_id = a.id AND w.status = 'available')
            FROM artist_profiles a
            ORDER BY a.display_name COLLATE NOCASE ASC
            "#,
            (),
            |row| {
                Ok(ArtistSummary {
                    id: row.get(0)?,
                    display_name: row.get(1)?,
                    slug: row.get(2)?,
                    location: row.get(3)?,
                    avatar_path: row.get(4)?,
                    available_artworks: row.get(5)?,
                })
            },
        )
        .await
    }

    /// Artists whose display name matches a LIKE pattern.
    pub async fn suggest(conn: &Connection, pattern: &str, limit: i64) -> AppResult<Vec<ArtistSummary>> {
        fetch_all(
            conn,
            r#"
            SELECT a.id, a.display_name, a.slug, a.location, a.avatar_path,
                   (SELECT COUNT(*) FROM artworks w WHERE w.artist_id = a.id AND w.status = 'available')
            FROM artist_profiles a
            WHERE a.display_name LIKE ? ESCAPE '\'
            ORDER BY a.display_name COLLATE NOCASE ASC
            LIMIT ?
            "#,
            libsql::params![pattern.to_string(), limit],
            |row| {
                Ok(ArtistSummary {
                    id: row.get(0)?,
                    display_name: row.get(1)?,
                    slug: row.get(2)?,
                    location: row.get(3)?,
                    avatar_path: row.get(4)?,
                    available_artworks: row.get(5)?,
                })
            },
        )
        .await
    }

    pub async fn count_all(conn: &Connection) -> AppResult<i64> {
        crate::db::fetch_i64(conn, "SELECT COUNT(*) FROM artist_profiles", ()).await
    }
}
