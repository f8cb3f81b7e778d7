use libsql::params::Params;
use libsql::{Connection, Value};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::{fetch_all, fetch_i64, fetch_optional, now_ts};
use crate::error::{AppError, AppResult};
use crate::services::catalogue::CatalogueQuery;
use crate::services::slug::{unique_slug, SlugTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtworkStatus {
    /// Awaiting moderation.
    Pending,
    Available,
    /// Held by a pending order.
    Reserved,
    Sold,
    Rejected,
    Archived,
}

impl ArtworkStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtworkStatus::Pending => "pending",
            ArtworkStatus::Available => "available",
            ArtworkStatus::Reserved => "reserved",
            ArtworkStatus::Sold => "sold",
            ArtworkStatus::Rejected => "rejected",
            ArtworkStatus::Archived => "archived",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ArtworkStatus::Pending),
            "available" => Some(ArtworkStatus::Available),
            "reserved" => Some(ArtworkStatus::Reserved),
            "sold" => Some(ArtworkStatus::Sold),
            "rejected" => Some(ArtworkStatus::Rejected),
            "archived" => Some(ArtworkStatus::Archived),
            _ => None,
        }
    }

    /// Reserved and sold works belong to an order and are frozen.
    pub fn is_locked(&self) -> bool {
        matches!(self, ArtworkStatus::Reserved | ArtworkStatus::Sold)
    }

    /// Visible outside the artist studio and the admin queue.
    pub fn is_public(&self) -> bool {
        matches!(
            self,
            ArtworkStatus::Available | ArtworkStatus::Reserved | ArtworkStatus::Sold
        )
    }

    /// Statuses an admin may set directly.
    pub fn is_moderation_target(&self) -> bool {
        matches!(
            self,
            ArtworkStatus::Available | ArtworkStatus::Rejected | ArtworkStatus::Archived
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artwork {
    pub id: String,
    pub artist_id: String,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub category: String,
    pub medium: Option<String>,
    pub style: Option<String>,
    pub year: Option<i64>,
    pub width_cm: Option<f64>,
    pub height_cm: Option<f64>,
    pub depth_cm: Option<f64>,
    pub price_cents: i64,
    pub status: String,
    pub is_featured: bool,
    pub view_count: i64,
    pub rejection_reason: Option<String>,
    pub created_ts: i64,
    pub updated_ts: i64,
}

const COLUMNS: &str = "w.id, w.artist_id, w.title, w.slug, w.description, w.category, w.medium, w.style, \
     w.year, w.width_cm, w.height_cm, w.depth_cm, w.price_cents, w.status, w.is_featured, \
     w.view_count, w.rejection_reason, w.created_ts, w.updated_ts";

impl Artwork {
    fn from_row(row: &libsql::Row) -> Result<Self, libsql::Error> {
        Ok(Self {
            id: row.get(0)?,
            artist_id: row.get(1)?,
            title: row.get(2)?,
            slug: row.get(3)?,
            description: row.get(4)?,
            category: row.get(5)?,
            medium: row.get(6)?,
            style: row.get(7)?,
            year: row.get(8)?,
            width_cm: row.get(9)?,
            height_cm: row.get(10)?,
            depth_cm: row.get(11)?,
            price_cents: row.get(12)?,
            status: row.get(13)?,
            is_featured: row.get::<i64>(14)? != 0,
            view_count: row.get(15)?,
            rejection_reason: row.get(16)?,
            created_ts: row.get(17)?,
            updated_ts: row.get(18)?,
        })
    }

    pub fn get_status(&self) -> ArtworkStatus {
        ArtworkStatus::parse(&self.status).unwrap_or(ArtworkStatus::Pending)
    }

    /// `W x H [x D] cm`, or `None` when width or height is missing.
    pub fn dimensions(&self) -> Option<String> {
        let (w, h) = (self.width_cm?, self.height_cm?);
        Some(match self.depth_cm {
            Some(d) => format!("{w} x {h} x {d} cm"),
            None => format!("{w} x {h} cm"),
        })
    }
}

/// Catalogue listing row: an artwork joined with its artist and cover image.
#[derive(Debug, Clone)]
pub struct ArtworkCard {
    pub artwork: Artwork,
    pub artist_name: String,
    pub artist_slug: String,
    pub cover_image: Option<String>,
}

const CARD_COLUMNS: &str = "a.display_name, a.slug, \
     (SELECT image_path FROM artwork_images i WHERE i.artwork_id = w.id ORDER BY i.sort_order ASC LIMIT 1)";

impl ArtworkCard {
    fn from_row(row: &libsql::Row) -> Result<Self, libsql::Error> {
        Ok(Self {
            artwork: Artwork::from_row(row)?,
            artist_name: row.get(19)?,
            artist_slug: row.get(20)?,
            cover_image: row.get(21)?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtworkImage {
    pub id: String,
    pub artwork_id: String,
    pub image_path: String,
    pub sort_order: i64,
}

impl ArtworkImage {
    fn from_row(row: &libsql::Row) -> Result<Self, libsql::Error> {
        Ok(Self {
            id: row.get(0)?,
            artwork_id: row.get(1)?,
            image_path: row.get(2)?,
            sort_order: row.get(3)?,
        })
    }

    pub async fn list_by_artwork(conn: &Connection, artwork_id: &str) -> AppResult<Vec<Self>> {
        fetch_all(
            conn,
            "SELECT id, artwork_id, image_path, sort_order FROM artwork_images WHERE artwork_id = ? ORDER BY sort_order ASC",
            [artwork_id],
            Self::from_row,
        )
        .await
    }

    pub async fn find(conn: &Connection, artwork_id: &str, id: &str) -> AppResult<Option<Self>> {
        fetch_optional(
            conn,
            "SELECT id, artwork_id, image_path, sort_order FROM artwork_images WHERE artwork_id = ? AND id = ?",
            [artwork_id, id],
            Self::from_row,
        )
        .await
    }

    /// Appends an image after the current last one.
    pub async fn add(conn: &Connection, artwork_id: &str, image_path: &str) -> AppResult<Self> {
        let next = fetch_i64(
            conn,
            "SELECT COALESCE(MAX(sort_order) + 1, 0) FROM artwork_images WHERE artwork_id = ?",
            [artwork_id],
        )
        .await?;

        let id = Uuid::new_v4().to_string();
        conn.execute(
            "INSERT INTO artwork_images (id, artwork_id, image_path, sort_order) VALUES (?, ?, ?, ?)",
            libsql::params![id.clone(), artwork_id.to_string(), image_path.to_string(), next],
        )
        .await?;

        Ok(Self {
            id,
            artwork_id: artwork_id.to_string(),
            image_path: image_path.to_string(),
            sort_order: next,
        })
    }

    pub async fn delete(conn: &Connection, id: &str) -> AppResult<()> {
        conn.execute("DELETE FROM artwork_images WHERE id = ?", [id]).await?;
        Ok(())
    }

    pub async fn delete_by_artwork(conn: &Connection, artwork_id: &str) -> AppResult<()> {
        conn.execute("DELETE FROM artwork_images WHERE artwork_id = ?", [artwork_id])
            .await?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateArtwork {
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub medium: Option<String>,
    pub style: Option<String>,
    pub year: Option<i64>,
    pub width_cm: Option<f64>,
    pub height_cm: Option<f64>,
    pub depth_cm: Option<f64>,
    pub price_cents: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateArtwork {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub medium: Option<String>,
    pub style: Option<String>,
    pub year: Option<i64>,
    pub width_cm: Option<f64>,
    pub height_cm: Option<f64>,
    pub depth_cm: Option<f64>,
    pub price_cents: Option<i64>,
}

fn validate_fields(title: &str, category: &str, price_cents: i64, dims: [Option<f64>; 3]) -> AppResult<()> {
    if title.trim().is_empty() {
        return Err(AppError::BadRequest("Title is required".to_string()));
    }
    if category.trim().is_empty() {
        return Err(AppError::BadRequest("Category is required".to_string()));
    }
    if price_cents <= 0 {
        return Err(AppError::BadRequest("Price must be positive".to_string()));
    }
    if dims.iter().flatten().any(|d| !d.is_finite() || *d <= 0.0) {
        return Err(AppError::BadRequest("Dimensions must be positive".to_string()));
    }
    Ok(())
}

/// Distinct filter values across the public catalogue.
#[derive(Debug, Clone, Serialize)]
pub struct Facets {
    pub categories: Vec<String>,
    pub media: Vec<String>,
    pub styles: Vec<String>,
}

impl Artwork {
    pub async fn find_by_id(conn: &Connection, id: &str) -> AppResult<Option<Self>> {
        fetch_optional(
            conn,
            &format!("SELECT {COLUMNS} FROM artworks w WHERE w.id = ?"),
            [id],
            Self::from_row,
        )
        .await
    }

    pub async fn find_by_slug(conn: &Connection, slug: &str) -> AppResult<Option<Self>> {
        fetch_optional(
            conn,
            &format!("SELECT {COLUMNS} FROM artworks w WHERE w.slug = ?"),
            [slug],
            Self::from_row,
        )
        .await
    }

    pub async fn create(conn: &Connection, artist_id: &str, data: CreateArtwork) -> AppResult<Self> {
        validate_fields(
            &data.title,
            &data.category,
            data.price_cents,
            [data.width_cm, data.height_cm, data.depth_cm],
        )?;

        let id = Uuid::new_v4().to_string();
        let title = data.title.trim().to_string();
        let slug = unique_slug(conn, SlugTable::Artworks, &title).await?;
        let now = now_ts();

        conn.execute(
            r#"
            INSERT INTO artworks (
                id, artist_id, title, slug, description, category, medium, style, year,
                width_cm, height_cm, depth_cm, price_cents, status, created_ts, updated_ts
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 'pending', ?, ?)
            "#,
            libsql::params![
                id.clone(),
                artist_id.to_string(),
                title,
                slug,
                data.description,
                data.category.trim().to_string(),
                data.medium,
                data.style,
                data.year,
                data.width_cm,
                data.height_cm,
                data.depth_cm,
                data.price_cents,
                now,
                now
            ],
        )
        .await?;

        Self::find_by_id(conn, &id)
            .await?
            .ok_or_else(|| AppError::Internal("Failed to create artwork".to_string()))
    }

    /// Applies an artist edit. A rejected artwork goes back into the moderation queue.
    pub async fn update(conn: &Connection, id: &str, data: UpdateArtwork) -> AppResult<Self> {
        let current = Self::find_by_id(conn, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Artwork not found".to_string()))?;

        let status = current.get_status();
        if status.is_locked() {
            return Err(AppError::Conflict(
                "Artwork is part of an order and can no longer be edited".to_string(),
            ));
        }

        let title = data.title.map(|t| t.trim().to_string()).unwrap_or(current.title);
        let description = data.description.or(current.description);
        let category = data.category.map(|c| c.trim().to_string()).unwrap_or(current.category);
        let medium = data.medium.or(current.medium);
        let style = data.style.or(current.style);
        let year = data.year.or(current.year);
        let width_cm = data.width_cm.or(current.width_cm);
        let height_cm = data.height_cm.or(current.height_cm);
        let depth_cm = data.depth_cm.or(current.depth_cm);
        let price_cents = data.price_cents.unwrap_or(current.price_cents);

        validate_fields(&title, &category, price_cents, [width_cm, height_cm, depth_cm])?;

        let observed = status;
        let (status, rejection_reason) = if status == ArtworkStatus::Rejected {
            (ArtworkStatus::Pending, None)
        } else {
            (status, current.rejection_reason)
        };

        let changed = conn
            .execute(
                r#"
                UPDATE artworks SET
                    title = ?, description = ?, category = ?, medium = ?, style = ?, year = ?,
                    width_cm = ?, height_cm = ?, depth_cm = ?, price_cents = ?,
                    status = ?, rejection_reason = ?, updated_ts = ?
                WHERE id = ? AND status = ?
                "#,
                libsql::params![
                    title,
                    description,
                    category,
                    medium,
                    style,
                    year,
                    width_cm,
                    height_cm,
                    depth_cm,
                    price_cents,
                    status.as_str(),
                    rejection_reason,
                    now_ts(),
                    id.to_string(),
                    observed.as_str()
                ],
            )
            .await?;
        if changed == 0 {
            return Err(AppError::Conflict(
                "Artwork changed while editing, reload and try again".to_string(),
            ));
        }

        Self::find_by_id(conn, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Artwork not found".to_string()))
    }

    /// Removes the artwork with its images, favorites and reviews, all or nothing.
    pub async fn delete(conn: &Connection, id: &str) -> AppResult<()> {
        let tx = conn.transaction().await?;
        ArtworkImage::delete_by_artwork(&tx, id).await?;
        tx.execute("DELETE FROM favorites WHERE artwork_id = ?", [id]).await?;
        tx.execute("DELETE FROM reviews WHERE artwork_id = ?", [id]).await?;
        tx.execute("DELETE FROM artworks WHERE id = ?", [id]).await?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn list_by_artist(conn: &Connection, artist_id: &str) -> AppResult<Vec<Self>> {
        fetch_all(
            conn,
            &format!("SELECT {COLUMNS} FROM artworks w WHERE w.artist_id = ? ORDER BY w.created_ts DESC"),
            [artist_id],
            Self::from_row,
        )
        .await
    }

    pub async fn list_available_by_artist(conn: &Connection, artist_id: &str) -> AppResult<Vec<ArtworkCard>> {
        fetch_all(
            conn,
            &format!(
                "SELECT {COLUMNS}, {CARD_COLUMNS} FROM artworks w JOIN artist_profiles a ON a.id = w.artist_id \
                 WHERE w.artist_id = ? AND w.status = 'available' ORDER BY w.created_ts DESC"
            ),
            [artist_id],
            ArtworkCard::from_row,
        )
        .await
    }

    /// Admin listing, optionally restricted to one status.
    pub async fn list_all(conn: &Connection, status: Option<ArtworkStatus>) -> AppResult<Vec<ArtworkCard>> {
        let base = format!(
            "SELECT {COLUMNS}, {CARD_COLUMNS} FROM artworks w JOIN artist_profiles a ON a.id = w.artist_id"
        );
        match status {
            Some(status) => {
                fetch_all(
                    conn,
                    &format!("{base} WHERE w.status = ? ORDER BY w.created_ts DESC"),
                    [status.as_str()],
                    ArtworkCard::from_row,
                )
                .await
            }
            None => {
                fetch_all(
                    conn,
                    &format!("{base} ORDER BY w.created_ts DESC"),
                    (),
                    ArtworkCard::from_row,
                )
                .await
            }
        }
    }

    /// Runs a catalogue query, returning one page of cards and the total match count.
    pub async fn search(conn: &Connection, query: &CatalogueQuery) -> AppResult<(Vec<ArtworkCard>, i64)> {
        let from = format!(
            "FROM artworks w JOIN artist_profiles a ON a.id = w.artist_id WHERE {}",
            query.where_clause
        );

        let total = fetch_i64(
            conn,
            &format!("SELECT COUNT(*) {from}"),
            Params::Positional(query.params.clone()),
        )
        .await?;

        let mut params = query.params.clone();
        params.push(Value::Integer(query.limit()));
        params.push(Value::Integer(query.offset()));

        let cards = fetch_all(
            conn,
            &format!(
                "SELECT {COLUMNS}, {CARD_COLUMNS} {from} ORDER BY {} LIMIT ? OFFSET ?",
                query.order_by
            ),
            Params::Positional(params),
            ArtworkCard::from_row,
        )
        .await?;

        Ok((cards, total))
    }

    /// Available artworks whose title matches a LIKE pattern, most viewed first.
    pub async fn suggest(conn: &Connection, pattern: &str, limit: i64) -> AppResult<Vec<ArtworkCard>> {
        fetch_all(
            conn,
            &format!(
                "SELECT {COLUMNS}, {CARD_COLUMNS} FROM artworks w JOIN artist_profiles a ON a.id = w.artist_id \
                 WHERE w.status = 'available' AND w.title LIKE ? ESCAPE '\\' \
                 ORDER BY w.view_count DESC, w.title ASC LIMIT ?"
            ),
            libsql::params![pattern.to_string(), limit],
            ArtworkCard::from_row,
        )
        .await
    }

    pub async fn facets(conn: &Connection) -> AppResult<Facets> {
        async fn distinct(conn: &Connection, column: &str) -> AppResult<Vec<String>> {
            fetch_all(
                conn,
                &format!(
                    "SELECT DISTINCT {column} FROM artworks WHERE status = 'available' AND {column} IS NOT NULL \
                     AND {column} <> '' ORDER BY {column} COLLATE NOCASE ASC"
                ),
                (),
                |row| row.get(0),
            )
            .await
        }

        Ok(Facets {
            categories: distinct(conn, "category").await?,
            media: distinct(conn, "medium").await?,
            styles: distinct(conn, "style").await?,
        })
    }

    pub async fn increment_views(conn: &Connection, id: &str) -> AppResult<()> {
        conn.execute(
            "UPDATE artworks SET view_count = view_count + 1 WHERE id = ?",
            [id],
        )
        .await?;
        Ok(())
    }

    /// Moderation decision. `reason` is stored only for rejections.
    pub async fn moderate(
        conn: &Connection,
        id: &str,
        status: ArtworkStatus,
        reason: Option<String>,
    ) -> AppResult<Self> {
        let reason = if status == ArtworkStatus::Rejected { reason } else { None };
        let changed = conn
            .execute(
                "UPDATE artworks SET status = ?, rejection_reason = ?, updated_ts = ? \
                 WHERE id = ? AND status NOT IN ('reserved', 'sold')",
                libsql::params![status.as_str(), reason, now_ts(), id.to_string()],
            )
            .await?;
        if changed == 0 {
            return Err(AppError::Conflict(
                "Artwork is part of an order and cannot be moderated".to_string(),
            ));
        }

        Self::find_by_id(conn, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Artwork not found".to_string()))
    }

    pub async fn set_featured(conn: &Connection, id: &str, is_featured: bool) -> AppResult<Self> {
        conn.execute(
            "UPDATE artworks SET is_featured = ?, updated_ts = ? WHERE id = ?",
            libsql::params![is_featured as i64, now_ts(), id.to_string()],
        )
        .await?;

        Self::find_by_id(conn, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Artwork not found".to_string()))
    }

    /// Moves an available artwork to reserved. Returns false if it was no longer available.
    pub async fn reserve(conn: &Connection, id: &str) -> AppResult<bool> {
        let changed = conn
            .execute(
                "UPDATE artworks SET status = 'reserved', updated_ts = ? WHERE id = ? AND status = 'available'",
                libsql::params![now_ts(), id.to_string()],
            )
            .await?;
        Ok(changed == 1)
    }

    pub async fn mark_sold(conn: &Connection, id: &str) -> AppResult<()> {
        conn.execute(
            "UPDATE artworks SET status = 'sold', updated_ts = ? WHERE id = ? AND status IN ('reserved', 'available')",
            libsql::params![now_ts(), id.to_string()],
        )
        .await?;
        Ok(())
    }

    /// Returns a reserved or sold artwork to the catalogue.
    pub async fn release(conn: &Connection, id: &str) -> AppResult<()> {
        conn.execute(
            "UPDATE artworks SET status = 'available', updated_ts = ? WHERE id = ? AND status IN ('reserved', 'sold')",
            libsql::params![now_ts(), id.to_string()],
        )
        .await?;
        Ok(())
    }

    pub async fn is_ordered(conn: &Connection, id: &str) -> AppResult<bool> {
        let count = fetch_i64(
            conn,
            "SELECT COUNT(*) FROM order_items WHERE artwork_id = ?",
            [id],
        )
        .await?;
        Ok(count > 0)
    }

    pub async fn count_all(conn: &Connection) -> AppResult<i64> {
        fetch_i64(conn, "SELECT COUNT(*) FROM artworks", ()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artwork(width: Option<f64>, height: Option<f64>, depth: Option<f64>) -> Artwork {
        Artwork {
            id: "a".into(),
            artist_id: "b".into(),
            title: "Harbour at Dusk".into(),
            slug: "harbour-at-dusk".into(),
            description: None,
            category: "Painting".into(),
            medium: Some("Oil on canvas".into()),
            style: None,
            year: Some(2024),
            width_cm: width,
            height_cm: height,
            depth_cm: depth,
            price_cents: 120_000,
            status: "available".into(),
            is_featured: false,
            view_count: 0,
            rejection_reason: None,
            created_ts: 0,
            updated_ts: 0,
        }
    }

    #[test]
    fn dimensions_need_width_and_height() {
        assert_eq!(artwork(Some(60.0), Some(80.5), None).dimensions().as_deref(), Some("60 x 80.5 cm"));
        assert_eq!(
            artwork(Some(30.0), Some(30.0), Some(4.0)).dimensions().as_deref(),
            Some("30 x 30 x 4 cm")
        );
        assert_eq!(artwork(Some(30.0), None, Some(4.0)).dimensions(), None);
    }

    #[test]
    fn locked_and_moderation_statuses() {
        assert!(ArtworkStatus::Reserved.is_locked());
        assert!(ArtworkStatus::Sold.is_locked());
        assert!(!ArtworkStatus::Rejected.is_locked());
        assert!(ArtworkStatus::Available.is_moderation_target());
        assert!(!ArtworkStatus::Sold.is_moderation_target());
        assert!(!ArtworkStatus::Pending.is_moderation_target());
    }

    #[test]
    fn field_validation() {
        assert!(validate_fields("Dusk", "Painting", 100, [None, None, None]).is_ok());
        assert!(validate_fields(" ", "Painting", 100, [None, None, None]).is_err());
        assert!(validate_fields("Dusk", "Painting", 0, [None, None, None]).is_err());
        assert!(validate_fields("Dusk", "Painting", 100, [Some(-2.0), None, None]).is_err());
    }
}
