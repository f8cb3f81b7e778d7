use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use libsql::Connection;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::extract::AppQuery;
use crate::models::{
    ArtistProfile, Artwork, ArtworkCard, ArtworkImage, Facets, RatingSummary, Review,
    ReviewWithAuthor,
};
use crate::routes::{to_amount, AppState};
use crate::services::catalogue::CatalogueFilter;

#[derive(Serialize)]
pub struct ArtworkResponse {
    #[serde(flatten)]
    pub artwork: Artwork,
    pub price: f64,
    pub dimensions: Option<String>,
}

impl ArtworkResponse {
    pub fn from_artwork(artwork: Artwork) -> Self {
        Self {
            price: to_amount(artwork.price_cents),
            dimensions: artwork.dimensions(),
            artwork,
        }
    }
}

#[derive(Serialize)]
pub struct ArtworkCardResponse {
    #[serde(flatten)]
    pub artwork: ArtworkResponse,
    pub artist_name: String,
    pub artist_slug: String,
    pub cover_image_url: Option<String>,
}

impl ArtworkCardResponse {
    pub fn from_card(card: ArtworkCard, state: &AppState) -> Self {
        Self {
            artwork: ArtworkResponse::from_artwork(card.artwork),
            artist_name: card.artist_name,
            artist_slug: card.artist_slug,
            cover_image_url: card.cover_image.map(|p| state.image_url(&p)),
        }
    }
}

#[derive(Serialize)]
pub struct ImageResponse {
    pub id: String,
    pub image_path: String,
    pub url: String,
    pub sort_order: i64,
}

impl ImageResponse {
    pub fn from_image(image: ArtworkImage, state: &AppState) -> Self {
        Self {
            url: state.image_url(&image.image_path),
            id: image.id,
            image_path: image.image_path,
            sort_order: image.sort_order,
        }
    }
}

#[derive(Serialize)]
pub struct ArtistBrief {
    pub id: String,
    pub display_name: String,
    pub slug: String,
    pub location: Option<String>,
    pub avatar_url: Option<String>,
}

impl ArtistBrief {
    pub fn from_profile(profile: ArtistProfile, state: &AppState) -> Self {
        Self {
            avatar_url: profile.avatar_path.as_deref().map(|p| state.image_url(p)),
            id: profile.id,
            display_name: profile.display_name,
            slug: profile.slug,
            location: profile.location,
        }
    }
}

#[derive(Serialize)]
pub struct ArtworkDetailResponse {
    #[serde(flatten)]
    pub artwork: ArtworkResponse,
    pub images: Vec<ImageResponse>,
    pub artist: ArtistBrief,
    pub rating: RatingSummary,
}

#[derive(Serialize)]
pub struct CatalogueResponse {
    pub items: Vec<ArtworkCardResponse>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: i64,
}

#[derive(Serialize)]
pub struct ReviewListResponse {
    pub reviews: Vec<ReviewWithAuthor>,
    #[serde(flatten)]
    pub summary: RatingSummary,
}

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/artworks", get(list_artworks))
        .route("/artworks/facets", get(facets))
        .route("/artworks/{key}", get(get_artwork))
        .route("/artworks/{key}/reviews", get(list_reviews))
}

/// Looks an artwork up by slug, then by id, hiding anything not on public display.
pub async fn find_public(conn: &Connection, key: &str) -> AppResult<Artwork> {
    let artwork = match Artwork::find_by_slug(conn, key).await? {
        Some(artwork) => Some(artwork),
        None => Artwork::find_by_id(conn, key).await?,
    };

    match artwork {
        Some(artwork) if artwork.get_status().is_public() => Ok(artwork),
        _ => Err(AppError::NotFound("Artwork not found".to_string())),
    }
}

async fn list_artworks(
    State(state): State<AppState>,
    AppQuery(filter): AppQuery<CatalogueFilter>,
) -> AppResult<Json<CatalogueResponse>> {
    let query = filter.build()?;
    let conn = state.db.connect()?;
    let (cards, total) = Artwork::search(&conn, &query).await?;

    Ok(Json(CatalogueResponse {
        items: cards
            .into_iter()
            .map(|c| ArtworkCardResponse::from_card(c, &state))
            .collect(),
        total,
        page: query.page,
        per_page: query.per_page,
        total_pages: query.total_pages(total),
    }))
}

async fn facets(State(state): State<AppState>) -> AppResult<Json<Facets>> {
    let conn = state.db.connect()?;
    Ok(Json(Artwork::facets(&conn).await?))
}

async fn get_artwork(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> AppResult<Json<ArtworkDetailResponse>> {
    let conn = state.db.connect()?;
    let mut artwork = find_public(&conn, &key).await?;

    Artwork::increment_views(&conn, &artwork.id).await?;
    artwork.view_count += 1;

    let images = ArtworkImage::list_by_artwork(&conn, &artwork.id)
        .await?
        .into_iter()
        .map(|img| ImageResponse::from_image(img, &state))
        .collect();
    let artist = ArtistProfile::find_by_id(&conn, &artwork.artist_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Artist not found".to_string()))?;
    let rating = Review::summary_for_artwork(&conn, &artwork.id).await?;

    Ok(Json(ArtworkDetailResponse {
        artwork: ArtworkResponse::from_artwork(artwork),
        images,
        artist: ArtistBrief::from_profile(artist, &state),
        rating,
    }))
}

async fn list_reviews(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> AppResult<Json<ReviewListResponse>> {
    let conn = state.db.connect()?;
    let artwork = find_public(&conn, &key).await?;

    let reviews = Review::list_for_artwork(&conn, &artwork.id).await?;
    let summary = Review::summary_for_artwork(&conn, &artwork.id).await?;

    Ok(Json(ReviewListResponse { reviews, summary }))
}
