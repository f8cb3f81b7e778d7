use axum::{
    extract::{DefaultBodyLimit, Extension, Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use libsql::Connection;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppMultipart};
use crate::models::{ArtistProfile, Artwork, ArtworkImage, CreateArtwork, UpdateArtwork};
use crate::routes::artworks::{ArtworkResponse, ImageResponse};
use crate::routes::AppState;

use super::{store_uploaded_images, MAX_UPLOAD_BYTES};

#[derive(Serialize)]
pub struct StudioArtworkResponse {
    #[serde(flatten)]
    pub artwork: ArtworkResponse,
    pub images: Vec<ImageResponse>,
}

impl StudioArtworkResponse {
    async fn load(conn: &Connection, artwork: Artwork, state: &AppState) -> AppResult<Self> {
        let images = ArtworkImage::list_by_artwork(conn, &artwork.id)
            .await?
            .into_iter()
            .map(|img| ImageResponse::from_image(img, state))
            .collect();

        Ok(Self {
            artwork: ArtworkResponse::from_artwork(artwork),
            images,
        })
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/artist/artworks", get(list_artworks).post(create_artwork))
        .route(
            "/artist/artworks/{id}",
            get(get_artwork).put(update_artwork).delete(delete_artwork),
        )
        .route(
            "/artist/artworks/{id}/images",
            post(upload_images).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/artist/artworks/{id}/images/{image_id}", delete(delete_image))
}

/// The artwork, if it belongs to this artist. Other artists' works are reported as missing.
async fn find_owned(conn: &Connection, artist: &ArtistProfile, id: &str) -> AppResult<Artwork> {
    Artwork::find_by_id(conn, id)
        .await?
        .filter(|a| a.artist_id == artist.id)
        .ok_or_else(|| AppError::NotFound("Artwork not found".to_string()))
}

fn ensure_unlocked(artwork: &Artwork) -> AppResult<()> {
    if artwork.get_status().is_locked() {
        return Err(AppError::Conflict(
            "Artwork is part of an order and can no longer be changed".to_string(),
        ));
    }
    Ok(())
}

async fn list_artworks(
    State(state): State<AppState>,
    Extension(artist): Extension<ArtistProfile>,
) -> AppResult<Json<Vec<StudioArtworkResponse>>> {
    let conn = state.db.connect()?;
    let artworks = Artwork::list_by_artist(&conn, &artist.id).await?;

    let mut responses = Vec::with_capacity(artworks.len());
    for artwork in artworks {
        responses.push(StudioArtworkResponse::load(&conn, artwork, &state).await?);
    }
    Ok(Json(responses))
}

async fn get_artwork(
    State(state): State<AppState>,
    Extension(artist): Extension<ArtistProfile>,
    Path(id): Path<String>,
) -> AppResult<Json<StudioArtworkResponse>> {
    let conn = state.db.connect()?;
    let artwork = find_owned(&conn, &artist, &id).await?;
    Ok(Json(StudioArtworkResponse::load(&conn, artwork, &state).await?))
}

async fn create_artwork(
    State(state): State<AppState>,
    Extension(artist): Extension<ArtistProfile>,
    AppJson(payload): AppJson<CreateArtwork>,
) -> AppResult<(StatusCode, Json<StudioArtworkResponse>)> {
    let conn = state.db.connect()?;
    let artwork = Artwork::create(&conn, &artist.id, payload).await?;

    tracing::info!("Artist {} submitted artwork {}", artist.slug, artwork.slug);
    Ok((
        StatusCode::CREATED,
        Json(StudioArtworkResponse::load(&conn, artwork, &state).await?),
    ))
}

async fn update_artwork(
    State(state): State<AppState>,
    Extension(artist): Extension<ArtistProfile>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdateArtwork>,
) -> AppResult<Json<StudioArtworkResponse>> {
    let conn = state.db.connect()?;
    find_owned(&conn, &artist, &id).await?;

    let artwork = Artwork::update(&conn, &id, payload).await?;
    Ok(Json(StudioArtworkResponse::load(&conn, artwork, &state).await?))
}

async fn delete_artwork(
    State(state): State<AppState>,
    Extension(artist): Extension<ArtistProfile>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let conn = state.db.connect()?;
    let artwork = find_owned(&conn, &artist, &id).await?;
    ensure_unlocked(&artwork)?;

    if let Err(e) = state.storage.delete_folder(&format!("artworks/{}", artwork.id)).await {
        tracing::warn!("Failed to delete images of artwork {}: {}", artwork.id, e);
    }
    Artwork::delete(&conn, &artwork.id).await?;

    tracing::info!("Artist {} deleted artwork {}", artist.slug, artwork.slug);
    Ok(StatusCode::NO_CONTENT)
}

async fn upload_images(
    State(state): State<AppState>,
    Extension(artist): Extension<ArtistProfile>,
    Path(id): Path<String>,
    AppMultipart(multipart): AppMultipart,
) -> AppResult<Json<StudioArtworkResponse>> {
    let conn = state.db.connect()?;
    let artwork = find_owned(&conn, &artist, &id).await?;
    ensure_unlocked(&artwork)?;

    let paths = store_uploaded_images(&state, &format!("artworks/{}", artwork.id), multipart).await?;
    for path in &paths {
        ArtworkImage::add(&conn, &artwork.id, path).await?;
    }

    Ok(Json(StudioArtworkResponse::load(&conn, artwork, &state).await?))
}

async fn delete_image(
    State(state): State<AppState>,
    Extension(artist): Extension<ArtistProfile>,
    Path((id, image_id)): Path<(String, String)>,
) -> AppResult<Json<StudioArtworkResponse>> {
    let conn = state.db.connect()?;
    let artwork = find_owned(&conn, &artist, &id).await?;
    ensure_unlocked(&artwork)?;

    let image = ArtworkImage::find(&conn, &artwork.id, &image_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Image not found".to_string()))?;

    if let Err(e) = state.storage.delete(&image.image_path).await {
        tracing::warn!("Failed to delete image file {}: {}", image.image_path, e);
    }
    ArtworkImage::delete(&conn, &image.id).await?;

    Ok(Json(StudioArtworkResponse::load(&conn, artwork, &state).await?))
}
