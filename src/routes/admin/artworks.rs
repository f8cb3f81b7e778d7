use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, put},
    Json, Router,
};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppQuery};
use crate::models::{ArtistProfile, Artwork, ArtworkStatus, Notification, NotificationKind};
use crate::routes::artworks::{ArtworkCardResponse, ArtworkResponse};
use crate::routes::AppState;

#[derive(Deserialize)]
pub struct StatusFilter {
    pub status: Option<String>,
}

#[derive(Deserialize)]
pub struct ModerateRequest {
    pub status: ArtworkStatus,
    pub reason: Option<String>,
}

#[derive(Deserialize)]
pub struct FeaturedRequest {
    pub is_featured: bool,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/artworks", get(list_artworks))
        .route("/admin/artworks/{id}", delete(delete_artwork))
        .route("/admin/artworks/{id}/status", put(moderate_artwork))
        .route("/admin/artworks/{id}/featured", put(set_featured))
}

async fn list_artworks(
    State(state): State<AppState>,
    AppQuery(filter): AppQuery<StatusFilter>,
) -> AppResult<Json<Vec<ArtworkCardResponse>>> {
    let status = match filter.status.as_deref().filter(|s| !s.is_empty()) {
        Some(s) => Some(
            ArtworkStatus::parse(s)
                .ok_or_else(|| AppError::BadRequest(format!("Unknown artwork status '{}'", s)))?,
        ),
        None => None,
    };

    let conn = state.db.connect()?;
    let cards = Artwork::list_all(&conn, status).await?;

    Ok(Json(
        cards
            .into_iter()
            .map(|c| ArtworkCardResponse::from_card(c, &state))
            .collect(),
    ))
}

async fn moderate_artwork(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<ModerateRequest>,
) -> AppResult<Json<ArtworkResponse>> {
    if !payload.status.is_moderation_target() {
        return Err(AppError::BadRequest(
            "Status must be available, rejected or archived".to_string(),
        ));
    }

    let conn = state.db.connect()?;
    let artwork = Artwork::find_by_id(&conn, &id)
        .await?
        .ok_or_else(|| AppError::NotFound("Artwork not found".to_string()))?;

    if artwork.get_status().is_locked() {
        return Err(AppError::Conflict(
            "Artwork is part of an order and cannot be moderated".to_string(),
        ));
    }

    let reason = payload
        .reason
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty());
    let updated = Artwork::moderate(&conn, &id, payload.status, reason).await?;

    if let Some(artist) = ArtistProfile::find_by_id(&conn, &updated.artist_id).await? {
        let body = match (payload.status, updated.rejection_reason.as_deref()) {
            (ArtworkStatus::Available, _) => format!("'{}' is now live in the gallery", updated.title),
            (ArtworkStatus::Rejected, Some(reason)) => {
                format!("'{}' was not approved: {}", updated.title, reason)
            }
            (ArtworkStatus::Rejected, None) => format!("'{}' was not approved", updated.title),
            _ => format!("'{}' was archived", updated.title),
        };
        Notification::create(
            &conn,
            &artist.user_id,
            NotificationKind::ArtworkModerated,
            "Artwork reviewed",
            &body,
            Some(format!("/artist/artworks/{}", updated.id)),
        )
        .await?;
    }

    tracing::info!(
        "Artwork {} moderated: {} -> {}",
        updated.id,
        artwork.status,
        updated.status
    );
    Ok(Json(ArtworkResponse::from_artwork(updated)))
}

async fn set_featured(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<FeaturedRequest>,
) -> AppResult<Json<ArtworkResponse>> {
    let conn = state.db.connect()?;
    if Artwork::find_by_id(&conn, &id).await?.is_none() {
        return Err(AppError::NotFound("Artwork not found".to_string()));
    }

    let artwork = Artwork::set_featured(&conn, &id, payload.is_featured).await?;
    Ok(Json(ArtworkResponse::from_artwork(artwork)))
}

async fn delete_artwork(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<StatusCode> {
    let conn = state.db.connect()?;
    let artwork = Artwork::find_by_id(&conn, &id)
        .await?
        .ok_or_else(|| AppError::NotFound("Artwork not found".to_string()))?;

    if Artwork::is_ordered(&conn, &artwork.id).await? {
        return Err(AppError::Conflict(
            "Artwork is part of an order and cannot be deleted".to_string(),
        ));
    }

    if let Err(e) = state.storage.delete_folder(&format!("artworks/{}", artwork.id)).await {
        tracing::warn!("Failed to delete images of artwork {}: {}", artwork.id, e);
    }
    Artwork::delete(&conn, &artwork.id).await?;

    tracing::info!("Admin deleted artwork {}", artwork.id);
    Ok(StatusCode::NO_CONTENT)
}
