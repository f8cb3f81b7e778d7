use axum::{
    extract::{DefaultBodyLimit, Extension, State},
    routing::{get, put},
    Json, Router,
};

use crate::error::AppResult;
use crate::extract::{AppJson, AppMultipart};
use crate::models::{ArtistProfile, UpdateArtistProfile};
use crate::routes::artists::ArtistProfileResponse;
use crate::routes::AppState;

use super::{store_uploaded_images, MAX_UPLOAD_BYTES};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/artist/profile", get(get_profile).put(update_profile))
        .route(
            "/artist/profile/avatar",
            put(upload_avatar).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
}

async fn get_profile(
    State(state): State<AppState>,
    Extension(artist): Extension<ArtistProfile>,
) -> Json<ArtistProfileResponse> {
    Json(ArtistProfileResponse::from_profile(artist, &state))
}

async fn update_profile(
    State(state): State<AppState>,
    Extension(artist): Extension<ArtistProfile>,
    AppJson(payload): AppJson<UpdateArtistProfile>,
) -> AppResult<Json<ArtistProfileResponse>> {
    let conn = state.db.connect()?;
    let profile = ArtistProfile::update(&conn, &artist.id, payload).await?;
    Ok(Json(ArtistProfileResponse::from_profile(profile, &state)))
}

async fn upload_avatar(
    State(state): State<AppState>,
    Extension(artist): Extension<ArtistProfile>,
    AppMultipart(multipart): AppMultipart,
) -> AppResult<Json<ArtistProfileResponse>> {
    let folder = format!("avatars/{}", artist.id);
    let paths = store_uploaded_images(&state, &folder, multipart).await?;

    let conn = state.db.connect()?;
    // Only the last uploaded file is kept as the avatar
    let Some((latest, extra)) = paths.split_last() else {
        return Ok(Json(ArtistProfileResponse::from_profile(artist, &state)));
    };
    for path in extra {
        if let Err(e) = state.storage.delete(path).await {
            tracing::warn!("Failed to delete extra avatar upload {}: {}", path, e);
        }
    }
    if let Some(old) = artist.avatar_path.as_deref() {
        if let Err(e) = state.storage.delete(old).await {
            tracing::warn!("Failed to delete old avatar {}: {}", old, e);
        }
    }

    let profile = ArtistProfile::set_avatar(&conn, &artist.id, latest).await?;
    Ok(Json(ArtistProfileResponse::from_profile(profile, &state)))
}
