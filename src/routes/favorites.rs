use axum::{
    extract::{Extension, Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::AuthUser;
use crate::models::{Artwork, Favorite};
use crate::routes::artworks::{find_public, ArtworkResponse};
use crate::routes::AppState;

#[derive(Serialize)]
pub struct ToggleResponse {
    pub artwork_id: String,
    pub is_favorite: bool,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/favorites", get(list_favorites))
        .route("/favorites/{artwork_id}", post(toggle_favorite))
}

async fn list_favorites(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> AppResult<Json<Vec<ArtworkResponse>>> {
    let conn = state.db.connect()?;
    let ids = Favorite::artwork_ids(&conn, &user.id).await?;

    let mut artworks = Vec::with_capacity(ids.len());
    for id in ids {
        // Favorites of works later archived or sent back to moderation stay hidden
        match Artwork::find_by_id(&conn, &id).await? {
            Some(artwork) if artwork.get_status().is_public() => {
                artworks.push(ArtworkResponse::from_artwork(artwork));
            }
            _ => {}
        }
    }

    Ok(Json(artworks))
}

async fn toggle_favorite(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(artwork_id): Path<String>,
) -> AppResult<Json<ToggleResponse>> {
    let conn = state.db.connect()?;
    let artwork = find_public(&conn, &artwork_id).await?;

    let is_favorite = Favorite::toggle(&conn, &user.id, &artwork.id).await?;
    Ok(Json(ToggleResponse {
        artwork_id: artwork.id,
        is_favorite,
    }))
}
