use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::AuthUser;
use crate::models::{ArtistProfile, ArtistSummary, Artwork, CreateArtistProfile, Exhibition, Role, User};
use crate::routes::artworks::ArtworkCardResponse;
use crate::routes::AppState;

#[derive(Serialize)]
pub struct ArtistProfileResponse {
    #[serde(flatten)]
    pub profile: ArtistProfile,
    pub avatar_url: Option<String>,
}

impl ArtistProfileResponse {
    pub fn from_profile(profile: ArtistProfile, state: &AppState) -> Self {
        Self {
            avatar_url: profile.avatar_path.as_deref().map(|p| state.image_url(p)),
            profile,
        }
    }
}

#[derive(Serialize)]
pub struct ArtistSummaryResponse {
    #[serde(flatten)]
    pub summary: ArtistSummary,
    pub avatar_url: Option<String>,
}

#[derive(Serialize)]
pub struct ArtistPageResponse {
    pub artist: ArtistProfileResponse,
    pub artworks: Vec<ArtworkCardResponse>,
    pub exhibitions: Vec<Exhibition>,
}

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/artists", get(list_artists))
        .route("/artists/{slug}", get(get_artist))
}

pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/artist/register", post(register_artist))
}

async fn list_artists(State(state): State<AppState>) -> AppResult<Json<Vec<ArtistSummaryResponse>>> {
    let conn = state.db.connect()?;
    let artists = ArtistProfile::list_directory(&conn).await?;

    Ok(Json(
        artists
            .into_iter()
            .map(|summary| ArtistSummaryResponse {
                avatar_url: summary.avatar_path.as_deref().map(|p| state.image_url(p)),
                summary,
            })
            .collect(),
    ))
}

async fn get_artist(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<ArtistPageResponse>> {
    let conn = state.db.connect()?;
    let profile = ArtistProfile::find_by_slug(&conn, &slug)
        .await?
        .ok_or_else(|| AppError::NotFound("Artist not found".to_string()))?;

    let artworks = Artwork::list_available_by_artist(&conn, &profile.id)
        .await?
        .into_iter()
        .map(|c| ArtworkCardResponse::from_card(c, &state))
        .collect();
    let exhibitions = Exhibition::list_by_artist(&conn, &profile.id).await?;

    Ok(Json(ArtistPageResponse {
        artist: ArtistProfileResponse::from_profile(profile, &state),
        artworks,
        exhibitions,
    }))
}

async fn register_artist(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    AppJson(payload): AppJson<CreateArtistProfile>,
) -> AppResult<(StatusCode, Json<ArtistProfileResponse>)> {
    let conn = state.db.connect()?;
    let tx = conn.transaction().await?;

    let profile = ArtistProfile::create(&tx, &user.id, payload).await?;
    if user.role == Role::Buyer {
        User::set_role(&tx, &user.id, Role::Artist).await?;
    }

    tx.commit().await?;

    tracing::info!("User {} opened artist profile {}", user.id, profile.slug);
    Ok((
        StatusCode::CREATED,
        Json(ArtistProfileResponse::from_profile(profile, &state)),
    ))
}
