use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::extract::AppQuery;
use crate::models::Exhibition;
use crate::routes::AppState;

#[derive(Deserialize)]
pub struct ExhibitionQuery {
    /// Artist slug.
    pub artist: Option<String>,
    #[serde(default)]
    pub current: bool,
}

#[derive(Serialize)]
pub struct PublicExhibition {
    #[serde(flatten)]
    pub exhibition: Exhibition,
    pub artist_name: String,
    pub artist_slug: String,
}

pub fn public_routes() -> Router<AppState> {
    Router::new().route("/exhibitions", get(list_exhibitions))
}

async fn list_exhibitions(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ExhibitionQuery>,
) -> AppResult<Json<Vec<PublicExhibition>>> {
    let conn = state.db.connect()?;
    let artist = query.artist.as_deref().map(str::trim).filter(|s| !s.is_empty());

    let exhibitions = Exhibition::list_public(&conn, artist, query.current)
        .await?
        .into_iter()
        .map(|(exhibition, artist_name, artist_slug)| PublicExhibition {
            exhibition,
            artist_name,
            artist_slug,
        })
        .collect();

    Ok(Json(exhibitions))
}
