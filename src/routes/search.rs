use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::extract::AppQuery;
use crate::models::{ArtistProfile, ArtistSummary, Artwork};
use crate::routes::artworks::ArtworkCardResponse;
use crate::routes::AppState;
use crate::services::catalogue::like_pattern;

const MIN_QUERY_CHARS: usize = 2;
const SUGGESTION_LIMIT: i64 = 5;

#[derive(Deserialize)]
pub struct SuggestQuery {
    pub q: Option<String>,
}

#[derive(Serialize, Default)]
pub struct SuggestionsResponse {
    pub artworks: Vec<ArtworkCardResponse>,
    pub artists: Vec<ArtistSummary>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/search/suggestions", get(suggestions))
}

async fn suggestions(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<SuggestQuery>,
) -> AppResult<Json<SuggestionsResponse>> {
    let q = query.q.as_deref().unwrap_or("").trim();
    if q.chars().count() < MIN_QUERY_CHARS {
        return Ok(Json(SuggestionsResponse::default()));
    }

    let pattern = like_pattern(q);
    let conn = state.db.connect()?;

    let artworks = Artwork::suggest(&conn, &pattern, SUGGESTION_LIMIT)
        .await?
        .into_iter()
        .map(|c| ArtworkCardResponse::from_card(c, &state))
        .collect();
    let artists = ArtistProfile::suggest(&conn, &pattern, SUGGESTION_LIMIT).await?;

    Ok(Json(SuggestionsResponse { artworks, artists }))
}
