use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::models::{ArtistProfile, CreateExhibition, Exhibition, UpdateExhibition};
use crate::routes::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/artist/exhibitions", get(list_exhibitions).post(create_exhibition))
        .route(
            "/artist/exhibitions/{id}",
            put(update_exhibition).delete(delete_exhibition),
        )
}

async fn find_owned(conn: &libsql::Connection, artist: &ArtistProfile, id: &str) -> AppResult<Exhibition> {
    Exhibition::find_by_id(conn, id)
        .await?
        .filter(|e| e.artist_id == artist.id)
        .ok_or_else(|| AppError::NotFound("Exhibition not found".to_string()))
}

async fn list_exhibitions(
    State(state): State<AppState>,
    Extension(artist): Extension<ArtistProfile>,
) -> AppResult<Json<Vec<Exhibition>>> {
    let conn = state.db.connect()?;
    Ok(Json(Exhibition::list_by_artist(&conn, &artist.id).await?))
}

async fn create_exhibition(
    State(state): State<AppState>,
    Extension(artist): Extension<ArtistProfile>,
    AppJson(payload): AppJson<CreateExhibition>,
) -> AppResult<(StatusCode, Json<Exhibition>)> {
    let conn = state.db.connect()?;
    let exhibition = Exhibition::create(&conn, &artist.id, payload).await?;
    Ok((StatusCode::CREATED, Json(exhibition)))
}

async fn update_exhibition(
    State(state): State<AppState>,
    Extension(artist): Extension<ArtistProfile>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdateExhibition>,
) -> AppResult<Json<Exhibition>> {
    let conn = state.db.connect()?;
    find_owned(&conn, &artist, &id).await?;
    Ok(Json(Exhibition::update(&conn, &id, payload).await?))
}

async fn delete_exhibition(
    State(state): State<AppState>,
    Extension(artist): Extension<ArtistProfile>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let conn = state.db.connect()?;
    let exhibition = find_owned(&conn, &artist, &id).await?;
    Exhibition::delete(&conn, &exhibition.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
