use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    routing::{delete, post},
    Json, Router,
};

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::AuthUser;
use crate::models::{ArtistProfile, Artwork, CreateReview, Notification, NotificationKind, Order, Review};
use crate::routes::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reviews", post(create_review))
        .route("/reviews/{id}", delete(delete_review))
}

async fn create_review(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    AppJson(payload): AppJson<CreateReview>,
) -> AppResult<(StatusCode, Json<Review>)> {
    let conn = state.db.connect()?;
    let artwork = Artwork::find_by_id(&conn, &payload.artwork_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Artwork not found".to_string()))?;

    if !Order::user_purchased(&conn, &user.id, &artwork.id).await? {
        return Err(AppError::Forbidden(
            "Only collectors who bought this artwork can review it".to_string(),
        ));
    }

    let review = Review::create(&conn, &user.id, payload).await?;

    if let Some(artist) = ArtistProfile::find_by_id(&conn, &artwork.artist_id).await? {
        Notification::create(
            &conn,
            &artist.user_id,
            NotificationKind::NewReview,
            "New review",
            &format!("{} rated '{}' {}/5", user.display_name(), artwork.title, review.rating),
            Some(format!("/artworks/{}", artwork.slug)),
        )
        .await?;
    }

    Ok((StatusCode::CREATED, Json(review)))
}

async fn delete_review(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let conn = state.db.connect()?;
    let review = Review::find_by_id(&conn, &id)
        .await?
        .ok_or_else(|| AppError::NotFound("Review not found".to_string()))?;

    if review.user_id != user.id && !user.is_admin() {
        return Err(AppError::Forbidden("Access denied".to_string()));
    }

    Review::delete(&conn, &review.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
