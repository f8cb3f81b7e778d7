use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::extract::AppQuery;
use crate::middleware::AuthUser;
use crate::models::Notification;
use crate::routes::messages::UnreadCount;
use crate::routes::AppState;

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 100;

#[derive(Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub unread_only: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Serialize)]
pub struct MarkAllResponse {
    pub updated: u64,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/notifications", get(list_notifications))
        .route("/notifications/unread-count", get(unread_count))
        .route("/notifications/read-all", post(mark_all_read))
        .route("/notifications/{id}", delete(delete_notification))
        .route("/notifications/{id}/read", post(mark_read))
}

async fn list_notifications(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    AppQuery(query): AppQuery<ListQuery>,
) -> AppResult<Json<Vec<Notification>>> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let offset = query.offset.unwrap_or(0).max(0);

    let conn = state.db.connect()?;
    let notifications =
        Notification::list_for_user(&conn, &user.id, query.unread_only, limit, offset).await?;
    Ok(Json(notifications))
}

async fn unread_count(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> AppResult<Json<UnreadCount>> {
    let conn = state.db.connect()?;
    let count = Notification::unread_count(&conn, &user.id).await?;
    Ok(Json(UnreadCount { count }))
}

async fn mark_read(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let conn = state.db.connect()?;
    if !Notification::mark_read(&conn, &id, &user.id).await? {
        return Err(AppError::NotFound("Notification not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn mark_all_read(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> AppResult<Json<MarkAllResponse>> {
    let conn = state.db.connect()?;
    let updated = Notification::mark_all_read(&conn, &user.id).await?;
    Ok(Json(MarkAllResponse { updated }))
}

async fn delete_notification(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let conn = state.db.connect()?;
    if !Notification::delete(&conn, &id, &user.id).await? {
        return Err(AppError::NotFound("Notification not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}
