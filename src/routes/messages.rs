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
use crate::models::{Message, Notification, NotificationKind, SendMessage, User};
use crate::routes::artworks::find_public;
use crate::routes::AppState;

#[derive(Serialize)]
pub struct UnreadCount {
    pub count: i64,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/messages", get(inbox).post(send_message))
        .route("/messages/sent", get(sent))
        .route("/messages/unread-count", get(unread_count))
        .route("/messages/{id}/read", post(mark_read))
}

async fn inbox(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> AppResult<Json<Vec<Message>>> {
    let conn = state.db.connect()?;
    Ok(Json(Message::inbox(&conn, &user.id).await?))
}

async fn sent(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> AppResult<Json<Vec<Message>>> {
    let conn = state.db.connect()?;
    Ok(Json(Message::sent(&conn, &user.id).await?))
}

async fn send_message(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    AppJson(mut payload): AppJson<SendMessage>,
) -> AppResult<(StatusCode, Json<Message>)> {
    let conn = state.db.connect()?;

    if User::find_by_id(&conn, &payload.recipient_id).await?.is_none() {
        return Err(AppError::NotFound("Recipient not found".to_string()));
    }
    if let Some(key) = payload.artwork_id.take() {
        payload.artwork_id = Some(find_public(&conn, &key).await?.id);
    }

    let message = Message::send(&conn, &user.id, payload).await?;

    Notification::create(
        &conn,
        &message.recipient_id,
        NotificationKind::NewMessage,
        "New message",
        &format!("{}: {}", user.display_name(), message.subject),
        Some("/messages".to_string()),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(message)))
}

async fn mark_read(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let conn = state.db.connect()?;
    if !Message::mark_read(&conn, &id, &user.id).await? {
        return Err(AppError::NotFound("Message not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn unread_count(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> AppResult<Json<UnreadCount>> {
    let conn = state.db.connect()?;
    let count = Message::unread_count(&conn, &user.id).await?;
    Ok(Json(UnreadCount { count }))
}
