use axum::{
    extract::{Extension, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::auth::{hash_password, issue_token, password::MIN_PASSWORD_LENGTH, verify_password};
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::AuthUser;
use crate::models::{ArtistProfile, CreateUser, Role, User};
use crate::routes::AppState;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[derive(Serialize)]
pub struct MeResponse {
    pub user: User,
    pub artist_profile: Option<ArtistProfile>,
}

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/auth/me", get(me))
}

fn token_for(state: &AppState, user: &User) -> AppResult<String> {
    issue_token(&user.id, &user.role, &state.config.jwt_secret, state.config.jwt_expiry_hours)
        .map_err(|e| AppError::Internal(format!("Failed to issue token: {}", e)))
}

async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let email = payload.email.trim().to_lowercase();
    if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
        return Err(AppError::BadRequest("A valid email is required".to_string()));
    }
    if payload.password.len() < MIN_PASSWORD_LENGTH {
        return Err(AppError::BadRequest(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        )));
    }

    let password_hash = hash_password(&payload.password)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;

    let role = if state.config.admin_email.as_deref() == Some(email.as_str()) {
        Role::Admin
    } else {
        Role::Buyer
    };

    let conn = state.db.connect()?;
    let user = User::create(
        &conn,
        CreateUser {
            email,
            password_hash,
            name: payload.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
            role,
        },
    )
    .await?;

    tracing::info!("Registered user {} as {}", user.id, user.role);

    let token = token_for(&state, &user)?;
    Ok((StatusCode::CREATED, Json(AuthResponse { token, user })))
}

async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let invalid = || AppError::Unauthorized("Invalid email or password".to_string());

    let conn = state.db.connect()?;
    let user = User::find_by_email(&conn, &payload.email)
        .await?
        .ok_or_else(invalid)?;

    let matches = verify_password(&payload.password, &user.password_hash)
        .map_err(|e| AppError::Internal(format!("Failed to verify password: {}", e)))?;
    if !matches {
        tracing::warn!("Failed login for {}", user.email);
        return Err(invalid());
    }
    if !user.is_active {
        return Err(AppError::Forbidden("Account is suspended".to_string()));
    }

    let token = token_for(&state, &user)?;
    Ok(Json(AuthResponse { token, user }))
}

async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> AppResult<Json<MeResponse>> {
    let conn = state.db.connect()?;
    let user = User::find_by_id(&conn, &auth.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    let artist_profile = ArtistProfile::find_by_user(&conn, &auth.id).await?;

    Ok(Json(MeResponse { user, artist_profile }))
}
