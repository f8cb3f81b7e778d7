use axum::{
    body::Body,
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::auth::verify_token;
use crate::error::AppError;
use crate::models::{ArtistProfile, Role, User};
use crate::routes::AppState;

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| self.email.clone())
    }
}

impl From<User> for AuthUser {
    fn from(user: User) -> Self {
        Self {
            role: user.get_role(),
            id: user.id,
            email: user.email,
            name: user.name,
        }
    }
}

/// Resolves the bearer token to an active user and stores it as an `AuthUser` extension.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    let token = match token {
        Some(t) => t,
        None => {
            return AppError::Unauthorized("Missing authorization header".to_string()).into_response()
        }
    };

    let claims = match verify_token(token, &state.config.jwt_secret) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::warn!("JWT decode error: {}", e);
            return AppError::Unauthorized("Invalid token".to_string()).into_response();
        }
    };

    let user = match state.db.connect() {
        Ok(conn) => User::find_by_id(&conn, &claims.sub).await,
        Err(e) => Err(AppError::from(e)),
    };

    let user = match user {
        Ok(Some(user)) => user,
        Ok(None) => return AppError::Unauthorized("User not found".to_string()).into_response(),
        Err(e) => return e.into_response(),
    };

    if !user.is_active {
        tracing::warn!("Suspended user {} attempted access", user.id);
        return AppError::Forbidden("Account is suspended".to_string()).into_response();
    }

    req.extensions_mut().insert(AuthUser::from(user));
    next.run(req).await
}

pub async fn require_admin(req: Request<Body>, next: Next) -> Response {
    match req.extensions().get::<AuthUser>() {
        Some(user) if user.is_admin() => next.run(req).await,
        Some(_) => AppError::Forbidden("Admin access required".to_string()).into_response(),
        None => AppError::Unauthorized("Authentication required".to_string()).into_response(),
    }
}

/// Loads the caller's artist profile into the request, rejecting users without one.
pub async fn require_artist(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let user_id = match req.extensions().get::<AuthUser>() {
        Some(user) => user.id.clone(),
        None => return AppError::Unauthorized("Authentication required".to_string()).into_response(),
    };

    let profile = match state.db.connect() {
        Ok(conn) => ArtistProfile::find_by_user(&conn, &user_id).await,
        Err(e) => Err(AppError::from(e)),
    };

    match profile {
        Ok(Some(profile)) => {
            req.extensions_mut().insert(profile);
            next.run(req).await
        }
        Ok(None) => AppError::Forbidden("Artist profile required".to_string()).into_response(),
        Err(e) => e.into_response(),
    }
}
