use axum::{
    extract::{Extension, Path, State},
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppQuery};
use crate::middleware::AuthUser;
use crate::models::{Role, User, UserFilter};
use crate::routes::AppState;

#[derive(Deserialize)]
pub struct RoleRequest {
    pub role: Role,
}

#[derive(Deserialize)]
pub struct ActiveRequest {
    pub is_active: bool,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/users", get(list_users))
        .route("/admin/users/{id}/role", put(set_role))
        .route("/admin/users/{id}/active", put(set_active))
}

async fn list_users(
    State(state): State<AppState>,
    AppQuery(filter): AppQuery<UserFilter>,
) -> AppResult<Json<Vec<User>>> {
    if let Some(role) = filter.role.as_deref().filter(|r| !r.is_empty()) {
        if Role::parse(role).is_none() {
            return Err(AppError::BadRequest(format!("Unknown role '{}'", role)));
        }
    }

    let conn = state.db.connect()?;
    Ok(Json(User::list(&conn, &filter).await?))
}

async fn set_role(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<RoleRequest>,
) -> AppResult<Json<User>> {
    if id == admin.id && payload.role != Role::Admin {
        return Err(AppError::BadRequest("You cannot remove your own admin role".to_string()));
    }

    let conn = state.db.connect()?;
    if User::find_by_id(&conn, &id).await?.is_none() {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    let user = User::set_role(&conn, &id, payload.role).await?;
    tracing::info!("Admin {} set role of {} to {}", admin.id, user.id, user.role);
    Ok(Json(user))
}

async fn set_active(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<ActiveRequest>,
) -> AppResult<Json<User>> {
    if id == admin.id && !payload.is_active {
        return Err(AppError::BadRequest("You cannot suspend yourself".to_string()));
    }

    let conn = state.db.connect()?;
    if User::find_by_id(&conn, &id).await?.is_none() {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    let user = User::set_active(&conn, &id, payload.is_active).await?;
    tracing::info!(
        "Admin {} {} user {}",
        admin.id,
        if user.is_active { "reactivated" } else { "suspended" },
        user.id
    );
    Ok(Json(user))
}
