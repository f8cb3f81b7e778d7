pub mod admin;
pub mod artist;
pub mod artists;
pub mod artworks;
pub mod auth;
pub mod checkout;
pub mod exhibitions;
pub mod favorites;
pub mod messages;
pub mod notifications;
pub mod orders;
pub mod reviews;
pub mod search;
pub mod settings;

use axum::{middleware, routing::get, Json, Router};
use libsql::Database;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::middleware::auth::{auth_middleware, require_admin, require_artist};
use crate::storage::StorageBackend;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub config: Config,
    pub storage: Arc<dyn StorageBackend>,
}

impl AppState {
    pub fn image_url(&self, path: &str) -> String {
        self.storage.public_url(path)
    }
}

/// Cents to the display amount sent alongside every `*_cents` field.
pub fn to_amount(cents: i64) -> f64 {
    cents as f64 / 100.0
}

pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health))
        .merge(auth::public_routes())
        .merge(artworks::public_routes())
        .merge(search::routes())
        .merge(artists::public_routes())
        .merge(exhibitions::public_routes())
        .merge(settings::routes());

    let protected_routes = Router::new()
        .merge(auth::protected_routes())
        .merge(favorites::routes())
        .merge(checkout::routes())
        .merge(orders::routes())
        .merge(reviews::routes())
        .merge(messages::routes())
        .merge(notifications::routes())
        .merge(artists::protected_routes())
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let artist_routes = artist::routes()
        .layer(middleware::from_fn_with_state(state.clone(), require_artist))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let admin_routes = admin::routes()
        .layer(middleware::from_fn(require_admin))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let api_routes = public_routes
        .merge(protected_routes)
        .merge(artist_routes)
        .merge(admin_routes);

    Router::new()
        .nest("/api", api_routes)
        .nest_service("/uploads", ServeDir::new(&state.config.upload_dir))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
