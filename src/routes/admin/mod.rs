pub mod artworks;
pub mod orders;
pub mod settings;
pub mod stats;
pub mod users;

use axum::Router;

use crate::routes::AppState;

/// Admin API. `create_router` wraps these in `auth_middleware` and `require_admin`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(artworks::routes())
        .merge(orders::routes())
        .merge(users::routes())
        .merge(stats::routes())
        .merge(settings::routes())
}
