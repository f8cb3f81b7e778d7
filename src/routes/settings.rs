use axum::{extract::State, routing::get, Json, Router};

use crate::error::AppResult;
use crate::models::{Setting, SiteSettings};
use crate::routes::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/settings", get(get_site_settings))
}

async fn get_site_settings(State(state): State<AppState>) -> AppResult<Json<SiteSettings>> {
    let conn = state.db.connect()?;
    let settings = Setting::get_site_settings(&conn).await?;
    Ok(Json(settings))
}
