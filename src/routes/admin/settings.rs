use axum::{
    extract::State,
    routing::get,
    Json, Router,
};

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::models::{Setting, SiteSettings, UpdateSiteSettings};
use crate::routes::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/admin/settings", get(get_settings).put(update_settings))
}

async fn get_settings(State(state): State<AppState>) -> AppResult<Json<SiteSettings>> {
    let conn = state.db.connect()?;
    Ok(Json(Setting::get_site_settings(&conn).await?))
}

async fn update_settings(
    State(state): State<AppState>,
    AppJson(payload): AppJson<UpdateSiteSettings>,
) -> AppResult<Json<SiteSettings>> {
    let conn = state.db.connect()?;
    let settings = Setting::update_site_settings(&conn, payload).await?;
    tracing::info!("Site settings updated");
    Ok(Json(settings))
}
