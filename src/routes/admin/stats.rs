use axum::{extract::State, routing::get, Json, Router};

use crate::error::AppResult;
use crate::routes::AppState;
use crate::services::stats::{self, AdminStats};

pub fn routes() -> Router<AppState> {
    Router::new().route("/admin/stats", get(get_stats))
}

async fn get_stats(State(state): State<AppState>) -> AppResult<Json<AdminStats>> {
    let conn = state.db.connect()?;
    let today = chrono::Utc::now().date_naive();
    Ok(Json(stats::collect(&conn, today).await?))
}
