use axum::{
    extract::{Extension, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::Deserialize;

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::AuthUser;
use crate::models::ShippingAddress;
use crate::routes::orders::OrderResponse;
use crate::routes::AppState;
use crate::services::order_flow;

#[derive(Deserialize)]
pub struct CheckoutRequest {
    pub artwork_ids: Vec<String>,
    pub shipping_address: ShippingAddress,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/checkout", post(checkout))
}

async fn checkout(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    AppJson(payload): AppJson<CheckoutRequest>,
) -> AppResult<(StatusCode, Json<OrderResponse>)> {
    let conn = state.db.connect()?;
    let order = order_flow::checkout(&conn, &user.id, payload.artwork_ids, payload.shipping_address).await?;

    Ok((
        StatusCode::CREATED,
        Json(OrderResponse::load(&conn, order, &state).await?),
    ))
}
