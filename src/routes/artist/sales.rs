use axum::{
    extract::{Extension, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::error::AppResult;
use crate::models::{ArtistProfile, Order};
use crate::routes::orders::{OrderItemResponse, OrderResponse};
use crate::routes::{to_amount, AppState};

#[derive(Serialize)]
pub struct SaleResponse {
    pub order_id: String,
    pub status: String,
    pub tracking_number: Option<String>,
    /// Only this artist's works from the order.
    pub items: Vec<OrderItemResponse>,
    pub subtotal_cents: i64,
    pub subtotal: f64,
    pub created_ts: i64,
}

#[derive(Serialize)]
pub struct SalesResponse {
    pub sales: Vec<SaleResponse>,
    /// Sum over settled orders only.
    pub revenue_cents: i64,
    pub revenue: f64,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/artist/sales", get(list_sales))
}

async fn list_sales(
    State(state): State<AppState>,
    Extension(artist): Extension<ArtistProfile>,
) -> AppResult<Json<SalesResponse>> {
    let conn = state.db.connect()?;
    let orders = Order::list_by_artist(&conn, &artist.id).await?;

    let mut sales = Vec::with_capacity(orders.len());
    let mut revenue_cents = 0;
    for order in orders {
        let settled = order.get_status().is_settled();
        let items = Order::get_items(&conn, &order.id)
            .await?
            .into_iter()
            .filter(|i| i.artist_id == artist.id)
            .collect();
        let order = OrderResponse::build(order, items, &state);

        let subtotal_cents: i64 = order.items.iter().map(|i| i.price_cents).sum();
        if settled {
            revenue_cents += subtotal_cents;
        }

        sales.push(SaleResponse {
            order_id: order.id,
            status: order.status,
            tracking_number: order.tracking_number,
            items: order.items,
            subtotal_cents,
            subtotal: to_amount(subtotal_cents),
            created_ts: order.created_ts,
        });
    }

    Ok(Json(SalesResponse {
        sales,
        revenue_cents,
        revenue: to_amount(revenue_cents),
    }))
}
