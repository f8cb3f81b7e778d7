use axum::{
    extract::{Extension, Path, State},
    response::Html,
    routing::{get, post},
    Json, Router,
};
use libsql::Connection;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::{ArtistProfile, Artwork, Order, OrderItem, OrderStatus, Setting, ShippingAddress, User};
use crate::routes::{to_amount, AppState};
use crate::services::{certificate, order_flow};

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub user_id: String,
    pub status: String,
    pub total_cents: i64,
    pub total: f64,
    pub shipping_address: Option<ShippingAddress>,
    pub tracking_number: Option<String>,
    pub items: Vec<OrderItemResponse>,
    pub created_ts: i64,
    pub updated_ts: i64,
}

#[derive(Serialize)]
pub struct OrderItemResponse {
    pub artwork_id: String,
    pub artist_id: String,
    pub title: String,
    pub image_url: Option<String>,
    pub price_cents: i64,
    pub price: f64,
}

impl OrderResponse {
    pub fn build(order: Order, items: Vec<OrderItem>, state: &AppState) -> Self {
        let items = items
            .into_iter()
            .map(|item| OrderItemResponse {
                image_url: item.image_path.as_deref().map(|p| state.image_url(p)),
                artwork_id: item.artwork_id,
                artist_id: item.artist_id,
                title: item.title,
                price: to_amount(item.price_cents),
                price_cents: item.price_cents,
            })
            .collect();

        Self {
            shipping_address: order.get_shipping_address(),
            total: to_amount(order.total_cents),
            id: order.id,
            user_id: order.user_id,
            status: order.status,
            total_cents: order.total_cents,
            tracking_number: order.tracking_number,
            items,
            created_ts: order.created_ts,
            updated_ts: order.updated_ts,
        }
    }

    pub async fn load(conn: &Connection, order: Order, state: &AppState) -> AppResult<Self> {
        let items = Order::get_items(conn, &order.id).await?;
        Ok(Self::build(order, items, state))
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders))
        .route("/orders/{id}", get(get_order))
        .route("/orders/{id}/cancel", post(cancel_order))
        .route("/orders/{id}/certificate/{artwork_id}", get(get_certificate))
}

/// The order, if the caller owns it or is an admin.
async fn find_visible(conn: &Connection, id: &str, user: &AuthUser) -> AppResult<Order> {
    let order = Order::find_by_id(conn, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

    if order.user_id != user.id && !user.is_admin() {
        return Err(AppError::Forbidden("Access denied".to_string()));
    }
    Ok(order)
}

async fn list_orders(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> AppResult<Json<Vec<OrderResponse>>> {
    let conn = state.db.connect()?;
    let orders = Order::list_by_user(&conn, &user.id).await?;

    let mut responses = Vec::with_capacity(orders.len());
    for order in orders {
        responses.push(OrderResponse::load(&conn, order, &state).await?);
    }

    Ok(Json(responses))
}

async fn get_order(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> AppResult<Json<OrderResponse>> {
    let conn = state.db.connect()?;
    let order = find_visible(&conn, &id, &user).await?;
    Ok(Json(OrderResponse::load(&conn, order, &state).await?))
}

async fn cancel_order(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> AppResult<Json<OrderResponse>> {
    let conn = state.db.connect()?;
    let order = Order::find_by_id(&conn, &id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

    if order.user_id != user.id {
        return Err(AppError::Forbidden("Access denied".to_string()));
    }
    if order.get_status() != OrderStatus::Pending {
        return Err(AppError::Conflict(
            "Only pending orders can be cancelled".to_string(),
        ));
    }

    let updated = order_flow::transition(&conn, &order, OrderStatus::Cancelled, None).await?;
    Ok(Json(OrderResponse::load(&conn, updated, &state).await?))
}

async fn get_certificate(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((id, artwork_id)): Path<(String, String)>,
) -> AppResult<Html<String>> {
    let conn = state.db.connect()?;
    let order = find_visible(&conn, &id, &user).await?;

    if !order.get_status().is_settled() {
        return Err(AppError::Conflict(
            "Certificates are issued once an order is paid".to_string(),
        ));
    }

    let item = Order::get_items(&conn, &order.id)
        .await?
        .into_iter()
        .find(|i| i.artwork_id == artwork_id)
        .ok_or_else(|| AppError::NotFound("Artwork is not part of this order".to_string()))?;

    let artwork = Artwork::find_by_id(&conn, &item.artwork_id).await?;
    let artist_name = ArtistProfile::find_by_id(&conn, &item.artist_id)
        .await?
        .map(|a| a.display_name)
        .unwrap_or_default();
    let buyer_name = match User::find_by_id(&conn, &order.user_id).await? {
        Some(buyer) => buyer.display_name(),
        None => order
            .get_shipping_address()
            .map(|a| a.name)
            .unwrap_or_default(),
    };
    let settings = Setting::get_site_settings(&conn).await?;

    let html = certificate::render(certificate::CertificateInput {
        gallery_name: &settings.gallery_name,
        order_id: &order.id,
        artwork_id: &item.artwork_id,
        price_cents: item.price_cents,
        title: &item.title,
        artist_name: &artist_name,
        year: artwork.as_ref().and_then(|a| a.year),
        medium: artwork.as_ref().and_then(|a| a.medium.as_deref()),
        dimensions: artwork.as_ref().and_then(|a| a.dimensions()),
        buyer_name: &buyer_name,
        purchased_ts: order.created_ts,
    })?;

    tracing::debug!("Rendered certificate for order {} artwork {}", order.id, item.artwork_id);
    Ok(Html(html))
}
