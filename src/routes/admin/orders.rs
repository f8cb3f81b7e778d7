use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppQuery};
use crate::models::{Order, OrderStatus, User};
use crate::routes::orders::OrderResponse;
use crate::routes::AppState;
use crate::services::order_flow;

#[derive(Serialize)]
pub struct AdminOrderResponse {
    #[serde(flatten)]
    pub order: OrderResponse,
    pub user: Option<OrderUserInfo>,
}

#[derive(Serialize)]
pub struct OrderUserInfo {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
}

#[derive(Deserialize)]
pub struct StatusFilter {
    pub status: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
    pub tracking_number: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/orders", get(list_orders))
        .route("/admin/orders/{id}", get(get_order))
        .route("/admin/orders/{id}/status", put(update_status))
}

async fn to_admin_response(
    conn: &libsql::Connection,
    order: Order,
    state: &AppState,
) -> AppResult<AdminOrderResponse> {
    let user = User::find_by_id(conn, &order.user_id)
        .await?
        .map(|u| OrderUserInfo {
            id: u.id,
            email: u.email,
            name: u.name,
        });
    let order = OrderResponse::load(conn, order, state).await?;
    Ok(AdminOrderResponse { order, user })
}

async fn list_orders(
    State(state): State<AppState>,
    AppQuery(filter): AppQuery<StatusFilter>,
) -> AppResult<Json<Vec<AdminOrderResponse>>> {
    let status = match filter.status.as_deref().filter(|s| !s.is_empty()) {
        Some(s) => Some(
            OrderStatus::parse(s)
                .ok_or_else(|| AppError::BadRequest(format!("Unknown order status '{}'", s)))?,
        ),
        None => None,
    };

    let conn = state.db.connect()?;
    let orders = Order::list_all(&conn, status).await?;

    let mut responses = Vec::with_capacity(orders.len());
    for order in orders {
        responses.push(to_admin_response(&conn, order, &state).await?);
    }
    Ok(Json(responses))
}

async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<AdminOrderResponse>> {
    let conn = state.db.connect()?;
    let order = Order::find_by_id(&conn, &id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

    Ok(Json(to_admin_response(&conn, order, &state).await?))
}

async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdateStatusRequest>,
) -> AppResult<Json<AdminOrderResponse>> {
    let conn = state.db.connect()?;
    let order = Order::find_by_id(&conn, &id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

    let updated = order_flow::transition(&conn, &order, payload.status, payload.tracking_number).await?;
    Ok(Json(to_admin_response(&conn, updated, &state).await?))
}
