use libsql::Connection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::{fetch_all, fetch_i64, fetch_optional, now_ts};
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Paid,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(OrderStatus::Pending),
            "paid" => Some(OrderStatus::Paid),
            "shipped" => Some(OrderStatus::Shipped),
            "delivered" => Some(OrderStatus::Delivered),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Paid) | (Pending, Cancelled) | (Paid, Shipped) | (Paid, Cancelled) | (Shipped, Delivered)
        )
    }

    /// Paid for and not cancelled: counts as revenue, unlocks reviews and certificates.
    pub fn is_settled(&self) -> bool {
        matches!(self, OrderStatus::Paid | OrderStatus::Shipped | OrderStatus::Delivered)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub name: String,
    pub street: String,
    pub city: String,
    pub state: Option<String>,
    pub zip: String,
    pub country: String,
}

impl ShippingAddress {
    pub fn validate(&self) -> AppResult<()> {
        let required = [
            ("name", &self.name),
            ("street", &self.street),
            ("city", &self.city),
            ("zip", &self.zip),
            ("country", &self.country),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(AppError::BadRequest(format!("Shipping {field} is required")));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub status: String,
    pub total_cents: i64,
    pub shipping_address: String,
    pub tracking_number: Option<String>,
    pub created_ts: i64,
    pub updated_ts: i64,
}

const COLUMNS: &str =
    "id, user_id, status, total_cents, shipping_address, tracking_number, created_ts, updated_ts";

impl Order {
    fn from_row(row: &libsql::Row) -> Result<Self, libsql::Error> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            status: row.get(2)?,
            total_cents: row.get(3)?,
            shipping_address: row.get(4)?,
            tracking_number: row.get(5)?,
            created_ts: row.get(6)?,
            updated_ts: row.get(7)?,
        })
    }
}

/// Snapshot of an artwork at the time it was ordered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub artwork_id: String,
    pub artist_id: String,
    pub title: String,
    pub image_path: Option<String>,
    pub price_cents: i64,
}

const ITEM_COLUMNS: &str = "id, order_id, artwork_id, artist_id, title, image_path, price_cents";

impl OrderItem {
    fn from_row(row: &libsql::Row) -> Result<Self, libsql::Error> {
        Ok(Self {
            id: row.get(0)?,
            order_id: row.get(1)?,
            artwork_id: row.get(2)?,
            artist_id: row.get(3)?,
            title: row.get(4)?,
            image_path: row.get(5)?,
            price_cents: row.get(6)?,
        })
    }
}

#[derive(Debug)]
pub struct CreateOrderItem {
    pub artwork_id: String,
    pub artist_id: String,
    pub title: String,
    pub image_path: Option<String>,
    pub price_cents: i64,
}

#[derive(Debug)]
pub struct CreateOrder {
    pub user_id: String,
    pub shipping_address: ShippingAddress,
    pub items: Vec<CreateOrderItem>,
}

impl Order {
    pub fn get_shipping_address(&self) -> Option<ShippingAddress> {
        serde_json::from_str(&self.shipping_address).ok()
    }

    pub fn get_status(&self) -> OrderStatus {
        OrderStatus::parse(&self.status).unwrap_or(OrderStatus::Pending)
    }

    pub async fn find_by_id(conn: &Connection, id: &str) -> AppResult<Option<Self>> {
        fetch_optional(
            conn,
            &format!("SELECT {COLUMNS} FROM orders WHERE id = ?"),
            [id],
            Self::from_row,
        )
        .await
    }

    pub async fn list_by_user(conn: &Connection, user_id: &str) -> AppResult<Vec<Self>> {
        fetch_all(
            conn,
            &format!("SELECT {COLUMNS} FROM orders WHERE user_id = ? ORDER BY created_ts DESC"),
            [user_id],
            Self::from_row,
        )
        .await
    }

    pub async fn list_all(conn: &Connection, status: Option<OrderStatus>) -> AppResult<Vec<Self>> {
        match status {
            Some(status) => {
                fetch_all(
                    conn,
                    &format!("SELECT {COLUMNS} FROM orders WHERE status = ? ORDER BY created_ts DESC"),
                    [status.as_str()],
                    Self::from_row,
                )
                .await
            }
            None => {
                fetch_all(
                    conn,
                    &format!("SELECT {COLUMNS} FROM orders ORDER BY created_ts DESC"),
                    (),
                    Self::from_row,
                )
                .await
            }
        }
    }

    /// Orders containing at least one work by the given artist.
    pub async fn list_by_artist(conn: &Connection, artist_id: &str) -> AppResult<Vec<Self>> {
        fetch_all(
            conn,
            &format!(
                "SELECT {COLUMNS} FROM orders WHERE id IN (SELECT order_id FROM order_items WHERE artist_id = ?) \
                 ORDER BY created_ts DESC"
            ),
            [artist_id],
            Self::from_row,
        )
        .await
    }

    /// Inserts the order and its items. The total is the sum of item prices.
    pub async fn create(conn: &Connection, data: CreateOrder) -> AppResult<Self> {
        let id = Uuid::new_v4().to_string();
        let total_cents: i64 = data.items.iter().map(|i| i.price_cents).sum();
        let shipping_json = serde_json::to_string(&data.shipping_address)
            .map_err(|e| AppError::Internal(e.to_string()))?;
        let now = now_ts();

        conn.execute(
            "INSERT INTO orders (id, user_id, status, total_cents, shipping_address, created_ts, updated_ts) VALUES (?, ?, 'pending', ?, ?, ?, ?)",
            libsql::params![id.clone(), data.user_id, total_cents, shipping_json, now, now],
        )
        .await?;

        for item in data.items {
            conn.execute(
                "INSERT INTO order_items (id, order_id, artwork_id, artist_id, title, image_path, price_cents) VALUES (?, ?, ?, ?, ?, ?, ?)",
                libsql::params![
                    Uuid::new_v4().to_string(),
                    id.clone(),
                    item.artwork_id,
                    item.artist_id,
                    item.title,
                    item.image_path,
                    item.price_cents
                ],
            )
            .await?;
        }

        Self::find_by_id(conn, &id)
            .await?
            .ok_or_else(|| AppError::Internal("Failed to create order".to_string()))
    }

    /// Moves the order from `from` to `status`. Returns `None` if the order is no longer in `from`.
    pub async fn update_status(
        conn: &Connection,
        id: &str,
        from: OrderStatus,
        status: OrderStatus,
        tracking_number: Option<String>,
    ) -> AppResult<Option<Self>> {
        let changed = conn
            .execute(
                "UPDATE orders SET status = ?, tracking_number = COALESCE(?, tracking_number), updated_ts = ? \
                 WHERE id = ? AND status = ?",
                libsql::params![status.as_str(), tracking_number, now_ts(), id.to_string(), from.as_str()],
            )
            .await?;
        if changed == 0 {
            return Ok(None);
        }

        Self::find_by_id(conn, id).await
    }

    pub async fn get_items(conn: &Connection, order_id: &str) -> AppResult<Vec<OrderItem>> {
        fetch_all(
            conn,
            &format!("SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = ?"),
            [order_id],
            OrderItem::from_row,
        )
        .await
    }

    /// Whether the user holds a settled order containing the artwork.
    pub async fn user_purchased(conn: &Connection, user_id: &str, artwork_id: &str) -> AppResult<bool> {
        let count = fetch_i64(
            conn,
            r#"
            SELECT COUNT(*) FROM orders o JOIN order_items i ON i.order_id = o.id
            WHERE o.user_id = ? AND i.artwork_id = ? AND o.status IN ('paid', 'shipped', 'delivered')
            "#,
            [user_id, artwork_id],
        )
        .await?;
        Ok(count > 0)
    }

    pub async fn count_all(conn: &Connection) -> AppResult<i64> {
        fetch_i64(conn, "SELECT COUNT(*) FROM orders", ()).await
    }

    pub async fn total_revenue(conn: &Connection) -> AppResult<i64> {
        fetch_i64(
            conn,
            "SELECT SUM(total_cents) FROM orders WHERE status IN ('paid', 'shipped', 'delivered')",
            (),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::OrderStatus::{self, *};

    const ALL: [OrderStatus; 5] = [Pending, Paid, Shipped, Delivered, Cancelled];

    #[test]
    fn only_the_forward_path_and_cancellation_are_allowed() {
        let allowed: Vec<(OrderStatus, OrderStatus)> = ALL
            .iter()
            .flat_map(|from| ALL.iter().map(move |to| (*from, *to)))
            .filter(|(from, to)| from.can_transition_to(*to))
            .collect();

        assert_eq!(
            allowed,
            vec![
                (Pending, Paid),
                (Pending, Cancelled),
                (Paid, Shipped),
                (Paid, Cancelled),
                (Shipped, Delivered),
            ]
        );
    }

    #[test]
    fn terminal_statuses_go_nowhere() {
        for next in ALL {
            assert!(!Delivered.can_transition_to(next));
            assert!(!Cancelled.can_transition_to(next));
        }
    }

    #[test]
    fn settled_statuses() {
        assert!(!Pending.is_settled());
        assert!(Paid.is_settled());
        assert!(Shipped.is_settled());
        assert!(Delivered.is_settled());
        assert!(!Cancelled.is_settled());
    }

    #[test]
    fn status_strings_round_trip() {
        for status in ALL {
            assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(OrderStatus::parse("refunded"), None);
    }
}
