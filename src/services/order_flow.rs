//! Checkout and order status changes, with their effects on artworks and notifications.

use libsql::Connection;

use crate::error::{AppError, AppResult};
use crate::models::{
    ArtistProfile, Artwork, ArtworkImage, CreateOrder, CreateOrderItem, Notification, NotificationKind, Order,
    OrderStatus, ShippingAddress,
};

/// Artwork ids trimmed, blanks and duplicates dropped, first occurrence kept.
pub fn dedupe_ids(ids: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    ids.into_iter()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty() && seen.insert(id.clone()))
        .collect()
}

/// Reserves every artwork and records a pending order, all or nothing.
pub async fn checkout(
    conn: &Connection,
    buyer_id: &str,
    artwork_ids: Vec<String>,
    shipping_address: ShippingAddress,
) -> AppResult<Order> {
    let artwork_ids = dedupe_ids(artwork_ids);
    if artwork_ids.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".to_string()));
    }
    shipping_address.validate()?;

    let tx = conn.transaction().await?;

    let mut items = Vec::with_capacity(artwork_ids.len());
    let mut artists: Vec<(ArtistProfile, String)> = Vec::new();

    for artwork_id in &artwork_ids {
        let artwork = Artwork::find_by_id(&tx, artwork_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Artwork {} not found", artwork_id)))?;

        let artist = ArtistProfile::find_by_id(&tx, &artwork.artist_id)
            .await?
            .ok_or_else(|| AppError::Internal("Artwork has no artist".to_string()))?;

        if artist.user_id == buyer_id {
            return Err(AppError::BadRequest("You cannot buy your own artwork".to_string()));
        }

        if !Artwork::reserve(&tx, &artwork.id).await? {
            return Err(AppError::Conflict(format!(
                "Artwork '{}' is no longer available",
                artwork.title
            )));
        }

        let cover = ArtworkImage::list_by_artwork(&tx, &artwork.id)
            .await?
            .into_iter()
            .next()
            .map(|img| img.image_path);

        items.push(CreateOrderItem {
            artwork_id: artwork.id.clone(),
            artist_id: artwork.artist_id.clone(),
            title: artwork.title.clone(),
            image_path: cover,
            price_cents: artwork.price_cents,
        });

        match artists.iter_mut().find(|(a, _)| a.id == artist.id) {
            Some((_, titles)) => {
                titles.push_str(", ");
                titles.push_str(&artwork.title);
            }
            None => artists.push((artist, artwork.title.clone())),
        }
    }

    let order = Order::create(
        &tx,
        CreateOrder {
            user_id: buyer_id.to_string(),
            shipping_address,
            items,
        },
    )
    .await?;

    for (artist, titles) in &artists {
        Notification::create(
            &tx,
            &artist.user_id,
            NotificationKind::OrderPlaced,
            "New order",
            &format!("A collector ordered: {}", titles),
            Some("/artist/sales".to_string()),
        )
        .await?;
    }

    tx.commit().await?;

    tracing::info!("Order {} placed for {} artwork(s)", order.id, artwork_ids.len());
    Ok(order)
}

/// Moves an order to `next`, updating its artworks and notifying the buyer.
pub async fn transition(
    conn: &Connection,
    order: &Order,
    next: OrderStatus,
    tracking_number: Option<String>,
) -> AppResult<Order> {
    let current = order.get_status();
    if !current.can_transition_to(next) {
        return Err(AppError::Conflict(format!(
            "Cannot change order from {} to {}",
            current.as_str(),
            next.as_str()
        )));
    }

    let tracking_number = tracking_number
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty() && next == OrderStatus::Shipped);

    let tx = conn.transaction().await?;

    let Some(updated) = Order::update_status(&tx, &order.id, current, next, tracking_number).await? else {
        return Err(AppError::Conflict(format!("Order is no longer {}", current.as_str())));
    };

    let items = Order::get_items(&tx, &order.id).await?;
    for item in &items {
        match next {
            OrderStatus::Paid => Artwork::mark_sold(&tx, &item.artwork_id).await?,
            OrderStatus::Cancelled => Artwork::release(&tx, &item.artwork_id).await?,
            _ => {}
        }
    }

    let body = match (&next, &updated.tracking_number) {
        (OrderStatus::Shipped, Some(tracking)) => {
            format!("Your order has shipped. Tracking number: {}", tracking)
        }
        _ => format!("Your order is now {}", next.as_str()),
    };
    Notification::create(
        &tx,
        &order.user_id,
        NotificationKind::OrderStatus,
        "Order update",
        &body,
        Some(format!("/orders/{}", order.id)),
    )
    .await?;

    tx.commit().await?;

    tracing::info!("Order {} moved from {} to {}", order.id, current.as_str(), next.as_str());
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::dedupe_ids;

    #[test]
    fn dedupe_keeps_first_occurrence_and_drops_blanks() {
        let ids = vec!["b".into(), "a".into(), " b ".into(), "".into(), "c".into(), "a".into()];
        assert_eq!(dedupe_ids(ids), vec!["b", "a", "c"]);
    }
}
