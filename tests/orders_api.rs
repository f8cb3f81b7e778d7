//! Checkout, order status changes, certificates, reviews, and admin stats.

mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

use art_gallery::error::AppError;
use art_gallery::models::{Artwork, ArtworkStatus, CreateReview, Order, OrderStatus, Review, UpdateArtwork};
use art_gallery::services::certificate::{certificate_number, verification_code};
use art_gallery::services::order_flow;

async fn artwork_status(app: &TestApp, artist_token: &str, id: &str) -> String {
    let (_, artwork) = app.get(&format!("/api/artist/artworks/{id}"), Some(artist_token)).await;
    artwork["status"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn checkout_reserves_and_blocks_a_second_buyer() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let (artist, _) = app.artist("ada@example.com", "Ada Lane").await;
    let first = app.listed_artwork(&artist, &admin, "Blue Harbour", 50000).await;
    let second = app.listed_artwork(&artist, &admin, "Red Field", 70000).await;

    let sam = app.register("sam@example.com", "Sam").await;
    let kim = app.register("kim@example.com", "Kim").await;

    let (status, order) = app.checkout(&sam, &[&first, &second, &first]).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["status"], "pending");
    assert_eq!(order["total_cents"], 120000);
    assert_eq!(order["items"].as_array().unwrap().len(), 2);
    assert_eq!(order["shipping_address"]["city"], "Porto");

    assert_eq!(artwork_status(&app, &artist.token, &first).await, "reserved");
    let (_, page) = app.get("/api/artworks", None).await;
    assert_eq!(page["total"], 0);

    let (status, body) = app.checkout(&kim, &[&first]).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("Blue Harbour"));

    // The artist was told about the order once
    let (_, notes) = app.get("/api/notifications", Some(&artist.token)).await;
    let placed = notes
        .as_array()
        .unwrap()
        .iter()
        .filter(|n| n["kind"] == "order_placed")
        .count();
    assert_eq!(placed, 1);

    // Reserved works are frozen for the artist
    let (status, _) = app
        .put(&format!("/api/artist/artworks/{first}"), Some(&artist.token), json!({ "price_cents": 1 }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn failed_checkout_rolls_back_every_reservation() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let (artist, _) = app.artist("ada@example.com", "Ada Lane").await;
    let free = app.listed_artwork(&artist, &admin, "Blue Harbour", 50000).await;
    let taken = app.listed_artwork(&artist, &admin, "Red Field", 70000).await;

    let sam = app.register("sam@example.com", "Sam").await;
    let kim = app.register("kim@example.com", "Kim").await;
    app.checkout(&sam, &[&taken]).await;

    let (status, _) = app.checkout(&kim, &[&free, &taken]).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(artwork_status(&app, &artist.token, &free).await, "available");

    let (_, orders) = app.get("/api/orders", Some(&kim.token)).await;
    assert_eq!(orders, json!([]));
}

#[tokio::test]
async fn checkout_validation() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let (artist, _) = app.artist("ada@example.com", "Ada Lane").await;
    let id = app.listed_artwork(&artist, &admin, "Blue Harbour", 50000).await;
    let sam = app.register("sam@example.com", "Sam").await;

    let (status, _) = app.checkout(&sam, &[]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.checkout(&artist, &[&id]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.checkout(&sam, &["no-such-artwork"]).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .post(
            "/api/checkout",
            Some(&sam.token),
            json!({
                "artwork_ids": [id],
                "shipping_address": { "name": "Sam", "street": " ", "city": "Porto", "zip": "1", "country": "PT" }
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Shipping street is required");
}

#[tokio::test]
async fn order_lifecycle_updates_artworks_and_notifies_the_buyer() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let (artist, _) = app.artist("ada@example.com", "Ada Lane").await;
    let id = app.listed_artwork(&artist, &admin, "Blue Harbour", 50000).await;
    let sam = app.register("sam@example.com", "Sam").await;

    let (_, order) = app.checkout(&sam, &[&id]).await;
    let order_id = order["id"].as_str().unwrap();

    let (status, _) = app.set_order_status(&admin, order_id, "shipped").await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app.set_order_status(&admin, order_id, "paid").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "paid");
    assert_eq!(body["user"]["email"], "sam@example.com");
    assert_eq!(artwork_status(&app, &artist.token, &id).await, "sold");

    let (status, body) = app
        .put(
            &format!("/api/admin/orders/{order_id}/status"),
            Some(&admin.token),
            json!({ "status": "shipped", "tracking_number": "PT123456789" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tracking_number"], "PT123456789");

    let (status, _) = app.set_order_status(&admin, order_id, "delivered").await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.set_order_status(&admin, order_id, "cancelled").await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, notes) = app.get("/api/notifications", Some(&sam.token)).await;
    let notes = notes.as_array().unwrap();
    assert_eq!(notes.len(), 3);
    assert!(notes.iter().all(|n| n["kind"] == "order_status"));
    assert!(notes
        .iter()
        .any(|n| n["body"].as_str().unwrap().contains("PT123456789")));

    let (_, listed) = app.get("/api/admin/orders?status=delivered", Some(&admin.token)).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn buyers_cancel_only_their_own_pending_orders() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let (artist, _) = app.artist("ada@example.com", "Ada Lane").await;
    let id = app.listed_artwork(&artist, &admin, "Blue Harbour", 50000).await;
    let sam = app.register("sam@example.com", "Sam").await;
    let kim = app.register("kim@example.com", "Kim").await;

    let (_, order) = app.checkout(&sam, &[&id]).await;
    let order_id = order["id"].as_str().unwrap();

    let (status, _) = app.get(&format!("/api/orders/{order_id}"), Some(&kim.token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app
        .post(&format!("/api/orders/{order_id}/cancel"), Some(&kim.token), json!({}))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .post(&format!("/api/orders/{order_id}/cancel"), Some(&sam.token), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "cancelled");
    assert_eq!(artwork_status(&app, &artist.token, &id).await, "available");

    let (status, _) = app
        .post(&format!("/api/orders/{order_id}/cancel"), Some(&sam.token), json!({}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn certificate_is_issued_for_paid_orders_only() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let (artist, _) = app.artist("ada@example.com", "Ada <Lane>").await;
    let artwork = app
        .submit_artwork(
            &artist,
            json!({
                "title": "Harbour & Light",
                "category": "Painting",
                "medium": "Oil on linen",
                "year": 2024,
                "width_cm": 60.0,
                "height_cm": 80.0,
                "price_cents": 250000
            }),
        )
        .await;
    let id = artwork["id"].as_str().unwrap().to_string();
    app.approve(&admin, &id).await;

    let sam = app.register("sam@example.com", "Sam Collector").await;
    let kim = app.register("kim@example.com", "Kim").await;
    let (_, order) = app.checkout(&sam, &[&id]).await;
    let order_id = order["id"].as_str().unwrap().to_string();
    let uri = format!("/api/orders/{order_id}/certificate/{id}");

    let (status, _) = app.get_text(&uri, &sam.token).await;
    assert_eq!(status, StatusCode::CONFLICT);

    app.set_order_status(&admin, &order_id, "paid").await;

    let (status, html) = app.get_text(&uri, &sam.token).await;
    assert_eq!(status, StatusCode::OK);
    let code = verification_code(&order_id, &id, 250000);
    assert!(html.contains(&code));
    assert!(html.contains(&certificate_number(&code)));
    assert!(html.contains("Harbour &amp; Light"));
    assert!(html.contains("Ada &lt;Lane&gt;"));
    assert!(html.contains("Oil on linen"));
    assert!(html.contains("60 x 80 cm"));
    assert!(html.contains("Sam Collector"));

    let (status, _) = app.get_text(&uri, &kim.token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.get_text(&uri, &admin.token).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .get_text(&format!("/api/orders/{order_id}/certificate/other"), &sam.token)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reviews_require_a_settled_purchase() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let (artist, _) = app.artist("ada@example.com", "Ada Lane").await;
    let id = app.listed_artwork(&artist, &admin, "Blue Harbour", 50000).await;
    let sam = app.register("sam@example.com", "Sam").await;

    let review = json!({ "artwork_id": id, "rating": 5, "comment": "Glorious" });

    let (_, order) = app.checkout(&sam, &[&id]).await;
    let (status, _) = app.post("/api/reviews", Some(&sam.token), review.clone()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    app.set_order_status(&admin, order["id"].as_str().unwrap(), "paid").await;

    let (status, _) = app
        .post("/api/reviews", Some(&sam.token), json!({ "artwork_id": id, "rating": 6 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, created) = app.post("/api/reviews", Some(&sam.token), review.clone()).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app.post("/api/reviews", Some(&sam.token), review).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, listing) = app.get("/api/artworks/blue-harbour/reviews", None).await;
    assert_eq!(listing["count"], 1);
    assert_eq!(listing["average_rating"], 5.0);
    assert_eq!(listing["reviews"][0]["author"], "Sam");

    let (_, notes) = app.get("/api/notifications?unread_only=true", Some(&artist.token)).await;
    assert!(notes.as_array().unwrap().iter().any(|n| n["kind"] == "new_review"));

    let review_id = created["id"].as_str().unwrap();
    let (status, _) = app.delete(&format!("/api/reviews/{review_id}"), Some(&artist.token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.delete(&format!("/api/reviews/{review_id}"), Some(&admin.token)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn ordered_artworks_cannot_be_deleted_by_admins() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let (artist, _) = app.artist("ada@example.com", "Ada Lane").await;
    let ordered = app.listed_artwork(&artist, &admin, "Blue Harbour", 50000).await;
    let spare = app.listed_artwork(&artist, &admin, "Red Field", 50000).await;
    let sam = app.register("sam@example.com", "Sam").await;
    app.checkout(&sam, &[&ordered]).await;

    let (status, _) = app.delete(&format!("/api/admin/artworks/{ordered}"), Some(&admin.token)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app.delete(&format!("/api/admin/artworks/{spare}"), Some(&admin.token)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn sales_and_stats_count_settled_orders() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let (ada, _) = app.artist("ada@example.com", "Ada Lane").await;
    let (ben, _) = app.artist("ben@example.com", "Ben Okafor").await;
    let ada_work = app.listed_artwork(&ada, &admin, "Blue Harbour", 50000).await;
    let ben_work = app.listed_artwork(&ben, &admin, "Bronze Study", 300000).await;
    let unsold = app.listed_artwork(&ben, &admin, "Clay Bowl", 9000).await;

    let sam = app.register("sam@example.com", "Sam").await;
    let (_, paid) = app.checkout(&sam, &[&ada_work, &ben_work]).await;
    app.set_order_status(&admin, paid["id"].as_str().unwrap(), "paid").await;
    app.checkout(&sam, &[&unsold]).await;

    let (status, sales) = app.get("/api/artist/sales", Some(&ada.token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sales["revenue_cents"], 50000);
    let first = &sales["sales"][0];
    assert_eq!(first["items"].as_array().unwrap().len(), 1);
    assert_eq!(first["subtotal_cents"], 50000);

    let (_, sales) = app.get("/api/artist/sales", Some(&ben.token)).await;
    assert_eq!(sales["sales"].as_array().unwrap().len(), 2);
    assert_eq!(sales["revenue_cents"], 300000);

    let (status, stats) = app.get("/api/admin/stats", Some(&admin.token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["totals"]["users"], 4);
    assert_eq!(stats["totals"]["artists"], 2);
    assert_eq!(stats["totals"]["orders"], 2);
    assert_eq!(stats["totals"]["revenue_cents"], 350000);

    let months = stats["revenue_by_month"].as_array().unwrap();
    assert_eq!(months.len(), 12);
    assert_eq!(months[11]["value"], 350000);
    assert!(months[..11].iter().all(|m| m["value"] == 0));

    let top = stats["top_artists"].as_array().unwrap();
    assert_eq!(top[0]["display_name"], "Ben Okafor");
    assert_eq!(top[1]["revenue_cents"], 50000);

    assert!(stats["orders_by_status"]
        .as_array()
        .unwrap()
        .contains(&json!({ "label": "pending", "value": 1 })));
}

#[tokio::test]
async fn stale_order_snapshot_cannot_apply_a_second_transition() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let (artist, _) = app.artist("ada@example.com", "Ada Lane").await;
    let id = app.listed_artwork(&artist, &admin, "Blue Harbour", 50000).await;
    let sam = app.register("sam@example.com", "Sam").await;
    let (_, order) = app.checkout(&sam, &[&id]).await;
    let order_id = order["id"].as_str().unwrap();

    let conn = app.db.connect().unwrap();
    let snapshot = Order::find_by_id(&conn, order_id).await.unwrap().unwrap();

    let cancelled = order_flow::transition(&conn, &snapshot, OrderStatus::Cancelled, None)
        .await
        .unwrap();
    assert_eq!(cancelled.status, "cancelled");

    // Same pending snapshot, but the order has moved on
    let result = order_flow::transition(&conn, &snapshot, OrderStatus::Paid, None).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));

    let current = Order::find_by_id(&conn, order_id).await.unwrap().unwrap();
    assert_eq!(current.status, "cancelled");
    assert_eq!(artwork_status(&app, &artist.token, &id).await, "available");
}

#[tokio::test]
async fn reserved_artworks_ignore_late_moderation_and_edits() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let (artist, _) = app.artist("ada@example.com", "Ada Lane").await;
    let id = app.listed_artwork(&artist, &admin, "Blue Harbour", 50000).await;
    let sam = app.register("sam@example.com", "Sam").await;
    app.checkout(&sam, &[&id]).await;

    let conn = app.db.connect().unwrap();
    let result = Artwork::moderate(&conn, &id, ArtworkStatus::Archived, None).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));

    let result = Artwork::update(
        &conn,
        &id,
        UpdateArtwork {
            price_cents: Some(1),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(result, Err(AppError::Conflict(_))));

    assert_eq!(artwork_status(&app, &artist.token, &id).await, "reserved");
}

#[tokio::test]
async fn duplicate_review_insert_is_a_conflict_not_a_database_error() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let (artist, _) = app.artist("ada@example.com", "Ada Lane").await;
    let id = app.listed_artwork(&artist, &admin, "Blue Harbour", 50000).await;
    let sam = app.register("sam@example.com", "Sam").await;

    let conn = app.db.connect().unwrap();
    let review = |rating| CreateReview {
        artwork_id: id.clone(),
        rating,
        comment: None,
    };

    Review::create(&conn, &sam.id, review(5)).await.unwrap();
    let second = Review::create(&conn, &sam.id, review(1)).await;
    assert!(matches!(second, Err(AppError::Conflict(_))));

    let summary = Review::summary_for_artwork(&conn, &id).await.unwrap();
    assert_eq!(summary.count, 1);
    assert_eq!(summary.average_rating, Some(5.0));
}
