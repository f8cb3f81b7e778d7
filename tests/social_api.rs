//! Messages, notifications, favorites, exhibitions, and site settings.

mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn messages_reach_the_recipient_and_notify_them() {
    let app = TestApp::new().await;
    let (artist, _) = app.artist("ada@example.com", "Ada Lane").await;
    let sam = app.register("sam@example.com", "Sam").await;

    let (status, message) = app
        .post(
            "/api/messages",
            Some(&sam.token),
            json!({ "recipient_id": artist.id, "subject": "Commission", "body": "Do you take commissions?" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(message["is_read"], false);

    let (_, count) = app.get("/api/messages/unread-count", Some(&artist.token)).await;
    assert_eq!(count["count"], 1);

    let (_, inbox) = app.get("/api/messages", Some(&artist.token)).await;
    assert_eq!(inbox[0]["subject"], "Commission");
    let (_, sent) = app.get("/api/messages/sent", Some(&sam.token)).await;
    assert_eq!(sent.as_array().unwrap().len(), 1);

    let (_, notes) = app.get("/api/notifications", Some(&artist.token)).await;
    assert_eq!(notes[0]["kind"], "new_message");
    assert_eq!(notes[0]["body"], "Sam: Commission");

    let message_id = message["id"].as_str().unwrap();
    // Only the recipient can mark it read
    let (status, _) = app
        .post(&format!("/api/messages/{message_id}/read"), Some(&sam.token), json!({}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app
        .post(&format!("/api/messages/{message_id}/read"), Some(&artist.token), json!({}))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, count) = app.get("/api/messages/unread-count", Some(&artist.token)).await;
    assert_eq!(count["count"], 0);
}

#[tokio::test]
async fn message_validation() {
    let app = TestApp::new().await;
    let sam = app.register("sam@example.com", "Sam").await;

    let (status, _) = app
        .post(
            "/api/messages",
            Some(&sam.token),
            json!({ "recipient_id": sam.id, "subject": "Hi", "body": "Me" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/messages",
            Some(&sam.token),
            json!({ "recipient_id": "nobody", "subject": "Hi", "body": "There" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn notifications_can_be_read_and_dismissed() {
    let app = TestApp::new().await;
    let (artist, _) = app.artist("ada@example.com", "Ada Lane").await;
    let sam = app.register("sam@example.com", "Sam").await;

    for subject in ["One", "Two", "Three"] {
        app.post(
            "/api/messages",
            Some(&sam.token),
            json!({ "recipient_id": artist.id, "subject": subject, "body": "..." }),
        )
        .await;
    }

    let (_, page) = app.get("/api/notifications?limit=2", Some(&artist.token)).await;
    let page = page.as_array().unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0]["body"], "Sam: Three");

    let first = page[0]["id"].as_str().unwrap();
    let (status, _) = app
        .post(&format!("/api/notifications/{first}/read"), Some(&artist.token), json!({}))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, unread) = app.get("/api/notifications?unread_only=true", Some(&artist.token)).await;
    assert_eq!(unread.as_array().unwrap().len(), 2);

    // Someone else's notification is invisible
    let (status, _) = app.delete(&format!("/api/notifications/{first}"), Some(&sam.token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.delete(&format!("/api/notifications/{first}"), Some(&artist.token)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = app
        .post("/api/notifications/read-all", Some(&artist.token), json!({}))
        .await;
    assert_eq!(body["updated"], 2);

    let (_, count) = app.get("/api/notifications/unread-count", Some(&artist.token)).await;
    assert_eq!(count["count"], 0);
}

#[tokio::test]
async fn favorites_toggle() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let (artist, _) = app.artist("ada@example.com", "Ada Lane").await;
    let id = app.listed_artwork(&artist, &admin, "Blue Harbour", 50000).await;
    let sam = app.register("sam@example.com", "Sam").await;

    let (status, body) = app.post(&format!("/api/favorites/{id}"), Some(&sam.token), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_favorite"], true);

    let (_, favorites) = app.get("/api/favorites", Some(&sam.token)).await;
    assert_eq!(favorites[0]["title"], "Blue Harbour");

    let (_, body) = app.post(&format!("/api/favorites/{id}"), Some(&sam.token), json!({})).await;
    assert_eq!(body["is_favorite"], false);
    let (_, favorites) = app.get("/api/favorites", Some(&sam.token)).await;
    assert_eq!(favorites, json!([]));

    let (status, _) = app.post("/api/favorites/missing", Some(&sam.token), json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn exhibitions_are_managed_by_their_artist() {
    let app = TestApp::new().await;
    let (ada, _) = app.artist("ada@example.com", "Ada Lane").await;
    let (ben, _) = app.artist("ben@example.com", "Ben Okafor").await;

    let (status, body) = app
        .post(
            "/api/artist/exhibitions",
            Some(&ada.token),
            json!({ "title": "Tides", "starts_on": "2030-05-10", "ends_on": "2030-05-01" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "ends_on must not be before starts_on");

    let (status, show) = app
        .post(
            "/api/artist/exhibitions",
            Some(&ada.token),
            json!({ "title": "Tides", "venue": "Quay Gallery", "starts_on": "2030-05-01", "ends_on": "2030-06-01" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let show_id = show["id"].as_str().unwrap();

    app.post(
        "/api/artist/exhibitions",
        Some(&ben.token),
        json!({ "title": "Old Show", "starts_on": "2001-01-01", "ends_on": "2001-02-01" }),
    )
    .await;

    let (_, all) = app.get("/api/exhibitions", None).await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    let (_, current) = app.get("/api/exhibitions?current=true", None).await;
    let current = current.as_array().unwrap();
    assert_eq!(current.len(), 1);
    assert_eq!(current[0]["artist_slug"], "ada-lane");

    let (_, filtered) = app.get("/api/exhibitions?artist=ben-okafor", None).await;
    assert_eq!(filtered[0]["title"], "Old Show");

    let (status, _) = app
        .put(&format!("/api/artist/exhibitions/{show_id}"), Some(&ben.token), json!({ "title": "Mine now" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, updated) = app
        .put(
            &format!("/api/artist/exhibitions/{show_id}"),
            Some(&ada.token),
            json!({ "ends_on": "2030-07-01" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["ends_on"], "2030-07-01");
    assert_eq!(updated["venue"], "Quay Gallery");

    let (status, _) = app.delete(&format!("/api/artist/exhibitions/{show_id}"), Some(&ada.token)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn site_settings_are_public_and_admin_editable() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let sam = app.register("sam@example.com", "Sam").await;

    let (status, settings) = app.get("/api/settings", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(settings["gallery_name"], "Art Gallery");
    assert_eq!(settings["commission_percent"], 20);
    assert_eq!(settings["currency"], "USD");

    let (status, _) = app
        .put("/api/admin/settings", Some(&sam.token), json!({ "gallery_name": "Mine" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .put("/api/admin/settings", Some(&admin.token), json!({ "commission_percent": 120 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, updated) = app
        .put(
            "/api/admin/settings",
            Some(&admin.token),
            json!({ "gallery_name": "Quay Gallery", "currency": "eur" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["gallery_name"], "Quay Gallery");
    assert_eq!(updated["currency"], "EUR");

    let (_, settings) = app.get("/api/settings", None).await;
    assert_eq!(settings["gallery_name"], "Quay Gallery");
    assert_eq!(settings["commission_percent"], 20);
}

#[tokio::test]
async fn hidden_artworks_cannot_be_favorited_or_referenced() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let (artist, _) = app.artist("ada@example.com", "Ada Lane").await;
    let sam = app.register("sam@example.com", "Sam").await;

    let pending = app
        .submit_artwork(&artist, json!({ "title": "Draft", "category": "Painting", "price_cents": 1000 }))
        .await;
    let pending_id = pending["id"].as_str().unwrap();
    app.put(
        &format!("/api/admin/artworks/{pending_id}/status"),
        Some(&admin.token),
        json!({ "status": "rejected", "reason": "internal note" }),
    )
    .await;

    let (status, _) = app
        .post(&format!("/api/favorites/{pending_id}"), Some(&sam.token), json!({}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .post(
            "/api/messages",
            Some(&sam.token),
            json!({ "recipient_id": artist.id, "artwork_id": pending_id, "subject": "Hi", "body": "About this" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // A favorite drops out of the list once the work is archived
    let listed = app.listed_artwork(&artist, &admin, "Blue Harbour", 50000).await;
    app.post(&format!("/api/favorites/{listed}"), Some(&sam.token), json!({})).await;
    app.put(
        &format!("/api/admin/artworks/{listed}/status"),
        Some(&admin.token),
        json!({ "status": "archived" }),
    )
    .await;
    let (_, favorites) = app.get("/api/favorites", Some(&sam.token)).await;
    assert_eq!(favorites, json!([]));
}

#[tokio::test]
async fn messages_can_reference_a_listed_artwork_by_slug() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let (artist, _) = app.artist("ada@example.com", "Ada Lane").await;
    let id = app.listed_artwork(&artist, &admin, "Blue Harbour", 50000).await;
    let sam = app.register("sam@example.com", "Sam").await;

    let (status, message) = app
        .post(
            "/api/messages",
            Some(&sam.token),
            json!({ "recipient_id": artist.id, "artwork_id": "blue-harbour", "subject": "Hi", "body": "Still available?" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(message["artwork_id"], id.as_str());
}

#[tokio::test]
async fn rejected_settings_update_changes_nothing() {
    let app = TestApp::new().await;
    let admin = app.admin().await;

    let (status, _) = app
        .put(
            "/api/admin/settings",
            Some(&admin.token),
            json!({ "gallery_name": "Renamed", "commission_percent": 250 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, settings) = app.get("/api/settings", None).await;
    assert_eq!(settings["gallery_name"], "Art Gallery");
    assert_eq!(settings["commission_percent"], 20);
}
