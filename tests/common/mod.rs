//! Shared harness for the HTTP-level integration tests.
//!
//! Every `TestApp` owns a fresh libsql database file and upload directory
//! inside a temporary directory, and drives the real router with `oneshot`.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use libsql::Database;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use art_gallery::config::Config;
use art_gallery::db;
use art_gallery::routes::{create_router, AppState};
use art_gallery::storage::LocalStorage;

pub const ADMIN_EMAIL: &str = "curator@gallery.test";
pub const PASSWORD: &str = "correct-horse-battery";

pub struct TestApp {
    pub router: Router,
    pub db: Arc<Database>,
    pub dir: TempDir,
}

/// A registered account and its bearer token.
pub struct Account {
    pub id: String,
    pub token: String,
}

pub fn test_config(dir: &TempDir) -> Config {
    Config {
        database_url: dir.path().join("gallery.db").to_string_lossy().into_owned(),
        turso_auth_token: None,
        jwt_secret: "integration-test-secret".to_string(),
        jwt_expiry_hours: 1,
        upload_dir: dir.path().join("uploads").to_string_lossy().into_owned(),
        base_url: "http://localhost:3000".to_string(),
        port: 0,
        admin_email: Some(ADMIN_EMAIL.to_string()),
    }
}

impl TestApp {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let config = test_config(&dir);

        let database = db::create_database(&config.database_url, None)
            .await
            .expect("database should open");
        db::migrate(&database.connect().unwrap()).await.expect("migration should run");

        let storage = LocalStorage::new(&config.upload_dir, &config.base_url);
        storage.ensure_dir().await.unwrap();

        let db = Arc::new(database);
        let state = AppState {
            db: db.clone(),
            config,
            storage: Arc::new(storage),
        };

        Self {
            router: create_router(state),
            db,
            dir,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Bytes) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, bytes)
    }

    /// JSON request. Empty or non-JSON response bodies come back as `Value::Null`.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let (status, bytes) = self.send(request).await;
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, token, None).await
    }

    /// GET returning the raw body as text, for HTML endpoints.
    pub async fn get_text(&self, uri: &str, token: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .uri(uri)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        let (status, bytes) = self.send(request).await;
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    // -----------------------------------------------------------------------
    // Fixtures
    // -----------------------------------------------------------------------

    pub async fn register(&self, email: &str, name: &str) -> Account {
        let (status, body) = self
            .post(
                "/api/auth/register",
                None,
                json!({ "email": email, "password": PASSWORD, "name": name }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register {email}: {body}");

        Account {
            id: body["user"]["id"].as_str().unwrap().to_string(),
            token: body["token"].as_str().unwrap().to_string(),
        }
    }

    pub async fn admin(&self) -> Account {
        self.register(ADMIN_EMAIL, "Curator").await
    }

    /// Registers a user and opens an artist profile. Returns the account and the profile JSON.
    pub async fn artist(&self, email: &str, display_name: &str) -> (Account, Value) {
        let account = self.register(email, display_name).await;
        let (status, profile) = self
            .post(
                "/api/artist/register",
                Some(&account.token),
                json!({ "display_name": display_name, "location": "Lisbon" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "artist profile: {profile}");
        (account, profile)
    }

    /// Submits an artwork as `artist`. Returns the artwork JSON (status `pending`).
    pub async fn submit_artwork(&self, artist: &Account, fields: Value) -> Value {
        let (status, body) = self.post("/api/artist/artworks", Some(&artist.token), fields).await;
        assert_eq!(status, StatusCode::CREATED, "submit artwork: {body}");
        body
    }

    pub async fn approve(&self, admin: &Account, artwork_id: &str) {
        let (status, body) = self
            .put(
                &format!("/api/admin/artworks/{artwork_id}/status"),
                Some(&admin.token),
                json!({ "status": "available" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "approve: {body}");
    }

    /// Submits and approves an artwork. Returns its id.
    pub async fn listed_artwork(&self, artist: &Account, admin: &Account, title: &str, price_cents: i64) -> String {
        let artwork = self
            .submit_artwork(
                artist,
                json!({ "title": title, "category": "Painting", "price_cents": price_cents }),
            )
            .await;
        let id = artwork["id"].as_str().unwrap().to_string();
        self.approve(admin, &id).await;
        id
    }

    /// Checks out the given artworks. Returns the order JSON.
    pub async fn checkout(&self, buyer: &Account, artwork_ids: &[&str]) -> (StatusCode, Value) {
        self.post(
            "/api/checkout",
            Some(&buyer.token),
            json!({ "artwork_ids": artwork_ids, "shipping_address": shipping_address() }),
        )
        .await
    }

    pub async fn set_order_status(&self, admin: &Account, order_id: &str, status: &str) -> (StatusCode, Value) {
        self.put(
            &format!("/api/admin/orders/{order_id}/status"),
            Some(&admin.token),
            json!({ "status": status }),
        )
        .await
    }
}

pub fn shipping_address() -> Value {
    json!({
        "name": "Sam Collector",
        "street": "12 Quay Street",
        "city": "Porto",
        "zip": "4050-001",
        "country": "PT"
    })
}
