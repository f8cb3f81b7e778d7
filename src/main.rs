use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use art_gallery::config::Config;
use art_gallery::db;
use art_gallery::routes::{create_router, AppState};
use art_gallery::storage::{LocalStorage, StorageBackend};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "art_gallery=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env().expect("DATABASE_URL and JWT_SECRET must be set");

    let db = db::create_database(&config.database_url, config.turso_auth_token.as_deref())
        .await
        .expect("Failed to create database");

    db::migrate(&db.connect()?).await?;
    tracing::info!("Connected to database, schema is up to date");

    let local = LocalStorage::new(&config.upload_dir, &config.base_url);
    local.ensure_dir().await.expect("Failed to create upload directory");
    let storage: Arc<dyn StorageBackend> = Arc::new(local);
    tracing::info!("Storing uploads in {}", config.upload_dir);

    if config.admin_email.is_none() {
        tracing::warn!("ADMIN_EMAIL is not set - no account can register as admin");
    }

    let state = AppState {
        db: Arc::new(db),
        config: config.clone(),
        storage,
    };

    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
