//! Routes for users with an artist profile. `require_artist` puts the
//! caller's `ArtistProfile` into the request extensions.

pub mod artworks;
pub mod exhibitions;
pub mod profile;
pub mod sales;

use axum::extract::Multipart;
use axum::Router;

use crate::error::{AppError, AppResult};
use crate::routes::AppState;
use crate::services::image::process_image;

const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

/// Body limit for image upload routes. Originals are resized after upload.
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(profile::routes())
        .merge(artworks::routes())
        .merge(exhibitions::routes())
        .merge(sales::routes())
}

/// Processes every image field of the upload and stores it under `folder`.
/// Returns the stored paths in upload order.
pub(crate) async fn store_uploaded_images(
    state: &AppState,
    folder: &str,
    mut multipart: Multipart,
) -> AppResult<Vec<String>> {
    let mut paths = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to process upload: {}", e)))?
    {
        let filename = field
            .file_name()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "image.jpg".to_string());
        let extension = filename.rsplit('.').next().unwrap_or("").to_lowercase();
        let is_image = field
            .content_type()
            .map(|ct| ct.starts_with("image/"))
            .unwrap_or(false);

        if !is_image && !IMAGE_EXTENSIONS.contains(&extension.as_str()) {
            return Err(AppError::BadRequest("Only image files are allowed".to_string()));
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {}", e)))?;

        let processed = tokio::task::spawn_blocking(move || process_image(&data, &extension))
            .await
            .map_err(|e| AppError::Internal(format!("Image task failed: {}", e)))?
            .map_err(AppError::BadRequest)?;

        let path = state
            .storage
            .upload_to_folder(folder, processed.extension, &processed.data)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        tracing::debug!("Stored {} ({} bytes) at {}", processed.content_type, processed.data.len(), path);
        paths.push(path);
    }

    if paths.is_empty() {
        return Err(AppError::BadRequest("No image was uploaded".to_string()));
    }
    Ok(paths)
}
