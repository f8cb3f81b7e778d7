use libsql::{Builder, Database};

pub async fn create_database(database_url: &str, auth_token: Option<&str>) -> Result<Database, libsql::Error> {
    // Turso remote URL
    if database_url.starts_with("libsql://") {
        let auth_token = auth_token.ok_or_else(|| {
            libsql::Error::ConnectionFailed("TURSO_AUTH_TOKEN must be set for remote database".to_string())
        })?;

        Builder::new_remote(database_url.to_string(), auth_token.to_string())
            .build()
            .await
    } else {
        Builder::new_local(local_path(database_url)).build().await
    }
}

/// Strips an optional `sqlite:` scheme and query string from a local database URL.
pub fn local_path(database_url: &str) -> &str {
    let path = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))
        .unwrap_or(database_url);

    match path.split('?').next() {
        Some(p) if !p.is_empty() => p,
        _ => "art_gallery.db",
    }
}

#[cfg(test)]
mod tests {
    use super::local_path;

    #[test]
    fn local_path_strips_scheme_and_options() {
        assert_eq!(local_path("sqlite:gallery.db?mode=rwc"), "gallery.db");
        assert_eq!(local_path("sqlite://data/gallery.db"), "data/gallery.db");
        assert_eq!(local_path("gallery.db"), "gallery.db");
        assert_eq!(local_path("sqlite:"), "art_gallery.db");
    }
}
