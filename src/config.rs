use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub turso_auth_token: Option<String>,
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    pub upload_dir: String,
    pub base_url: String,
    pub port: u16,
    /// Registering with this email grants the admin role.
    pub admin_email: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")?,
            turso_auth_token: env::var("TURSO_AUTH_TOKEN").ok(),
            jwt_secret: env::var("JWT_SECRET")?,
            jwt_expiry_hours: env::var("JWT_EXPIRY_HOURS")
                .unwrap_or_else(|_| "24".to_string())
                .parse()
                .unwrap_or(24),
            upload_dir: env::var("UPLOAD_DIR").unwrap_or_else(|_| "./static/uploads".to_string()),
            base_url: env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            admin_email: env::var("ADMIN_EMAIL")
                .ok()
                .map(|e| e.trim().to_lowercase())
                .filter(|e| !e.is_empty()),
        })
    }
}
