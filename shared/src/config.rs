use tracing::warn;

use crate::{Error, Result};

pub struct Config {
    pub host: String,
    pub http_port: u16,
    /// Connection string for the document store. Required; startup fails
    /// without it.
    pub db_url: String,
    pub category_cache_ttl_secs: u64,
    pub admin_username: String,
    pub admin_password: String,
    pub allowed_origins: Vec<String>,
}

impl Config {
    const DEFAULT_ADMIN_USERNAME: &str = "admin";
    const DEFAULT_ADMIN_PASSWORD: &str = "admin123";
    const DEFAULT_CACHE_TTL_SECS: u64 = 300; // 5 minutes

    pub fn from_env() -> Result<Self> {
        let db_url = std::env::var("BAZAAR_DB_URL")
            .map_err(|_| Error::Config("BAZAAR_DB_URL is not set".to_string()))?;

        let host = std::env::var("BAZAAR_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let http_port = std::env::var("BAZAAR_HTTP_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .unwrap_or(8080);

        let category_cache_ttl_secs = std::env::var("BAZAAR_CATEGORY_CACHE_TTL_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(Self::DEFAULT_CACHE_TTL_SECS);

        Ok(Self {
            host,
            http_port,
            db_url,
            category_cache_ttl_secs,
            admin_username: std::env::var("BAZAAR_ADMIN_USERNAME")
                .unwrap_or_else(|_| Self::DEFAULT_ADMIN_USERNAME.to_string()),
            admin_password: std::env::var("BAZAAR_ADMIN_PASSWORD").unwrap_or_else(|_| {
                warn!("BAZAAR_ADMIN_PASSWORD not set, using default password 'admin123'");
                warn!("⚠️  WARNING: Please change the default admin password immediately!");
                Self::DEFAULT_ADMIN_PASSWORD.to_string()
            }),
            allowed_origins: std::env::var("BAZAAR_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "*".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
        })
    }
}
