use std::env;

/// Fixed bearer token lifetime used by every issuance path.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 600;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub token_ttl_secs: i64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let jwt_secret = env::var("JWT_SECRET")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let token_ttl_secs = env::var("TOKEN_TTL_SECS")
            .ok()
            .and_then(|t| t.parse::<i64>().ok())
            .unwrap_or(DEFAULT_TOKEN_TTL_SECS);
        Ok(Self {
            port,
            database_url,
            host,
            jwt_secret,
            token_ttl_secs,
        })
    }
}
