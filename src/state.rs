use chrono::Duration;

use crate::auth::tokens::TokenKeys;
use crate::config::AppConfig;
use crate::db::{DbPool, OrmConn};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub tokens: TokenKeys,
    pub token_ttl: Duration,
}

impl AppState {
    pub fn new(config: &AppConfig, pool: DbPool, orm: OrmConn) -> Self {
        Self {
            pool,
            orm,
            tokens: TokenKeys::new(config.jwt_secret.as_bytes()),
            token_ttl: Duration::seconds(config.token_ttl_secs),
        }
    }
}
