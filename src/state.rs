use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::email::Mailer;
use crate::auth::JwtManager;
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub jwt: JwtManager,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    pub fn new(pool: PgPool, config: Config, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            jwt: JwtManager::from_config(&config),
            pool,
            config: Arc::new(config),
            mailer,
        }
    }
}
