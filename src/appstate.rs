use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use std::sync::Arc;

use crate::auth::user::MemoryUserStore;
use crate::auth::user::UserStore;
use crate::config::Config;
use crate::config::ConfigError;
use crate::database::PgStore;
use crate::joke::JokeStore;
use crate::joke::MemoryJokeStore;
use crate::joke::RandomStrategy;

#[derive(Debug, Clone, Copy)]
pub struct Settings {
    pub secure_cookies: bool,
    pub random_strategy: RandomStrategy,
    pub bcrypt_cost: u32,
}

impl From<&Config> for Settings {
    fn from(config: &Config) -> Self {
        Self {
            secure_cookies: config.secure_cookies,
            random_strategy: config.random_strategy,
            bcrypt_cost: config.bcrypt_cost,
        }
    }
}

/// Everything a handler needs, built once at startup and shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub jokes: Arc<dyn JokeStore>,
    pub key: Key,
    pub settings: Settings,
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.key.clone()
    }
}

impl AppState {
    pub fn in_memory(key: Key, settings: Settings) -> Self {
        Self {
            users: Arc::new(MemoryUserStore::new()),
            jokes: Arc::new(MemoryJokeStore::new()),
            key,
            settings,
        }
    }

    pub async fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let key = config.signing_key()?;
        let settings = Settings::from(config);

        let Some(database_url) = &config.database_url else {
            tracing::warn!("DATABASE_URL is not set; using the in-memory store");
            return Ok(Self::in_memory(key, settings));
        };

        let store = PgStore::connect(database_url).await?;
        store.migrate().await?;
        tracing::info!("connected to postgres");

        Ok(Self {
            users: Arc::new(store.clone()),
            jokes: Arc::new(store),
            key,
            settings,
        })
    }
}
