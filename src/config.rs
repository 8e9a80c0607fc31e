use axum_extra::extract::cookie::Key;
use clap::Parser;
use thiserror::Error;

use crate::joke::RandomStrategy;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("SESSION_SECRET must be at least 64 bytes long")]
    SessionSecretTooShort,
    #[error("failed to connect to the database: {0}")]
    Database(#[from] sqlx::Error),
}

/// Process-wide settings, read once at startup from flags or the environment.
#[derive(Parser, Debug, Clone)]
#[command(version, about = "A small server-rendered jokes app")]
pub struct Config {
    /// address to bind the http listener to
    #[arg(long, env = "SITE_ADDR", default_value = "0.0.0.0:3000")]
    pub site_addr: String,

    /// postgres connection string; jokes and users are kept in memory without it
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// key material for signing session cookies, at least 64 bytes
    #[arg(long, env = "SESSION_SECRET", hide_env_values = true)]
    pub session_secret: Option<String>,

    /// mark the session cookie as `Secure`
    #[arg(long, env = "SECURE_COOKIES")]
    pub secure_cookies: bool,

    #[arg(long, env = "RANDOM_JOKE_STRATEGY", value_enum, default_value_t = RandomStrategy::Offset)]
    pub random_strategy: RandomStrategy,

    #[arg(long, env = "BCRYPT_COST", default_value_t = bcrypt::DEFAULT_COST)]
    pub bcrypt_cost: u32,

    /// create the dev user and a few jokes on startup
    #[arg(long, env = "SEED_DEV_DATA")]
    pub seed: bool,
}

impl Config {
    pub fn signing_key(&self) -> Result<Key, ConfigError> {
        match &self.session_secret {
            Some(secret) => {
                Key::try_from(secret.as_bytes()).map_err(|_| ConfigError::SessionSecretTooShort)
            }
            None => {
                tracing::warn!("SESSION_SECRET is not set; sessions will not survive a restart");
                Ok(Key::generate())
            }
        }
    }
}
