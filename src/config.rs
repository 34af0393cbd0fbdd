use std::env;

use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::error::{Error, Result};

/// Connection settings for the hosted backend, loaded from `.env` and the
/// process environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_access_secret: String,
    pub jwt_refresh_secret: String,
    pub max_connections: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::from_filename(".env").or_else(|_| dotenv::dotenv()).ok();

        Ok(Self {
            database_url: require("DATABASE_URL")?,
            jwt_access_secret: require("JWT_ACCESS_SECRET")?,
            jwt_refresh_secret: require("JWT_REFRESH_SECRET")?,
            max_connections: optional("DATABASE_MAX_CONNECTIONS", 5)?,
        })
    }

    pub async fn connect(&self) -> Result<PgPool> {
        let pool = PgPoolOptions::new()
            .max_connections(self.max_connections)
            .connect(&self.database_url)
            .await?;
        Ok(pool)
    }
}

fn require(key: &'static str) -> Result<String> {
    env::var(key).map_err(|_| Error::MissingEnv(key))
}

fn optional(key: &'static str, default: u32) -> Result<u32> {
    match env::var(key) {
        Ok(raw) => raw.parse().map_err(|_| Error::InvalidEnv(key)),
        Err(_) => Ok(default),
    }
}
