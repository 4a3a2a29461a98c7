//! Process configuration, read once from the environment at startup.

use anyhow::{bail, Context};
use std::env;
use std::path::PathBuf;

const DEV_JWT_SECRET: &str = "dev-jwt-secret-not-for-production";

#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL. `None` runs on the in-memory store.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub port: u16,
    /// Secret for signing bearer tokens.
    pub jwt_secret: String,
    pub token_ttl_minutes: i64,
    /// Directory uploaded images are written to, served under `/uploads`.
    pub upload_dir: PathBuf,
    pub nats_url: Option<String>,
    /// development | production
    pub environment: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let environment = env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let jwt_secret = match env::var("JWT_SECRET").ok().filter(|s| !s.is_empty()) {
            Some(secret) => secret,
            None if environment == "development" => DEV_JWT_SECRET.to_string(),
            None => bail!("JWT_SECRET must be set in {environment} environment"),
        };

        Ok(Self {
            database_url: env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()),
            database_max_connections: parse_var("DATABASE_MAX_CONNECTIONS", 10)?,
            port: parse_var("PORT", 8080)?,
            jwt_secret,
            token_ttl_minutes: parse_var("TOKEN_TTL_MINUTES", 60)?,
            upload_dir: env::var("UPLOAD_DIR").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("uploads")),
            nats_url: env::var("NATS_URL").ok().filter(|s| !s.is_empty()),
            environment,
        })
    }

    /// Configuration for a database-less instance, as used by tests.
    pub fn in_memory(jwt_secret: impl Into<String>, upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            database_url: None,
            database_max_connections: 1,
            port: 0,
            jwt_secret: jwt_secret.into(),
            token_ttl_minutes: 60,
            upload_dir: upload_dir.into(),
            nats_url: None,
            environment: "development".into(),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> anyhow::Result<T> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().ok().with_context(|| format!("{name} has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}
