//! Centralized configuration (environment variables + defaults).
//!
//! `.env` is honoured through `dotenv` by the binary before [`AppConfig::from_env`] runs.

use anyhow::{bail, Context};
use std::net::SocketAddr;
use std::str::FromStr;

const DEV_JWT_SECRET: &str = "granja-dev-secret-change-me";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            other => bail!("STORAGE_BACKEND must be 'postgres' or 'memory', got '{}'", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub storage: StorageBackend,
    /// Only read when `storage` is Postgres.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub run_migrations: bool,
    pub jwt_secret: String,
    pub jwt_ttl_minutes: i64,
    /// `APP_ENV=production` hides internal error details from responses.
    pub production: bool,
}

fn var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parsed<T: FromStr>(name: &str, default: T) -> anyhow::Result<T>
where
    T::Err: std::fmt::Display,
{
    match var(name) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{} has an invalid value '{}': {}", name, raw, e)),
        None => Ok(default),
    }
}

fn flag(name: &str) -> bool {
    matches!(
        var(name).map(|v| v.trim().to_lowercase()).as_deref(),
        Some("1") | Some("true") | Some("yes")
    )
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let production = var("APP_ENV")
            .map(|v| v.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        let storage = parsed("STORAGE_BACKEND", StorageBackend::Postgres)?;
        let database_url = var("DATABASE_URL");
        if storage == StorageBackend::Postgres && database_url.is_none() {
            bail!("DATABASE_URL must be set when STORAGE_BACKEND=postgres");
        }

        let jwt_secret = match var("JWT_SECRET") {
            Some(secret) => secret,
            None if production => bail!("JWT_SECRET must be set when APP_ENV=production"),
            None => {
                tracing::warn!("JWT_SECRET not set; using the development secret");
                DEV_JWT_SECRET.to_string()
            }
        };

        let bind_addr = var("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let bind_addr = bind_addr
            .parse()
            .with_context(|| format!("BIND_ADDR must be host:port, got '{}'", bind_addr))?;

        Ok(Self {
            bind_addr,
            storage,
            database_url,
            db_max_connections: parsed("DB_MAX_CONNECTIONS", 5u32)?.max(1),
            run_migrations: flag("RUN_MIGRATIONS"),
            jwt_secret,
            jwt_ttl_minutes: parsed("JWT_TTL_MINUTES", 60i64)?.max(1),
            production,
        })
    }
}
