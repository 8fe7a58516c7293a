use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};

use crate::store::postgres::is_valid_database_name;
use crate::store::IdFormat;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_name: String,
    pub id_format: IdFormat,
    pub media_dir: Option<PathBuf>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url = lookup("DATABASE_URL")
            .or_else(|| lookup("MONGODB_URI"))
            .context("Required environment variable 'DATABASE_URL' is not set")?;

        let db_name = lookup("DB_NAME").unwrap_or_else(|| "emogo_db".to_string());
        if !is_valid_database_name(&db_name) {
            bail!("DB_NAME '{db_name}' must match [a-z_][a-z0-9_]*");
        }

        let id_format = match lookup("ID_FORMAT") {
            Some(raw) => raw.parse::<IdFormat>().map_err(|e| anyhow!("ID_FORMAT: {e}"))?,
            None => IdFormat::default(),
        };

        Ok(Config {
            database_url,
            db_name,
            id_format,
            media_dir: lookup("MEDIA_DIR")
                .filter(|dir| !dir.is_empty())
                .map(PathBuf::from),
            port: lookup("PORT")
                .unwrap_or_else(|| "8000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}
