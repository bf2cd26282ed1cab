//! Handles settings for the application.
//!
//! Values come from `settings.toml` (optional) and are overridden by
//! `ATRIUM__<SECTION>__<KEY>` environment variables, e.g.
//! `ATRIUM__SERVER__PORT=9000`.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

/// Where the store lives.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
    Postgres(String),
}

impl Database {
    pub fn url(&self) -> String {
        match self {
            Database::Memory => String::from("sqlite::memory:"),
            Database::Sqlite(path) => format!("sqlite:{path}?mode=rwc"),
            Database::Postgres(url) => url.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
    /// Insert the default expense categories at startup.
    pub seed_categories: bool,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Server,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("app.level", "info")?
            .set_default("server.port", 8000)?
            .set_default("server.database", "memory")?
            .set_default("server.seed_categories", true)?
            .add_source(File::with_name("settings").required(false))
            .add_source(
                Environment::with_prefix("ATRIUM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}
