//! Application settings.
//!
//! Values are read from an optional `settings.toml` in the working directory
//! and then from `EXPENSES__*` environment variables, e.g.
//! `EXPENSES__AUTH__JWT_SECRET` or `EXPENSES__SERVER__PORT`.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
    pub api_prefix: String,
}

#[derive(Debug, Deserialize)]
pub struct Auth {
    pub jwt_secret: String,
    pub token_ttl_seconds: u64,
}

#[derive(Debug, Deserialize)]
pub struct Reporting {
    /// IANA timezone name used to bucket expenses into days and months.
    pub timezone: String,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Server,
    pub auth: Auth,
    pub reporting: Reporting,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_builder(
            Config::builder().add_source(File::with_name("settings").required(false)),
        )
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        let settings = builder
            .set_default("app.level", "info")?
            .set_default("server.port", 3000)?
            .set_default("server.database.sqlite", "./expenses.db")?
            .set_default("server.api_prefix", "/api")?
            .set_default("auth.token_ttl_seconds", 60 * 60 * 24)?
            .set_default("reporting.timezone", "UTC")?
            .add_source(
                Environment::with_prefix("EXPENSES")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_everything_but_the_secret() {
        let builder = Config::builder().set_override("auth.jwt_secret", "s3cret").unwrap();
        let settings = Settings::from_builder(builder).unwrap();

        assert_eq!(settings.app.level, "info");
        assert_eq!(settings.server.port, 3000);
        assert_eq!(settings.server.api_prefix, "/api");
        assert!(matches!(settings.server.database, Database::Sqlite(ref p) if p == "./expenses.db"));
        assert_eq!(settings.auth.token_ttl_seconds, 86_400);
        assert_eq!(settings.reporting.timezone, "UTC");
    }

    #[test]
    fn missing_secret_is_an_error() {
        assert!(Settings::from_builder(Config::builder()).is_err());
    }
}
