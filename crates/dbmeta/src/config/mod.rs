//! Configuration loading and validation.

mod types;
mod validation;

pub use types::*;
pub use validation::validate_connection;

use crate::error::{MetaError, Result};
use std::path::Path;
use tracing::debug;

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }
}

impl ConnectionConfig {
    /// Parse an ADO-style Firebird connection string such as
    /// `DataSource=localhost;Port=3050;Database=/data/app.fdb;User=SYSDBA;Password=masterkey`.
    ///
    /// Keys are case-insensitive; keys that do not affect the connection are ignored.
    /// Unset values keep their defaults.
    pub fn from_connection_string(s: &str) -> Result<Self> {
        if s.trim().is_empty() {
            return Err(MetaError::Config("connection string must not be empty".into()));
        }

        let mut config = ConnectionConfig::default();
        for part in s.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = part.split_once('=').ok_or_else(|| {
                MetaError::Config(format!("invalid connection string segment '{}'", part))
            })?;
            let value = value.trim().to_string();

            match normalize_key(key).as_str() {
                "datasource" | "server" | "host" => config.host = value,
                "port" => {
                    config.port = value.parse().map_err(|_| {
                        MetaError::Config(format!("invalid port '{}' in connection string", value))
                    })?
                }
                "database" | "initialcatalog" => config.database = value,
                "user" | "userid" | "username" => config.user = value,
                "password" | "pwd" => config.password = value,
                other => debug!("Ignoring connection string key '{}'", other),
            }
        }

        Ok(config)
    }

    /// Copy of this configuration pointing at another database file.
    pub fn with_database(&self, database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            ..self.clone()
        }
    }
}

fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}
