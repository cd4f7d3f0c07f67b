//! Configuration type definitions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Database connection settings.
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// Settings for building a fresh database.
    #[serde(default)]
    pub build: BuildConfig,
}

/// Firebird connection settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Server host (default: "localhost").
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port (default: 3050).
    #[serde(default = "default_port")]
    pub port: u16,

    /// Database file path or alias on the server.
    #[serde(default)]
    pub database: String,

    /// Username (default: "SYSDBA").
    #[serde(default = "default_user")]
    pub user: String,

    /// Password (default: "masterkey").
    #[serde(default = "default_password")]
    pub password: String,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database: String::new(),
            user: default_user(),
            password: default_password(),
        }
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Settings for `build-db`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// File name of the database created inside the target directory
    /// (default: "database.fdb").
    #[serde(default = "default_database_file")]
    pub database_file: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            database_file: default_database_file(),
        }
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    3050
}

fn default_user() -> String {
    "SYSDBA".to_string()
}

fn default_password() -> String {
    "masterkey".to_string()
}

fn default_database_file() -> String {
    "database.fdb".to_string()
}
