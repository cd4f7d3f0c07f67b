//! Configuration validation.

use super::{BuildConfig, Config, ConnectionConfig};
use crate::error::{MetaError, Result};
use std::path::{Component, Path};

/// Validate the configuration file contents.
///
/// The connection's database is not required here: `build-db` derives it
/// from the target directory. [`validate_connection`] checks it before connecting.
pub fn validate(config: &Config) -> Result<()> {
    if config.connection.port == 0 {
        return Err(MetaError::Config("connection.port must be non-zero".into()));
    }
    validate_build(&config.build)
}

/// Validate settings needed to open a connection.
pub fn validate_connection(conn: &ConnectionConfig) -> Result<()> {
    if conn.host.trim().is_empty() {
        return Err(MetaError::Config("connection.host is required".into()));
    }
    if conn.database.trim().is_empty() {
        return Err(MetaError::Config("connection.database is required".into()));
    }
    if conn.user.trim().is_empty() {
        return Err(MetaError::Config("connection.user is required".into()));
    }
    if conn.port == 0 {
        return Err(MetaError::Config("connection.port must be non-zero".into()));
    }
    Ok(())
}

fn validate_build(build: &BuildConfig) -> Result<()> {
    let mut components = Path::new(&build.database_file).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(MetaError::Config(format!(
            "build.database_file must be a plain file name, got '{}'",
            build.database_file
        ))),
    }
}
