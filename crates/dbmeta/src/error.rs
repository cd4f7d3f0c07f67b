//! Error types for the dbmeta library.

use thiserror::Error;

/// Exit code for configuration errors (bad YAML, missing fields, bad arguments).
pub const EXIT_CONFIG_ERROR: u8 = 1;
/// Exit code when the database cannot be opened or authenticated against.
pub const EXIT_CONNECTION_ERROR: u8 = 2;
/// Exit code for database engine errors outside per-item recovery.
pub const EXIT_DATABASE_ERROR: u8 = 3;
/// Exit code for filesystem errors.
pub const EXIT_IO_ERROR: u8 = 7;

/// Main error type for export and replay operations.
#[derive(Error, Debug)]
pub enum MetaError {
    /// Configuration error (invalid YAML, missing fields, bad paths)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Cannot open or authenticate to the database
    #[error("Database connection failed: {0}")]
    Connection(String),

    /// Statement or catalog query rejected by the engine
    #[error("Database error: {0}")]
    Engine(String),

    /// Error raised by the Firebird client
    #[cfg(feature = "firebird")]
    #[error("Firebird error: {0}")]
    Firebird(#[from] rsfbclient::FbError),

    /// A catalog object could not be rendered
    #[error("Export failed for {object}: {message}")]
    Export { object: String, message: String },

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MetaError {
    /// Create an Export error for a named catalog object.
    pub fn export(object: impl Into<String>, message: impl Into<String>) -> Self {
        MetaError::Export {
            object: object.into(),
            message: message.into(),
        }
    }

    /// Process exit code for this error kind.
    pub fn exit_code(&self) -> u8 {
        match self {
            MetaError::Config(_) | MetaError::Yaml(_) | MetaError::Json(_) => EXIT_CONFIG_ERROR,
            MetaError::Connection(_) => EXIT_CONNECTION_ERROR,
            MetaError::Engine(_) | MetaError::Export { .. } => EXIT_DATABASE_ERROR,
            #[cfg(feature = "firebird")]
            MetaError::Firebird(_) => EXIT_DATABASE_ERROR,
            MetaError::Io(_) => EXIT_IO_ERROR,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for dbmeta operations.
pub type Result<T> = std::result::Result<T, MetaError>;
