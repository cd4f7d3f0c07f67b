//! Plain-text error log shared by export and replay.
//!
//! One line per failure, appended for the duration of an operation. Writing is
//! best-effort: a log that cannot be written never fails the operation.

use chrono::{SecondsFormat, Utc};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default error log file name inside the working directory of an operation.
pub const ERROR_LOG_FILE: &str = "error.log";

/// Append-only failure log.
#[derive(Debug, Clone)]
pub struct ErrorLog {
    path: Option<PathBuf>,
}

impl ErrorLog {
    /// Log appending to `path`. The file is created on the first failure.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Log named [`ERROR_LOG_FILE`] inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(ERROR_LOG_FILE))
    }

    /// Log that discards every line.
    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Whether at least one failure has been written.
    pub fn has_entries(&self) -> bool {
        self.path
            .as_deref()
            .and_then(|p| fs::metadata(p).ok())
            .is_some_and(|m| m.len() > 0)
    }

    /// Remove a log left over from a previous run.
    pub fn reset(&self) {
        if let Some(path) = &self.path {
            if path.exists() {
                if let Err(e) = fs::remove_file(path) {
                    debug!("Could not remove old error log {:?}: {}", path, e);
                }
            }
        }
    }

    /// Append one line as-is.
    pub fn append(&self, line: &str) {
        let Some(path) = &self.path else {
            return;
        };

        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .and_then(|mut file| writeln!(file, "{}", line));

        if let Err(e) = result {
            debug!("Could not write to error log {:?}: {}", path, e);
        }
    }

    /// Append one line prefixed with the current UTC time.
    pub fn append_timestamped(&self, message: &str) {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
        self.append(&format!("{} {}", now, message));
    }
}
