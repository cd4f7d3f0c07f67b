//! Ordered, failure-isolated replay of definition scripts.
//!
//! Domain scripts run statement by statement (split on `;`); every other kind
//! runs as one statement. A failing statement is logged and skipped: the
//! batch always runs to the end. Nothing is retried and nothing is rolled back.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{info, warn};

use crate::core::Connection;
use crate::error_log::ErrorLog;
use crate::script::{ScriptKind, ScriptUnit};

/// How much of a script one outcome covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    /// One `;`-separated statement of a domain script.
    Statement,
    /// The whole script text.
    File,
}

/// Result of running one statement or one whole script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    /// Origin of the script (file name).
    pub origin: String,

    /// 1-based statement number; always 1 for whole-file execution.
    pub sequence: usize,

    pub granularity: Granularity,

    /// Engine error text, present iff the statement failed.
    pub error: Option<String>,
}

impl ExecutionOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }

    /// Error log line for a failed outcome.
    pub fn log_line(&self) -> Option<String> {
        let message = self.error.as_deref()?;
        Some(match self.granularity {
            Granularity::Statement => format!(
                "Error in domain statement {} of file {}: {}",
                self.sequence, self.origin, message
            ),
            Granularity::File => format!("Error in file {}: {}", self.origin, message),
        })
    }
}

/// Outcome of a replay run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplayReport {
    /// Number of scripts handed to the run.
    pub scripts: usize,

    /// One entry per attempted statement, in execution order.
    pub outcomes: Vec<ExecutionOutcome>,

    /// Set when the connection could not be opened and nothing ran.
    pub connection_error: Option<String>,

    /// Error log path, set by the caller when failures were written to it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_log: Option<PathBuf>,
}

impl ReplayReport {
    /// Report for a run that never got a connection.
    pub fn aborted(scripts: usize, error: impl Into<String>) -> Self {
        Self {
            scripts,
            connection_error: Some(error.into()),
            ..Self::default()
        }
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    /// Failed outcomes in execution order.
    pub fn failures(&self) -> impl Iterator<Item = &ExecutionOutcome> {
        self.outcomes.iter().filter(|o| !o.succeeded())
    }

    /// True when nothing failed and the connection was available.
    pub fn is_clean(&self) -> bool {
        self.connection_error.is_none() && self.failed() == 0
    }
}

/// Split a domain script into its statements.
///
/// Naive split on `;`: semicolons inside string literals are not recognised.
pub fn split_statements(text: &str) -> Vec<&str> {
    text.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Runs definition scripts against one open connection.
pub struct ScriptRunner<'a, C: Connection + ?Sized> {
    conn: &'a mut C,
    error_log: &'a ErrorLog,
}

impl<'a, C: Connection + ?Sized> ScriptRunner<'a, C> {
    pub fn new(conn: &'a mut C, error_log: &'a ErrorLog) -> Self {
        Self { conn, error_log }
    }

    /// Execute scripts in the given order.
    ///
    /// Callers sort the units first (see [`crate::script::order_by_kind`]).
    pub fn execute_scripts(&mut self, units: &[ScriptUnit]) -> ReplayReport {
        let mut report = ReplayReport {
            scripts: units.len(),
            ..ReplayReport::default()
        };

        for unit in units {
            match unit.kind() {
                ScriptKind::Domain => self.execute_per_statement(unit, &mut report.outcomes),
                _ => {
                    let outcome = self.run(unit.origin(), unit.content(), 1, Granularity::File);
                    report.outcomes.push(outcome);
                }
            }
        }

        info!(
            "Replay finished: {} scripts, {} statements ok, {} failed",
            report.scripts,
            report.succeeded(),
            report.failed()
        );
        report
    }

    fn execute_per_statement(&mut self, unit: &ScriptUnit, outcomes: &mut Vec<ExecutionOutcome>) {
        for (idx, statement) in split_statements(unit.content()).into_iter().enumerate() {
            let outcome = self.run(unit.origin(), statement, idx + 1, Granularity::Statement);
            outcomes.push(outcome);
        }
    }

    fn run(
        &mut self,
        origin: &str,
        sql: &str,
        sequence: usize,
        granularity: Granularity,
    ) -> ExecutionOutcome {
        let error = match self.conn.execute(sql) {
            Ok(()) => {
                match granularity {
                    Granularity::Statement => {
                        info!("Executed domain statement {} from {}", sequence, origin)
                    }
                    Granularity::File => info!("Executed file {}", origin),
                }
                None
            }
            Err(e) => Some(e.to_string()),
        };

        let outcome = ExecutionOutcome {
            origin: origin.to_string(),
            sequence,
            granularity,
            error,
        };

        if let Some(line) = outcome.log_line() {
            warn!("{}", line);
            self.error_log.append(&line);
        }

        outcome
    }
}
