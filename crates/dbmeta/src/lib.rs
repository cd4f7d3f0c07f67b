//! # dbmeta
//!
//! Firebird schema export and ordered script replay.
//!
//! This library provides:
//!
//! - **Metadata export** of domains, tables and stored procedures into
//!   re-executable SQL scripts
//! - **Type mapping** from catalog type codes to SQL type text
//! - **Script replay** in dependency order (domains, tables, procedures),
//!   with per-statement failure isolation and a plain-text error log
//! - **Build and update** workflows over a directory of `*.sql` files
//!
//! ## Example
//!
//! ```rust,no_run
//! # #[cfg(feature = "firebird")]
//! # fn main() -> dbmeta::Result<()> {
//! use dbmeta::{orchestrator, ConnectionConfig};
//! use std::path::Path;
//!
//! let conn = ConnectionConfig::from_connection_string(
//!     "DataSource=localhost;Database=/data/app.fdb;User=SYSDBA;Password=masterkey",
//! )?;
//! let report = orchestrator::export_scripts(Path::new("export"), || {
//!     dbmeta::drivers::firebird::connect(&conn)
//! })?;
//! println!("Exported {} tables", report.tables);
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "firebird"))]
//! # fn main() {}
//! ```

pub mod config;
pub mod core;
pub mod drivers;
pub mod error;
pub mod error_log;
pub mod export;
pub mod orchestrator;
pub mod replay;
pub mod script;
pub mod typemap;

// Re-exports for convenient access
pub use crate::core::{CatalogReader, Connection};
pub use config::{BuildConfig, Config, ConnectionConfig};
pub use error::{MetaError, Result};
pub use error_log::ErrorLog;
pub use export::{ExportReport, ExportedScripts, MetadataExporter};
pub use replay::{ExecutionOutcome, ReplayReport, ScriptRunner};
pub use script::{classify, ScriptKind, ScriptUnit};
pub use typemap::{map_type, TypeDescriptor};
