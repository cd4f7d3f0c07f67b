//! Catalog export: rebuild definition scripts from live catalog metadata.
//!
//! Domains, tables and procedures are exported independently into three text
//! buffers. A failure on one object is logged and the object skipped; a
//! failure listing a whole category leaves that category empty. Neither stops
//! the other categories.

mod render;

pub use render::{render_domain, render_procedure, render_table, terminate, SignatureEntry};

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::core::{CatalogReader, ParameterDirection, ParameterRecord};
use crate::error::{MetaError, Result};
use crate::error_log::ErrorLog;

/// Output file for domain definitions.
pub const DOMAINS_FILE: &str = "domains.sql";
/// Output file for table definitions.
pub const TABLES_FILE: &str = "tables.sql";
/// Output file for procedure definitions.
pub const PROCEDURES_FILE: &str = "procedures.sql";

/// Type text used when a parameter's backing field cannot be found.
pub const UNRESOLVED_TYPE: &str = "UNKNOWN";

/// The three rendered script buffers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportedScripts {
    pub domains: String,
    pub tables: String,
    pub procedures: String,
}

impl ExportedScripts {
    /// `(file name, text)` pairs in replay order.
    pub fn files(&self) -> [(&'static str, &str); 3] {
        [
            (DOMAINS_FILE, self.domains.as_str()),
            (TABLES_FILE, self.tables.as_str()),
            (PROCEDURES_FILE, self.procedures.as_str()),
        ]
    }

    /// Write the three files into `dir`, overwriting previous exports.
    pub fn write_to_dir(&self, dir: &Path) -> Result<()> {
        for (name, text) in self.files() {
            fs::write(dir.join(name), text)?;
            debug!("Wrote {} ({} bytes)", name, text.len());
        }
        Ok(())
    }
}

/// Summary of an export run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportReport {
    pub domains: usize,
    pub tables: usize,
    pub procedures: usize,

    /// One message per object or category that could not be exported.
    pub failures: Vec<String>,

    /// Whether the output files were written.
    pub files_written: bool,

    /// Set when the connection could not be opened and nothing was exported.
    pub connection_error: Option<String>,

    /// Error log path, set by the caller when failures were written to it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_log: Option<PathBuf>,
}

impl ExportReport {
    /// Report for a run that never got a connection.
    pub fn aborted(error: impl Into<String>) -> Self {
        Self {
            connection_error: Some(error.into()),
            ..Self::default()
        }
    }

    pub fn is_clean(&self) -> bool {
        self.connection_error.is_none() && self.failures.is_empty()
    }
}

/// Renders catalog objects read through a [`CatalogReader`].
pub struct MetadataExporter<'a, R: CatalogReader + ?Sized> {
    catalog: &'a mut R,
    error_log: &'a ErrorLog,
    report: ExportReport,
}

impl<'a, R: CatalogReader + ?Sized> MetadataExporter<'a, R> {
    pub fn new(catalog: &'a mut R, error_log: &'a ErrorLog) -> Self {
        Self {
            catalog,
            error_log,
            report: ExportReport::default(),
        }
    }

    /// Export all three categories.
    pub fn export(mut self) -> (ExportedScripts, ExportReport) {
        let scripts = ExportedScripts {
            domains: self.export_domains(),
            tables: self.export_tables(),
            procedures: self.export_procedures(),
        };

        info!(
            "Export finished: {} domains, {} tables, {} procedures, {} failures",
            self.report.domains,
            self.report.tables,
            self.report.procedures,
            self.report.failures.len()
        );
        (scripts, self.report)
    }

    fn export_domains(&mut self) -> String {
        let names = match self.catalog.domain_names() {
            Ok(names) => names,
            Err(e) => {
                self.fail(MetaError::export("domains", e.to_string()));
                return String::new();
            }
        };

        let mut out = String::new();
        for name in &names {
            match self.catalog.domain(name) {
                Ok(Some(domain)) => {
                    out.push_str(&render_domain(&domain));
                    self.report.domains += 1;
                    info!("Generated domain: {}", name);
                }
                Ok(None) => self.fail(MetaError::export(
                    format!("domain {}", name),
                    "no longer present in the catalog",
                )),
                Err(e) => self.fail(MetaError::export(format!("domain {}", name), e.to_string())),
            }
        }
        out
    }

    fn export_tables(&mut self) -> String {
        let names = match self.catalog.table_names() {
            Ok(names) => names,
            Err(e) => {
                self.fail(MetaError::export("tables", e.to_string()));
                return String::new();
            }
        };

        let mut out = String::new();
        for name in &names {
            match self.catalog.table_columns(name) {
                Ok(columns) => {
                    debug!("Loaded {} columns for {}", columns.len(), name);
                    out.push_str(&render_table(name, &columns));
                    self.report.tables += 1;
                    info!("Generated table: {}", name);
                }
                Err(e) => self.fail(MetaError::export(format!("table {}", name), e.to_string())),
            }
        }
        out
    }

    fn export_procedures(&mut self) -> String {
        let names = match self.catalog.procedure_names() {
            Ok(names) => names,
            Err(e) => {
                self.fail(MetaError::export("procedures", e.to_string()));
                return String::new();
            }
        };

        let mut out = String::new();
        for name in &names {
            match self.procedure_text(name) {
                Ok(text) => {
                    out.push_str(&text);
                    self.report.procedures += 1;
                    info!("Generated procedure: {}", name);
                }
                Err(e) => self.fail(MetaError::export(format!("procedure {}", name), e.to_string())),
            }
        }
        out
    }

    fn procedure_text(&mut self, name: &str) -> Result<String> {
        let inputs = self
            .catalog
            .procedure_parameters(name, ParameterDirection::In)?;
        let outputs = self
            .catalog
            .procedure_parameters(name, ParameterDirection::Out)?;

        let inputs = self.signature(&inputs)?;
        let outputs = self.signature(&outputs)?;
        let source = self.catalog.procedure_source(name)?;

        Ok(render_procedure(name, &inputs, &outputs, source.as_deref()))
    }

    /// Resolve each parameter's type through its backing field.
    fn signature(&mut self, params: &[ParameterRecord]) -> Result<Vec<SignatureEntry>> {
        let mut entries = Vec::with_capacity(params.len());
        for param in params {
            let sql_type = match self.catalog.field_type(&param.field_source)? {
                Some(desc) => desc.sql_type(),
                None => {
                    self.log(&format!("Field/domain not found: {}", param.field_source));
                    UNRESOLVED_TYPE.to_string()
                }
            };
            entries.push(SignatureEntry::new(param.name.clone(), sql_type));
        }
        Ok(entries)
    }

    fn fail(&mut self, err: MetaError) {
        let message = err.to_string();
        self.log(&message);
        self.report.failures.push(message);
    }

    fn log(&self, message: &str) {
        warn!("{}", message);
        self.error_log.append_timestamped(message);
    }
}
