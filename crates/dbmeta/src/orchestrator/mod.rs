//! Build, update and export workflows.
//!
//! These tie the core to the filesystem: gather scripts from a directory,
//! open the connection through a caller-supplied function, run the replay
//! engine or the exporter and place the error log next to the work.

use std::borrow::Cow;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::core::{CatalogReader, Connection};
use crate::error::{MetaError, Result};
use crate::error_log::ErrorLog;
use crate::export::{ExportReport, MetadataExporter};
use crate::replay::{ReplayReport, ScriptRunner};
use crate::script::{order_by_kind, ScriptUnit};

/// Read every `*.sql` file in `dir`, sorted by file name and then by kind.
///
/// Bytes that are not UTF-8 are replaced rather than failing the whole load.
pub fn load_scripts(dir: &Path) -> Result<Vec<ScriptUnit>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_sql = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("sql"));
        if path.is_file() && is_sql {
            files.push(path);
        }
    }
    files.sort();

    let mut units = Vec::with_capacity(files.len());
    for path in &files {
        let bytes = fs::read(path)?;
        let origin = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content = String::from_utf8_lossy(&bytes);
        if let Cow::Owned(_) = content {
            warn!("{} is not valid UTF-8; invalid bytes replaced", origin);
        }
        units.push(ScriptUnit::new(origin, &content));
    }
    order_by_kind(&mut units);

    info!("Loaded {} SQL scripts from {:?}", units.len(), dir);
    Ok(units)
}

fn require_dir(dir: &Path, what: &str) -> Result<()> {
    if dir.as_os_str().is_empty() {
        return Err(MetaError::Config(format!("{} must not be empty", what)));
    }
    if !dir.is_dir() {
        return Err(MetaError::Config(format!(
            "{} does not exist: {}",
            what,
            dir.display()
        )));
    }
    Ok(())
}

fn finish_replay(mut report: ReplayReport, log: &ErrorLog) -> ReplayReport {
    if log.has_entries() {
        report.error_log = log.path().map(Path::to_path_buf);
    }
    report
}

/// Create a fresh database in `db_dir` and replay every script from `scripts_dir`.
///
/// An existing database file of the same name is replaced and a stale
/// `error.log` in `db_dir` is removed first. `create` receives the database
/// path and returns an open connection to the new, empty database; its
/// failure is logged and returned.
pub fn build_database<C, F>(
    db_dir: &Path,
    scripts_dir: &Path,
    database_file: &str,
    create: F,
) -> Result<ReplayReport>
where
    C: Connection,
    F: FnOnce(&Path) -> Result<C>,
{
    require_dir(scripts_dir, "scripts directory")?;
    fs::create_dir_all(db_dir)?;

    let db_path = db_dir.join(database_file);
    if db_path.exists() {
        info!("Removing existing database {:?}", db_path);
        fs::remove_file(&db_path)?;
    }

    let log = ErrorLog::in_dir(db_dir);
    log.reset();

    let units = load_scripts(scripts_dir)?;

    let mut conn = match create(&db_path) {
        Ok(conn) => conn,
        Err(e) => {
            let message = format!("Database creation failed: {}", e);
            warn!("{}", message);
            log.append_timestamped(&message);
            return Err(e);
        }
    };
    info!("Database created: {:?}", db_path);

    let report = ScriptRunner::new(&mut conn, &log).execute_scripts(&units);
    Ok(finish_replay(report, &log))
}

/// Replay every script from `scripts_dir` against an existing database.
///
/// Failures go to `<scripts_dir>/error.log`. With no scripts the connection
/// is never opened. A connection failure is logged once and reported; no
/// statement runs.
pub fn update_database<C, F>(scripts_dir: &Path, connect: F) -> Result<ReplayReport>
where
    C: Connection,
    F: FnOnce() -> Result<C>,
{
    require_dir(scripts_dir, "scripts directory")?;

    let units = load_scripts(scripts_dir)?;
    if units.is_empty() {
        info!("No SQL scripts found in {:?}", scripts_dir);
        return Ok(ReplayReport::default());
    }

    let log = ErrorLog::in_dir(scripts_dir);
    let mut conn = match connect() {
        Ok(conn) => conn,
        Err(e) => {
            let message = e.to_string();
            warn!("{}", message);
            log.append_timestamped(&message);
            return Ok(finish_replay(ReplayReport::aborted(units.len(), message), &log));
        }
    };

    let report = ScriptRunner::new(&mut conn, &log).execute_scripts(&units);
    Ok(finish_replay(report, &log))
}

/// Export domains, tables and procedures into `output_dir`.
///
/// Writes `domains.sql`, `tables.sql` and `procedures.sql`, overwriting
/// earlier exports. A connection failure is logged once and no files are
/// written; a write failure is logged and reported.
pub fn export_scripts<C, F>(output_dir: &Path, connect: F) -> Result<ExportReport>
where
    C: CatalogReader,
    F: FnOnce() -> Result<C>,
{
    if output_dir.as_os_str().is_empty() {
        return Err(MetaError::Config("output directory must not be empty".into()));
    }
    fs::create_dir_all(output_dir)?;

    let log = ErrorLog::in_dir(output_dir);
    let mut catalog = match connect() {
        Ok(conn) => conn,
        Err(e) => {
            let message = e.to_string();
            warn!("{}", message);
            log.append_timestamped(&message);
            let mut report = ExportReport::aborted(message);
            report.error_log = log.path().map(Path::to_path_buf);
            return Ok(report);
        }
    };

    let (scripts, mut report) = MetadataExporter::new(&mut catalog, &log).export();

    match scripts.write_to_dir(output_dir) {
        Ok(()) => {
            report.files_written = true;
            info!("Metadata exported to {:?}", output_dir);
        }
        Err(e) => {
            let message = format!("Failed to write export files: {}", e);
            warn!("{}", message);
            log.append_timestamped(&message);
            report.failures.push(message);
        }
    }

    if log.has_entries() {
        report.error_log = log.path().map(Path::to_path_buf);
    }
    Ok(report)
}
