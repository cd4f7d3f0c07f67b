//! dbmeta CLI - Firebird schema export and script replay.

use clap::{Parser, Subcommand};
use dbmeta::drivers::firebird;
use dbmeta::{orchestrator, Config, ConnectionConfig, ExportReport, MetaError, ReplayReport};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, Level};
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Parser)]
#[command(name = "dbmeta")]
#[command(about = "Firebird schema export and ordered script replay")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output JSON result to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a fresh database and replay every script into it
    BuildDb {
        /// Directory that receives the database file and error.log
        #[arg(long)]
        db_dir: PathBuf,

        /// Directory containing *.sql scripts
        #[arg(long)]
        scripts_dir: PathBuf,
    },

    /// Export domains, tables and procedures as SQL scripts
    ExportScripts {
        /// Firebird connection string (overrides the config file)
        #[arg(long)]
        connection_string: Option<String>,

        /// Directory that receives domains.sql, tables.sql and procedures.sql
        #[arg(long)]
        output_dir: PathBuf,
    },

    /// Replay scripts against an existing database
    UpdateDb {
        /// Firebird connection string (overrides the config file)
        #[arg(long)]
        connection_string: Option<String>,

        /// Directory containing *.sql scripts
        #[arg(long)]
        scripts_dir: PathBuf,
    },
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

fn run() -> Result<(), MetaError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format).map_err(MetaError::Config)?;

    let config = match &cli.config {
        Some(path) => {
            let config = Config::load(path)?;
            info!("Loaded configuration from {:?}", path);
            Some(config)
        }
        None => None,
    };

    match cli.command {
        Commands::BuildDb {
            db_dir,
            scripts_dir,
        } => {
            let config = config.unwrap_or_default();
            let db_dir = absolute(&db_dir)?;
            let server = config.connection.clone();

            let report = orchestrator::build_database(
                &db_dir,
                &scripts_dir,
                &config.build.database_file,
                |path| firebird::create_database(&server.with_database(path.to_string_lossy())),
            )?;

            print_replay(&report, cli.output_json, "Build")?;
        }

        Commands::ExportScripts {
            connection_string,
            output_dir,
        } => {
            let conn = resolve_connection(connection_string.as_deref(), config.as_ref())?;
            let report = orchestrator::export_scripts(&output_dir, || firebird::connect(&conn))?;

            print_export(&report, &output_dir, cli.output_json)?;
            if let Some(err) = report.connection_error {
                return Err(MetaError::Connection(err));
            }
        }

        Commands::UpdateDb {
            connection_string,
            scripts_dir,
        } => {
            let conn = resolve_connection(connection_string.as_deref(), config.as_ref())?;
            let report = orchestrator::update_database(&scripts_dir, || firebird::connect(&conn))?;

            if report.scripts == 0 && !cli.output_json {
                println!("No SQL scripts found in {}", scripts_dir.display());
                return Ok(());
            }
            print_replay(&report, cli.output_json, "Update")?;
            if let Some(err) = report.connection_error {
                return Err(MetaError::Connection(err));
            }
        }
    }

    Ok(())
}

/// Connection settings from the command line, else from the config file.
fn resolve_connection(
    connection_string: Option<&str>,
    config: Option<&Config>,
) -> Result<ConnectionConfig, MetaError> {
    match (connection_string, config) {
        (Some(cs), _) => ConnectionConfig::from_connection_string(cs),
        (None, Some(config)) if !config.connection.database.is_empty() => {
            Ok(config.connection.clone())
        }
        _ => Err(MetaError::Config(
            "no connection: pass --connection-string or set connection.database in --config"
                .to_string(),
        )),
    }
}

/// The server resolves database paths itself, so relative paths are anchored here.
fn absolute(path: &Path) -> Result<PathBuf, MetaError> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

fn print_replay(report: &ReplayReport, output_json: bool, label: &str) -> Result<(), MetaError> {
    if output_json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    if let Some(ref err) = report.connection_error {
        println!("\n{} aborted: {}", label, err);
    } else {
        println!("\n{} completed!", label);
        println!("  Scripts: {}", report.scripts);
        println!("  Statements succeeded: {}", report.succeeded());
        println!("  Statements failed: {}", report.failed());
        for failure in report.failures() {
            if let Some(line) = failure.log_line() {
                println!("    {}", line);
            }
        }
    }
    if let Some(ref path) = report.error_log {
        println!("  Error log: {}", path.display());
    }
    Ok(())
}

fn print_export(report: &ExportReport, output_dir: &Path, output_json: bool) -> Result<(), MetaError> {
    if output_json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    if let Some(ref err) = report.connection_error {
        println!("\nExport aborted: {}", err);
    } else {
        println!("\nExport completed!");
        println!("  Domains: {}", report.domains);
        println!("  Tables: {}", report.tables);
        println!("  Procedures: {}", report.procedures);
        if report.files_written {
            println!("  Output: {}", output_dir.display());
        }
        if !report.failures.is_empty() {
            println!("  Failures: {}", report.failures.len());
        }
    }
    if let Some(ref path) = report.error_log {
        println!("  Error log: {}", path.display());
    }
    Ok(())
}

fn setup_logging(verbosity: &str, format: &str) -> Result<(), String> {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(std::io::stderr);

    match format {
        "json" => subscriber.json().init(),
        "text" => subscriber.init(),
        other => return Err(format!("unknown log format '{}' (expected text or json)", other)),
    }

    Ok(())
}
