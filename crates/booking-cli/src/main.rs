// crates/booking-cli/src/main.rs
// ============================================================================
// Module: Booking Gate CLI Entry Point
// Description: Command dispatcher for the server and record maintenance.
// Purpose: Run the HTTP gate and seed or inspect records offline.
// Dependencies: clap, booking-config, booking-core, booking-server, tokio
// ============================================================================

//! ## Overview
//! `booking-gate serve` runs the HTTP server. `booking-gate config validate`
//! checks a config file. `booking-gate record ...` registers and inspects
//! records in a `SQLite` store; registration always starts in `PENDING` and
//! is the only way records enter the store.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use booking_config::BookingGateConfig;
use booking_core::Record;
use booking_core::RecordId;
use booking_core::RecordStore;
use booking_core::Role;
use booking_server::BookingServer;
use booking_store_sqlite::SqliteRecordStore;
use booking_store_sqlite::SqliteStoreConfig;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "booking-gate", version, disable_help_subcommand = true)]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the Booking Gate HTTP server.
    Serve(ServeCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Record maintenance utilities.
    Record {
        /// Selected record subcommand.
        #[command(subcommand)]
        command: RecordCommand,
    },
}

/// Arguments for `serve`.
#[derive(Args, Debug)]
struct ServeCommand {
    /// Optional config file path (defaults to booking-gate.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Configuration subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Load and validate a config file.
    Validate(ConfigValidateCommand),
}

/// Arguments for `config validate`.
#[derive(Args, Debug)]
struct ConfigValidateCommand {
    /// Optional config file path (defaults to booking-gate.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Record subcommands.
#[derive(Subcommand, Debug)]
enum RecordCommand {
    /// Register a new PENDING record.
    Register(RecordRegisterCommand),
    /// Print one record as JSON.
    Show(RecordShowCommand),
    /// Print all records as JSON lines.
    List(RecordListCommand),
}

/// Store location inputs for record commands.
#[derive(Args, Debug, Clone)]
struct StoreLocationArgs {
    /// Optional config file path; its sqlite store settings are used.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Direct `SQLite` database path (overrides the configured path).
    #[arg(long, value_name = "PATH")]
    db: Option<PathBuf>,
}

/// Arguments for `record register`.
#[derive(Args, Debug)]
struct RecordRegisterCommand {
    /// Store location.
    #[command(flatten)]
    location: StoreLocationArgs,
    /// Record identifier.
    #[arg(long, value_name = "ID")]
    id: String,
    /// Actor role (`DMP_MANAGER`, `CATEGORY_MANAGER`, `SUPPLIER`).
    #[arg(long, value_name = "ROLE", value_parser = parse_role)]
    role: Role,
    /// Optional supplier category.
    #[arg(long, value_name = "CATEGORY")]
    category: Option<String>,
    /// Optional taxpayer identification number.
    #[arg(long, value_name = "INN")]
    inn: Option<String>,
}

/// Arguments for `record show`.
#[derive(Args, Debug)]
struct RecordShowCommand {
    /// Store location.
    #[command(flatten)]
    location: StoreLocationArgs,
    /// Record identifier.
    #[arg(long, value_name = "ID")]
    id: String,
}

/// Arguments for `record list`.
#[derive(Args, Debug)]
struct RecordListCommand {
    /// Store location.
    #[command(flatten)]
    location: StoreLocationArgs,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Commands::Serve(command) => command_serve(command).await,
        Commands::Config {
            command,
        } => command_config(command),
        Commands::Record {
            command,
        } => command_record(command),
    }
}

// ============================================================================
// SECTION: Serve Command
// ============================================================================

/// Executes the `serve` command.
async fn command_serve(command: ServeCommand) -> CliResult<ExitCode> {
    let config = BookingGateConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    let server = tokio::task::spawn_blocking(move || BookingServer::from_config(config))
        .await
        .map_err(|err| CliError::new(format!("server init failed: init join failed: {err}")))?
        .map_err(|err| CliError::new(format!("server init failed: {err}")))?;
    server.serve().await.map_err(|err| CliError::new(format!("server failed: {err}")))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands.
fn command_config(command: ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate(command) => command_config_validate(&command),
    }
}

/// Executes the config validation command.
fn command_config_validate(command: &ConfigValidateCommand) -> CliResult<ExitCode> {
    let _config = BookingGateConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    write_stdout_line("ok").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Record Commands
// ============================================================================

/// Dispatches record subcommands.
fn command_record(command: RecordCommand) -> CliResult<ExitCode> {
    let mut stdout = std::io::stdout();
    match command {
        RecordCommand::Register(command) => command_record_register(&command, &mut stdout),
        RecordCommand::Show(command) => command_record_show(&command, &mut stdout),
        RecordCommand::List(command) => command_record_list(&command, &mut stdout),
    }
}

/// Executes `record register`.
fn command_record_register(
    command: &RecordRegisterCommand,
    out: &mut impl Write,
) -> CliResult<ExitCode> {
    let store = open_sqlite_store(&command.location)?;
    let record = build_record(command);
    store
        .register(&record)
        .map_err(|err| CliError::new(format!("record register failed: {err}")))?;
    write_line(out, &format!("registered {} as {}", record.id, record.status))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `record show`.
fn command_record_show(command: &RecordShowCommand, out: &mut impl Write) -> CliResult<ExitCode> {
    let store = open_sqlite_store(&command.location)?;
    let id = RecordId::new(command.id.clone());
    let record = store
        .load(&id)
        .map_err(|err| CliError::new(format!("record load failed: {err}")))?
        .ok_or_else(|| CliError::new(format!("record not found: {id}")))?;
    write_line(out, &render_record(&record)?)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `record list`.
fn command_record_list(command: &RecordListCommand, out: &mut impl Write) -> CliResult<ExitCode> {
    let store = open_sqlite_store(&command.location)?;
    let records =
        store.list().map_err(|err| CliError::new(format!("record list failed: {err}")))?;
    for record in &records {
        write_line(out, &render_record(record)?)?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Builds the PENDING record described by `record register`.
fn build_record(command: &RecordRegisterCommand) -> Record {
    let mut record = Record::pending(command.id.as_str(), command.role);
    if let Some(category) = &command.category {
        record = record.with_category(category.as_str());
    }
    if let Some(inn) = &command.inn {
        record = record.with_inn(inn.as_str());
    }
    record
}

/// Renders a record as a single JSON line.
fn render_record(record: &Record) -> CliResult<String> {
    serde_json::to_string(record)
        .map_err(|err| CliError::new(format!("record serialization failed: {err}")))
}

// ============================================================================
// SECTION: Store Helpers
// ============================================================================

/// Resolves `SQLite` settings from `--db` and/or `--config`.
fn resolve_sqlite_store_config(location: &StoreLocationArgs) -> CliResult<SqliteStoreConfig> {
    match (&location.db, location.config.as_deref()) {
        (Some(db), None) => Ok(SqliteStoreConfig::for_path(db)),
        (Some(db), Some(config_path)) => {
            let config = load_config(config_path)?;
            Ok(SqliteStoreConfig {
                path: db.clone(),
                busy_timeout_ms: config.store.busy_timeout_ms,
                journal_mode: config.store.journal_mode,
                sync_mode: config.store.sync_mode,
            })
        }
        (None, Some(config_path)) => load_config(config_path)?.store.sqlite_config().ok_or_else(
            || CliError::new("configured store is not sqlite; pass --db".to_string()),
        ),
        (None, None) => Err(CliError::new("record commands require --db or --config".to_string())),
    }
}

/// Loads and validates a config file for store resolution.
fn load_config(path: &Path) -> CliResult<BookingGateConfig> {
    BookingGateConfig::load(Some(path))
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))
}

/// Opens the `SQLite` record store for a record command.
fn open_sqlite_store(location: &StoreLocationArgs) -> CliResult<SqliteRecordStore> {
    let config = resolve_sqlite_store_config(location)?;
    SqliteRecordStore::new(&config)
        .map_err(|err| CliError::new(format!("failed to open record store: {err}")))
}

/// Parses a role wire name for clap.
fn parse_role(value: &str) -> Result<Role, String> {
    value.parse::<Role>().map_err(|err| err.to_string())
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a command output line to `out`.
fn write_line(out: &mut impl Write, message: &str) -> CliResult<()> {
    writeln!(out, "{message}").map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output stream failure.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
