// crates/booking-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Main Helpers Tests
// Description: Unit tests for argument parsing and record maintenance.
// Purpose: Ensure record commands open the right store and fail closed.
// Dependencies: booking-cli main helpers
// ============================================================================

//! ## Overview
//! Exercises clap parsing, store resolution, and the record commands against
//! temporary `SQLite` databases.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::PathBuf;

use booking_core::RecordId;
use booking_core::RecordStore;
use booking_core::Role;
use booking_core::Status;
use booking_store_sqlite::SqliteRecordStore;
use booking_store_sqlite::SqliteStoreConfig;
use booking_store_sqlite::SqliteStoreMode;
use clap::Parser;

use super::Cli;
use super::Commands;
use super::RecordCommand;
use super::RecordListCommand;
use super::RecordRegisterCommand;
use super::RecordShowCommand;
use super::StoreLocationArgs;
use super::build_record;
use super::command_record_list;
use super::command_record_register;
use super::command_record_show;
use super::resolve_sqlite_store_config;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn db_location(dir: &tempfile::TempDir) -> StoreLocationArgs {
    StoreLocationArgs {
        config: None,
        db: Some(dir.path().join("records.db")),
    }
}

fn register_command(location: StoreLocationArgs, id: &str, role: Role) -> RecordRegisterCommand {
    RecordRegisterCommand {
        location,
        id: id.to_string(),
        role,
        category: None,
        inn: None,
    }
}

fn write_config(dir: &tempfile::TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("booking-gate.toml");
    fs::write(&path, contents).unwrap();
    path
}

// ============================================================================
// SECTION: Parsing
// ============================================================================

#[test]
fn parses_record_register_arguments() {
    let cli = Cli::try_parse_from([
        "booking-gate",
        "record",
        "register",
        "--db",
        "records.db",
        "--id",
        "s42",
        "--role",
        "SUPPLIER",
        "--category",
        "food",
    ])
    .unwrap();
    let Commands::Record {
        command: RecordCommand::Register(command),
    } = cli.command
    else {
        panic!("expected record register");
    };
    assert_eq!(command.role, Role::Supplier);
    assert_eq!(command.category.as_deref(), Some("food"));
    assert_eq!(command.location.db, Some(PathBuf::from("records.db")));
}

#[test]
fn rejects_unknown_role() {
    let result = Cli::try_parse_from([
        "booking-gate",
        "record",
        "register",
        "--db",
        "records.db",
        "--id",
        "x",
        "--role",
        "ADMIN",
    ]);
    assert!(result.is_err());
}

#[test]
fn build_record_is_always_pending() {
    let mut command = register_command(
        StoreLocationArgs {
            config: None,
            db: None,
        },
        "s1",
        Role::Supplier,
    );
    command.inn = Some("7701".to_string());
    let record = build_record(&command);
    assert_eq!(record.status, Status::Pending);
    assert_eq!(record.inn.as_deref(), Some("7701"));
}

// ============================================================================
// SECTION: Store Resolution
// ============================================================================

#[test]
fn store_resolution_requires_a_location() {
    let location = StoreLocationArgs {
        config: None,
        db: None,
    };
    let err = resolve_sqlite_store_config(&location).unwrap_err();
    assert!(err.to_string().contains("require --db or --config"));
}

#[test]
fn store_resolution_rejects_memory_config_without_db() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = write_config(&dir, "[store]\ntype = \"memory\"\n");
    let location = StoreLocationArgs {
        config: Some(config),
        db: None,
    };
    let err = resolve_sqlite_store_config(&location).unwrap_err();
    assert!(err.to_string().contains("not sqlite"));
}

#[test]
fn store_resolution_uses_config_tuning_with_db_override() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = write_config(
        &dir,
        "[store]\ntype = \"sqlite\"\npath = \"other.db\"\nbusy_timeout_ms = 250\njournal_mode = \
         \"delete\"\n",
    );
    let db = dir.path().join("override.db");
    let location = StoreLocationArgs {
        config: Some(config),
        db: Some(db.clone()),
    };
    let resolved = resolve_sqlite_store_config(&location).unwrap();
    assert_eq!(resolved.path, db);
    assert_eq!(resolved.busy_timeout_ms, 250);
    assert_eq!(resolved.journal_mode, SqliteStoreMode::Delete);
}

// ============================================================================
// SECTION: Record Commands
// ============================================================================

#[test]
fn register_then_show_roundtrips_through_sqlite() {
    let dir = tempfile::TempDir::new().unwrap();
    let mut out = Vec::new();
    command_record_register(
        &register_command(db_location(&dir), "u123", Role::CategoryManager),
        &mut out,
    )
    .unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "registered u123 as PENDING\n");

    let mut out = Vec::new();
    command_record_show(
        &RecordShowCommand {
            location: db_location(&dir),
            id: "u123".to_string(),
        },
        &mut out,
    )
    .unwrap();
    let shown: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(shown["role"], "CATEGORY_MANAGER");
    assert_eq!(shown["status"], "PENDING");

    let store =
        SqliteRecordStore::new(&SqliteStoreConfig::for_path(dir.path().join("records.db")))
            .unwrap();
    let record = store.load(&RecordId::from("u123")).unwrap().unwrap();
    assert_eq!(record.role, Role::CategoryManager);
    assert_eq!(record.status, Status::Pending);
}

#[test]
fn duplicate_registration_fails() {
    let dir = tempfile::TempDir::new().unwrap();
    let mut out = Vec::new();
    command_record_register(&register_command(db_location(&dir), "s1", Role::Supplier), &mut out)
        .unwrap();
    let err = command_record_register(
        &register_command(db_location(&dir), "s1", Role::Supplier),
        &mut out,
    )
    .unwrap_err();
    assert!(err.to_string().starts_with("record register failed"));
    assert_eq!(String::from_utf8(out).unwrap().lines().count(), 1);
}

#[test]
fn list_writes_one_json_line_per_record() {
    let dir = tempfile::TempDir::new().unwrap();
    let mut sink = Vec::new();
    for (id, role) in [("s2", Role::Supplier), ("s1", Role::Supplier)] {
        command_record_register(&register_command(db_location(&dir), id, role), &mut sink)
            .unwrap();
    }
    let mut out = Vec::new();
    command_record_list(
        &RecordListCommand {
            location: db_location(&dir),
        },
        &mut out,
    )
    .unwrap();
    let ids: Vec<String> = String::from_utf8(out)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str::<serde_json::Value>(line).unwrap()["id"].to_string())
        .collect();
    assert_eq!(ids, vec!["\"s1\"".to_string(), "\"s2\"".to_string()]);
}

#[test]
fn show_missing_record_fails() {
    let dir = tempfile::TempDir::new().unwrap();
    let mut out = Vec::new();
    let err = command_record_show(
        &RecordShowCommand {
            location: db_location(&dir),
            id: "ghost".to_string(),
        },
        &mut out,
    )
    .unwrap_err();
    assert!(out.is_empty());
    assert_eq!(err.to_string(), "record not found: ghost");
}
