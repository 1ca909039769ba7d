//! Load and validation tests for booking-config.
// crates/booking-config/tests/load_validation.rs
// =============================================================================
// Module: Config Load Validation Tests
// Description: Validate file loading, session tokens, store, and transitions.
// Purpose: Ensure configuration fails closed on malformed input.
// =============================================================================

use std::path::PathBuf;

use booking_config::BookingGateConfig;
use booking_config::SessionMode;
use booking_config::StoreType;
use booking_core::Role;
use booking_core::Status;

mod common;

type TestResult = Result<(), String>;

// ============================================================================
// SECTION: Loading
// ============================================================================

#[test]
fn load_reads_full_config_file() -> TestResult {
    let (_dir, path) = common::write_config(
        r#"
        [server]
        bind = "0.0.0.0:9000"

        [server.session]
        mode = "bearer_token"

        [[server.session.tokens]]
        token = "manager-token"
        user_id = "m1"
        role = "DMP_MANAGER"

        [server.audit]
        enabled = false

        [store]
        type = "sqlite"
        path = "data/records.db"
        journal_mode = "delete"
        sync_mode = "normal"
        "#,
    )?;
    let config = BookingGateConfig::load(Some(&path)).map_err(|err| err.to_string())?;
    assert_eq!(config.server.bind_addr().map_err(|err| err.to_string())?.port(), 9000);
    assert_eq!(config.server.session.tokens.len(), 1);
    let session = config.server.session.tokens[0].session();
    assert_eq!(session.role(), Role::DmpManager);
    assert_eq!(session.user.status, Status::Approved);
    assert!(!config.server.audit.enabled);
    assert_eq!(config.store.store_type, StoreType::Sqlite);
    Ok(())
}

#[test]
fn load_rejects_missing_file() -> TestResult {
    let path = PathBuf::from("/nonexistent/booking-gate.toml");
    common::assert_invalid(BookingGateConfig::load(Some(&path)), "config io error")
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let padding = format!("# {}\n", "x".repeat(1024 * 1024));
    let (_dir, path) = common::write_config(&padding)?;
    common::assert_invalid(BookingGateConfig::load(Some(&path)), "exceeds size limit")
}

#[test]
fn load_rejects_malformed_toml() -> TestResult {
    let (_dir, path) = common::write_config("[server\nbind = 1")?;
    common::assert_invalid(BookingGateConfig::load(Some(&path)), "config parse error")
}

#[test]
fn load_rejects_unknown_role_literal() -> TestResult {
    let (_dir, path) = common::write_config(
        r#"
        [[server.session.tokens]]
        token = "t"
        user_id = "u"
        role = "ADMIN"
        "#,
    )?;
    common::assert_invalid(BookingGateConfig::load(Some(&path)), "config parse error")
}

// ============================================================================
// SECTION: Server
// ============================================================================

#[test]
fn invalid_bind_address_is_rejected() -> TestResult {
    let mut config = common::config_from_toml("").map_err(|err| err.to_string())?;
    config.server.bind = "localhost".to_string();
    common::assert_invalid(config.validate(), "invalid bind address")
}

#[test]
fn zero_max_body_bytes_is_rejected() -> TestResult {
    let mut config = common::config_from_toml("").map_err(|err| err.to_string())?;
    config.server.max_body_bytes = 0;
    common::assert_invalid(config.validate(), "max_body_bytes must be greater than zero")
}

#[test]
fn duplicate_session_tokens_are_rejected() -> TestResult {
    let config = common::config_from_toml(
        r#"
        [[server.session.tokens]]
        token = "same"
        user_id = "m1"
        role = "DMP_MANAGER"

        [[server.session.tokens]]
        token = "same"
        user_id = "s1"
        role = "SUPPLIER"
        "#,
    )
    .map_err(|err| err.to_string())?;
    common::assert_invalid(config.validate(), "duplicate session token")
}

#[test]
fn overlong_session_token_is_rejected() -> TestResult {
    let config = common::config_from_toml(&format!(
        "[[server.session.tokens]]\ntoken = \"{}\"\nuser_id = \"m1\"\nrole = \"DMP_MANAGER\"\n",
        "a".repeat(257)
    ))
    .map_err(|err| err.to_string())?;
    common::assert_invalid(config.validate(), "session token too long")
}

#[test]
fn trusted_header_mode_rejects_tokens() -> TestResult {
    let config = common::config_from_toml(
        r#"
        [server.session]
        mode = "trusted_header"

        [[server.session.tokens]]
        token = "t"
        user_id = "m1"
        role = "DMP_MANAGER"
        "#,
    )
    .map_err(|err| err.to_string())?;
    assert_eq!(config.server.session.mode, SessionMode::TrustedHeader);
    common::assert_invalid(config.validate(), "trusted_header sessions must not configure tokens")
}

#[test]
fn blank_audit_path_is_rejected() -> TestResult {
    let mut config = common::config_from_toml("").map_err(|err| err.to_string())?;
    config.server.audit.path = Some("  ".to_string());
    common::assert_invalid(config.validate(), "audit.path must be non-empty")
}

// ============================================================================
// SECTION: Store
// ============================================================================

#[test]
fn memory_store_rejects_path() -> TestResult {
    let mut config = common::config_from_toml("").map_err(|err| err.to_string())?;
    config.store.path = Some(PathBuf::from("records.db"));
    common::assert_invalid(config.validate(), "memory store must not set path")
}

#[test]
fn sqlite_store_requires_path() -> TestResult {
    let mut config = common::config_from_toml("").map_err(|err| err.to_string())?;
    config.store.store_type = StoreType::Sqlite;
    common::assert_invalid(config.validate(), "sqlite store requires path")
}

// ============================================================================
// SECTION: Transitions
// ============================================================================

#[test]
fn configured_transitions_replace_defaults() -> TestResult {
    let config = common::config_from_toml(
        r#"
        [[transitions]]
        collection = "suppliers"
        action = "approve"
        target_status = "APPROVED"
        authorized_role = "DMP_MANAGER"
        subject_label = "Supplier"
        from = ["PENDING"]

        [[transitions]]
        collection = "suppliers"
        action = "reset"
        target_status = "PENDING"
        authorized_role = "DMP_MANAGER"
        subject_label = "Supplier"
        message = "Supplier returned to review"
        "#,
    )
    .map_err(|err| err.to_string())?;
    config.validate().map_err(|err| err.to_string())?;
    let table = config.transition_table().map_err(|err| err.to_string())?;
    assert_eq!(table.len(), 2);
    assert!(table.lookup("category-managers", "reject").is_none());
    let reset = table.lookup("suppliers", "reset").ok_or("missing reset rule")?;
    assert_eq!(reset.success_message(), "Supplier returned to review");
    let approve = table.lookup("suppliers", "approve").ok_or("missing approve rule")?;
    assert_eq!(approve.guard_statuses(), Some(vec![Status::Pending, Status::Approved]));
    Ok(())
}

#[test]
fn duplicate_transition_routes_are_rejected() -> TestResult {
    let rule = r#"
        [[transitions]]
        collection = "suppliers"
        action = "approve"
        target_status = "APPROVED"
        authorized_role = "DMP_MANAGER"
        subject_label = "Supplier"
    "#;
    let config = common::config_from_toml(&format!("{rule}\n{rule}"))
        .map_err(|err| err.to_string())?;
    common::assert_invalid(config.validate(), "duplicate transition route: suppliers/approve")
}

#[test]
fn unsafe_transition_segment_is_rejected() -> TestResult {
    let config = common::config_from_toml(
        r#"
        [[transitions]]
        collection = "../admin"
        action = "approve"
        target_status = "APPROVED"
        authorized_role = "DMP_MANAGER"
        subject_label = "Admin"
        "#,
    )
    .map_err(|err| err.to_string())?;
    common::assert_invalid(config.validate(), "invalid transition")
}
