// crates/booking-config/tests/common/mod.rs
// =============================================================================
// Module: Config Test Helpers
// Description: Shared helpers for config validation tests.
// Purpose: Reduce duplication across integration tests for booking-config.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use std::path::PathBuf;

use booking_config::BookingGateConfig;
use booking_config::ConfigError;
use tempfile::TempDir;

/// Parses a TOML string into a `BookingGateConfig` for tests.
pub fn config_from_toml(toml_str: &str) -> Result<BookingGateConfig, toml::de::Error> {
    toml::from_str(toml_str)
}

/// Writes `contents` to a config file inside a fresh temp dir.
pub fn write_config(contents: &str) -> Result<(TempDir, PathBuf), String> {
    let dir = TempDir::new().map_err(|err| err.to_string())?;
    let path = dir.path().join("booking-gate.toml");
    std::fs::write(&path, contents).map_err(|err| err.to_string())?;
    Ok((dir, path))
}

/// Asserts that `result` failed with a message containing `needle`.
pub fn assert_invalid<T>(result: Result<T, ConfigError>, needle: &str) -> Result<(), String> {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config".to_string()),
    }
}
