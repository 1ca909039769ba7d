// crates/booking-config/src/config.rs
// ============================================================================
// Module: Booking Gate Configuration
// Description: Configuration loading and validation for Booking Gate.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: booking-core, booking-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Missing or invalid configuration fails closed. An empty file is valid and
//! yields the defaults: loopback bind, bearer-token sessions with no tokens
//! (every transition is unauthorized), stderr audit, in-memory store, and
//! the default transition table.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;

use booking_core::RecordId;
use booking_core::Role;
use booking_core::Session;
use booking_core::SessionUser;
use booking_core::Status;
use booking_core::TransitionRule;
use booking_core::TransitionTable;
use booking_store_sqlite::SqliteStoreConfig;
use booking_store_sqlite::SqliteStoreMode;
use booking_store_sqlite::SqliteSyncMode;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "booking-gate.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "BOOKING_GATE_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum number of session tokens.
pub(crate) const MAX_SESSION_TOKENS: usize = 64;
/// Maximum length of a session token.
pub(crate) const MAX_SESSION_TOKEN_LENGTH: usize = 256;
/// Maximum length of a session user identifier.
pub(crate) const MAX_USER_ID_LENGTH: usize = 256;
/// Default bind address.
pub(crate) const DEFAULT_BIND: &str = "127.0.0.1:8080";
/// Default maximum request body size in bytes.
pub(crate) const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024;
/// Upper bound on the configurable request body size.
pub(crate) const MAX_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;
/// Default busy timeout (ms) for `SQLite` stores.
pub(crate) const DEFAULT_STORE_BUSY_TIMEOUT_MS: u64 = 5_000;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Booking Gate configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingGateConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Record store configuration.
    #[serde(default)]
    pub store: StoreConfig,
    /// Transition table override. Empty means the default table.
    #[serde(default)]
    pub transitions: Vec<TransitionRule>,
}

impl BookingGateConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.store.validate()?;
        self.transition_table()?;
        Ok(())
    }

    /// Builds the effective transition table.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the configured rules are invalid.
    pub fn transition_table(&self) -> Result<TransitionTable, ConfigError> {
        if self.transitions.is_empty() {
            return Ok(TransitionTable::default());
        }
        TransitionTable::new(self.transitions.iter().cloned())
            .map_err(|err| ConfigError::Invalid(err.to_string()))
    }
}

// ============================================================================
// SECTION: Server
// ============================================================================

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Maximum request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    /// Session resolution configuration.
    #[serde(default)]
    pub session: SessionConfig,
    /// Audit logging configuration.
    #[serde(default)]
    pub audit: ServerAuditConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_body_bytes: default_max_body_bytes(),
            session: SessionConfig::default(),
            audit: ServerAuditConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Validates server configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        self.bind_addr()?;
        if self.max_body_bytes == 0 {
            return Err(ConfigError::Invalid(
                "max_body_bytes must be greater than zero".to_string(),
            ));
        }
        if self.max_body_bytes > MAX_MAX_BODY_BYTES {
            return Err(ConfigError::Invalid("max_body_bytes exceeds limit".to_string()));
        }
        self.session.validate()?;
        self.audit.validate()
    }

    /// Parses the bind address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the address is not a socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("invalid bind address: {}", self.bind)))
    }
}

/// Session resolution modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    /// `Authorization: Bearer` tokens mapped to configured users.
    #[default]
    BearerToken,
    /// Session JSON forwarded by a trusted upstream proxy.
    TrustedHeader,
}

/// Session resolution configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionConfig {
    /// Resolution mode.
    #[serde(default)]
    pub mode: SessionMode,
    /// Static token table for `bearer_token` mode.
    #[serde(default)]
    pub tokens: Vec<SessionTokenConfig>,
}

impl SessionConfig {
    /// Validates session configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.mode == SessionMode::TrustedHeader && !self.tokens.is_empty() {
            return Err(ConfigError::Invalid(
                "trusted_header sessions must not configure tokens".to_string(),
            ));
        }
        if self.tokens.len() > MAX_SESSION_TOKENS {
            return Err(ConfigError::Invalid("too many session tokens".to_string()));
        }
        let mut seen = BTreeSet::new();
        for entry in &self.tokens {
            entry.validate()?;
            if !seen.insert(entry.token.as_str()) {
                return Err(ConfigError::Invalid("duplicate session token".to_string()));
            }
        }
        Ok(())
    }
}

/// A bearer token and the session it resolves to.
#[derive(Clone, Deserialize)]
pub struct SessionTokenConfig {
    /// Opaque bearer token.
    pub token: String,
    /// Session user identifier.
    pub user_id: String,
    /// Session user role.
    pub role: Role,
    /// Session user status.
    #[serde(default = "default_session_status")]
    pub status: Status,
    /// Optional supplier category.
    #[serde(default)]
    pub category: Option<String>,
    /// Optional taxpayer identification number.
    #[serde(default)]
    pub inn: Option<String>,
}

impl std::fmt::Debug for SessionTokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTokenConfig")
            .field("token", &"<redacted>")
            .field("user_id", &self.user_id)
            .field("role", &self.role)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

impl SessionTokenConfig {
    /// Validates a token entry.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.token.trim().is_empty() {
            return Err(ConfigError::Invalid("session token must be non-empty".to_string()));
        }
        if self.token.len() > MAX_SESSION_TOKEN_LENGTH {
            return Err(ConfigError::Invalid("session token too long".to_string()));
        }
        if self.token.chars().any(char::is_whitespace) {
            return Err(ConfigError::Invalid(
                "session token must not contain whitespace".to_string(),
            ));
        }
        if self.user_id.trim().is_empty() {
            return Err(ConfigError::Invalid("session user_id must be non-empty".to_string()));
        }
        if self.user_id.len() > MAX_USER_ID_LENGTH {
            return Err(ConfigError::Invalid("session user_id too long".to_string()));
        }
        Ok(())
    }

    /// Builds the session this token resolves to.
    #[must_use]
    pub fn session(&self) -> Session {
        Session {
            user: SessionUser {
                id: RecordId::new(self.user_id.clone()),
                role: self.role,
                status: self.status,
                category: self.category.clone(),
                inn: self.inn.clone(),
            },
        }
    }
}

/// Audit logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerAuditConfig {
    /// Enable structured audit logging.
    #[serde(default = "default_audit_enabled")]
    pub enabled: bool,
    /// Optional audit log path (JSON lines). Stderr when unset.
    #[serde(default)]
    pub path: Option<String>,
}

impl Default for ServerAuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_audit_enabled(),
            path: None,
        }
    }
}

impl ServerAuditConfig {
    /// Validates audit configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.path {
            validate_path_string("audit.path", path)?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// Record store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Store backend type.
    #[serde(rename = "type", default)]
    pub store_type: StoreType,
    /// `SQLite` database path when using the sqlite backend.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_store_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` synchronous mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            store_type: StoreType::default(),
            path: None,
            busy_timeout_ms: default_store_busy_timeout_ms(),
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

impl StoreConfig {
    /// Validates store configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match self.store_type {
            StoreType::Memory => {
                if self.path.is_some() {
                    return Err(ConfigError::Invalid("memory store must not set path".to_string()));
                }
                Ok(())
            }
            StoreType::Sqlite => {
                let path = self.path.as_ref().ok_or_else(|| {
                    ConfigError::Invalid("sqlite store requires path".to_string())
                })?;
                validate_store_path(path)
            }
        }
    }

    /// Returns the `SQLite` store config when the sqlite backend is selected.
    #[must_use]
    pub fn sqlite_config(&self) -> Option<SqliteStoreConfig> {
        if self.store_type != StoreType::Sqlite {
            return None;
        }
        self.path.as_ref().map(|path| SqliteStoreConfig {
            path: path.clone(),
            busy_timeout_ms: self.busy_timeout_ms,
            journal_mode: self.journal_mode,
            sync_mode: self.sync_mode,
        })
    }
}

/// Record store backend type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoreType {
    /// Use the in-memory store.
    #[default]
    Memory,
    /// Use `SQLite`-backed durable store.
    Sqlite,
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Returns the default bind address.
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

/// Returns the default max body size.
const fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

/// Returns the default audit enablement.
const fn default_audit_enabled() -> bool {
    true
}

/// Returns the default status for configured session users.
const fn default_session_status() -> Status {
    Status::Approved
}

/// Returns the default store busy timeout.
const fn default_store_busy_timeout_ms() -> u64 {
    DEFAULT_STORE_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        let component_value = component.as_os_str().to_string_lossy();
        if component_value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates a store path against length constraints.
fn validate_store_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.trim().is_empty() {
        return Err(ConfigError::Invalid("store path must be non-empty".to_string()));
    }
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("store path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("store path component too long".to_string()));
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
