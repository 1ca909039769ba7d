// crates/booking-store-sqlite/src/lib.rs
// ============================================================================
// Module: SQLite Record Store
// Description: Durable RecordStore backend using SQLite.
// Purpose: Persist booking-management records across restarts.
// Dependencies: booking-core, rusqlite
// ============================================================================

//! ## Overview
//! This crate provides a SQLite-backed [`RecordStore`] implementation. Each
//! status transition is a single `UPDATE` inside a transaction, so concurrent
//! requests against the same record serialize at the database and the last
//! committed write wins.
//!
//! [`RecordStore`]: booking_core::RecordStore

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::SqliteRecordStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
