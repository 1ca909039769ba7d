// crates/booking-core/src/interfaces/mod.rs
// ============================================================================
// Module: Booking Gate Interfaces
// Description: Backend-agnostic interfaces for record persistence.
// Purpose: Define the store contract consumed by the transition executor.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! The [`RecordStore`] trait is the only path by which the core touches
//! persisted records. Status mutations are expressed as a [`StatusUpdate`],
//! which can only be built from an authorized transition inside this crate.
//! That keeps every status write behind the gate.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::Record;
use crate::core::RecordId;
use crate::core::Status;

// ============================================================================
// SECTION: Status Update
// ============================================================================

/// Point update of a single record's status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    /// Record to update.
    id: RecordId,
    /// Status literal to write.
    status: Status,
    /// Statuses the record must currently hold, if guarded.
    guard: Option<Vec<Status>>,
}

impl StatusUpdate {
    /// Builds an update. Restricted to the executor.
    pub(crate) const fn new(id: RecordId, status: Status, guard: Option<Vec<Status>>) -> Self {
        Self {
            id,
            status,
            guard,
        }
    }

    /// Returns the targeted record identifier.
    #[must_use]
    pub const fn id(&self) -> &RecordId {
        &self.id
    }

    /// Returns the status literal to write.
    #[must_use]
    pub const fn status(&self) -> Status {
        self.status
    }

    /// Returns the guard statuses, or `None` for an unconditional write.
    #[must_use]
    pub fn guard(&self) -> Option<&[Status]> {
        self.guard.as_deref()
    }

    /// Returns true when `current` satisfies the guard.
    #[must_use]
    pub fn permits(&self, current: Status) -> bool {
        self.guard.as_ref().is_none_or(|allowed| allowed.contains(&current))
    }
}

// ============================================================================
// SECTION: Record Store
// ============================================================================

/// Record store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No record exists for the identifier.
    #[error("record not found: {0}")]
    NotFound(String),
    /// A record already exists for the identifier.
    #[error("record already exists: {0}")]
    AlreadyExists(String),
    /// The record's current status does not satisfy the update guard.
    #[error("record {id} has status {current}, transition to {target} not permitted")]
    Conflict {
        /// Record identifier.
        id: String,
        /// Current status.
        current: Status,
        /// Requested status.
        target: Status,
    },
    /// Store I/O error.
    #[error("record store io error: {0}")]
    Io(String),
    /// Store data is invalid.
    #[error("record store invalid data: {0}")]
    Invalid(String),
    /// Store reported an error.
    #[error("record store error: {0}")]
    Store(String),
}

/// Persistent table of records keyed by identifier.
pub trait RecordStore {
    /// Inserts a newly registered record. The record must be `PENDING`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the record exists or cannot be written.
    fn register(&self, record: &Record) -> Result<(), StoreError>;

    /// Loads a record by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails.
    fn load(&self, id: &RecordId) -> Result<Option<Record>, StoreError>;

    /// Lists every record ordered by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails.
    fn list(&self) -> Result<Vec<Record>, StoreError>;

    /// Applies a single-record status update atomically and returns the
    /// updated record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the identifier does not resolve,
    /// [`StoreError::Conflict`] when the guard rejects the current status, or
    /// another [`StoreError`] when the write fails.
    fn update_status(&self, update: &StatusUpdate) -> Result<Record, StoreError>;
}
