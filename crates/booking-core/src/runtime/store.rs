// crates/booking-core/src/runtime/store.rs
// ============================================================================
// Module: Booking Gate In-Memory Store
// Description: Simple in-memory record store and a shared store wrapper.
// Purpose: Provide a deterministic store implementation without external deps.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! [`InMemoryRecordStore`] keeps records in a mutex-guarded map and is used
//! for tests and local demos. [`SharedRecordStore`] wraps any store in an
//! `Arc` trait object so HTTP handlers can share it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use crate::core::Record;
use crate::core::RecordId;
use crate::core::Status;
use crate::interfaces::RecordStore;
use crate::interfaces::StatusUpdate;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// In-memory record store for tests and examples.
#[derive(Debug, Default, Clone)]
pub struct InMemoryRecordStore {
    /// Records keyed by identifier.
    records: Arc<Mutex<BTreeMap<RecordId, Record>>>,
    /// Number of `update_status` calls received.
    updates: Arc<AtomicUsize>,
}

impl InMemoryRecordStore {
    /// Creates an empty in-memory record store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns how many status updates the store has received, including
    /// failed ones.
    #[must_use]
    pub fn update_count(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }
}

impl RecordStore for InMemoryRecordStore {
    fn register(&self, record: &Record) -> Result<(), StoreError> {
        if record.status != Status::Pending {
            return Err(StoreError::Invalid(format!(
                "registered record {} must be PENDING",
                record.id
            )));
        }
        let mut guard = self
            .records
            .lock()
            .map_err(|_| StoreError::Store("record store mutex poisoned".to_string()))?;
        if guard.contains_key(&record.id) {
            return Err(StoreError::AlreadyExists(record.id.to_string()));
        }
        guard.insert(record.id.clone(), record.clone());
        drop(guard);
        Ok(())
    }

    fn load(&self, id: &RecordId) -> Result<Option<Record>, StoreError> {
        let guard = self
            .records
            .lock()
            .map_err(|_| StoreError::Store("record store mutex poisoned".to_string()))?;
        Ok(guard.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<Record>, StoreError> {
        let guard = self
            .records
            .lock()
            .map_err(|_| StoreError::Store("record store mutex poisoned".to_string()))?;
        Ok(guard.values().cloned().collect())
    }

    fn update_status(&self, update: &StatusUpdate) -> Result<Record, StoreError> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        let mut guard = self
            .records
            .lock()
            .map_err(|_| StoreError::Store("record store mutex poisoned".to_string()))?;
        let record = guard
            .get_mut(update.id())
            .ok_or_else(|| StoreError::NotFound(update.id().to_string()))?;
        if !update.permits(record.status) {
            return Err(StoreError::Conflict {
                id: update.id().to_string(),
                current: record.status,
                target: update.status(),
            });
        }
        record.status = update.status();
        Ok(record.clone())
    }
}

// ============================================================================
// SECTION: Shared Store
// ============================================================================

/// Shared record store backed by an `Arc` trait object.
#[derive(Clone)]
pub struct SharedRecordStore {
    /// Inner store implementation.
    inner: Arc<dyn RecordStore + Send + Sync>,
}

impl SharedRecordStore {
    /// Wraps a record store in a shared, clonable wrapper.
    #[must_use]
    pub fn from_store(store: impl RecordStore + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(store),
        }
    }
}

impl RecordStore for SharedRecordStore {
    fn register(&self, record: &Record) -> Result<(), StoreError> {
        self.inner.register(record)
    }

    fn load(&self, id: &RecordId) -> Result<Option<Record>, StoreError> {
        self.inner.load(id)
    }

    fn list(&self) -> Result<Vec<Record>, StoreError> {
        self.inner.list()
    }

    fn update_status(&self, update: &StatusUpdate) -> Result<Record, StoreError> {
        self.inner.update_status(update)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
