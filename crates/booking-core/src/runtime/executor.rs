// crates/booking-core/src/runtime/executor.rs
// ============================================================================
// Module: Booking Gate Transition Executor
// Description: Applies an authorized status transition to the record store.
// Purpose: Perform exactly one point update per authorized transition.
// Dependencies: crate::{core, interfaces}, thiserror
// ============================================================================

//! ## Overview
//! The executor turns an [`AuthorizedTransition`] into one
//! [`RecordStore::update_status`] call. It performs no read-modify-write and
//! does not interpret store failures: they surface as
//! [`ExecutionError::Store`] with the store's message intact. Writing the
//! same literal twice is a no-op in effect, so repeated calls are idempotent.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::Record;
use crate::core::RecordId;
use crate::core::Session;
use crate::core::TransitionRule;
use crate::interfaces::RecordStore;
use crate::interfaces::StatusUpdate;
use crate::interfaces::StoreError;
use crate::runtime::gate::AuthorizedTransition;
use crate::runtime::gate::GateError;
use crate::runtime::gate::authorize;

// ============================================================================
// SECTION: Results
// ============================================================================

/// Successful transition outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionSuccess {
    /// Record after the update.
    pub record: Record,
    /// Message describing the transition performed.
    pub message: String,
}

/// Failures raised while applying an authorized transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    /// The target identifier is empty.
    #[error("record id must be non-empty")]
    EmptyId,
    /// The store rejected or failed the update.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failures of the full gate + executor pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// The gate rejected the session.
    #[error(transparent)]
    Gate(#[from] GateError),
    /// The executor failed.
    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

// ============================================================================
// SECTION: Executor
// ============================================================================

/// Applies authorized transitions against a record store.
#[derive(Debug, Clone)]
pub struct TransitionExecutor<S> {
    /// Backing record store.
    store: S,
}

impl<S: RecordStore> TransitionExecutor<S> {
    /// Creates an executor over `store`.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self {
            store,
        }
    }

    /// Applies an authorized transition.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionError`] when the identifier is empty or the store
    /// update fails.
    pub fn execute(
        &self,
        transition: AuthorizedTransition,
    ) -> Result<TransitionSuccess, ExecutionError> {
        if transition.id().is_blank() {
            return Err(ExecutionError::EmptyId);
        }
        let rule = transition.rule();
        let update =
            StatusUpdate::new(transition.id().clone(), rule.target_status, rule.guard_statuses());
        let record = self.store.update_status(&update)?;
        Ok(TransitionSuccess {
            record,
            message: rule.success_message(),
        })
    }

    /// Runs the gate and, when it passes, the executor.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::Gate`] when the session is rejected, or
    /// [`TransitionError::Execution`] when the update fails.
    pub fn run(
        &self,
        session: Option<&Session>,
        rule: &TransitionRule,
        id: impl Into<RecordId>,
    ) -> Result<TransitionSuccess, TransitionError> {
        let transition = authorize(session, rule, id)?;
        Ok(self.execute(transition)?)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
