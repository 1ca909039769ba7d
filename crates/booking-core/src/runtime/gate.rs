// crates/booking-core/src/runtime/gate.rs
// ============================================================================
// Module: Booking Gate Status Transition Gate
// Description: Role check preceding every status mutation.
// Purpose: Decide, without I/O, whether a session may perform a transition.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! The gate is a pure function over the session and the transition rule.
//! A missing session and a session with the wrong role collapse into the
//! same [`GateError::Unauthorized`], so callers cannot tell which check
//! failed. On success it yields an [`AuthorizedTransition`], the only value
//! the executor accepts.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::RecordId;
use crate::core::Session;
use crate::core::TransitionRule;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Fixed message reported for every authorization failure.
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized";

/// Gate rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GateError {
    /// Session missing or role insufficient.
    #[error("Unauthorized")]
    Unauthorized,
}

// ============================================================================
// SECTION: Authorized Transition
// ============================================================================

/// Proof that a session passed the gate for a specific record and rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizedTransition {
    /// Targeted record.
    id: RecordId,
    /// Rule being applied.
    rule: TransitionRule,
}

impl AuthorizedTransition {
    /// Returns the targeted record identifier.
    #[must_use]
    pub const fn id(&self) -> &RecordId {
        &self.id
    }

    /// Returns the rule being applied.
    #[must_use]
    pub const fn rule(&self) -> &TransitionRule {
        &self.rule
    }
}

// ============================================================================
// SECTION: Gate
// ============================================================================

/// Checks that `session` holds the rule's authorized role.
///
/// # Errors
///
/// Returns [`GateError::Unauthorized`] when the session is absent or its role
/// differs from [`TransitionRule::authorized_role`].
pub fn authorize(
    session: Option<&Session>,
    rule: &TransitionRule,
    id: impl Into<RecordId>,
) -> Result<AuthorizedTransition, GateError> {
    let Some(session) = session else {
        return Err(GateError::Unauthorized);
    };
    if session.role() != rule.authorized_role {
        return Err(GateError::Unauthorized);
    }
    Ok(AuthorizedTransition {
        id: id.into(),
        rule: rule.clone(),
    })
}

// ============================================================================
// SECTION: Tests
// ============================================================================
