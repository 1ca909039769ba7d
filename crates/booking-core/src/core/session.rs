// crates/booking-core/src/core/session.rs
// ============================================================================
// Module: Booking Gate Sessions
// Description: Authenticated session descriptor issued by the identity provider.
// Purpose: Carry the acting user's identity and role into gate decisions.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Sessions are issued outside this workspace and passed explicitly to every
//! gate call as `Option<&Session>`. There is no process-wide session state.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::RecordId;
use crate::core::record::Role;
use crate::core::record::Status;

// ============================================================================
// SECTION: Session
// ============================================================================

/// Authenticated session envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Acting user.
    pub user: SessionUser,
}

/// User fields exposed by a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    /// User record identifier.
    pub id: RecordId,
    /// User role.
    pub role: Role,
    /// User review status.
    pub status: Status,
    /// Optional supplier category.
    #[serde(default)]
    pub category: Option<String>,
    /// Optional taxpayer identification number.
    #[serde(default)]
    pub inn: Option<String>,
}

impl Session {
    /// Builds a session for a user with the given role and an approved status.
    #[must_use]
    pub fn for_role(id: impl Into<RecordId>, role: Role) -> Self {
        Self {
            user: SessionUser {
                id: id.into(),
                role,
                status: Status::Approved,
                category: None,
                inn: None,
            },
        }
    }

    /// Returns the acting user's role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.user.role
    }
}
