// crates/booking-core/src/core/record.rs
// ============================================================================
// Module: Booking Gate Records
// Description: Record, role, and status types for booking-management actors.
// Purpose: Define the persisted entity whose status the gate protects.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! A [`Record`] is a persisted user/actor entity with an immutable identifier,
//! a [`Role`], and a mutable [`Status`]. Role and status are closed sets that
//! serialize with their upper snake case wire names (`DMP_MANAGER`,
//! `PENDING`, ...).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::identifiers::RecordId;

// ============================================================================
// SECTION: Role
// ============================================================================

/// Actor role carried by records and sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Marketplace operator allowed to approve or reject applicants.
    DmpManager,
    /// Category manager applicant.
    CategoryManager,
    /// Supplier applicant.
    Supplier,
}

impl Role {
    /// All roles in declaration order.
    pub const ALL: [Self; 3] = [Self::DmpManager, Self::CategoryManager, Self::Supplier];

    /// Returns the wire name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DmpManager => "DMP_MANAGER",
            Self::CategoryManager => "CATEGORY_MANAGER",
            Self::Supplier => "SUPPLIER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseEnumError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == value)
            .ok_or_else(|| ParseEnumError::Role(value.to_string()))
    }
}

// ============================================================================
// SECTION: Status
// ============================================================================

/// Review status of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    /// Awaiting review. Initial status of every registered record.
    Pending,
    /// Accepted by an authorized reviewer.
    Approved,
    /// Declined by an authorized reviewer.
    Rejected,
}

impl Status {
    /// All statuses in declaration order.
    pub const ALL: [Self; 3] = [Self::Pending, Self::Approved, Self::Rejected];

    /// Returns the wire name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }

    /// Past-tense verb used in success messages (`approved`, `rejected`).
    #[must_use]
    pub const fn past_tense(self) -> &'static str {
        match self {
            Self::Pending => "reset to pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = ParseEnumError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| ParseEnumError::Status(value.to_string()))
    }
}

/// Errors raised when parsing role or status wire names.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseEnumError {
    /// Unknown role name.
    #[error("unknown role: {0}")]
    Role(String),
    /// Unknown status name.
    #[error("unknown status: {0}")]
    Status(String),
}

// ============================================================================
// SECTION: Record
// ============================================================================

/// Persisted user/actor record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Primary key.
    pub id: RecordId,
    /// Actor role.
    pub role: Role,
    /// Current review status.
    pub status: Status,
    /// Optional supplier category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Optional taxpayer identification number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inn: Option<String>,
}

impl Record {
    /// Builds a freshly registered record. Registration always starts in
    /// [`Status::Pending`].
    #[must_use]
    pub fn pending(id: impl Into<RecordId>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
            status: Status::Pending,
            category: None,
            inn: None,
        }
    }

    /// Returns a copy with the category set.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Returns a copy with the taxpayer number set.
    #[must_use]
    pub fn with_inn(mut self, inn: impl Into<String>) -> Self {
        self.inn = Some(inn.into());
        self
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
