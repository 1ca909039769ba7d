// crates/booking-core/src/core/transition.rs
// ============================================================================
// Module: Booking Gate Transition Table
// Description: Configured status transitions keyed by collection and action.
// Purpose: Treat the set of permitted transitions as data, not code.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Each [`TransitionRule`] names a route (`collection`/`action`), the status
//! literal written on success, and the single role allowed to perform it.
//! The default table exposes approve/reject for category managers and
//! suppliers. Deployments may replace it from configuration.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::identifiers::ActionName;
use crate::core::identifiers::CollectionName;
use crate::core::record::Role;
use crate::core::record::Status;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum length of a route path segment.
pub const MAX_SEGMENT_LENGTH: usize = 64;
/// Maximum number of rules in a transition table.
pub const MAX_TRANSITION_RULES: usize = 128;

// ============================================================================
// SECTION: Transition Rule
// ============================================================================

/// A single permitted status transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRule {
    /// Collection path segment (e.g. `category-managers`).
    pub collection: CollectionName,
    /// Action path segment (e.g. `reject`).
    pub action: ActionName,
    /// Status literal written by the executor.
    pub target_status: Status,
    /// The only role permitted to perform this transition.
    pub authorized_role: Role,
    /// Human-readable subject used in the default success message.
    pub subject_label: String,
    /// Explicit success message overriding the generated one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Statuses the record must currently hold. Empty means unconditional.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub from: Vec<Status>,
}

impl TransitionRule {
    /// Builds an unconditional rule with a generated success message.
    #[must_use]
    pub fn new(
        collection: impl Into<CollectionName>,
        action: impl Into<ActionName>,
        target_status: Status,
        authorized_role: Role,
        subject_label: impl Into<String>,
    ) -> Self {
        Self {
            collection: collection.into(),
            action: action.into(),
            target_status,
            authorized_role,
            subject_label: subject_label.into(),
            message: None,
            from: Vec::new(),
        }
    }

    /// Returns a copy restricted to records currently in one of `from`.
    #[must_use]
    pub fn with_from(mut self, from: impl IntoIterator<Item = Status>) -> Self {
        self.from = from.into_iter().collect();
        self
    }

    /// Returns the message reported on success.
    #[must_use]
    pub fn success_message(&self) -> String {
        self.message.clone().unwrap_or_else(|| {
            format!("{} {} successfully", self.subject_label, self.target_status.past_tense())
        })
    }

    /// Returns the statuses accepted by the update guard, or `None` when the
    /// rule is unconditional. The target status is always accepted so repeated
    /// calls stay idempotent.
    #[must_use]
    pub fn guard_statuses(&self) -> Option<Vec<Status>> {
        if self.from.is_empty() {
            return None;
        }
        let mut statuses = self.from.clone();
        if !statuses.contains(&self.target_status) {
            statuses.push(self.target_status);
        }
        statuses.sort();
        statuses.dedup();
        Some(statuses)
    }

    /// Validates the rule's route segments and labels.
    fn validate(&self) -> Result<(), TransitionTableError> {
        validate_segment("collection", self.collection.as_str())?;
        validate_segment("action", self.action.as_str())?;
        if self.subject_label.trim().is_empty() {
            return Err(TransitionTableError::Invalid(format!(
                "transition {}/{} requires subject_label",
                self.collection, self.action
            )));
        }
        if let Some(message) = &self.message
            && message.trim().is_empty()
        {
            return Err(TransitionTableError::Invalid(format!(
                "transition {}/{} message must be non-empty",
                self.collection, self.action
            )));
        }
        Ok(())
    }
}

/// Returns the default transition rules.
#[must_use]
pub fn default_transition_rules() -> Vec<TransitionRule> {
    vec![
        TransitionRule::new(
            "category-managers",
            "reject",
            Status::Rejected,
            Role::DmpManager,
            "Category Manager",
        ),
        TransitionRule::new(
            "category-managers",
            "approve",
            Status::Approved,
            Role::DmpManager,
            "Category Manager",
        ),
        TransitionRule::new("suppliers", "reject", Status::Rejected, Role::DmpManager, "Supplier"),
        TransitionRule::new("suppliers", "approve", Status::Approved, Role::DmpManager, "Supplier"),
    ]
}

// ============================================================================
// SECTION: Transition Table
// ============================================================================

/// Validated transition rules keyed by `(collection, action)`.
#[derive(Debug, Clone)]
pub struct TransitionTable {
    /// Rules keyed by route.
    rules: BTreeMap<(CollectionName, ActionName), TransitionRule>,
}

impl TransitionTable {
    /// Builds a table from rules, rejecting duplicates and unsafe segments.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionTableError`] when a rule is invalid or duplicated.
    pub fn new(rules: impl IntoIterator<Item = TransitionRule>) -> Result<Self, TransitionTableError> {
        let mut table = BTreeMap::new();
        for rule in rules {
            rule.validate()?;
            let key = (rule.collection.clone(), rule.action.clone());
            if table.contains_key(&key) {
                return Err(TransitionTableError::Duplicate {
                    collection: key.0.to_string(),
                    action: key.1.to_string(),
                });
            }
            table.insert(key, rule);
        }
        if table.is_empty() {
            return Err(TransitionTableError::Invalid(
                "transition table must contain at least one rule".to_string(),
            ));
        }
        if table.len() > MAX_TRANSITION_RULES {
            return Err(TransitionTableError::Invalid(format!(
                "transition table exceeds {MAX_TRANSITION_RULES} rules"
            )));
        }
        Ok(Self {
            rules: table,
        })
    }

    /// Looks up the rule for a route.
    #[must_use]
    pub fn lookup(&self, collection: &str, action: &str) -> Option<&TransitionRule> {
        self.rules.get(&(CollectionName::new(collection), ActionName::new(action)))
    }

    /// Iterates rules in route order.
    pub fn rules(&self) -> impl Iterator<Item = &TransitionRule> {
        self.rules.values()
    }

    /// Returns the number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true when the table holds no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for TransitionTable {
    fn default() -> Self {
        let rules = default_transition_rules()
            .into_iter()
            .map(|rule| ((rule.collection.clone(), rule.action.clone()), rule))
            .collect();
        Self {
            rules,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Transition table validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionTableError {
    /// Two rules share the same route.
    #[error("duplicate transition route: {collection}/{action}")]
    Duplicate {
        /// Collection segment.
        collection: String,
        /// Action segment.
        action: String,
    },
    /// A rule is malformed.
    #[error("invalid transition: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Validates that a route segment is non-empty, bounded, and path-safe.
fn validate_segment(field: &str, value: &str) -> Result<(), TransitionTableError> {
    if value.is_empty() {
        return Err(TransitionTableError::Invalid(format!("{field} must be non-empty")));
    }
    if value.len() > MAX_SEGMENT_LENGTH {
        return Err(TransitionTableError::Invalid(format!("{field} exceeds max length")));
    }
    let valid = value
        .bytes()
        .all(|byte| byte.is_ascii_lowercase() || byte.is_ascii_digit() || byte == b'-' || byte == b'_');
    if !valid {
        return Err(TransitionTableError::Invalid(format!(
            "{field} must use lowercase ascii letters, digits, '-' or '_': {value}"
        )));
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
