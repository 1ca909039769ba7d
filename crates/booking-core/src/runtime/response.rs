// crates/booking-core/src/runtime/response.rs
// ============================================================================
// Module: Booking Gate Response Formatter
// Description: Maps transition outcomes to wire-level status codes and bodies.
// Purpose: Keep the outcome-to-response mapping in one transport-neutral place.
// Dependencies: crate::runtime, serde
// ============================================================================

//! ## Overview
//! | Outcome | Status | Body |
//! |---|---|---|
//! | success | 200 | `{"message": <rule message>}` |
//! | gate rejection | 401 | `{"error": "Unauthorized"}` |
//! | execution failure | 500 | `{"error": <raw failure text>}` |
//!
//! Execution failures are surfaced verbatim; authorization failures never
//! carry detail.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;

use crate::runtime::executor::TransitionError;
use crate::runtime::executor::TransitionSuccess;
use crate::runtime::gate::UNAUTHORIZED_MESSAGE;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// HTTP 200.
pub const STATUS_OK: u16 = 200;
/// HTTP 401.
pub const STATUS_UNAUTHORIZED: u16 = 401;
/// HTTP 404.
pub const STATUS_NOT_FOUND: u16 = 404;
/// HTTP 500.
pub const STATUS_INTERNAL_ERROR: u16 = 500;

// ============================================================================
// SECTION: Response Types
// ============================================================================

/// JSON body of a transition response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    /// Success confirmation.
    Message {
        /// Confirmation text.
        message: String,
    },
    /// Failure description.
    Error {
        /// Error text.
        error: String,
    },
}

/// Wire-level response for a transition request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResponse {
    /// HTTP status code.
    pub status: u16,
    /// JSON body.
    pub body: ResponseBody,
}

impl TransitionResponse {
    /// Builds a 200 response.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: STATUS_OK,
            body: ResponseBody::Message {
                message: message.into(),
            },
        }
    }

    /// Builds the fixed 401 response.
    #[must_use]
    pub fn unauthorized() -> Self {
        Self {
            status: STATUS_UNAUTHORIZED,
            body: ResponseBody::Error {
                error: UNAUTHORIZED_MESSAGE.to_string(),
            },
        }
    }

    /// Builds a 500 response carrying `message` unchanged.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            status: STATUS_INTERNAL_ERROR,
            body: ResponseBody::Error {
                error: message.into(),
            },
        }
    }

    /// Builds a 404 response for routes outside the transition table.
    #[must_use]
    pub fn not_found() -> Self {
        Self {
            status: STATUS_NOT_FOUND,
            body: ResponseBody::Error {
                error: "Not Found".to_string(),
            },
        }
    }

    /// Maps a pipeline outcome to its response.
    #[must_use]
    pub fn from_outcome(outcome: &Result<TransitionSuccess, TransitionError>) -> Self {
        match outcome {
            Ok(success) => Self::success(success.message.clone()),
            Err(TransitionError::Gate(_)) => Self::unauthorized(),
            Err(TransitionError::Execution(err)) => Self::failure(err.to_string()),
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
