// crates/booking-core/src/core/time.rs
// ============================================================================
// Module: Booking Gate Time
// Description: Wall-clock helpers for audit and store timestamps.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Audit entries and store rows stamp time as unix milliseconds. A clock set
//! before the epoch reads as zero instead of failing.

use std::time::SystemTime;
use std::time::UNIX_EPOCH;

/// Returns the current unix epoch in milliseconds.
#[must_use]
pub fn unix_millis() -> i64 {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    i64::try_from(now.as_millis()).unwrap_or(i64::MAX)
}
