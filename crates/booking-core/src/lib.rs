// crates/booking-core/src/lib.rs
// ============================================================================
// Module: Booking Gate Core Library
// Description: Public API surface for the Booking Gate core.
// Purpose: Expose record types, store interfaces, and the transition runtime.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Booking Gate core implements the role-gated status transition workflow for
//! booking-management records (category managers, suppliers). A request is
//! checked by the gate, applied by the executor as a single point update, and
//! mapped to a wire response by the formatter. The core is backend-agnostic
//! and reaches storage only through [`RecordStore`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::RecordStore;
pub use interfaces::StatusUpdate;
pub use interfaces::StoreError;
pub use runtime::AuthorizedTransition;
pub use runtime::ExecutionError;
pub use runtime::GateError;
pub use runtime::InMemoryRecordStore;
pub use runtime::ResponseBody;
pub use runtime::SharedRecordStore;
pub use runtime::TransitionError;
pub use runtime::TransitionExecutor;
pub use runtime::TransitionResponse;
pub use runtime::TransitionSuccess;
pub use runtime::authorize;
