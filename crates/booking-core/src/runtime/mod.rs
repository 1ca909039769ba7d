// crates/booking-core/src/runtime/mod.rs
// ============================================================================
// Module: Booking Gate Runtime
// Description: Transition gate, executor, response formatter, and stores.
// Purpose: Execute role-gated status transitions against a record store.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime modules implement the transition pipeline: [`gate::authorize`]
//! decides eligibility, [`executor::TransitionExecutor`] applies the point
//! update, and [`response::TransitionResponse`] maps outcomes to the wire.
//! Every surface must call into the same pipeline.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod executor;
pub mod gate;
pub mod response;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use executor::ExecutionError;
pub use executor::TransitionError;
pub use executor::TransitionExecutor;
pub use executor::TransitionSuccess;
pub use gate::AuthorizedTransition;
pub use gate::GateError;
pub use gate::authorize;
pub use response::ResponseBody;
pub use response::TransitionResponse;
pub use store::InMemoryRecordStore;
pub use store::SharedRecordStore;
