//! Admission protocol for the shared room.
//!
//! Workers call [`Washroom::enter`] and get back a [`Visit`] that holds their place:
//! - `enter` blocks on the room condvar until the gate is open and the room is
//!   either empty or held by the worker's class with space to spare.
//! - [`Visit::leave`] frees the place and either wakes every waiter, closes the
//!   gate for a fairness swap, or performs the swap once the room is empty.
//! - Dropping a `Visit` without `leave` still frees the place.

mod protocol;
mod visit;

pub use protocol::{AdmissionError, LeaveOutcome, Washroom};
pub use visit::Visit;
