//! Visit - a held place in the room.

use super::{AdmissionError, LeaveOutcome, Washroom};
use crate::class::Class;

/// A place in the room, held from admission until [`Visit::leave`].
///
/// On drop without `leave`: the place is released anyway and a warning is logged.
#[must_use = "a Visit holds a place in the room until it leaves"]
#[derive(Debug)]
pub struct Visit<'a> {
    washroom: &'a Washroom,
    class: Class,
    occupancy: usize,
    waited: u64,
    released: bool,
}

impl<'a> Visit<'a> {
    pub(super) fn new(washroom: &'a Washroom, class: Class, occupancy: usize, waited: u64) -> Self {
        Self {
            washroom,
            class,
            occupancy,
            waited,
            released: false,
        }
    }

    pub fn class(&self) -> Class {
        self.class
    }

    /// Occupancy right after this visitor came in.
    pub fn occupancy_at_entry(&self) -> usize {
        self.occupancy
    }

    /// Ticks spent blocked before admission.
    pub fn waited(&self) -> u64 {
        self.waited
    }

    /// Leave the room, possibly swapping its class and waking waiters.
    pub fn leave(mut self) -> Result<LeaveOutcome, AdmissionError> {
        self.released = true;
        self.washroom.release()
    }
}

impl Drop for Visit<'_> {
    fn drop(&mut self) {
        if self.released {
            return;
        }

        tracing::warn!(class = %self.class, "Visit dropped without leave - releasing place");
        if let Err(e) = self.washroom.release() {
            tracing::error!(class = %self.class, error = %e, "Failed to release dropped visit");
        }
    }
}
