//! Enter/leave protocol over the room monitor.
//!
//! All room transitions happen under one mutex. The only suspension point is the
//! condvar wait inside `enter`, and every wake-up is a broadcast, so each parked
//! worker re-evaluates its admission predicate on its own.

use std::sync::{Condvar, Mutex, PoisonError};

use crate::class::Class;
use crate::config::WashroomConfig;
use crate::monitor::{Decision, RoomSnapshot, RoomState};
use crate::stats::{Histograms, Stats};

use super::Visit;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AdmissionError {
    #[error("Lock poisoned by a panicked worker")]
    Poisoned,
}

impl<T> From<PoisonError<T>> for AdmissionError {
    fn from(_: PoisonError<T>) -> Self {
        AdmissionError::Poisoned
    }
}

/// What a departure did to the room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveOutcome {
    /// Opposite class under the fairness threshold: every waiter was woken.
    Broadcast,
    /// Threshold crossed with occupants left: gate stays closed until they go.
    Draining { remaining: usize },
    /// Last occupant left after the threshold was crossed: the room now belongs to `to`.
    Swapped { to: Class },
}

/// Wakes every parked worker if the current thread unwinds, so that nobody
/// sleeps forever on a lock that was just poisoned.
struct WakeOnPanic<'a>(&'a Condvar);

impl Drop for WakeOnPanic<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.0.notify_all();
        }
    }
}

/// The shared room: monitor state, its condvar, and the diagnostic histograms.
#[derive(Debug)]
pub struct Washroom {
    config: WashroomConfig,
    room: Mutex<RoomState>,
    spot_open: Condvar,
    stats: Stats,
}

impl Washroom {
    /// Create an empty room with the gate open.
    ///
    /// `waiting_buckets` sizes the waiting-time histogram; longer waits are
    /// counted as overflow.
    pub fn new(config: WashroomConfig, waiting_buckets: usize) -> Self {
        Self {
            room: Mutex::new(RoomState::new(&config)),
            spot_open: Condvar::new(),
            stats: Stats::new(config.max_occupancy, waiting_buckets),
            config,
        }
    }

    pub fn config(&self) -> &WashroomConfig {
        &self.config
    }

    /// Block until a member of `class` may enter, then take a place.
    pub fn enter(&self, class: Class) -> Result<Visit<'_>, AdmissionError> {
        let _wake = WakeOnPanic(&self.spot_open);
        let mut room = self.lock_room()?;
        let mut blocked_since: Option<u64> = None;

        loop {
            match room.decide(class) {
                Decision::Admit => break,
                Decision::CountWait => {
                    room.register_wait(class);
                    tracing::trace!(
                        %class,
                        waits = room.wait_count(class),
                        "Room held by other class, counting wait"
                    );
                }
                Decision::Wait => {
                    tracing::trace!(%class, occupancy = room.occupancy(), "Room closed or full");
                }
            }

            blocked_since.get_or_insert(room.clock());
            room.park();
            room = match self.spot_open.wait(room) {
                Ok(room) => room,
                Err(poisoned) => {
                    poisoned.into_inner().unpark();
                    self.spot_open.notify_all();
                    return Err(AdmissionError::Poisoned);
                }
            };
            room.unpark();
        }

        let admitted = room.admit(class);
        let waited = blocked_since.map_or(0, |start| admitted.tick - start);
        if let Err(e) = self.stats.record_entry(class, admitted.occupancy, waited) {
            // No Visit will exist to give the place back.
            room.depart();
            self.spot_open.notify_all();
            return Err(e);
        }

        tracing::trace!(%class, occupancy = admitted.occupancy, waited, "Admitted");
        Ok(Visit::new(self, class, admitted.occupancy, waited))
    }

    /// Give up one place. Called through [`Visit`].
    pub(super) fn release(&self) -> Result<LeaveOutcome, AdmissionError> {
        let _wake = WakeOnPanic(&self.spot_open);
        let mut room = self.lock_room()?;

        let class = room.depart();
        let opposite = class.opposite();
        let waiting = room.wait_count(opposite);

        if waiting <= self.config.fairness_threshold {
            self.spot_open.notify_all();
            return Ok(LeaveOutcome::Broadcast);
        }

        room.close_gate();
        if room.occupancy() == 0 {
            room.swap_to(opposite);
            self.spot_open.notify_all();
            tracing::debug!(from = %class, to = %opposite, waiting, "Room empty, class swapped");
            Ok(LeaveOutcome::Swapped { to: opposite })
        } else {
            let remaining = room.occupancy();
            tracing::debug!(%class, %opposite, waiting, remaining, "Fairness threshold crossed, draining room");
            Ok(LeaveOutcome::Draining { remaining })
        }
    }

    /// Consistent copy of the room state.
    pub fn snapshot(&self) -> Result<RoomSnapshot, AdmissionError> {
        Ok(self.room.lock()?.snapshot())
    }

    /// Copy of the diagnostic histograms.
    pub fn histograms(&self) -> Result<Histograms, AdmissionError> {
        self.stats.snapshot()
    }

    fn lock_room(&self) -> Result<std::sync::MutexGuard<'_, RoomState>, AdmissionError> {
        self.room.lock().map_err(|_| {
            // Parked workers would otherwise never see the poison.
            self.spot_open.notify_all();
            AdmissionError::Poisoned
        })
    }
}
