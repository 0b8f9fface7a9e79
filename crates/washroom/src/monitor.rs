//! Room state held behind the admission lock.
//!
//! [`RoomState`] is a plain data holder. It never locks anything itself; every
//! method assumes the caller holds the room mutex (see [`crate::admission`]).
//! Mutators are crate-private so that all transitions go through the protocol.

use serde::{Deserialize, Serialize};

use crate::class::Class;
use crate::config::WashroomConfig;

/// What a would-be entrant does after looking at the room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Decision {
    /// Room holds the other class and has space: count the wait, then block.
    CountWait,
    /// Gate open and the room is empty or holds this class with space.
    Admit,
    /// Gate closed or room full: block without counting.
    Wait,
}

/// Where the room is in its Empty → Occupied → Empty cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomPhase {
    /// Nobody inside; the next entrant picks the class.
    Empty,
    /// Occupied by the active class, gate open.
    Occupied,
    /// Gate closed; waiting for the room to empty before the class flips.
    Draining,
}

/// Clock reading and occupancy produced by an admission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Admitted {
    /// Clock value at the moment of admission (before this entry's tick).
    pub tick: u64,
    /// Occupancy including the new entrant.
    pub occupancy: usize,
}

#[derive(Debug, Clone)]
pub(crate) struct RoomState {
    max_occupancy: usize,
    occupancy: usize,
    active_class: Option<Class>,
    wait_counts: [usize; 2],
    gate_open: bool,
    /// Workers currently parked on the condvar. Diagnostic only.
    blocked: usize,
    /// Ticks once per admitted entry.
    clock: u64,
}

impl RoomState {
    pub fn new(config: &WashroomConfig) -> Self {
        Self {
            max_occupancy: config.max_occupancy,
            occupancy: 0,
            active_class: None,
            wait_counts: [0; 2],
            gate_open: true,
            blocked: 0,
            clock: 0,
        }
    }

    pub fn decide(&self, class: Class) -> Decision {
        let has_space = self.occupancy < self.max_occupancy;
        let occupied_by_other = self.occupancy != 0 && self.active_class != Some(class);

        if self.gate_open && occupied_by_other && has_space {
            Decision::CountWait
        } else if self.gate_open
            && (self.occupancy == 0 || (has_space && self.active_class == Some(class)))
        {
            Decision::Admit
        } else {
            Decision::Wait
        }
    }

    pub fn register_wait(&mut self, class: Class) {
        self.wait_counts[class.index()] += 1;
    }

    pub fn park(&mut self) {
        self.blocked += 1;
    }

    pub fn unpark(&mut self) {
        self.blocked -= 1;
    }

    /// Admit one member of `class`. Panics if that would mix classes or overfill the room.
    pub fn admit(&mut self, class: Class) -> Admitted {
        let tick = self.clock;
        self.clock += 1;

        if self.occupancy == 0 {
            self.active_class = Some(class);
        }
        self.occupancy += 1;

        assert_eq!(
            self.active_class,
            Some(class),
            "{class} admitted into a room held by another class"
        );
        assert!(
            self.occupancy <= self.max_occupancy,
            "occupancy {} exceeds capacity {}",
            self.occupancy,
            self.max_occupancy
        );

        Admitted {
            tick,
            occupancy: self.occupancy,
        }
    }

    /// Remove one occupant and return the class that held the room.
    pub fn depart(&mut self) -> Class {
        assert!(self.occupancy > 0, "leave called on an empty room");
        let Some(class) = self.active_class else {
            panic!("occupied room has no active class");
        };
        self.occupancy -= 1;
        class
    }

    pub fn close_gate(&mut self) {
        self.gate_open = false;
    }

    /// Hand the room to `class`. Only legal once the room is empty.
    pub fn swap_to(&mut self, class: Class) {
        assert_eq!(self.occupancy, 0, "class swap attempted with occupants inside");
        self.active_class = Some(class);
        self.wait_counts[class.index()] = 0;
        self.gate_open = true;
    }

    pub fn occupancy(&self) -> usize {
        self.occupancy
    }

    pub fn wait_count(&self, class: Class) -> usize {
        self.wait_counts[class.index()]
    }

    pub fn clock(&self) -> u64 {
        self.clock
    }

    pub fn phase(&self) -> RoomPhase {
        if self.occupancy == 0 {
            RoomPhase::Empty
        } else if self.gate_open {
            RoomPhase::Occupied
        } else {
            RoomPhase::Draining
        }
    }

    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            phase: self.phase(),
            occupancy: self.occupancy,
            active_class: if self.occupancy > 0 {
                self.active_class
            } else {
                None
            },
            last_class: self.active_class,
            wait_counts: self.wait_counts,
            gate_open: self.gate_open,
            blocked: self.blocked,
            clock: self.clock,
        }
    }
}

/// Consistent copy of the room, taken under the lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoomSnapshot {
    pub phase: RoomPhase,
    pub occupancy: usize,
    /// Class of the current occupants; `None` when the room is empty.
    pub active_class: Option<Class>,
    /// Class most recently granted the room, kept across empty spells and swaps.
    pub last_class: Option<Class>,
    /// Indexed by [`Class::index`].
    pub wait_counts: [usize; 2],
    pub gate_open: bool,
    pub blocked: usize,
    pub clock: u64,
}

impl RoomSnapshot {
    pub fn wait_count(&self, class: Class) -> usize {
        self.wait_counts[class.index()]
    }
}
