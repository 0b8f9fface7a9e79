//! The two user classes sharing the room.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the two mutually-exclusive user classes.
///
/// The classes are symmetric: nothing in the protocol prefers one over the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Class {
    A,
    B,
}

impl Class {
    /// Both classes, in index order.
    pub const ALL: [Class; 2] = [Class::A, Class::B];

    pub fn opposite(self) -> Class {
        match self {
            Class::A => Class::B,
            Class::B => Class::A,
        }
    }

    /// Array index for per-class counters.
    pub fn index(self) -> usize {
        match self {
            Class::A => 0,
            Class::B => 1,
        }
    }

    /// Class for a raw draw: even draws are `A`, odd draws are `B`.
    pub fn from_draw(draw: u32) -> Class {
        if draw % 2 == 0 { Class::A } else { Class::B }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Class::A => "A",
            Class::B => "B",
        }
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "class {}", self.as_str())
    }
}
