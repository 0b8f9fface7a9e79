//! washroom: a capacity-bounded room shared by two mutually-exclusive classes.
//!
//! The room admits up to `max_occupancy` people of one class at a time. When
//! too many of the other class have been turned away, the gate closes, the
//! room drains, and the class swaps.

mod class;
mod monitor;
mod version;

pub mod admission;
pub mod config;
pub mod report;
pub mod simulation;
pub mod stats;

pub use admission::{AdmissionError, LeaveOutcome, Visit, Washroom};
pub use class::Class;
pub use config::{SimulationConfig, WashroomConfig};
pub use monitor::{RoomPhase, RoomSnapshot};
pub use report::Report;
pub use simulation::{Simulation, SimulationError};
pub use stats::Histograms;
pub use version::{VersionInfo, WASHROOM_VERSION};
