//! Deterministic simulation module
//!
//! All piece-generating logic lives here. This module must be pure and
//! deterministic:
//! - Fixed angular step per tick (wall-clock time only gates, never scales)
//! - Seeded RNG only
//! - No rendering or platform dependencies

pub mod pendulum;
pub mod run;
pub mod trace;

pub use pendulum::{Arm, Pendulum, Spin};
pub use run::{ArmTuning, RunConfig, RunController, RunPhase, TickOutcome};
pub use trace::{PathTrace, Segment};
