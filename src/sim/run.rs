//! Run lifecycle state machine
//!
//! One `RunController` owns the pendulum and trace for exactly one piece.
//! Per tick it evaluates, in order: the halfway direction reversal, the
//! duration termination check, and the advance step. Once `Done` it ignores
//! further ticks and must be discarded.

use std::f32::consts::TAU;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::pendulum::{Arm, Pendulum, Spin};
use super::trace::PathTrace;
use crate::palette;

/// Immutable per-run configuration
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub duration_secs: f32,
    /// Rotation direction per arm; length 2 or 3 decides the arm count
    pub spins: Vec<Spin>,
    /// Flip the primary arm's direction at the run's temporal midpoint
    pub reverse_main_at_halfway: bool,
    /// Start a new trace segment with a fresh color when the reversal fires
    pub color_change_on_reversal: bool,
    pub show_arms: bool,
}

impl RunConfig {
    pub fn arm_count(&self) -> usize {
        self.spins.len()
    }
}

/// Sampling ranges for per-run randomized arm parameters
#[derive(Debug, Clone)]
pub struct ArmTuning {
    /// Arm length range (world units)
    pub length_range: (f32, f32),
    /// Per-arm angular speed range (degrees per tick)
    pub speed_ranges: Vec<(f32, f32)>,
}

/// Lifecycle phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Running,
    /// Duration exceeded: arms hidden, trace frozen for the final redraw
    /// and export. The next tick moves to `Done`.
    Finalizing,
    Done,
}

/// What a single tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Pendulum advanced and one point was appended
    Advanced,
    /// Duration exceeded this tick; the trace is frozen and ready for export
    Finalized,
    /// Run already finished; tick was ignored
    Ignored,
}

/// Per-run state machine
#[derive(Debug)]
pub struct RunController {
    config: RunConfig,
    pendulum: Pendulum,
    trace: PathTrace,
    rng: Pcg32,
    elapsed_secs: f32,
    reversed: bool,
    phase: RunPhase,
}

fn sample(rng: &mut Pcg32, (lo, hi): (f32, f32)) -> f32 {
    if hi > lo { rng.random_range(lo..hi) } else { lo }
}

impl RunController {
    /// Sample arm parameters and build the run. The same seed and config
    /// always produce the same piece.
    pub fn new(config: RunConfig, tuning: &ArmTuning, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);

        let arms = config
            .spins
            .iter()
            .enumerate()
            .map(|(i, &spin)| Arm {
                length: sample(&mut rng, tuning.length_range),
                angle: rng.random_range(0.0..TAU),
                speed_deg_per_tick: sample(&mut rng, tuning.speed_ranges[i]),
                spin,
            })
            .collect();

        let initial_color = palette::pick(&mut rng);

        Self {
            config,
            pendulum: Pendulum::new(arms),
            trace: PathTrace::new(initial_color),
            rng,
            elapsed_secs: 0.0,
            reversed: false,
            phase: RunPhase::Running,
        }
    }

    /// Advance the run by one tick; `dt_secs` is the wall-clock delta since
    /// the previous tick and only feeds the elapsed-time gates, never the
    /// angular step.
    pub fn tick(&mut self, dt_secs: f32) -> TickOutcome {
        match self.phase {
            RunPhase::Running => {}
            RunPhase::Finalizing => {
                self.phase = RunPhase::Done;
                return TickOutcome::Ignored;
            }
            RunPhase::Done => return TickOutcome::Ignored,
        }

        // Halfway reversal: fires on the first tick at or past the midpoint.
        // The up-to-one-tick overshoot is accepted, not corrected.
        if self.config.reverse_main_at_halfway
            && !self.reversed
            && self.elapsed_secs >= self.config.duration_secs / 2.0
        {
            self.pendulum.flip_primary();
            self.reversed = true;
            log::info!("primary arm direction reversed at halfway mark");

            if self.config.color_change_on_reversal {
                let color = palette::pick(&mut self.rng);
                self.trace.start_segment(color);
                log::info!(
                    "trace color changed to #{:02X}{:02X}{:02X} on reversal",
                    color.r,
                    color.g,
                    color.b
                );
            }
        }

        // Termination: strictly greater-than, so a run always draws for at
        // least its full duration.
        if self.elapsed_secs > self.config.duration_secs {
            self.phase = RunPhase::Finalizing;
            return TickOutcome::Finalized;
        }

        self.pendulum.advance();
        self.trace.push(self.pendulum.tip());
        self.elapsed_secs += dt_secs;
        TickOutcome::Advanced
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn is_done(&self) -> bool {
        self.phase == RunPhase::Done
    }

    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed_secs
    }

    pub fn reversed(&self) -> bool {
        self.reversed
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn trace(&self) -> &PathTrace {
        &self.trace
    }

    pub fn pendulum(&self) -> &Pendulum {
        &self.pendulum
    }

    /// Arms are rendered only while the run is live and the config asks
    /// for them; finalization always hides them.
    pub fn arms_visible(&self) -> bool {
        self.config.show_arms && self.phase == RunPhase::Running
    }

    /// World viewport half-width for rendering and export
    pub fn view_extent(&self) -> f32 {
        self.pendulum.view_extent()
    }
}
