//! Stylized pendulum integrator
//!
//! Not an equations-of-motion simulator: each arm sweeps by a fixed angular
//! increment per tick, which keeps a piece's visual character independent of
//! frame-rate jitter.

use std::f32::consts::PI;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::VIEW_MARGIN;

/// Rotation direction of an arm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Spin {
    /// Positive angular increment
    Cw,
    /// Negative angular increment
    Ccw,
}

impl Spin {
    pub fn signum(self) -> f32 {
        match self {
            Spin::Cw => 1.0,
            Spin::Ccw => -1.0,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Spin::Cw => Spin::Ccw,
            Spin::Ccw => Spin::Cw,
        }
    }

    /// Uniformly random direction
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        if rng.random_bool(0.5) { Spin::Cw } else { Spin::Ccw }
    }
}

/// One pendulum arm
///
/// `speed_deg_per_tick` is drawn once per run and stays fixed; only the
/// primary arm's spin may flip, at most once, at the run's halfway mark.
#[derive(Debug, Clone, Copy)]
pub struct Arm {
    pub length: f32,
    pub angle: f32,
    pub speed_deg_per_tick: f32,
    pub spin: Spin,
}

impl Arm {
    /// Angular increment applied by one tick (radians)
    fn angle_step(&self) -> f32 {
        self.spin.signum() * self.speed_deg_per_tick * PI / 180.0
    }
}

/// A coupled chain of 2 or 3 arms, anchored at the origin
#[derive(Debug, Clone)]
pub struct Pendulum {
    arms: Vec<Arm>,
}

impl Pendulum {
    /// Build from explicit arms. Panics in debug builds on an unsupported
    /// arm count; the settings layer validates this before a run starts.
    pub fn new(arms: Vec<Arm>) -> Self {
        debug_assert!(arms.len() == 2 || arms.len() == 3);
        Self { arms }
    }

    pub fn arm_count(&self) -> usize {
        self.arms.len()
    }

    pub fn arms(&self) -> &[Arm] {
        &self.arms
    }

    /// Advance every arm by one tick-unit angular increment
    pub fn advance(&mut self) {
        for arm in &mut self.arms {
            arm.angle += arm.angle_step();
        }
    }

    /// Flip the primary arm's rotation direction
    pub fn flip_primary(&mut self) {
        self.arms[0].spin = self.arms[0].spin.flipped();
    }

    pub fn primary_spin(&self) -> Spin {
        self.arms[0].spin
    }

    /// Joint positions from the anchor outward: tip of arm 1, tip of arm 2,
    /// and tip of arm 3 when present. Recomputed from angles every call.
    pub fn joint_positions(&self) -> Vec<Vec2> {
        let mut joints = Vec::with_capacity(self.arms.len());
        let mut pos = Vec2::ZERO;
        for arm in &self.arms {
            pos += arm.length * Vec2::new(arm.angle.sin(), -arm.angle.cos());
            joints.push(pos);
        }
        joints
    }

    /// Tip of the outermost arm (the traced point)
    pub fn tip(&self) -> Vec2 {
        let mut pos = Vec2::ZERO;
        for arm in &self.arms {
            pos += arm.length * Vec2::new(arm.angle.sin(), -arm.angle.cos());
        }
        pos
    }

    /// Half-width of the square world viewport enclosing every reachable tip
    pub fn view_extent(&self) -> f32 {
        self.arms.iter().map(|a| a.length).sum::<f32>() + VIEW_MARGIN
    }
}
