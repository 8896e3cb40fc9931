//! Pendulum Path - generative art from chaotic pendulum traces
//!
//! Core modules:
//! - `sim`: Deterministic simulation (pendulum integrator, trace, run state machine)
//! - `session`: Run-after-run driver with direction alternation and retention stats
//! - `export`: Polyline rasterizer and PNG writer
//! - `platform`: Canvas/clock/filesystem abstraction
//! - `settings`: Data-driven configuration and presets

pub mod export;
pub mod palette;
pub mod platform;
pub mod retention;
pub mod session;
pub mod settings;
pub mod sim;

pub use palette::Rgb;
pub use settings::{Preset, Settings};

/// Engine configuration constants
pub mod consts {
    /// Nominal frame interval driving the simulation (milliseconds)
    pub const FRAME_INTERVAL_MS: u64 = 5;

    /// Assumed average image size when the output folder is empty (2 MiB)
    pub const DEFAULT_AVG_IMAGE_BYTES: u64 = 2 * 1024 * 1024;

    /// Disk-space safety margin left untouched by exports (1 GiB)
    pub const DEFAULT_RESERVE_BYTES: u64 = 1024 * 1024 * 1024;

    /// Extra world-space margin added around the pendulum's reach
    pub const VIEW_MARGIN: f32 = 0.5;

    /// Pause between consecutive runs (seconds)
    pub const INTER_RUN_PAUSE_SECS: f32 = 1.0;
}

/// Format the remaining run time as a `MM:SS` countdown
pub fn format_countdown(elapsed_secs: f32, duration_secs: f32) -> String {
    let remaining = (duration_secs - elapsed_secs).max(0.0) as u64;
    format!("{:02}:{:02}", remaining / 60, remaining % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_countdown() {
        assert_eq!(format_countdown(0.0, 90.0), "01:30");
        assert_eq!(format_countdown(30.5, 90.0), "00:59");
        assert_eq!(format_countdown(95.0, 90.0), "00:00");
    }
}
