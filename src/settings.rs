//! Session configuration and presets
//!
//! One engine, many parameter sets: the historical variants of the generator
//! survive here as named presets rather than separate programs. Settings are
//! validated once at session start; an invalid configuration never reaches a
//! live run.

use std::error::Error;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_RESERVE_BYTES;
use crate::sim::Spin;

/// Number of coupled arms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ArmCount {
    #[default]
    Two,
    Three,
}

impl ArmCount {
    pub fn count(self) -> usize {
        match self {
            ArmCount::Two => 2,
            ArmCount::Three => 3,
        }
    }
}

/// How an arm's initial rotation direction is chosen run after run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DirectionPolicy {
    /// Same direction every run
    Fixed(Spin),
    /// Random on the first run, then flipped before each subsequent run
    Alternate,
}

/// Named parameter presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
pub enum Preset {
    /// Short un-saved sketches with wildly varying arm lengths
    Draft,
    /// Single-color pieces with visible arms
    Classic,
    /// Hidden arms, halfway reversal with a color change
    Segmented,
    /// Thick visible arms, alternating secondary direction
    Bold,
    /// Fast arms, reversal color change, retention overlay
    #[default]
    Gallery,
}

impl Preset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Draft => "draft",
            Preset::Classic => "classic",
            Preset::Segmented => "segmented",
            Preset::Bold => "bold",
            Preset::Gallery => "gallery",
        }
    }
}

/// Full configuration surface for a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub arm_count: ArmCount,

    // === Run duration (seconds), drawn from {min, min+step, ..., max} ===
    pub min_duration_secs: u32,
    pub max_duration_secs: u32,
    pub duration_step_secs: u32,

    // === Per-run sampling ranges ===
    /// Arm length range (world units)
    pub arm_length_range: (f32, f32),
    /// Angular speed range per arm (degrees per tick); third entry unused
    /// with two arms
    pub arm_speed_ranges: [(f32, f32); 3],

    /// Initial direction policy per arm
    pub directions: [DirectionPolicy; 3],

    // === Reversal behavior ===
    pub reverse_main_at_halfway: bool,
    pub color_change_on_reversal: bool,

    // === Rendering ===
    pub show_arms: bool,
    /// Arm line thickness in export pixels
    pub arm_thickness: f32,
    /// Path line thickness in export pixels
    pub path_thickness: f32,

    // === Export ===
    pub save_image: bool,
    pub transparent_background: bool,
    /// Side length of the square exported image
    pub export_size_px: u32,
    pub output_dir: PathBuf,
    /// Free-space reserve the retention estimate must not touch
    pub reserve_bytes: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_preset(Preset::default())
    }
}

impl Settings {
    /// Build the settings for a named preset
    pub fn from_preset(preset: Preset) -> Self {
        let base = Self {
            arm_count: ArmCount::Two,
            min_duration_secs: 60,
            max_duration_secs: 500,
            duration_step_secs: 15,
            arm_length_range: (5.0, 15.0),
            arm_speed_ranges: [(0.5, 3.0), (0.5, 3.0), (0.5, 3.0)],
            directions: [
                DirectionPolicy::Fixed(Spin::Cw),
                DirectionPolicy::Fixed(Spin::Cw),
                DirectionPolicy::Fixed(Spin::Cw),
            ],
            reverse_main_at_halfway: false,
            color_change_on_reversal: false,
            show_arms: true,
            arm_thickness: 2.0,
            path_thickness: 1.0,
            save_image: true,
            transparent_background: false,
            export_size_px: 2048,
            output_dir: PathBuf::from("Images"),
            reserve_bytes: DEFAULT_RESERVE_BYTES,
        };

        match preset {
            Preset::Draft => Self {
                min_duration_secs: 10,
                max_duration_secs: 100,
                duration_step_secs: 45,
                arm_length_range: (0.1, 20.0),
                arm_speed_ranges: [(1.0, 4.0), (1.0, 5.0), (1.0, 5.0)],
                directions: [
                    DirectionPolicy::Fixed(Spin::Cw),
                    DirectionPolicy::Fixed(Spin::Ccw),
                    DirectionPolicy::Fixed(Spin::Ccw),
                ],
                show_arms: false,
                save_image: false,
                path_thickness: 0.5,
                ..base
            },
            Preset::Classic => Self {
                path_thickness: 0.5,
                ..base
            },
            Preset::Segmented => Self {
                reverse_main_at_halfway: true,
                color_change_on_reversal: true,
                show_arms: false,
                directions: [
                    DirectionPolicy::Fixed(Spin::Cw),
                    DirectionPolicy::Alternate,
                    DirectionPolicy::Fixed(Spin::Cw),
                ],
                ..base
            },
            Preset::Bold => Self {
                arm_thickness: 4.0,
                directions: [
                    DirectionPolicy::Fixed(Spin::Cw),
                    DirectionPolicy::Alternate,
                    DirectionPolicy::Fixed(Spin::Cw),
                ],
                ..base
            },
            Preset::Gallery => Self {
                max_duration_secs: 550,
                arm_speed_ranges: [(5.0, 8.0), (5.0, 8.0), (5.0, 8.0)],
                reverse_main_at_halfway: true,
                color_change_on_reversal: true,
                directions: [
                    DirectionPolicy::Alternate,
                    DirectionPolicy::Alternate,
                    DirectionPolicy::Alternate,
                ],
                ..base
            },
        }
    }

    /// Fail fast on ranges a run could not sample from
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_duration_secs == 0 || self.min_duration_secs > self.max_duration_secs {
            return Err(ConfigError::DurationRange {
                min: self.min_duration_secs,
                max: self.max_duration_secs,
            });
        }
        if self.duration_step_secs == 0 {
            return Err(ConfigError::DurationStep);
        }
        let (lmin, lmax) = self.arm_length_range;
        if lmin <= 0.0 || lmin > lmax {
            return Err(ConfigError::LengthRange { min: lmin, max: lmax });
        }
        for (i, &(smin, smax)) in self
            .arm_speed_ranges
            .iter()
            .take(self.arm_count.count())
            .enumerate()
        {
            if smin <= 0.0 || smin > smax {
                return Err(ConfigError::SpeedRange {
                    arm: i + 1,
                    min: smin,
                    max: smax,
                });
            }
        }
        if self.arm_thickness <= 0.0 || self.path_thickness <= 0.0 {
            return Err(ConfigError::Thickness);
        }
        if self.export_size_px < 64 {
            return Err(ConfigError::ExportSize(self.export_size_px));
        }
        Ok(())
    }

    /// The discrete duration set `{min, min+step, ..., max}`
    pub fn duration_choices(&self) -> Vec<u32> {
        (self.min_duration_secs..=self.max_duration_secs)
            .step_by(self.duration_step_secs as usize)
            .collect()
    }

    /// Load settings from a JSON file
    pub fn load(path: &Path) -> io::Result<Self> {
        let json = fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Save settings to a JSON file
    pub fn save(&self, path: &Path) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, json)
    }
}

/// Invalid configuration, rejected before the session starts
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    DurationRange { min: u32, max: u32 },
    DurationStep,
    LengthRange { min: f32, max: f32 },
    SpeedRange { arm: usize, min: f32, max: f32 },
    Thickness,
    ExportSize(u32),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::DurationRange { min, max } => {
                write!(f, "invalid duration range: min {min}s, max {max}s")
            }
            ConfigError::DurationStep => write!(f, "duration step must be positive"),
            ConfigError::LengthRange { min, max } => {
                write!(f, "invalid arm length range: {min}..{max}")
            }
            ConfigError::SpeedRange { arm, min, max } => {
                write!(f, "invalid speed range for arm {arm}: {min}..{max}")
            }
            ConfigError::Thickness => write!(f, "line thickness must be positive"),
            ConfigError::ExportSize(px) => write!(f, "export size too small: {px}px"),
        }
    }
}

impl Error for ConfigError {}
