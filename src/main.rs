//! Pendulum Path entry point
//!
//! Parses the CLI, builds the session, and runs it until `q` is entered.

use std::error::Error;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::thread;

use clap::Parser;
use rand::Rng;

use pendulum_path::platform::{CancelSignal, ConsoleCanvas, MonotonicClock, NativeFs};
use pendulum_path::session::SessionLoop;
use pendulum_path::settings::ArmCount;
use pendulum_path::{Preset, Settings};

/// Generative art from chaotic double/triple pendulum traces
#[derive(Parser, Debug)]
#[clap(version, about)]
struct Cli {
    /// Parameter preset to start from
    #[clap(short, long, value_enum, default_value = "gallery")]
    preset: Preset,

    /// Load settings from a JSON file instead of a preset
    #[clap(long)]
    settings_file: Option<PathBuf>,

    /// Session seed; a fixed seed replays the same sequence of pieces
    #[clap(short, long)]
    seed: Option<u64>,

    /// Directory exported images are written into
    #[clap(short, long)]
    output_dir: Option<PathBuf>,

    /// Number of pendulum arms (2 or 3)
    #[clap(long)]
    arms: Option<u8>,

    /// Do not export images at run end
    #[clap(long)]
    no_save: bool,

    /// Export with a transparent background
    #[clap(long)]
    transparent: bool,

    /// Hide the pendulum arms during the animation
    #[clap(long)]
    hide_arms: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let mut settings = match &cli.settings_file {
        Some(path) => Settings::load(path)?,
        None => Settings::from_preset(cli.preset),
    };
    if let Some(dir) = cli.output_dir {
        settings.output_dir = dir;
    }
    if let Some(arms) = cli.arms {
        settings.arm_count = match arms {
            2 => ArmCount::Two,
            3 => ArmCount::Three,
            _ => return Err("arms must be 2 or 3".into()),
        };
    }
    if cli.no_save {
        settings.save_image = false;
    }
    if cli.transparent {
        settings.transparent_background = true;
    }
    if cli.hide_arms {
        settings.show_arms = false;
    }

    let cancel = CancelSignal::new();
    spawn_stop_watcher(cancel.clone());

    let seed = cli.seed.unwrap_or_else(|| rand::rng().random());
    log::info!(
        "starting session: preset {}, seed {seed} (enter q to stop)",
        cli.preset.as_str()
    );

    let mut session = SessionLoop::new(
        settings,
        ConsoleCanvas::default(),
        MonotonicClock::new(),
        NativeFs,
        cancel,
        seed,
    )?;
    session.run_forever();
    Ok(())
}

/// Raise the cancel signal when `q` arrives on stdin
fn spawn_stop_watcher(cancel: CancelSignal) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if line.trim().eq_ignore_ascii_case("q") {
                cancel.request();
                break;
            }
        }
    });
}
