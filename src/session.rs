//! Session loop: one piece after another until cancelled
//!
//! Owns the cross-run state the runs themselves must not share: the session
//! RNG, the per-arm direction carried between runs, and the retention stats
//! shown in the next run's overlay.

use std::path::PathBuf;
use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::{FRAME_INTERVAL_MS, INTER_RUN_PAUSE_SECS};
use crate::export::{self, ExportOptions};
use crate::format_countdown;
use crate::platform::{Canvas, CancelSignal, Clock, FileSystem, OverlayCorner};
use crate::retention::{self, RetentionStats};
use crate::settings::{ConfigError, DirectionPolicy, Settings};
use crate::sim::{ArmTuning, RunConfig, RunController, Spin, TickOutcome};

/// How a single run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Duration elapsed; `exported` holds the written image path, if any
    Completed { exported: Option<PathBuf> },
    /// Cancel signal arrived mid-run; nothing was exported
    Cancelled,
}

/// Drives runs back to back with alternating directions and fresh random
/// parameters, refreshing the retention estimate between runs.
pub struct SessionLoop<C: Canvas, K: Clock, F: FileSystem> {
    settings: Settings,
    canvas: C,
    clock: K,
    fs: F,
    cancel: CancelSignal,
    rng: Pcg32,
    /// Direction each arm will use next run, advanced by the per-arm policy
    spins: Vec<Spin>,
    stats: RetentionStats,
    remaining_images: u64,
}

impl<C: Canvas, K: Clock, F: FileSystem> SessionLoop<C, K, F> {
    /// Validate settings and seed the session. The same seed replays the
    /// same sequence of pieces.
    pub fn new(
        settings: Settings,
        canvas: C,
        clock: K,
        fs: F,
        cancel: CancelSignal,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        settings.validate()?;
        let mut rng = Pcg32::seed_from_u64(seed);

        let spins = settings
            .directions
            .iter()
            .take(settings.arm_count.count())
            .map(|policy| match policy {
                DirectionPolicy::Fixed(spin) => *spin,
                DirectionPolicy::Alternate => Spin::random(&mut rng),
            })
            .collect();

        Ok(Self {
            settings,
            canvas,
            clock,
            fs,
            cancel,
            rng,
            spins,
            stats: RetentionStats::default(),
            remaining_images: 0,
        })
    }

    /// Run pieces until the cancel signal is raised
    pub fn run_forever(&mut self) {
        if let Err(e) = self.fs.create_dir_all(&self.settings.output_dir) {
            log::warn!("could not create output directory: {e}");
        }
        self.refresh_retention();

        loop {
            if self.cancel.is_requested() {
                break;
            }
            match self.run_once() {
                RunOutcome::Cancelled => break,
                RunOutcome::Completed { exported } => {
                    if let Some(path) = exported {
                        log::info!("saved {}", path.display());
                    }
                }
            }
            self.refresh_retention();
            self.clock.sleep(Duration::from_secs_f32(INTER_RUN_PAUSE_SECS));
        }
        log::info!("session stopped");
    }

    /// Drive one complete run tick-by-tick
    pub fn run_once(&mut self) -> RunOutcome {
        let config = self.next_config();
        let seed = self.rng.random::<u64>();
        log::info!(
            "run start: {}s, {} arms, seed {seed}",
            config.duration_secs,
            config.arm_count()
        );

        let tuning = ArmTuning {
            length_range: self.settings.arm_length_range,
            speed_ranges: self
                .settings
                .arm_speed_ranges
                .iter()
                .take(config.arm_count())
                .copied()
                .collect(),
        };
        let mut ctl = RunController::new(config, &tuning, seed);

        let frame = Duration::from_millis(FRAME_INTERVAL_MS);
        let mut last = self.clock.now();

        loop {
            if self.cancel.is_requested() {
                log::info!("run abandoned on cancel");
                return RunOutcome::Cancelled;
            }

            let now = self.clock.now();
            let dt = (now - last).as_secs_f32();
            last = now;

            match ctl.tick(dt) {
                TickOutcome::Advanced => {
                    self.redraw(&ctl);
                    self.clock.sleep(frame);
                }
                TickOutcome::Finalized => {
                    // One last frame with the arms hidden
                    self.redraw(&ctl);
                    let exported = self.export(&ctl);
                    return RunOutcome::Completed { exported };
                }
                TickOutcome::Ignored => {
                    // Unreachable with a freshly constructed controller
                    return RunOutcome::Completed { exported: None };
                }
            }
        }
    }

    /// Build the next run's config, advancing alternating directions
    fn next_config(&mut self) -> RunConfig {
        for (spin, policy) in self.spins.iter_mut().zip(&self.settings.directions) {
            if *policy == DirectionPolicy::Alternate {
                *spin = spin.flipped();
            }
        }

        let choices = self.settings.duration_choices();
        let duration_secs = choices[self.rng.random_range(0..choices.len())] as f32;

        RunConfig {
            duration_secs,
            spins: self.spins.clone(),
            reverse_main_at_halfway: self.settings.reverse_main_at_halfway,
            color_change_on_reversal: self.settings.color_change_on_reversal,
            show_arms: self.settings.show_arms,
        }
    }

    fn redraw(&mut self, ctl: &RunController) {
        let trace = ctl.trace();
        self.canvas.draw_segments(trace.segments(), self.settings.path_thickness);

        // Arms take the color the piece opened with
        let arm_color = trace.segments()[0].color();
        self.canvas.draw_arms(
            &ctl.pendulum().joint_positions(),
            arm_color,
            self.settings.arm_thickness,
            ctl.arms_visible(),
        );

        self.canvas.draw_overlay_text(
            &format_countdown(ctl.elapsed_secs(), ctl.config().duration_secs),
            OverlayCorner::TopLeft,
        );
        self.canvas.draw_overlay_text(
            &format!(
                "Images saved: {}\nRemaining images: {}",
                self.stats.image_count, self.remaining_images
            ),
            OverlayCorner::BottomLeft,
        );
        self.canvas.present();
    }

    /// Export the finished trace when enabled; failures are logged, never fatal
    fn export(&mut self, ctl: &RunController) -> Option<PathBuf> {
        if !self.settings.save_image {
            return None;
        }
        let opts = ExportOptions {
            size_px: self.settings.export_size_px,
            path_thickness: self.settings.path_thickness,
            transparent_background: self.settings.transparent_background,
            output_dir: self.settings.output_dir.clone(),
        };
        match export::export_trace(ctl.trace(), ctl.view_extent(), &opts) {
            Ok(path) => Some(path),
            Err(e) => {
                log::warn!("export failed, continuing: {e}");
                None
            }
        }
    }

    /// Rescan the output folder and recompute the advisory estimate.
    /// A failed listing or free-space query degrades to "0 remaining".
    fn refresh_retention(&mut self) {
        let sizes = match self.fs.image_sizes(&self.settings.output_dir) {
            Ok(sizes) => sizes,
            Err(e) => {
                log::warn!("image listing failed, reporting 0 remaining: {e}");
                self.remaining_images = 0;
                return;
            }
        };
        self.stats = RetentionStats::from_sizes(&sizes);

        self.remaining_images = match self.fs.free_space(&self.settings.output_dir) {
            Ok(free) => retention::estimate_remaining(
                free,
                self.settings.reserve_bytes,
                self.stats.avg_bytes_per_image,
            ),
            Err(e) => {
                log::warn!("free-space query failed, reporting 0 remaining: {e}");
                0
            }
        };
        log::info!(
            "retention: {} images on disk, ~{} more before reserve",
            self.stats.image_count,
            self.remaining_images
        );
    }

    pub fn retention_stats(&self) -> &RetentionStats {
        &self.stats
    }

    pub fn remaining_images(&self) -> u64 {
        self.remaining_images
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::Path;

    use crate::platform::{ManualClock, NullCanvas};
    use crate::settings::ArmCount;

    /// Filesystem stub with canned listing and free space
    struct FakeFs {
        sizes: io::Result<Vec<u64>>,
        free: io::Result<u64>,
    }

    impl FileSystem for FakeFs {
        fn image_sizes(&self, _dir: &Path) -> io::Result<Vec<u64>> {
            match &self.sizes {
                Ok(v) => Ok(v.clone()),
                Err(e) => Err(io::Error::new(e.kind(), "listing failed")),
            }
        }

        fn free_space(&self, _path: &Path) -> io::Result<u64> {
            match &self.free {
                Ok(v) => Ok(*v),
                Err(e) => Err(io::Error::new(e.kind(), "query failed")),
            }
        }

        fn create_dir_all(&self, _dir: &Path) -> io::Result<()> {
            Ok(())
        }
    }

    fn ok_fs() -> FakeFs {
        FakeFs {
            sizes: Ok(vec![]),
            free: Ok(10 * 1024 * 1024 * 1024),
        }
    }

    fn quick_settings(dir: &Path) -> Settings {
        Settings {
            min_duration_secs: 1,
            max_duration_secs: 1,
            duration_step_secs: 1,
            export_size_px: 64,
            save_image: true,
            output_dir: dir.to_path_buf(),
            ..Settings::default()
        }
    }

    fn session(
        settings: Settings,
        fs: FakeFs,
        cancel: CancelSignal,
        seed: u64,
    ) -> SessionLoop<NullCanvas, ManualClock, FakeFs> {
        SessionLoop::new(settings, NullCanvas, ManualClock::default(), fs, cancel, seed).unwrap()
    }

    #[test]
    fn test_rejects_invalid_settings() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = quick_settings(dir.path());
        settings.arm_speed_ranges[0] = (5.0, 1.0);
        let result = SessionLoop::new(
            settings,
            NullCanvas,
            ManualClock::default(),
            ok_fs(),
            CancelSignal::new(),
            1,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_run_once_completes_and_exports() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(quick_settings(dir.path()), ok_fs(), CancelSignal::new(), 3);

        match session.run_once() {
            RunOutcome::Completed { exported } => {
                let path = exported.expect("export enabled");
                assert!(path.exists());
            }
            RunOutcome::Cancelled => panic!("not cancelled"),
        }
    }

    #[test]
    fn test_save_disabled_skips_export() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = quick_settings(dir.path());
        settings.save_image = false;
        let mut session = session(settings, ok_fs(), CancelSignal::new(), 3);

        assert_eq!(session.run_once(), RunOutcome::Completed { exported: None });
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[test]
    fn test_cancel_abandons_run_without_export() {
        let dir = tempfile::tempdir().unwrap();
        let cancel = CancelSignal::new();
        let mut session = session(quick_settings(dir.path()), ok_fs(), cancel.clone(), 3);

        cancel.request();
        assert_eq!(session.run_once(), RunOutcome::Cancelled);
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[test]
    fn test_run_forever_uses_injected_filesystem() {
        // Nonexistent output dir: everything goes through FakeFs, so the
        // loop must still start up and compute its estimate.
        let settings = quick_settings(Path::new("/nonexistent/pendulum-out"));
        let fs = FakeFs {
            sizes: Ok(vec![2 * 1024 * 1024]),
            free: Ok(1024 * 1024 * 1024 + 4 * 1024 * 1024),
        };
        let cancel = CancelSignal::new();
        let mut session = session(settings, fs, cancel.clone(), 9);

        cancel.request();
        session.run_forever();
        assert_eq!(session.remaining_images(), 2);
    }

    #[test]
    fn test_alternating_directions_flip_each_run() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = quick_settings(dir.path());
        settings.arm_count = ArmCount::Two;
        settings.directions = [
            DirectionPolicy::Fixed(Spin::Cw),
            DirectionPolicy::Alternate,
            DirectionPolicy::Alternate,
        ];
        let mut session = session(settings, ok_fs(), CancelSignal::new(), 9);

        let first = session.next_config();
        let second = session.next_config();
        assert_eq!(first.spins[0], Spin::Cw);
        assert_eq!(second.spins[0], Spin::Cw);
        assert_eq!(second.spins[1], first.spins[1].flipped());
    }

    #[test]
    fn test_duration_from_discrete_set() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = quick_settings(dir.path());
        settings.min_duration_secs = 60;
        settings.max_duration_secs = 120;
        settings.duration_step_secs = 15;
        let mut session = session(settings, ok_fs(), CancelSignal::new(), 5);

        for _ in 0..50 {
            let d = session.next_config().duration_secs as u32;
            assert!([60, 75, 90, 105, 120].contains(&d));
        }
    }

    #[test]
    fn test_disk_query_failure_reports_zero_remaining() {
        let dir = tempfile::tempdir().unwrap();
        let fs = FakeFs {
            sizes: Ok(vec![1024, 2048]),
            free: Err(io::Error::new(io::ErrorKind::Other, "nope")),
        };
        let mut session = session(quick_settings(dir.path()), fs, CancelSignal::new(), 1);
        session.refresh_retention();
        assert_eq!(session.remaining_images(), 0);
        assert_eq!(session.retention_stats().image_count, 2);
    }

    #[test]
    fn test_listing_failure_reports_zero_remaining() {
        let dir = tempfile::tempdir().unwrap();
        let fs = FakeFs {
            sizes: Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied")),
            free: Ok(10 * 1024 * 1024 * 1024),
        };
        let mut session = session(quick_settings(dir.path()), fs, CancelSignal::new(), 1);
        session.refresh_retention();
        // Plenty of free space, but an unreadable folder means no estimate
        assert_eq!(session.remaining_images(), 0);
    }

    #[test]
    fn test_retention_refresh_with_free_space() {
        let dir = tempfile::tempdir().unwrap();
        const GIB: u64 = 1024 * 1024 * 1024;
        const MIB: u64 = 1024 * 1024;
        let fs = FakeFs {
            sizes: Ok(vec![2 * MIB, 2 * MIB]),
            free: Ok(5 * GIB),
        };
        let mut settings = quick_settings(dir.path());
        settings.reserve_bytes = GIB;
        let mut session = session(settings, fs, CancelSignal::new(), 1);
        session.refresh_retention();
        assert_eq!(session.remaining_images(), 2048);
    }

    #[test]
    fn test_same_seed_same_session_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = session(quick_settings(dir.path()), ok_fs(), CancelSignal::new(), 42);
        let mut b = session(quick_settings(dir.path()), ok_fs(), CancelSignal::new(), 42);

        let ca = a.next_config();
        let cb = b.next_config();
        assert_eq!(ca.spins, cb.spins);
        assert_eq!(ca.duration_secs, cb.duration_secs);
    }
}
