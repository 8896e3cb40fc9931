//! Platform abstraction layer
//!
//! The session loop talks to the outside world only through these traits:
//! - `Canvas`: live display surface
//! - `Clock`: monotonic time and frame pacing
//! - `FileSystem`: output-folder listing and free-space queries
//! - `CancelSignal`: the single external "stop now" flag

use std::io;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use glam::Vec2;

use crate::palette::Rgb;
use crate::sim::Segment;

/// Overlay text anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayCorner {
    TopLeft,
    BottomLeft,
}

/// Live display surface. Export does not go through here; the exporter
/// rasterizes the trace itself.
pub trait Canvas {
    fn draw_segments(&mut self, segments: &[Segment], thickness: f32);
    /// Arm joint chain from the anchor outward; `visible: false` clears any
    /// previously drawn arms.
    fn draw_arms(&mut self, joints: &[Vec2], color: Rgb, thickness: f32, visible: bool);
    fn draw_overlay_text(&mut self, text: &str, corner: OverlayCorner);
    fn present(&mut self);
}

/// Canvas that discards everything (headless sessions, tests)
#[derive(Debug, Default)]
pub struct NullCanvas;

impl Canvas for NullCanvas {
    fn draw_segments(&mut self, _segments: &[Segment], _thickness: f32) {}
    fn draw_arms(&mut self, _joints: &[Vec2], _color: Rgb, _thickness: f32, _visible: bool) {}
    fn draw_overlay_text(&mut self, _text: &str, _corner: OverlayCorner) {}
    fn present(&mut self) {}
}

/// Canvas that mirrors the top-left overlay (the countdown) to the log,
/// once per change rather than once per frame.
#[derive(Debug, Default)]
pub struct ConsoleCanvas {
    last_overlay: Option<String>,
}

impl Canvas for ConsoleCanvas {
    fn draw_segments(&mut self, _segments: &[Segment], _thickness: f32) {}

    fn draw_arms(&mut self, _joints: &[Vec2], _color: Rgb, _thickness: f32, _visible: bool) {}

    fn draw_overlay_text(&mut self, text: &str, corner: OverlayCorner) {
        if corner == OverlayCorner::TopLeft && self.last_overlay.as_deref() != Some(text) {
            log::debug!("countdown {text}");
            self.last_overlay = Some(text.to_string());
        }
    }

    fn present(&mut self) {}
}

/// Monotonic time source plus frame pacing
pub trait Clock {
    /// Monotonic timestamp since clock creation
    fn now(&self) -> Duration;
    fn sleep(&self, d: Duration);
}

/// Wall clock backed by `std::time::Instant`
#[derive(Debug)]
pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }

    fn sleep(&self, d: Duration) {
        std::thread::sleep(d);
    }
}

/// Deterministic clock whose time advances only when slept on. Drives the
/// session loop at full speed in tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Mutex<Duration>,
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        *self.now.lock().unwrap()
    }

    fn sleep(&self, d: Duration) {
        *self.now.lock().unwrap() += d;
    }
}

/// Output-folder statistics and free-space queries
pub trait FileSystem {
    /// Sizes in bytes of the PNG files directly inside `dir`
    fn image_sizes(&self, dir: &Path) -> io::Result<Vec<u64>>;
    /// Free bytes on the volume holding `path`
    fn free_space(&self, path: &Path) -> io::Result<u64>;
    /// Create `dir` and any missing parents
    fn create_dir_all(&self, dir: &Path) -> io::Result<()>;
}

/// Real filesystem, free space via a disk-list refresh
#[derive(Debug, Default)]
pub struct NativeFs;

impl FileSystem for NativeFs {
    fn image_sizes(&self, dir: &Path) -> io::Result<Vec<u64>> {
        let mut sizes = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("png")) {
                sizes.push(entry.metadata()?.len());
            }
        }
        Ok(sizes)
    }

    fn free_space(&self, path: &Path) -> io::Result<u64> {
        let target = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        let disks = sysinfo::Disks::new_with_refreshed_list();

        // Longest mount-point prefix wins (e.g. "/home" over "/")
        disks
            .list()
            .iter()
            .filter(|d| target.starts_with(d.mount_point()))
            .max_by_key(|d| d.mount_point().as_os_str().len())
            .map(|d| d.available_space())
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, "no disk found for output path")
            })
    }

    fn create_dir_all(&self, dir: &Path) -> io::Result<()> {
        std::fs::create_dir_all(dir)
    }
}

/// Externally settable stop flag, checked before every tick
#[derive(Debug, Clone, Default)]
pub struct CancelSignal {
    flag: Arc<AtomicBool>,
}

impl CancelSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_signal_shared_across_clones() {
        let signal = CancelSignal::new();
        let clone = signal.clone();
        assert!(!signal.is_requested());
        clone.request();
        assert!(signal.is_requested());
    }

    #[test]
    fn test_manual_clock_advances_on_sleep() {
        let clock = ManualClock::default();
        assert_eq!(clock.now(), Duration::ZERO);
        clock.sleep(Duration::from_millis(5));
        clock.sleep(Duration::from_millis(5));
        assert_eq!(clock.now(), Duration::from_millis(10));
    }

    #[test]
    fn test_native_fs_lists_only_png_sizes() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.png"), [0u8; 16]).unwrap();
        std::fs::write(dir.path().join("b.PNG"), [0u8; 32]).unwrap();
        std::fs::write(dir.path().join("notes.txt"), [0u8; 64]).unwrap();

        let mut sizes = NativeFs.image_sizes(dir.path()).unwrap();
        sizes.sort_unstable();
        assert_eq!(sizes, vec![16, 32]);
    }

    #[test]
    fn test_native_fs_creates_nested_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("traces").join("2026");
        NativeFs.create_dir_all(&nested).unwrap();
        assert!(nested.is_dir());
        // Already existing is not an error
        NativeFs.create_dir_all(&nested).unwrap();
    }
}
