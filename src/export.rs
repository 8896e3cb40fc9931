//! Trace export: rasterize segments as polylines and write a PNG
//!
//! Only the trace is exported; pendulum arms and overlay text never reach
//! the bitmap. Called once per run, at finalization, off the per-tick path.

use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;

use glam::Vec2;
use image::{Rgba, RgbaImage};

use crate::sim::PathTrace;

/// Per-session export parameters
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Side length of the square output image
    pub size_px: u32,
    /// Polyline thickness in pixels
    pub path_thickness: f32,
    pub transparent_background: bool,
    pub output_dir: PathBuf,
}

/// Bitmap write failure. The run is still complete; the session logs this
/// and moves on.
#[derive(Debug)]
pub enum ExportError {
    Io(io::Error),
    Encode(image::ImageError),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Io(e) => write!(f, "export i/o error: {e}"),
            ExportError::Encode(e) => write!(f, "png encode error: {e}"),
        }
    }
}

impl Error for ExportError {}

impl From<io::Error> for ExportError {
    fn from(e: io::Error) -> Self {
        ExportError::Io(e)
    }
}

impl From<image::ImageError> for ExportError {
    fn from(e: image::ImageError) -> Self {
        ExportError::Encode(e)
    }
}

/// Rasterize every segment of the trace into a square RGBA image.
/// `view_extent` is the world-space half-width mapped onto the image.
pub fn rasterize(trace: &PathTrace, view_extent: f32, opts: &ExportOptions) -> RgbaImage {
    let size = opts.size_px;
    let background = if opts.transparent_background {
        Rgba([0, 0, 0, 0])
    } else {
        Rgba([0, 0, 0, 255])
    };
    let mut img = RgbaImage::from_pixel(size, size, background);

    let extent = if view_extent > 0.0 { view_extent } else { 1.0 };
    let scale = size as f32 / (2.0 * extent);
    let to_pixel = |p: Vec2| {
        // world y points up, image y points down
        Vec2::new((p.x + extent) * scale, (extent - p.y) * scale)
    };

    let radius = (opts.path_thickness / 2.0).max(0.5);
    for segment in trace.segments() {
        let pixel = Rgba(segment.color().to_rgba(255));
        for pair in segment.points().windows(2) {
            draw_line(&mut img, to_pixel(pair[0]), to_pixel(pair[1]), radius, pixel);
        }
        // A one-point segment still leaves a dot
        if segment.points().len() == 1 {
            stamp(&mut img, to_pixel(segment.points()[0]), radius, pixel);
        }
    }
    img
}

/// Draw a thick line by stamping discs along the span
fn draw_line(img: &mut RgbaImage, a: Vec2, b: Vec2, radius: f32, pixel: Rgba<u8>) {
    let delta = b - a;
    let steps = delta.x.abs().max(delta.y.abs()).ceil().max(1.0) as u32;
    for i in 0..=steps {
        let p = a + delta * (i as f32 / steps as f32);
        stamp(img, p, radius, pixel);
    }
}

fn stamp(img: &mut RgbaImage, center: Vec2, radius: f32, pixel: Rgba<u8>) {
    let r = radius.ceil() as i32;
    let (cx, cy) = (center.x.round() as i32, center.y.round() as i32);
    for dy in -r..=r {
        for dx in -r..=r {
            if (dx * dx + dy * dy) as f32 > radius * radius {
                continue;
            }
            let (x, y) = (cx + dx, cy + dy);
            if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
                img.put_pixel(x as u32, y as u32, pixel);
            }
        }
    }
}

/// Rasterize and write `pendulum_path_<timestamp>.png` into the output
/// directory, which must already exist. Returns the written path.
pub fn export_trace(
    trace: &PathTrace,
    view_extent: f32,
    opts: &ExportOptions,
) -> Result<PathBuf, ExportError> {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let path = opts.output_dir.join(format!("pendulum_path_{timestamp}.png"));

    let img = rasterize(trace, view_extent, opts);
    img.save(&path)?;
    Ok(path)
}
