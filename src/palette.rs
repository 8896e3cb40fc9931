//! Neon color palette for trace segments
//!
//! A fixed set of saturated high-contrast colors; every segment of every
//! piece draws its color uniformly from here.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// An 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Pixel value with the given alpha channel
    pub fn to_rgba(self, alpha: u8) -> [u8; 4] {
        [self.r, self.g, self.b, alpha]
    }
}

/// The neon palette
pub const NEON_COLORS: [Rgb; 41] = [
    Rgb::new(0x39, 0xFF, 0x14), // green
    Rgb::new(0xDF, 0xFF, 0x00), // yellow
    Rgb::new(0xFF, 0x3F, 0x00), // red
    Rgb::new(0xFF, 0x00, 0xFF), // pink
    Rgb::new(0x00, 0xFF, 0xFF), // cyan
    Rgb::new(0xFF, 0x66, 0x00), // orange
    Rgb::new(0x6E, 0x0D, 0xD0), // purple
    Rgb::new(0xFF, 0xFF, 0xFF), // white
    Rgb::new(0x00, 0xFF, 0x00), // bright green
    Rgb::new(0xFF, 0x00, 0x7F), // magenta
    Rgb::new(0xFE, 0x34, 0x7E), // rose
    Rgb::new(0xFE, 0x4E, 0xDA), // fuchsia
    Rgb::new(0x9D, 0xFF, 0x00), // lime
    Rgb::new(0xFE, 0xFE, 0x22), // lemon
    Rgb::new(0x7D, 0x3C, 0xF8), // violet
    Rgb::new(0x50, 0xBF, 0xE6), // blue
    Rgb::new(0xFF, 0x6E, 0xFF), // lavender
    Rgb::new(0xEE, 0x34, 0xD2), // dark pink
    Rgb::new(0xFF, 0xD3, 0x00), // sunflower
    Rgb::new(0x76, 0xFF, 0x7A), // light green
    Rgb::new(0xFF, 0x07, 0x3A),
    Rgb::new(0xFF, 0x6E, 0xC7),
    Rgb::new(0xFF, 0xBF, 0x00),
    Rgb::new(0xCC, 0xFF, 0x00),
    Rgb::new(0x00, 0xFF, 0xEF),
    Rgb::new(0xFF, 0x10, 0xF0),
    Rgb::new(0x00, 0xFF, 0x7F),
    Rgb::new(0xFF, 0x45, 0x00),
    Rgb::new(0x94, 0x00, 0xD3),
    Rgb::new(0xFF, 0x14, 0x93),
    Rgb::new(0x32, 0xCD, 0x32),
    Rgb::new(0x7F, 0xFF, 0x00),
    Rgb::new(0x00, 0xCE, 0xD1),
    Rgb::new(0xFF, 0x00, 0xCC),
    Rgb::new(0xFF, 0x69, 0xB4),
    Rgb::new(0xAD, 0xFF, 0x2F),
    Rgb::new(0x1E, 0x90, 0xFF),
    Rgb::new(0xFF, 0xB6, 0xC1),
    Rgb::new(0x00, 0xFA, 0x9A),
    Rgb::new(0xFF, 0x63, 0x47),
    Rgb::new(0x8A, 0x2B, 0xE2),
];

/// Pick one palette color uniformly at random
pub fn pick<R: Rng + ?Sized>(rng: &mut R) -> Rgb {
    NEON_COLORS[rng.random_range(0..NEON_COLORS.len())]
}
