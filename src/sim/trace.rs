//! Accumulated tip trace, subdivided into colored segments

use glam::Vec2;

use crate::palette::Rgb;

/// A contiguous run of trace points sharing one color
///
/// Points are append-only; once a segment is superseded by a newer one it is
/// closed for writing and only read for rendering/export.
#[derive(Debug, Clone)]
pub struct Segment {
    points: Vec<Vec2>,
    color: Rgb,
}

impl Segment {
    fn new(color: Rgb) -> Self {
        Self {
            points: Vec::new(),
            color,
        }
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    pub fn color(&self) -> Rgb {
        self.color
    }
}

/// Ordered segments; insertion order is temporal order. The current segment
/// is always the last one.
#[derive(Debug, Clone)]
pub struct PathTrace {
    segments: Vec<Segment>,
}

impl PathTrace {
    /// A trace always starts with one (empty) segment
    pub fn new(initial_color: Rgb) -> Self {
        Self {
            segments: vec![Segment::new(initial_color)],
        }
    }

    /// Close the current segment and open a new one with the given color
    pub fn start_segment(&mut self, color: Rgb) {
        self.segments.push(Segment::new(color));
    }

    /// Append a point to the current segment
    pub fn push(&mut self, point: Vec2) {
        // new() guarantees at least one segment
        self.segments.last_mut().unwrap().points.push(point);
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Total points across all segments; equals ticks advanced since run start
    pub fn total_points(&self) -> usize {
        self.segments.iter().map(|s| s.points.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::NEON_COLORS;

    #[test]
    fn test_starts_with_one_segment() {
        let trace = PathTrace::new(NEON_COLORS[0]);
        assert_eq!(trace.segment_count(), 1);
        assert_eq!(trace.total_points(), 0);
    }

    #[test]
    fn test_push_appends_to_last_segment() {
        let mut trace = PathTrace::new(NEON_COLORS[0]);
        trace.push(Vec2::new(1.0, 2.0));
        trace.push(Vec2::new(3.0, 4.0));
        trace.start_segment(NEON_COLORS[1]);
        trace.push(Vec2::new(5.0, 6.0));

        assert_eq!(trace.segment_count(), 2);
        assert_eq!(trace.segments()[0].points().len(), 2);
        assert_eq!(trace.segments()[1].points().len(), 1);
        assert_eq!(trace.segments()[1].color(), NEON_COLORS[1]);
        assert_eq!(trace.total_points(), 3);
    }

    #[test]
    fn test_closed_segment_unchanged_by_later_pushes() {
        let mut trace = PathTrace::new(NEON_COLORS[0]);
        trace.push(Vec2::ONE);
        trace.start_segment(NEON_COLORS[2]);
        for _ in 0..10 {
            trace.push(Vec2::ZERO);
        }
        assert_eq!(trace.segments()[0].points(), &[Vec2::ONE]);
    }
}
