//! Line segment type and fixed-step marching

use crate::core::types::Vec2;

/// A segment from `start` to `end`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub start: Vec2,
    pub end: Vec2,
}

impl Segment {
    pub fn new(start: Vec2, end: Vec2) -> Self {
        Self { start, end }
    }

    /// Get point along the segment at fraction t (0 = start, 1 = end)
    pub fn at(&self, t: f32) -> Vec2 {
        self.start.lerp(self.end, t)
    }

    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }

    /// Sample points from start to end (inclusive) no more than `step` apart.
    ///
    /// Yields `(fraction, point)` pairs. A zero-length segment yields its start once.
    pub fn march(&self, step: f32) -> impl Iterator<Item = (f32, Vec2)> + '_ {
        let steps = if step > 0.0 {
            (self.length() / step).ceil().max(1.0) as u32
        } else {
            1
        };
        let single = self.length() == 0.0;
        let last = if single { 0 } else { steps };
        (0..=last).map(move |i| {
            let t = if single { 0.0 } else { i as f32 / steps as f32 };
            (t, self.at(t))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at() {
        let seg = Segment::new(Vec2::ZERO, Vec2::new(10.0, 0.0));
        assert_eq!(seg.at(0.5), Vec2::new(5.0, 0.0));
    }

    #[test]
    fn test_march_covers_endpoints() {
        let seg = Segment::new(Vec2::ZERO, Vec2::new(10.0, 0.0));
        let samples: Vec<_> = seg.march(3.0).collect();
        // ceil(10 / 3) = 4 steps -> 5 samples
        assert_eq!(samples.len(), 5);
        assert_eq!(samples[0], (0.0, Vec2::ZERO));
        assert_eq!(samples[4], (1.0, Vec2::new(10.0, 0.0)));
    }

    #[test]
    fn test_march_zero_length() {
        let seg = Segment::new(Vec2::ONE, Vec2::ONE);
        assert_eq!(seg.march(1.0).count(), 1);
    }
}
