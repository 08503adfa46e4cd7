//! Axis-aligned rectangles in world and pixel space

use crate::core::types::Vec2;

/// Axis-aligned rectangle defined by min and max corners
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Quad {
    pub min: Vec2,
    pub max: Vec2,
}

impl Quad {
    /// Create quad from min and max corners
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Create quad from scalar corner coordinates
    pub fn from_coords(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self::new(Vec2::new(min_x, min_y), Vec2::new(max_x, max_y))
    }

    /// Create quad from min corner and size
    pub fn from_origin_size(origin: Vec2, size: Vec2) -> Self {
        Self::new(origin, origin + size)
    }

    /// Create quad from center and half-extents
    pub fn from_center_half_extent(center: Vec2, half_extent: Vec2) -> Self {
        Self {
            min: center - half_extent,
            max: center + half_extent,
        }
    }

    /// Get center point
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Get size (max - min)
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Check if point is inside the quad (min inclusive, max exclusive)
    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x < self.max.x &&
        p.y >= self.min.y && p.y < self.max.y
    }

    /// Check if two quads overlap with non-zero area
    pub fn intersects(&self, other: &Quad) -> bool {
        self.min.x < other.max.x && self.max.x > other.min.x &&
        self.min.y < other.max.y && self.max.y > other.min.y
    }

    /// Overlapping region of two quads, if any
    pub fn intersection(&self, other: &Quad) -> Option<Quad> {
        if !self.intersects(other) {
            return None;
        }
        Some(Quad {
            min: self.min.max(other.min),
            max: self.max.min(other.max),
        })
    }

    /// Return quad moved by `offset`
    pub fn translated(&self, offset: Vec2) -> Quad {
        Quad {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Return quad grown by `amount` on every side
    pub fn expanded(&self, amount: f32) -> Quad {
        Quad {
            min: self.min - Vec2::splat(amount),
            max: self.max + Vec2::splat(amount),
        }
    }

    /// Wrap the min corner into `reference` (modulo both axes), keeping the size.
    ///
    /// The result's max corner may lie beyond `reference.max`; callers that need
    /// full coverage issue shifted queries for the overflow.
    pub fn wrapped_into(&self, reference: &Quad) -> Quad {
        let extent = reference.size();
        let local = self.min - reference.min;
        let min = reference.min + Vec2::new(
            wrap_scalar(local.x, extent.x),
            wrap_scalar(local.y, extent.y),
        );
        Quad::from_origin_size(min, self.size())
    }

    /// Get child quadrant for quadtree subdivision
    /// index: 0-3 (bit 0 = x, bit 1 = y)
    pub fn child_quadrant(&self, index: u8) -> Quad {
        let center = self.center();
        let half = self.size() * 0.25;

        let offset = Vec2::new(
            if index & 1 != 0 { half.x } else { -half.x },
            if index & 2 != 0 { half.y } else { -half.y },
        );

        Quad::from_center_half_extent(center + offset, half)
    }
}

/// `v` modulo `extent`, in `[0, extent)`.
#[inline]
fn wrap_scalar(v: f32, extent: f32) -> f32 {
    let r = v.rem_euclid(extent);
    // Tiny negative inputs round up to exactly `extent`
    if r >= extent { 0.0 } else { r }
}

/// Wrap a point into `reference` (modulo both axes)
pub fn wrap_point(p: Vec2, reference: &Quad) -> Vec2 {
    let extent = reference.size();
    let local = p - reference.min;
    reference.min + Vec2::new(wrap_scalar(local.x, extent.x), wrap_scalar(local.y, extent.y))
}

/// Integer pixel rectangle, max exclusive
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PixelRect {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl PixelRect {
    pub fn new(x0: u32, y0: u32, x1: u32, y1: u32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> u32 {
        self.x1.saturating_sub(self.x0)
    }

    pub fn height(&self) -> u32 {
        self.y1.saturating_sub(self.y0)
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Clamp to a `width` x `height` image
    pub fn clamped(&self, width: u32, height: u32) -> PixelRect {
        PixelRect {
            x0: self.x0.min(width),
            y0: self.y0.min(height),
            x1: self.x1.min(width),
            y1: self.y1.min(height),
        }
    }

    /// Grow by `margin` pixels on every side, clamped to a `width` x `height` image
    pub fn expanded(&self, margin: u32, width: u32, height: u32) -> PixelRect {
        PixelRect {
            x0: self.x0.saturating_sub(margin),
            y0: self.y0.saturating_sub(margin),
            x1: self.x1.saturating_add(margin),
            y1: self.y1.saturating_add(margin),
        }
        .clamped(width, height)
    }
}
