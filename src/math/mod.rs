//! Geometry for the wrapping 2D field

pub mod quad;
pub mod segment;

pub use quad::{Quad, PixelRect, wrap_point};
pub use segment::Segment;
