//! Spatial lookup over the terrain field

pub mod quadtree;

pub use quadtree::{QuadNode, QuadTree};
