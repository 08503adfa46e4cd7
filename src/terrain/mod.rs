//! Terrain facade over the wrapping island field

pub mod terrain;
pub mod wrap;

pub use terrain::{RayHit, Terrain, TerrainStats};
pub use wrap::{wrap_queries, WrappedQuery};
