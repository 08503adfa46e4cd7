//! Atoll - streaming, destructible island terrain over a wrapping 2D field

pub mod core;
pub mod math;
pub mod spatial;
pub mod generation;
pub mod island;
pub mod streaming;
pub mod terrain;

pub use generation::{IslandSpec, NoiseBank, TerrainConfig};
pub use island::{ChunkAddress, Island, IslandId, IslandSprite};
pub use math::Quad;
pub use terrain::{RayHit, Terrain, TerrainStats};
