//! Procedural generation: configuration, shared noise, island shapes and placement.

pub mod config;
pub mod noise_bank;
pub mod placement;
pub mod shape;

pub use config::{NoiseParams, TerrainConfig};
pub use noise_bank::{DetailTile, NoiseBank, RockTexture};
pub use placement::{grid_placement, IslandSpec};
pub use shape::{generate_cells, IslandShape};
