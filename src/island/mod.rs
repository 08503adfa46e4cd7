//! Islands: destructible cell grids with lazily streamed pixel images.

pub mod chunks;
pub mod gpu;
pub mod grid;
pub mod island;
pub mod pixels;
pub mod synth;
pub mod texture;

pub use chunks::ChunkBitmap;
pub use gpu::{WgpuTexture, WgpuTextureBackend};
pub use grid::{Cell, CellGrid, CellRange};
pub use island::{ChunkAddress, Island, IslandId, IslandSprite, RegionTicket};
pub use pixels::{PixelBuffer, Rgba8};
pub use synth::{synthesize, SynthParams};
pub use texture::{CpuTexture, CpuTextureBackend, IslandTexture, TextureBackend};
