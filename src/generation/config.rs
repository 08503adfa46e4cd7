//! Construction-time terrain configuration.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};

/// Parameters for the shared shape and detail noise.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseParams {
    pub shape_scale: f32,  // World units per shape-noise unit (larger = blobbier)
    pub octaves: u32,      // FBM octaves
    pub persistence: f32,  // FBM persistence (0.5 typical)
    pub lacunarity: f32,   // FBM lacunarity (2.0 typical)
    pub falloff_gain: f32, // Multiplier on noise * radial falloff before the 0.5 threshold
    pub detail_period: u32, // Side of the tileable detail tile in pixels
    pub detail_frequency: f32, // Radius of the torus the detail tile is sampled on
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            shape_scale: 96.0,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            falloff_gain: 1.6,
            detail_period: 128,
            detail_frequency: 12.0,
        }
    }
}

/// Fixed terrain configuration. Not reconfigurable after the terrain is built.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Seed for placement, shape noise and detail noise.
    pub seed: u32,
    /// Side of the square, wrapping field in world units (1 unit = 1 pixel).
    pub field_size: f32,
    /// Side of one destructible cell in pixels.
    pub cell_size: u32,
    /// Side of one visibility chunk in pixels.
    pub chunk_size: u32,
    /// Extra pixels synthesized around each chunk to hide seams.
    pub chunk_margin: u32,
    /// Islands per field axis in the default placement pattern.
    pub islands_per_axis: u32,
    /// Smallest island side, in cells.
    pub island_cells_min: u32,
    /// Largest island side, in cells.
    pub island_cells_max: u32,
    /// Health every generated active cell starts with.
    pub base_health: f32,
    /// Quadtree subdivision depth (4^depth leaves).
    pub index_depth: u32,
    /// Distance between samples when marching a ray.
    pub ray_step: f32,
    /// Horizontal radius scanned for edge shading.
    pub shading_radius: u32,
    /// Amplitude of the detail noise added to interpolated density.
    pub detail_amplitude: f32,
    pub noise: NoiseParams,
    /// Image tiled as the base rock colour. `None` generates one from the seed.
    pub rock_texture: Option<PathBuf>,
    /// Flat colour used when no rock texture is available.
    pub fallback_color: [u8; 3],
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            seed: 12345,
            field_size: 8192.0,
            cell_size: 8,
            chunk_size: 128,
            chunk_margin: 4,
            islands_per_axis: 6,
            island_cells_min: 48,
            island_cells_max: 128,
            base_health: 100.0,
            index_depth: 5,
            ray_step: 2.0,
            shading_radius: 6,
            detail_amplitude: 0.2,
            noise: NoiseParams::default(),
            rock_texture: None,
            fallback_color: [150, 130, 110],
        }
    }
}

impl TerrainConfig {
    /// Parse from JSON; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: TerrainConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Replace the seed with one taken from the clock, so each run regenerates
    /// a different field.
    pub fn with_random_seed(mut self) -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
            .unwrap_or(self.seed);
        self.seed = nanos;
        self
    }

    /// Reject configurations the terrain cannot be built from.
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: &str| Err(Error::InvalidConfig(msg.to_string()));

        if !(self.field_size > 0.0) {
            return fail("field_size must be positive");
        }
        if self.cell_size == 0 || self.chunk_size == 0 {
            return fail("cell_size and chunk_size must be non-zero");
        }
        if self.islands_per_axis == 0 {
            return fail("islands_per_axis must be non-zero");
        }
        if self.island_cells_min == 0 || self.island_cells_min > self.island_cells_max {
            return fail("island_cells_min must be in 1..=island_cells_max");
        }
        if !(self.base_health > 0.0) {
            return fail("base_health must be positive");
        }
        if !(self.ray_step > 0.0) {
            return fail("ray_step must be positive");
        }
        if self.index_depth > 10 {
            return fail("index_depth must be at most 10");
        }
        if self.noise.detail_period == 0 {
            return fail("noise.detail_period must be non-zero");
        }
        Ok(())
    }

    /// Check the default grid placement can fit every island in its slot.
    pub fn validate_placement(&self) -> Result<()> {
        let slot = self.field_size / self.islands_per_axis.max(1) as f32;
        if (self.island_cells_max * self.cell_size) as f32 > slot {
            return Err(Error::InvalidConfig(
                "largest island does not fit in its placement slot".to_string(),
            ));
        }
        Ok(())
    }
}
