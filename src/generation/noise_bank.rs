//! Shared noise resources, built once and referenced by every island.
//!
//! Holds the low-frequency shape field used for occupancy, a small tileable
//! detail tile sampled per pixel, and the optional tiled rock colour.

use std::f64::consts::TAU;
use std::path::Path;

use noise::{Fbm, MultiFractal, NoiseFn, Perlin};

use super::config::{NoiseParams, TerrainConfig};
use crate::core::types::Vec2;
use crate::core::Result;

/// Sample 4D noise on a torus so the result tiles with `period` on both axes.
fn tileable_sample<N: NoiseFn<f64, 4>>(noise: &N, x: u32, y: u32, period: u32, radius: f64) -> f64 {
    let ax = TAU * x as f64 / period as f64;
    let ay = TAU * y as f64 / period as f64;
    noise.get([
        radius * ax.cos(),
        radius * ax.sin(),
        radius * ay.cos(),
        radius * ay.sin(),
    ])
}

/// Square tile of high-frequency noise in [-1, 1] that wraps seamlessly.
pub struct DetailTile {
    period: u32,
    values: Vec<f32>,
}

impl DetailTile {
    pub fn new(seed: u32, period: u32, radius: f32) -> Self {
        let perlin = Perlin::new(seed);
        let mut values = Vec::with_capacity((period * period) as usize);
        for y in 0..period {
            for x in 0..period {
                let v = tileable_sample(&perlin, x, y, period, radius as f64);
                values.push(v.clamp(-1.0, 1.0) as f32);
            }
        }
        Self { period, values }
    }

    #[inline]
    pub fn sample(&self, x: u32, y: u32) -> f32 {
        let tx = x % self.period;
        let ty = y % self.period;
        self.values[(ty * self.period + tx) as usize]
    }

    pub fn period(&self) -> u32 {
        self.period
    }
}

/// Tiled base colour for opaque terrain pixels.
pub struct RockTexture {
    width: u32,
    height: u32,
    texels: Vec<[u8; 3]>,
}

impl RockTexture {
    /// Load from any image format the `image` crate reads.
    pub fn from_image(path: &Path) -> Result<Self> {
        let img = image::open(path)?.to_rgb8();
        let (width, height) = img.dimensions();
        let texels = img.pixels().map(|p| p.0).collect();
        Ok(Self { width, height, texels })
    }

    /// Generate a seamless grey-brown rock tile from the seed.
    pub fn procedural(seed: u32, size: u32) -> Self {
        let fbm = Fbm::<Perlin>::new(seed)
            .set_octaves(5)
            .set_persistence(0.55)
            .set_lacunarity(2.0);
        let mut texels = Vec::with_capacity((size * size) as usize);
        for y in 0..size {
            for x in 0..size {
                let n = tileable_sample(&fbm, x, y, size, 4.0);
                let t = ((n + 1.0) * 0.5).clamp(0.0, 1.0) as f32;
                let r = 96.0 + 90.0 * t;
                let g = 82.0 + 80.0 * t;
                let b = 70.0 + 64.0 * t;
                texels.push([r as u8, g as u8, b as u8]);
            }
        }
        Self { width: size, height: size, texels }
    }

    #[inline]
    pub fn sample(&self, x: u32, y: u32) -> [u8; 3] {
        let tx = x % self.width;
        let ty = y % self.height;
        self.texels[(ty * self.width + tx) as usize]
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Process-wide noise resources. Immutable after construction.
pub struct NoiseBank {
    shape: Fbm<Perlin>,
    shape_scale: f64,
    falloff_gain: f32,
    detail: DetailTile,
    rock: Option<RockTexture>,
}

impl NoiseBank {
    /// Build from config. A configured rock texture that fails to load is logged
    /// and skipped; without one configured, a procedural rock tile is generated.
    pub fn new(config: &TerrainConfig) -> Self {
        let rock = match &config.rock_texture {
            Some(path) => match RockTexture::from_image(path) {
                Ok(rock) => Some(rock),
                Err(e) => {
                    log::warn!("Rock texture {} unavailable, shading disabled: {}", path.display(), e);
                    None
                }
            },
            None => Some(RockTexture::procedural(config.seed.wrapping_add(2), 256)),
        };
        Self::with_rock(config.seed, &config.noise, rock)
    }

    /// Build with no rock texture: synthesis produces the alpha mask with a flat colour.
    pub fn without_rock(config: &TerrainConfig) -> Self {
        Self::with_rock(config.seed, &config.noise, None)
    }

    pub fn with_rock(seed: u32, params: &NoiseParams, rock: Option<RockTexture>) -> Self {
        let shape = Fbm::<Perlin>::new(seed)
            .set_octaves(params.octaves as usize)
            .set_persistence(params.persistence as f64)
            .set_lacunarity(params.lacunarity as f64);
        let detail = DetailTile::new(
            seed.wrapping_add(1),
            params.detail_period,
            params.detail_frequency,
        );
        Self {
            shape,
            shape_scale: params.shape_scale.max(f32::EPSILON) as f64,
            falloff_gain: params.falloff_gain,
            detail,
            rock,
        }
    }

    /// Shape noise at a world position, mapped to [0, 1].
    pub fn shape_at(&self, p: Vec2) -> f32 {
        let n = self.shape.get([p.x as f64 / self.shape_scale, p.y as f64 / self.shape_scale]);
        ((n + 1.0) * 0.5).clamp(0.0, 1.0) as f32
    }

    pub fn falloff_gain(&self) -> f32 {
        self.falloff_gain
    }

    /// Detail noise in [-1, 1] at an image pixel.
    #[inline]
    pub fn detail_at(&self, x: u32, y: u32) -> f32 {
        self.detail.sample(x, y)
    }

    pub fn rock(&self) -> Option<&RockTexture> {
        self.rock.as_ref()
    }
}
