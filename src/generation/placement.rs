//! Island placement patterns over the field.

use super::config::TerrainConfig;
use super::shape::IslandShape;
use crate::core::types::Vec2;
use crate::math::Quad;

/// Where and how large one island is.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IslandSpec {
    /// Top-left corner in world space
    pub origin: Vec2,
    pub grid_width: u32,
    pub grid_height: u32,
    pub shape: IslandShape,
}

impl IslandSpec {
    pub fn new(origin: Vec2, grid_width: u32, grid_height: u32) -> Self {
        Self {
            origin,
            grid_width,
            grid_height,
            shape: IslandShape::Procedural,
        }
    }

    pub fn solid(origin: Vec2, grid_width: u32, grid_height: u32) -> Self {
        Self {
            shape: IslandShape::Solid,
            ..Self::new(origin, grid_width, grid_height)
        }
    }

    /// World-space bounds for a given cell size
    pub fn bounds(&self, cell_size: u32) -> Quad {
        let size = Vec2::new(
            (self.grid_width * cell_size) as f32,
            (self.grid_height * cell_size) as f32,
        );
        Quad::from_origin_size(self.origin, size)
    }
}

/// Integer hash producing a value in [0, 1].
fn hash_2d(ix: i32, iz: i32, seed: u32) -> f32 {
    let mut h = (ix as u32).wrapping_mul(374761393)
        .wrapping_add((iz as u32).wrapping_mul(668265263))
        .wrapping_add(seed.wrapping_mul(1274126177));
    h = (h ^ (h >> 13)).wrapping_mul(1103515245);
    h = h ^ (h >> 16);
    (h & 0x7FFFFFFF) as f32 / 0x7FFFFFFF_u32 as f32
}

/// One island per slot of an `islands_per_axis` square grid, with seeded size and
/// jitter. Every island stays inside its slot, so islands never overlap and never
/// straddle the field edge.
pub fn grid_placement(config: &TerrainConfig) -> Vec<IslandSpec> {
    let n = config.islands_per_axis;
    let slot = config.field_size / n as f32;
    let span = (config.island_cells_max - config.island_cells_min) as f32;
    let mut specs = Vec::with_capacity((n * n) as usize);

    for sy in 0..n {
        for sx in 0..n {
            let (ix, iy) = (sx as i32, sy as i32);
            let w = config.island_cells_min + (hash_2d(ix, iy, config.seed) * span).round() as u32;
            let h = config.island_cells_min
                + (hash_2d(ix, iy, config.seed.wrapping_add(17)) * span).round() as u32;

            let size = Vec2::new((w * config.cell_size) as f32, (h * config.cell_size) as f32);
            let slack = (Vec2::splat(slot) - size).max(Vec2::ZERO);
            let jitter = Vec2::new(
                hash_2d(ix, iy, config.seed.wrapping_add(31)),
                hash_2d(ix, iy, config.seed.wrapping_add(47)),
            );
            // Floor keeps the island inside its slot after rounding
            let origin = (Vec2::new(sx as f32, sy as f32) * slot + slack * jitter).floor();

            specs.push(IslandSpec::new(origin, w, h));
        }
    }
    specs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_placement_fits_field() {
        let config = TerrainConfig::default();
        let specs = grid_placement(&config);
        assert_eq!(specs.len(), 36);

        let field = Quad::new(Vec2::ZERO, Vec2::splat(config.field_size));
        for spec in &specs {
            let b = spec.bounds(config.cell_size);
            assert!(b.min.x >= 0.0 && b.min.y >= 0.0);
            assert!(b.max.x <= field.max.x && b.max.y <= field.max.y);
            assert!(spec.grid_width >= config.island_cells_min);
            assert!(spec.grid_width <= config.island_cells_max);
        }
    }

    #[test]
    fn test_grid_placement_no_overlap() {
        let config = TerrainConfig::default();
        let specs = grid_placement(&config);
        for (i, a) in specs.iter().enumerate() {
            for b in &specs[i + 1..] {
                assert!(!a.bounds(config.cell_size).intersects(&b.bounds(config.cell_size)));
            }
        }
    }

    #[test]
    fn test_placement_depends_on_seed() {
        let a = grid_placement(&TerrainConfig { seed: 1, ..Default::default() });
        let b = grid_placement(&TerrainConfig { seed: 2, ..Default::default() });
        let a2 = grid_placement(&TerrainConfig { seed: 1, ..Default::default() });
        assert_ne!(a, b);
        assert_eq!(a, a2);
    }
}
