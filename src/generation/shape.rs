//! Occupancy generation for freshly placed islands.

use super::noise_bank::NoiseBank;
use crate::core::types::Vec2;
use crate::island::grid::{Cell, CellGrid};
use crate::math::Quad;

/// Cell-grid shape an island is initialized with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IslandShape {
    /// Shape noise times a radial falloff, thresholded at 0.5
    #[default]
    Procedural,
    /// Every cell active
    Solid,
}

/// Radial falloff: 1 at the centre, 0 at (and beyond) the inscribed ellipse.
fn radial_falloff(cell_center: Vec2, bounds: &Quad) -> f32 {
    let half = bounds.size() * 0.5;
    let d = (cell_center - bounds.center()) / half.max(Vec2::splat(f32::EPSILON));
    (1.0 - d.length_squared()).max(0.0)
}

/// Generate the occupancy grid for an island covering `bounds` (world space).
///
/// Pure function of the noise bank and the island geometry, so the same seed
/// always yields the same grid.
pub fn generate_cells(
    noise: &NoiseBank,
    shape: IslandShape,
    bounds: &Quad,
    grid_width: u32,
    grid_height: u32,
    cell_size: f32,
    health: f32,
) -> CellGrid {
    if shape == IslandShape::Solid {
        return CellGrid::filled(grid_width, grid_height, health);
    }

    let mut grid = CellGrid::empty(grid_width, grid_height);
    let gain = noise.falloff_gain();
    for y in 0..grid_height {
        for x in 0..grid_width {
            let center = bounds.min + (Vec2::new(x as f32, y as f32) + 0.5) * cell_size;
            let density = noise.shape_at(center) * radial_falloff(center, bounds) * gain;
            if density > 0.5 {
                if let Some(cell) = grid.get_mut(x, y) {
                    *cell = Cell::solid(health);
                }
            }
        }
    }
    grid
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::config::TerrainConfig;

    fn bounds() -> Quad {
        Quad::from_coords(256.0, 512.0, 256.0 + 64.0 * 8.0, 512.0 + 48.0 * 8.0)
    }

    #[test]
    fn test_generation_is_deterministic() {
        let noise = NoiseBank::without_rock(&TerrainConfig::default());
        let a = generate_cells(&noise, IslandShape::Procedural, &bounds(), 64, 48, 8.0, 10.0);
        let b = generate_cells(&noise, IslandShape::Procedural, &bounds(), 64, 48, 8.0, 10.0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_edges_are_empty() {
        let noise = NoiseBank::without_rock(&TerrainConfig::default());
        let grid = generate_cells(&noise, IslandShape::Procedural, &bounds(), 64, 48, 8.0, 10.0);

        for x in 0..64 {
            assert!(!grid.get(x, 0).unwrap().active);
            assert!(!grid.get(x, 47).unwrap().active);
        }
        for cell in grid.iter().filter(|c| c.active) {
            assert_eq!(cell.health, 10.0);
        }
    }

    #[test]
    fn test_solid_shape() {
        let noise = NoiseBank::without_rock(&TerrainConfig::default());
        let grid = generate_cells(&noise, IslandShape::Solid, &bounds(), 10, 10, 16.0, 5.0);
        assert_eq!(grid.active_count(), 100);
    }

    #[test]
    fn test_falloff_peaks_in_center() {
        let b = bounds();
        assert!((radial_falloff(b.center(), &b) - 1.0).abs() < 1e-6);
        assert_eq!(radial_falloff(b.min, &b), 0.0);
    }
}
