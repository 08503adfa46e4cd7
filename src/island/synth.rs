//! Pixel synthesis from the cell grid.
//!
//! Density comes from bilinearly interpolated cell occupancy plus a little
//! tileable detail noise; thresholding it gives a hard alpha mask with organic
//! edges. Opaque pixels are shaded by how crowded their row neighbourhood is.

use super::grid::CellGrid;
use super::pixels::{PixelBuffer, Rgba8};
use crate::generation::config::TerrainConfig;
use crate::generation::noise_bank::NoiseBank;
use crate::math::PixelRect;

/// Maximum brightening or darkening applied by edge shading.
pub const SHADING_RANGE: f32 = 0.3;

/// Per-terrain synthesis settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SynthParams {
    pub cell_size: f32,
    pub detail_amplitude: f32,
    pub shading_radius: u32,
    pub fallback_color: [u8; 3],
}

impl SynthParams {
    pub fn from_config(config: &TerrainConfig) -> Self {
        Self {
            cell_size: config.cell_size as f32,
            detail_amplitude: config.detail_amplitude,
            shading_radius: config.shading_radius,
            fallback_color: config.fallback_color,
        }
    }
}

/// Whether image pixel (x, y) is solid.
#[inline]
fn is_opaque(grid: &CellGrid, noise: &NoiseBank, params: &SynthParams, x: u32, y: u32) -> bool {
    let fx = (x as f32 + 0.5) / params.cell_size - 0.5;
    let fy = (y as f32 + 0.5) / params.cell_size - 0.5;
    let ix = fx.floor();
    let iy = fy.floor();
    let tx = fx - ix;
    let ty = fy - iy;
    let (ix, iy) = (ix as i32, iy as i32);

    let sample = |cx: i32, cy: i32| if grid.active_clamped(cx, cy) { 1.0 } else { 0.0 };
    let top = sample(ix, iy) * (1.0 - tx) + sample(ix + 1, iy) * tx;
    let bottom = sample(ix, iy + 1) * (1.0 - tx) + sample(ix + 1, iy + 1) * tx;
    let density = top * (1.0 - ty) + bottom * ty;

    density + noise.detail_at(x, y) * params.detail_amplitude > 0.5
}

/// Shading factor from the opaque/empty balance of `row[centre - r ..= centre + r]`,
/// excluding the centre. Out-of-image neighbours count as empty.
fn shading_factor(row: &[bool], row_start: i64, x: u32, radius: u32, width: u32) -> f32 {
    if radius == 0 {
        return 1.0;
    }
    let mut balance = 0i32;
    for nx in x as i64 - radius as i64..=x as i64 + radius as i64 {
        if nx == x as i64 {
            continue;
        }
        let opaque = nx >= 0 && nx < width as i64 && row[(nx - row_start) as usize];
        balance += if opaque { 1 } else { -1 };
    }
    let normalized = balance as f32 / (2 * radius) as f32;
    (1.0 + normalized * SHADING_RANGE).clamp(1.0 - SHADING_RANGE, 1.0 + SHADING_RANGE)
}

/// Synthesize `rect` of `buffer` from `grid`.
///
/// Returns the rect actually written (clamped to the image).
pub fn synthesize(
    grid: &CellGrid,
    buffer: &mut PixelBuffer,
    noise: &NoiseBank,
    params: &SynthParams,
    rect: PixelRect,
) -> PixelRect {
    let (width, height) = (buffer.width(), buffer.height());
    let rect = rect.clamped(width, height);
    if rect.is_empty() {
        return rect;
    }

    let radius = params.shading_radius;
    let row_start = rect.x0.saturating_sub(radius);
    let row_end = (rect.x1 + radius).min(width);
    let mut row = vec![false; (row_end - row_start) as usize];

    for y in rect.y0..rect.y1 {
        for (i, x) in (row_start..row_end).enumerate() {
            row[i] = is_opaque(grid, noise, params, x, y);
        }

        for x in rect.x0..rect.x1 {
            if !row[(x - row_start) as usize] {
                buffer.set(x, y, Rgba8::TRANSPARENT);
                continue;
            }
            let pixel = match noise.rock() {
                Some(rock) => {
                    let factor = shading_factor(&row, row_start as i64, x, radius, width);
                    let base = rock.sample(x, y);
                    let shade = |c: u8| (c as f32 * factor).round().clamp(0.0, 255.0) as u8;
                    Rgba8::opaque([shade(base[0]), shade(base[1]), shade(base[2])])
                }
                None => Rgba8::opaque(params.fallback_color),
            };
            buffer.set(x, y, pixel);
        }
    }
    rect
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::noise_bank::RockTexture;
    use crate::generation::config::NoiseParams;

    fn params() -> SynthParams {
        SynthParams {
            cell_size: 8.0,
            detail_amplitude: 0.2,
            shading_radius: 4,
            fallback_color: [1, 2, 3],
        }
    }

    #[test]
    fn test_solid_grid_is_opaque_empty_grid_is_clear() {
        let noise = NoiseBank::with_rock(1, &NoiseParams::default(), None);
        let mut buffer = PixelBuffer::new(32, 32);

        synthesize(&CellGrid::filled(4, 4, 1.0), &mut buffer, &noise, &params(), PixelRect::new(0, 0, 32, 32));
        assert_eq!(buffer.opaque_count(), 32 * 32);
        assert_eq!(buffer.get(5, 5), Rgba8::opaque([1, 2, 3]));

        synthesize(&CellGrid::empty(4, 4), &mut buffer, &noise, &params(), PixelRect::new(0, 0, 32, 32));
        assert_eq!(buffer.opaque_count(), 0);
    }

    #[test]
    fn test_only_rect_is_written() {
        let noise = NoiseBank::with_rock(1, &NoiseParams::default(), None);
        let mut buffer = PixelBuffer::new(32, 32);
        let written = synthesize(
            &CellGrid::filled(4, 4, 1.0),
            &mut buffer,
            &noise,
            &params(),
            PixelRect::new(8, 8, 100, 16),
        );
        assert_eq!(written, PixelRect::new(8, 8, 32, 16));
        assert_eq!(buffer.opaque_count(), 24 * 8);
        assert!(!buffer.get(0, 0).is_opaque());
    }

    #[test]
    fn test_shading_stays_within_range() {
        let rock = RockTexture::procedural(5, 16);
        let noise = NoiseBank::with_rock(1, &NoiseParams::default(), Some(rock));
        let mut grid = CellGrid::filled(4, 4, 1.0);
        for y in 0..4 {
            grid.get_mut(3, y).unwrap().active = false;
        }
        let mut buffer = PixelBuffer::new(32, 32);
        synthesize(&grid, &mut buffer, &noise, &params(), PixelRect::new(0, 0, 32, 32));

        let rock = noise.rock().unwrap();
        for y in 0..32 {
            for x in 0..32 {
                let p = buffer.get(x, y);
                if !p.is_opaque() {
                    continue;
                }
                let base = rock.sample(x, y)[0] as f32;
                let r = p.r as f32;
                assert!(r >= (base * 0.7).floor() - 1.0 && r <= (base * 1.3).ceil() + 1.0);
            }
        }
    }

    #[test]
    fn test_shading_factor_balance() {
        let full = vec![true; 9];
        assert!((shading_factor(&full, 0, 4, 4, 9) - 1.3).abs() < 1e-6);
        let empty_neighbours = vec![false, false, false, false, true, false, false, false, false];
        assert!((shading_factor(&empty_neighbours, 0, 4, 4, 9) - 0.7).abs() < 1e-6);
        assert_eq!(shading_factor(&full, 0, 4, 0, 9), 1.0);
    }
}
