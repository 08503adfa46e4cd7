//! CPU-side pixel storage for a loaded island.

use bytemuck::{Pod, Zeroable};

use crate::math::PixelRect;

/// 8-bit RGBA pixel, layout-compatible with `Rgba8UnormSrgb` textures.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const TRANSPARENT: Self = Self { r: 0, g: 0, b: 0, a: 0 };

    pub fn opaque(rgb: [u8; 3]) -> Self {
        Self { r: rgb[0], g: rgb[1], b: rgb[2], a: 255 }
    }

    pub fn is_opaque(&self) -> bool {
        self.a != 0
    }
}

/// Row-major island image, one pixel per world unit.
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Rgba8>,
}

impl PixelBuffer {
    /// Fully transparent buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgba8::TRANSPARENT; (width * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Rgba8 {
        self.pixels[(y * self.width + x) as usize]
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, pixel: Rgba8) {
        let i = (y * self.width + x) as usize;
        self.pixels[i] = pixel;
    }

    /// Tightly packed copy of `rect` (clamped to the buffer).
    pub fn copy_region(&self, rect: PixelRect) -> Vec<Rgba8> {
        let rect = rect.clamped(self.width, self.height);
        let mut out = Vec::with_capacity((rect.width() * rect.height()) as usize);
        for y in rect.y0..rect.y1 {
            let row = (y * self.width) as usize;
            out.extend_from_slice(&self.pixels[row + rect.x0 as usize..row + rect.x1 as usize]);
        }
        out
    }

    pub fn pixels(&self) -> &[Rgba8] {
        &self.pixels
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    pub fn opaque_count(&self) -> usize {
        self.pixels.iter().filter(|p| p.is_opaque()).count()
    }
}
