//! Texture seam between island pixel buffers and the renderer.
//!
//! Islands only ever touch textures from the main thread; backends therefore
//! need `Send` (so the owning island can be shared) but not interior locking.

use std::any::Any;

use super::pixels::Rgba8;
use crate::math::PixelRect;

/// A texture holding one island's streamed image.
pub trait IslandTexture: Send {
    /// Upload a tightly packed `rect.width() * rect.height()` block.
    fn write_region(&mut self, rect: PixelRect, pixels: &[Rgba8]);

    fn size(&self) -> (u32, u32);

    /// Downcast hook for renderers that know their backend.
    fn as_any(&self) -> &dyn Any;
}

/// Creates island textures.
pub trait TextureBackend: Send + Sync {
    fn create_texture(&self, width: u32, height: u32) -> Box<dyn IslandTexture>;
}

/// CPU mirror texture, used for headless runs, tests and snapshot export.
pub struct CpuTexture {
    width: u32,
    height: u32,
    pixels: Vec<Rgba8>,
    uploads: usize,
}

impl CpuTexture {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgba8::TRANSPARENT; (width * height) as usize],
            uploads: 0,
        }
    }

    pub fn get(&self, x: u32, y: u32) -> Rgba8 {
        self.pixels[(y * self.width + x) as usize]
    }

    pub fn pixels(&self) -> &[Rgba8] {
        &self.pixels
    }

    /// Number of `write_region` calls received.
    pub fn uploads(&self) -> usize {
        self.uploads
    }
}

impl IslandTexture for CpuTexture {
    fn write_region(&mut self, rect: PixelRect, pixels: &[Rgba8]) {
        let rect = rect.clamped(self.width, self.height);
        let w = rect.width() as usize;
        if w == 0 {
            return;
        }
        for (row, src) in (rect.y0..rect.y1).zip(pixels.chunks_exact(w)) {
            let start = (row * self.width + rect.x0) as usize;
            self.pixels[start..start + w].copy_from_slice(src);
        }
        self.uploads += 1;
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Backend producing [`CpuTexture`]s.
#[derive(Clone, Copy, Debug, Default)]
pub struct CpuTextureBackend;

impl TextureBackend for CpuTextureBackend {
    fn create_texture(&self, width: u32, height: u32) -> Box<dyn IslandTexture> {
        Box::new(CpuTexture::new(width, height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_region() {
        let mut tex = CpuTexture::new(4, 4);
        let block = vec![Rgba8::opaque([10, 20, 30]); 4];
        tex.write_region(PixelRect::new(2, 2, 4, 4), &block);

        assert_eq!(tex.get(3, 3), Rgba8::opaque([10, 20, 30]));
        assert_eq!(tex.get(1, 1), Rgba8::TRANSPARENT);
        assert_eq!(tex.uploads(), 1);
    }

    #[test]
    fn test_backend_downcast() {
        let tex = CpuTextureBackend.create_texture(8, 2);
        assert_eq!(tex.size(), (8, 2));
        assert!(tex.as_any().downcast_ref::<CpuTexture>().is_some());
    }
}
