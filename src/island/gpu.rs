//! wgpu-backed island textures.

use std::any::Any;
use std::sync::Arc;

use super::pixels::Rgba8;
use super::texture::{IslandTexture, TextureBackend};
use crate::core::{Error, Result};
use crate::math::PixelRect;

/// Island texture living on the GPU.
pub struct WgpuTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    queue: Arc<wgpu::Queue>,
    width: u32,
    height: u32,
}

impl WgpuTexture {
    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }
}

impl IslandTexture for WgpuTexture {
    fn write_region(&mut self, rect: PixelRect, pixels: &[Rgba8]) {
        let rect = rect.clamped(self.width, self.height);
        if rect.is_empty() {
            return;
        }
        if pixels.len() < (rect.width() * rect.height()) as usize {
            log::warn!("Short upload for {:?}: {} pixels", rect, pixels.len());
            return;
        }
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d {
                    x: rect.x0,
                    y: rect.y0,
                    z: 0,
                },
                aspect: wgpu::TextureAspect::All,
            },
            bytemuck::cast_slice(pixels),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(rect.width() * 4),
                rows_per_image: Some(rect.height()),
            },
            wgpu::Extent3d {
                width: rect.width(),
                height: rect.height(),
                depth_or_array_layers: 1,
            },
        );
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Creates `Rgba8UnormSrgb` island textures on a wgpu device.
pub struct WgpuTextureBackend {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
}

impl WgpuTextureBackend {
    pub fn new(device: Arc<wgpu::Device>, queue: Arc<wgpu::Queue>) -> Self {
        Self { device, queue }
    }

    /// Open a device with no surface, for offline tools and tests.
    pub fn headless() -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            force_fallback_adapter: false,
            compatible_surface: None,
        }))
        .map_err(|e| Error::Gpu(format!("No suitable adapter found: {:?}", e)))?;

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("atoll_device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::downlevel_defaults(),
            memory_hints: wgpu::MemoryHints::default(),
            experimental_features: Default::default(),
            trace: Default::default(),
        }))
        .map_err(|e| Error::Gpu(e.to_string()))?;

        log::info!("Headless GPU: {}", adapter.get_info().name);
        Ok(Self::new(Arc::new(device), Arc::new(queue)))
    }
}

impl TextureBackend for WgpuTextureBackend {
    fn create_texture(&self, width: u32, height: u32) -> Box<dyn IslandTexture> {
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("island_texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Box::new(WgpuTexture {
            texture,
            view,
            queue: Arc::clone(&self.queue),
            width,
            height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_upload() {
        // Machines without any adapter have nothing to test
        let Ok(backend) = WgpuTextureBackend::headless() else {
            return;
        };
        let mut texture = backend.create_texture(64, 32);
        assert_eq!(texture.size(), (64, 32));

        let pixels = vec![Rgba8::opaque([10, 20, 30]); 16 * 8];
        texture.write_region(PixelRect::new(8, 8, 24, 16), &pixels);

        let gpu = texture.as_any().downcast_ref::<WgpuTexture>().unwrap();
        assert_eq!(gpu.texture().width(), 64);
        assert_eq!(gpu.texture().format(), wgpu::TextureFormat::Rgba8UnormSrgb);
    }
}
