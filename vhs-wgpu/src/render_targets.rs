//! Transient targets behind the pool, the 1x1 placeholder and asset uploads.

use std::sync::Arc;

use vhs_render::{TargetAllocator, TargetDesc};

/// Format the static noise and grain textures are uploaded in.
pub const ASSET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// A pooled colour target.
pub struct PooledTarget {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub width: u32,
    pub height: u32,
}

/// Create a colour target that can be rendered to and sampled.
pub fn create_render_target(
    device: &wgpu::Device,
    width: u32,
    height: u32,
    label: &str,
    format: wgpu::TextureFormat,
) -> PooledTarget {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT
            | wgpu::TextureUsages::TEXTURE_BINDING
            | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

    PooledTarget {
        texture,
        view,
        width,
        height,
    }
}

/// Pool allocator creating real textures on the device.
///
/// Freed targets are dropped rather than destroyed: a frame recorded into an
/// encoder that has not been submitted yet may still reference them.
pub struct WgpuTargetAllocator {
    device: Arc<wgpu::Device>,
}

impl WgpuTargetAllocator {
    pub fn new(device: Arc<wgpu::Device>) -> Self {
        Self { device }
    }
}

impl TargetAllocator for WgpuTargetAllocator {
    type Target = PooledTarget;

    fn allocate(&mut self, label: &str, desc: &TargetDesc) -> PooledTarget {
        create_render_target(&self.device, desc.width, desc.height, label, desc.format)
    }

    fn free(&mut self, target: PooledTarget) {
        log::trace!("Dropping {}x{} target", target.width, target.height);
    }
}

/// Create the 1x1 black texture bound in place of disabled inputs.
pub fn create_placeholder_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> (wgpu::Texture, wgpu::TextureView) {
    upload_rgba8(device, queue, "VHS Placeholder 1x1 Black", 1, 1, &[0u8, 0, 0, 255])
}

/// Upload tightly packed RGBA8 pixels as a sampled texture.
pub fn upload_rgba8(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    width: u32,
    height: u32,
    pixels: &[u8],
) -> (wgpu::Texture, wgpu::TextureView) {
    let size = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };

    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: ASSET_FORMAT,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    queue.write_texture(
        wgpu::ImageCopyTexture {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        pixels,
        wgpu::ImageDataLayout {
            offset: 0,
            bytes_per_row: Some(4 * width),
            rows_per_image: Some(height),
        },
        size,
    );

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}
