//! Copy a rendered RGBA8 texture back to the CPU.

use std::sync::mpsc;

use anyhow::{anyhow, ensure, Context, Result};
use image::RgbaImage;

const BYTES_PER_PIXEL: u32 = 4;

/// Row pitch rounded up to the copy alignment.
fn padded_bytes_per_row(width: u32) -> u32 {
    let unpadded = width * BYTES_PER_PIXEL;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unpadded.div_ceil(align) * align
}

fn strip_row_padding(mapped: &[u8], unpadded: u32, padded: u32, height: u32) -> Result<Vec<u8>> {
    let required = padded as usize * height as usize;
    ensure!(
        mapped.len() >= required,
        "mapped buffer too small: expected at least {required} bytes, got {}",
        mapped.len()
    );

    let mut tight = vec![0u8; unpadded as usize * height as usize];
    for row in 0..height as usize {
        let src = row * padded as usize;
        let dst = row * unpadded as usize;
        tight[dst..dst + unpadded as usize].copy_from_slice(&mapped[src..src + unpadded as usize]);
    }
    Ok(tight)
}

/// Read an `Rgba8Unorm` texture with `COPY_SRC` usage into an image.
pub fn read_rgba8(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
    width: u32,
    height: u32,
) -> Result<RgbaImage> {
    ensure!(width > 0 && height > 0, "readback size must be positive");
    ensure!(
        texture.format() == wgpu::TextureFormat::Rgba8Unorm,
        "readback expects Rgba8Unorm, got {:?}",
        texture.format()
    );

    let padded = padded_bytes_per_row(width);
    let staging = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("VHS Readback Staging"),
        size: padded as u64 * height as u64,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("VHS Readback"),
    });
    encoder.copy_texture_to_buffer(
        wgpu::ImageCopyTexture {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::ImageCopyBuffer {
            buffer: &staging,
            layout: wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(padded),
                rows_per_image: Some(height),
            },
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
    queue.submit(Some(encoder.finish()));

    let slice = staging.slice(..);
    let (sender, receiver) = mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = sender.send(result);
    });
    device.poll(wgpu::Maintain::Wait);

    receiver
        .recv()
        .map_err(|_| anyhow!("map_async callback channel dropped"))?
        .context("GPU buffer mapping failed")?;

    let mapped = slice.get_mapped_range();
    let tight = strip_row_padding(&mapped, width * BYTES_PER_PIXEL, padded, height)?;
    drop(mapped);
    staging.unmap();

    RgbaImage::from_raw(width, height, tight).ok_or_else(|| anyhow!("readback size mismatch"))
}
