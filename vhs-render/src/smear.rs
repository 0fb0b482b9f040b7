//! Directional smear over pyramid level 1.

use vhs_gpu_shared::uniforms::SmearParams;

use crate::commands::{Blit, PassParams, TextureRef};
use crate::pool::{TargetAllocator, TargetDesc, TargetHandle, TargetSlot};
use crate::resources::ShaderPass;
use crate::scope::FrameScope;
use crate::sizing::screen_space_size;

pub const SMEAR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// `(offset, attenuation)` of the two trailing-smear passes.
pub const SMEAR_PASSES: [(f32, f32); 2] = [(1.0, 0.3), (5.0, 1.2)];

pub fn smear_params(width: u32, height: u32, offset: f32, attenuation: f32) -> SmearParams {
    let (w, h) = (width as f32, height as f32);
    SmearParams {
        texel_size: [1.0 / w, 1.0 / h, w, h],
        offset_attenuation: [offset, attenuation, 0.0, 0.0],
    }
}

/// Smear `level1` into two ping-ponged buffers; returns the final one.
pub fn record_smear<A: TargetAllocator>(
    scope: &mut FrameScope<'_, A>,
    frame_width: u32,
    frame_height: u32,
    level1: TargetHandle,
) -> TargetHandle {
    let (sw, sh) = screen_space_size(frame_width, frame_height);
    let desc = TargetDesc::new(sw, sh, SMEAR_FORMAT);
    let first = scope.acquire(TargetSlot::Smear, desc);
    let second = scope.acquire(TargetSlot::Smear2, desc);

    let [(o0, a0), (o1, a1)] = SMEAR_PASSES;
    scope.blit(Blit {
        pass: ShaderPass::Smear,
        target: TextureRef::Transient(first),
        inputs: vec![TextureRef::Transient(level1)],
        params: PassParams::Smear(smear_params(sw, sh, o0, a0)),
    });
    scope.blit(Blit {
        pass: ShaderPass::Smear,
        target: TextureRef::Transient(second),
        inputs: vec![TextureRef::Transient(first)],
        params: PassParams::Smear(smear_params(sw, sh, o1, a1)),
    });
    second
}
