//! Noise buffer generation.

use rand::Rng;
use vhs_gpu_shared::uniforms::NoiseGenParams;

use crate::commands::{Blit, PassParams, TextureRef};
use crate::config::NoiseMode;
use crate::pool::{TargetAllocator, TargetDesc, TargetHandle, TargetSlot};
use crate::resources::{AssetCatalog, AssetKind, ShaderPass};
use crate::scope::FrameScope;
use crate::settings::VhsSettings;
use crate::sizing::screen_space_size;
use crate::smear::smear_params;

pub const NOISE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::R8Unorm;

/// `(offset, attenuation)` of the streak passes in `NoiseMode::Streaked`.
pub const STREAK_PASSES: [(f32, f32); 2] = [(1.0, 0.2), (5.0, 0.8)];

pub fn noise_gen_params(
    width: u32,
    height: u32,
    texture: (u32, u32),
    density: f32,
    scroll_pos: f32,
    jitter: [f32; 2],
) -> NoiseGenParams {
    NoiseGenParams {
        stripe_scale_offset: [
            width as f32 / texture.0 as f32,
            height as f32 / texture.1 as f32,
            jitter[0],
            jitter[1],
        ],
        horizontal_noise_pos: scroll_pos,
        horizontal_noise_power: density * density,
        _pad1: 0.0,
        _pad2: 0.0,
    }
}

/// Record the noise passes. Draws two jitter values from `rng`.
/// Callers gate on [`VhsSettings::noise_enabled`].
pub fn record_noise<A: TargetAllocator, R: Rng + ?Sized>(
    scope: &mut FrameScope<'_, A>,
    frame_width: u32,
    frame_height: u32,
    settings: &VhsSettings,
    scroll_pos: f32,
    mode: NoiseMode,
    assets: &AssetCatalog,
    rng: &mut R,
) -> TargetHandle {
    let (nw, nh) = screen_space_size(frame_width, frame_height);
    let desc = TargetDesc::new(nw, nh, NOISE_FORMAT);
    let noise = scope.acquire(TargetSlot::Noise, desc);

    let pattern = match mode {
        NoiseMode::Stripe => AssetKind::StripeNoise,
        NoiseMode::Streaked => AssetKind::SpeckNoise,
    };
    let info = assets.info(pattern);
    let jitter = [rng.gen::<f32>(), rng.gen::<f32>()];

    scope.blit(Blit {
        pass: ShaderPass::NoiseGen,
        target: TextureRef::Transient(noise),
        inputs: vec![
            TextureRef::Asset(AssetKind::HorizontalNoise),
            TextureRef::Asset(pattern),
        ],
        params: PassParams::NoiseGen(noise_gen_params(
            nw,
            nh,
            (info.width, info.height),
            settings.stripe_noise_density,
            scroll_pos,
            jitter,
        )),
    });

    if mode == NoiseMode::Streaked {
        let streak = scope.acquire(TargetSlot::NoiseStreak, desc);
        let [(o0, a0), (o1, a1)] = STREAK_PASSES;
        scope.blit(Blit {
            pass: ShaderPass::Smear,
            target: TextureRef::Transient(streak),
            inputs: vec![TextureRef::Transient(noise)],
            params: PassParams::Smear(smear_params(nw, nh, o0, a0)),
        });
        scope.blit(Blit {
            pass: ShaderPass::Smear,
            target: TextureRef::Transient(noise),
            inputs: vec![TextureRef::Transient(streak)],
            params: PassParams::Smear(smear_params(nw, nh, o1, a1)),
        });
    }

    noise
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noise_gen_params() {
        let p = noise_gen_params(640, 360, (256, 128), 0.5, 0.3, [0.1, 0.9]);
        assert_eq!(p.stripe_scale_offset, [2.5, 2.8125, 0.1, 0.9]);
        assert_eq!(p.horizontal_noise_power, 0.25);
        assert_eq!(p.horizontal_noise_pos, 0.3);
    }
}
