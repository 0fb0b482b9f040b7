//! Blur pyramid for colour bleeding.
//!
//! The source is halved `blur_iterations` times, then the deeper levels are
//! blended back up as far as level 3. Only levels 0 (sharp, with noise),
//! 1 (slightly blurred) and 2 (blurred) are read afterwards.

use vhs_gpu_shared::uniforms::DownsampleParams;

use crate::commands::{Blit, PassParams, TextureRef};
use crate::pool::{TargetAllocator, TargetDesc, TargetHandle, TargetSlot};
use crate::resources::ShaderPass;
use crate::scope::FrameScope;
use crate::settings::VhsSettings;
use crate::sizing::{blur_amount, blur_iterations, halve, odd_scale, upsample_blend};

/// Lowest level the upsample chain writes.
const UPSAMPLE_FLOOR: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct BlurPyramid {
    pub levels: Vec<TargetHandle>,
    pub sizes: Vec<(u32, u32)>,
    pub blur_amount: f32,
}

impl BlurPyramid {
    pub fn iterations(&self) -> usize {
        self.levels.len()
    }

    pub fn level(&self, index: usize) -> TargetHandle {
        self.levels[index]
    }
}

pub fn build_pyramid<A: TargetAllocator>(
    scope: &mut FrameScope<'_, A>,
    width: u32,
    height: u32,
    format: wgpu::TextureFormat,
    settings: &VhsSettings,
    noise: Option<TargetHandle>,
) -> BlurPyramid {
    let amount = blur_amount(width, settings.color_bleed_radius);
    let iterations = blur_iterations(amount);

    let mut levels = Vec::with_capacity(iterations);
    let mut sizes = Vec::with_capacity(iterations);
    let (mut w, mut h) = (width, height);

    for i in 0..iterations {
        let scale = odd_scale(w, h);
        (w, h) = halve(w, h);
        let level = scope.acquire(TargetSlot::Pyramid(i as u8), TargetDesc::new(w, h, format));

        let (pass, source, noise_input) = match levels.last() {
            None => (
                ShaderPass::DownsampleFirst,
                TextureRef::Source,
                noise.map_or(TextureRef::Placeholder, TextureRef::Transient),
            ),
            Some(&prev) => (ShaderPass::Downsample, TextureRef::Transient(prev), TextureRef::Placeholder),
        };
        let has_noise = pass == ShaderPass::DownsampleFirst && noise.is_some();

        scope.blit(Blit {
            pass,
            target: TextureRef::Transient(level),
            inputs: vec![source, noise_input],
            params: PassParams::Downsample(DownsampleParams {
                odd_scale: scale.to_array(),
                blur_bias: settings.color_bleed_direction,
                noise_opacity: settings.stripe_noise_opacity,
                upsample_blend: 0.0,
                has_noise: has_noise as i32,
            }),
        });

        levels.push(level);
        sizes.push((w, h));
    }

    for i in (UPSAMPLE_FLOOR..iterations).rev() {
        scope.blit(Blit {
            pass: ShaderPass::Upsample,
            target: TextureRef::Transient(levels[i - 1]),
            inputs: vec![TextureRef::Transient(levels[i]), TextureRef::Placeholder],
            params: PassParams::Downsample(DownsampleParams {
                // fs_upsample samples bilinearly without odd-size correction
                odd_scale: [0.0; 4],
                blur_bias: settings.color_bleed_direction,
                noise_opacity: 0.0,
                upsample_blend: upsample_blend(i, iterations, amount),
                has_noise: 0,
            }),
        });
    }

    log::trace!("Blur pyramid: amount {amount:.3}, {iterations} levels {sizes:?}");

    BlurPyramid {
        levels,
        sizes,
        blur_amount: amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{Command, CommandStream};
    use crate::pool::{ResourcePool, RetentionPolicy};
    use crate::temporal::CameraId;
    use crate::test_support::CountingAllocator;

    const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

    fn build(width: u32, height: u32, settings: &VhsSettings, noise: bool) -> (BlurPyramid, CommandStream) {
        let mut pool = ResourcePool::new(CountingAllocator::default(), RetentionPolicy::ReleaseEachFrame);
        let mut commands = CommandStream::new();
        let pyramid = {
            let mut scope = FrameScope::new(&mut pool, &mut commands, CameraId(0));
            let noise = noise.then(|| {
                scope.acquire(TargetSlot::Noise, TargetDesc::new(8, 8, wgpu::TextureFormat::R8Unorm))
            });
            build_pyramid(&mut scope, width, height, FORMAT, settings, noise)
        };
        (pyramid, commands)
    }

    fn downsample_params(blit: &Blit) -> DownsampleParams {
        match blit.params {
            PassParams::Downsample(p) => p,
            _ => panic!("expected downsample params"),
        }
    }

    #[test]
    fn test_1024x576_builds_seven_levels() {
        let (pyramid, commands) = build(1024, 576, &VhsSettings::default(), false);
        assert_eq!(pyramid.iterations(), 7);
        assert_eq!(
            pyramid.sizes,
            vec![(512, 288), (256, 144), (128, 72), (64, 36), (32, 18), (16, 9), (8, 4)]
        );
        assert_eq!(commands.blits_of(ShaderPass::DownsampleFirst).count(), 1);
        assert_eq!(commands.blits_of(ShaderPass::Downsample).count(), 6);
        // levels 6..=3 blend into 5..=2
        assert_eq!(commands.blits_of(ShaderPass::Upsample).count(), 4);
    }

    #[test]
    fn test_levels_use_source_format() {
        let (_, commands) = build(640, 480, &VhsSettings::default(), false);
        for c in commands.commands() {
            if let Command::Acquire { handle, desc } = c {
                if matches!(handle.slot, TargetSlot::Pyramid(_)) {
                    assert_eq!(desc.format, FORMAT);
                }
            }
        }
    }

    #[test]
    fn test_odd_scale_uses_pre_halving_size() {
        // 1024x576 -> level 5 halves 32x18, level 6 halves 16x9 (odd height)
        let (_, commands) = build(1024, 576, &VhsSettings::default(), false);
        let downs: Vec<&Blit> = commands
            .blits()
            .filter(|b| matches!(b.pass, ShaderPass::DownsampleFirst | ShaderPass::Downsample))
            .collect();
        let last = downsample_params(downs[6]);
        assert_eq!(last.odd_scale, [1.0, 0.75, 1.0 / 16.0, 0.125]);
        let first = downsample_params(downs[0]);
        assert_eq!(first.odd_scale, [1.0, 1.0, 1.0 / 1024.0, 1.0 / 576.0]);
    }

    #[test]
    fn test_upsample_order_and_weights() {
        // 1280 * 0.5 * 0.25 = 160 -> log2 = 7.32..
        let settings = VhsSettings::default();
        let (pyramid, commands) = build(1280, 720, &settings, false);
        assert_eq!(pyramid.iterations(), 7);
        let frac = pyramid.blur_amount - 7.0;
        assert!(frac > 0.0 && frac < 1.0);

        let ups: Vec<&Blit> = commands.blits_of(ShaderPass::Upsample).collect();
        assert_eq!(ups.len(), 4);
        assert_eq!(ups[0].inputs[0], TextureRef::Transient(pyramid.level(6)));
        assert_eq!(ups[0].target, TextureRef::Transient(pyramid.level(5)));
        assert!((downsample_params(ups[0]).upsample_blend - 0.7 * frac).abs() < 1e-6);
        for up in &ups[1..] {
            assert_eq!(downsample_params(up).upsample_blend, 0.7);
        }
        for up in &ups {
            assert_eq!(downsample_params(up).odd_scale, [0.0; 4]);
        }
        assert_eq!(ups[3].target, TextureRef::Transient(pyramid.level(2)));
    }

    #[test]
    fn test_minimum_depth_has_no_upsample() {
        let settings = VhsSettings {
            color_bleed_radius: 0.0,
            ..VhsSettings::default()
        };
        let (pyramid, commands) = build(1920, 1080, &settings, false);
        assert_eq!(pyramid.iterations(), 3);
        assert_eq!(commands.blits_of(ShaderPass::Upsample).count(), 0);
    }

    #[test]
    fn test_noise_feeds_only_level_zero() {
        let (pyramid, commands) = build(800, 600, &VhsSettings::default(), true);
        let first = commands.blits_of(ShaderPass::DownsampleFirst).next().unwrap();
        assert_eq!(first.inputs[0], TextureRef::Source);
        assert!(matches!(first.inputs[1], TextureRef::Transient(h) if h.slot == TargetSlot::Noise));
        assert_eq!(downsample_params(first).has_noise, 1);
        for blit in commands.blits_of(ShaderPass::Downsample) {
            assert_eq!(blit.inputs[1], TextureRef::Placeholder);
            assert_eq!(downsample_params(blit).has_noise, 0);
        }
        assert_eq!(first.target, TextureRef::Transient(pyramid.level(0)));
    }

    #[test]
    fn test_direction_is_blur_bias() {
        let settings = VhsSettings {
            color_bleed_direction: -0.4,
            ..VhsSettings::default()
        };
        let (_, commands) = build(800, 600, &settings, false);
        for blit in commands.blits() {
            assert_eq!(downsample_params(blit).blur_bias, -0.4);
        }
    }
}
