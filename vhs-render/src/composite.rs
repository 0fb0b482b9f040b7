//! Final composite into the destination.

use vhs_gpu_shared::uniforms::CompositeParams;

use crate::commands::{Blit, PassParams, TextureRef};
use crate::config::EdgePolarity;
use crate::pool::{TargetAllocator, TargetHandle};
use crate::pyramid::BlurPyramid;
use crate::resources::{AssetKind, ShaderPass};
use crate::scope::FrameScope;
use crate::settings::VhsSettings;

pub fn composite_params(
    settings: &VhsSettings,
    polarity: EdgePolarity,
    has_noise: bool,
    has_smear: bool,
    jitter: [f32; 2],
) -> CompositeParams {
    CompositeParams {
        grain_scale_offset: [
            0.6 * settings.grain_scale,
            settings.grain_scale,
            jitter[0],
            jitter[1],
        ],
        color_bleed_intensity: settings.color_bleeding_intensity,
        blur_intensity: settings.smear_intensity,
        grain_intensity: settings.grain_intensity,
        noise_opacity: settings.stripe_noise_opacity,
        edge_intensity: settings.edge_intensity,
        edge_distance: polarity.apply(settings.edge_distance),
        smear_intensity: settings.smear_intensity,
        has_noise: has_noise as i32,
        has_smear: has_smear as i32,
        _pad1: 0,
        _pad2: 0,
        _pad3: 0,
    }
}

/// Record the composite blit. `jitter` is the per-frame grain offset.
pub fn record_composite<A: TargetAllocator>(
    scope: &mut FrameScope<'_, A>,
    pyramid: &BlurPyramid,
    noise: Option<TargetHandle>,
    smear: Option<TargetHandle>,
    settings: &VhsSettings,
    polarity: EdgePolarity,
    jitter: [f32; 2],
) {
    let optional = |h: Option<TargetHandle>| h.map_or(TextureRef::Placeholder, TextureRef::Transient);

    scope.blit(Blit {
        pass: ShaderPass::Composite,
        target: TextureRef::Destination,
        inputs: vec![
            TextureRef::Transient(pyramid.level(0)),
            TextureRef::Transient(pyramid.level(1)),
            TextureRef::Transient(pyramid.level(2)),
            optional(noise),
            optional(smear),
            TextureRef::Asset(AssetKind::Grain),
        ],
        params: PassParams::Composite(composite_params(
            settings,
            polarity,
            noise.is_some(),
            smear.is_some(),
            jitter,
        )),
    });
}
