use bytemuck::{Pod, Zeroable};

/// Noise generation parameters matching noise_gen.wgsl group 0, binding 0.
///   1: texture_2d<f32> (horizontal_noise)
///   2: texture_2d<f32> (stripe_noise)
///   3: sampler         (repeat)
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct NoiseGenParams {
    /// xy = tiling scale of the stripe texture, zw = random offset.
    pub stripe_scale_offset: [f32; 4],
    pub horizontal_noise_pos: f32,
    pub horizontal_noise_power: f32,
    pub _pad1: f32,
    pub _pad2: f32,
}

/// Downsample / upsample parameters matching downsample.wgsl group 0, binding 0.
///   1: texture_2d<f32> (source level)
///   2: texture_2d<f32> (noise buffer or placeholder)
///   3: sampler         (clamp)
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct DownsampleParams {
    /// xy = odd-dimension scale, zw = source texel size.
    pub odd_scale: [f32; 4],
    pub blur_bias: f32,
    pub noise_opacity: f32,
    pub upsample_blend: f32,
    pub has_noise: i32,
}

/// Directional smear parameters matching smear.wgsl group 0, binding 0.
///   1: texture_2d<f32> (source)
///   2: sampler         (clamp)
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct SmearParams {
    /// (1/w, 1/h, w, h) of the target.
    pub texel_size: [f32; 4],
    /// x = offset in texels, y = attenuation, zw unused.
    pub offset_attenuation: [f32; 4],
}

/// Composite parameters matching composite.wgsl group 0, binding 0.
///   1: texture_2d<f32> (pyramid level 0)
///   2: texture_2d<f32> (pyramid level 1, slightly blurred)
///   3: texture_2d<f32> (pyramid level 2, blurred)
///   4: texture_2d<f32> (noise buffer or placeholder)
///   5: texture_2d<f32> (smear buffer or placeholder)
///   6: texture_2d<f32> (grain)
///   7: sampler         (clamp)
///   8: sampler         (repeat)
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct CompositeParams {
    /// xy = grain scale, zw = random offset.
    pub grain_scale_offset: [f32; 4],
    pub color_bleed_intensity: f32,
    pub blur_intensity: f32,
    pub grain_intensity: f32,
    pub noise_opacity: f32,
    pub edge_intensity: f32,
    pub edge_distance: f32,
    pub smear_intensity: f32,
    pub has_noise: i32,
    pub has_smear: i32,
    pub _pad1: i32,
    pub _pad2: i32,
    pub _pad3: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_sizes_are_16_byte_multiples() {
        assert_eq!(std::mem::size_of::<NoiseGenParams>(), 32);
        assert_eq!(std::mem::size_of::<DownsampleParams>(), 32);
        assert_eq!(std::mem::size_of::<SmearParams>(), 32);
        assert_eq!(std::mem::size_of::<CompositeParams>(), 64);
    }
}
