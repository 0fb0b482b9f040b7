//! Target sizing: screen-space clamping, pyramid halving, blur depth and
//! odd-dimension correction.

use glam::Vec4;

/// Noise and smear buffers never exceed this size.
pub const SCREEN_SPACE_MAX_WIDTH: u32 = 640;
pub const SCREEN_SPACE_MAX_HEIGHT: u32 = 480;

pub const MIN_BLUR_ITERATIONS: usize = 3;
pub const MAX_BLUR_ITERATIONS: usize = 8;

/// Half resolution rounded half to even, clamped to 640x480.
pub fn screen_space_size(width: u32, height: u32) -> (u32, u32) {
    let half = |v: u32, max: u32| ((v as f32 * 0.5).round_ties_even() as u32).clamp(1, max);
    (
        half(width, SCREEN_SPACE_MAX_WIDTH),
        half(height, SCREEN_SPACE_MAX_HEIGHT),
    )
}

/// Integer floor halving, never below one texel.
pub fn halve(width: u32, height: u32) -> (u32, u32) {
    ((width / 2).max(1), (height / 2).max(1))
}

/// Continuous blur depth: `clamp(log2(width * radius * 0.25), 3, 8)`.
pub fn blur_amount(source_width: u32, color_bleed_radius: f32) -> f32 {
    let amount = (source_width as f32 * color_bleed_radius * 0.25).log2();
    if amount.is_nan() {
        return MIN_BLUR_ITERATIONS as f32;
    }
    amount.clamp(MIN_BLUR_ITERATIONS as f32, MAX_BLUR_ITERATIONS as f32)
}

pub fn blur_iterations(blur_amount: f32) -> usize {
    (blur_amount.floor() as usize).clamp(MIN_BLUR_ITERATIONS, MAX_BLUR_ITERATIONS)
}

/// Sizes of every pyramid level; level 0 is half the source.
pub fn pyramid_sizes(width: u32, height: u32, iterations: usize) -> Vec<(u32, u32)> {
    let mut sizes = Vec::with_capacity(iterations);
    let (mut w, mut h) = (width, height);
    for _ in 0..iterations {
        (w, h) = halve(w, h);
        sizes.push((w, h));
    }
    sizes
}

/// Sampling correction for halving a `width` x `height` image.
///
/// Returns `(scale_x, scale_y, texel_x, texel_y)`. Even axes get scale 1 and
/// texel `1/n`; odd axes get scale `(n/2 - 1) / (n/2)` and texel `1/(n - 1)`.
/// A one-texel axis is treated as even.
pub fn odd_scale(width: u32, height: u32) -> Vec4 {
    let axis = |n: u32| -> (f32, f32) {
        if n % 2 == 0 || n < 3 {
            (1.0, 1.0 / n.max(1) as f32)
        } else {
            let half = (n / 2) as f32;
            ((half - 1.0) / half, 1.0 / (n - 1) as f32)
        }
    };
    let (sx, tx) = axis(width);
    let (sy, ty) = axis(height);
    Vec4::new(sx, sy, tx, ty)
}

/// Weight for blending pyramid level `level` into `level - 1`.
///
/// The deepest step carries the fractional part of the blur amount so the
/// radius changes continuously.
pub fn upsample_blend(level: usize, iterations: usize, blur_amount: f32) -> f32 {
    let fac = if level + 1 == iterations {
        blur_amount - iterations as f32
    } else {
        1.0
    };
    0.7 * fac
}
