/// Embedded WGSL shader source strings for the VHS passes.
/// Every fragment shader is paired with the fullscreen triangle vertex shader.

pub const FULLSCREEN_TRIANGLE_VERT: &str = include_str!("../shaders/fullscreen_triangle.wgsl");
pub const NOISE_GEN_FRAG: &str = include_str!("../shaders/noise_gen.wgsl");
pub const DOWNSAMPLE_FRAG: &str = include_str!("../shaders/downsample.wgsl");
pub const SMEAR_FRAG: &str = include_str!("../shaders/smear.wgsl");
pub const COMPOSITE_FRAG: &str = include_str!("../shaders/composite.wgsl");
