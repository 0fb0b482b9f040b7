//! wgpu backend for the VHS post-process.
//!
//! [`VhsPostProcess`] compiles the kernels and uploads the static textures
//! once, then replays each frame recorded by `vhs_render::VhsEffect` as
//! fullscreen passes on a caller-provided command encoder.

pub mod assets;
pub mod backend;
pub mod device;
pub mod error;
pub mod passes;
pub mod pipeline;
pub mod render_targets;

pub use assets::AssetSet;
pub use backend::VhsPostProcess;
pub use device::request_headless_device;
pub use error::BackendError;
pub use render_targets::{PooledTarget, WgpuTargetAllocator};
