use std::path::PathBuf;

use thiserror::Error;
use vhs_render::{ShaderPass, TargetSlot, TextureRef, VhsError};

#[derive(Debug, Error)]
pub enum BackendError {
    #[error(transparent)]
    Effect(#[from] VhsError),

    #[error("shader `{name}` failed validation: {message}")]
    ShaderValidation { name: &'static str, message: String },

    #[error("failed to decode {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("asset file {} not found", path.display())]
    MissingAsset { path: PathBuf },

    #[error("no suitable GPU adapter")]
    NoAdapter,

    #[error("failed to create device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("{0} was reallocated before the frame executed")]
    StaleTarget(TargetSlot),

    #[error("{pass:?} cannot render into {target:?}")]
    InvalidTarget { pass: ShaderPass, target: TextureRef },

    #[error("{pass:?} expects {expected} textures, got {actual}")]
    BindingCount {
        pass: ShaderPass,
        expected: usize,
        actual: usize,
    },
}
