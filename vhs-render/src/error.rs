use thiserror::Error;

use crate::resources::{AssetKind, ShaderId};

#[derive(Debug, Error)]
pub enum VhsError {
    #[error("shader `{}` is not available", .0.name())]
    MissingShader(ShaderId),

    #[error("texture asset `{}` is not available", .0.name())]
    MissingAsset(AssetKind),

    #[error("texture asset `{}` has zero size", .0.name())]
    EmptyAsset(AssetKind),

    #[error("invalid frame size {width}x{height}")]
    InvalidFrameSize { width: u32, height: u32 },

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}
