//! Device-independent half of the VHS post-process.
//!
//! [`VhsEffect::record`] turns one camera frame into a [`CommandStream`] of
//! target acquisitions, fullscreen blits and releases. A GPU backend replays
//! the stream; the pool hands out targets through a [`TargetAllocator`].

pub mod commands;
pub mod composite;
pub mod config;
pub mod effect;
pub mod error;
pub mod noise;
pub mod pool;
pub mod pyramid;
pub mod resources;
pub mod scope;
pub mod settings;
pub mod sizing;
pub mod smear;
pub mod temporal;

#[cfg(test)]
mod test_support;

pub use commands::{Blit, Command, CommandStream, PassParams, TextureRef};
pub use config::{EdgePolarity, EffectConfig, NoiseMode, PipelineConfig, SmearMode};
pub use effect::{FrameContext, FrameSummary, VhsEffect};
pub use error::VhsError;
pub use pool::{PoolStats, ResourcePool, RetentionPolicy, TargetAllocator, TargetDesc, TargetHandle, TargetSlot};
pub use resources::{AssetCatalog, AssetInfo, AssetKind, ResourceResolver, ShaderId, ShaderPass};
pub use settings::VhsSettings;
pub use temporal::{CameraId, TemporalStateStore};
