//! Pipeline modes and the serialized effect configuration.

use serde::{Deserialize, Serialize};

use crate::error::VhsError;
use crate::pool::RetentionPolicy;
use crate::settings::VhsSettings;

/// How the noise buffer is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseMode {
    /// Single pass over the stripe texture.
    Stripe,
    /// Speck texture streaked by two extra smear passes (playback-head jitter).
    Streaked,
}

/// Whether the separate smear pass over pyramid level 1 exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmearMode {
    Off,
    Directional,
}

/// Sign applied to `edge_distance` before it reaches the composite kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgePolarity {
    /// Neighbour sampled to the left.
    Negated,
    /// Neighbour sampled to the right.
    AsIs,
}

impl EdgePolarity {
    pub fn apply(self, edge_distance: f32) -> f32 {
        match self {
            EdgePolarity::Negated => -edge_distance,
            EdgePolarity::AsIs => edge_distance,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub noise_mode: NoiseMode,
    pub smear_mode: SmearMode,
    pub retention: RetentionPolicy,
    pub edge_polarity: EdgePolarity,
    /// Cameras not rendered for this many frames lose their temporal state.
    pub temporal_max_idle_frames: u64,
}

pub const DEFAULT_TEMPORAL_MAX_IDLE_FRAMES: u64 = 300;

impl PipelineConfig {
    /// Stripe noise, directional smear, targets released every frame.
    pub fn stripe() -> Self {
        Self {
            noise_mode: NoiseMode::Stripe,
            smear_mode: SmearMode::Directional,
            retention: RetentionPolicy::ReleaseEachFrame,
            edge_polarity: EdgePolarity::Negated,
            temporal_max_idle_frames: DEFAULT_TEMPORAL_MAX_IDLE_FRAMES,
        }
    }

    /// Streaked speck noise, no separate smear pass, targets kept across frames.
    pub fn streaked() -> Self {
        Self {
            noise_mode: NoiseMode::Streaked,
            smear_mode: SmearMode::Off,
            retention: RetentionPolicy::KeepAcrossFrames { max_idle_frames: 2 },
            edge_polarity: EdgePolarity::AsIs,
            temporal_max_idle_frames: DEFAULT_TEMPORAL_MAX_IDLE_FRAMES,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::stripe()
    }
}

/// Everything a host needs to configure the effect, as stored on disk.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectConfig {
    pub settings: VhsSettings,
    pub pipeline: PipelineConfig,
}

impl EffectConfig {
    pub fn from_json(text: &str) -> Result<Self, VhsError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String, VhsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
