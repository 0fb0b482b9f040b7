pub mod apply;
pub mod check;
pub mod defaults;

use std::path::Path;

use anyhow::Context;
use vhs_render::EffectConfig;

/// Read and parse an effect configuration file.
pub fn load_config(path: &Path) -> anyhow::Result<EffectConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    EffectConfig::from_json(&text).with_context(|| format!("failed to parse {}", path.display()))
}
