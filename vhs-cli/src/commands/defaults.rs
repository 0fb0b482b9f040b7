use vhs_render::{EffectConfig, VhsSettings};

use crate::cli::Mode;

pub fn run(mode: Mode) -> anyhow::Result<()> {
    let config = EffectConfig {
        settings: VhsSettings::default(),
        pipeline: mode.pipeline(),
    };
    println!("{}", config.to_json()?);
    Ok(())
}
