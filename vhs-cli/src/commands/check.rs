use std::path::PathBuf;

use vhs_render::{SmearMode, VhsSettings};

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    let config = super::load_config(&path)?;
    let (settings, clamped) = config.settings.clamp_report();

    println!("Config: {}", path.display());
    println!(
        "  Pipeline: {:?} noise, {:?} smear, {:?} edge distance, {:?}",
        config.pipeline.noise_mode,
        config.pipeline.smear_mode,
        config.pipeline.edge_polarity,
        config.pipeline.retention
    );

    for field in &clamped {
        log::warn!("{} = {} is out of range, using {}", field.name, field.original, field.value);
        println!("  Clamped: {} {} -> {}", field.name, field.original, field.value);
    }

    if settings.smear_enabled() && config.pipeline.smear_mode == SmearMode::Off {
        println!("  Note: smear_intensity is set but the smear pass is off in this pipeline");
    }

    if settings.is_active(true) {
        println!("  Active: yes");
    } else {
        println!("  Active: no (every contribution is zero)");
    }
    if settings != VhsSettings::default() {
        println!("  Differs from the default settings");
    }
    Ok(())
}
