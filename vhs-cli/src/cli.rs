use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use vhs_render::PipelineConfig;

#[derive(Parser)]
#[command(name = "vhs", about = "VHS videotape post-process", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Render the effect over a PNG
    Apply {
        /// Input image
        input: PathBuf,
        /// Output PNG path
        #[arg(short, long)]
        output: PathBuf,
        /// Effect configuration (JSON); defaults to the preset of --mode
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Directory holding vhs_grain.png, horizontal_noise.png, speck_noise.png, stripe_noise.png
        #[arg(long)]
        assets: Option<PathBuf>,
        /// Seed for the per-frame random values and procedural textures
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Frames to render before writing the last one
        #[arg(long, default_value_t = 1)]
        frames: u64,
        /// Seconds between frames
        #[arg(long, default_value_t = 1.0 / 60.0)]
        delta_time: f32,
        /// Pipeline preset used when no config file is given
        #[arg(short, long, default_value = "stripe", value_enum)]
        mode: Mode,
    },
    /// Print the default configuration as JSON
    Defaults {
        #[arg(short, long, default_value = "stripe", value_enum)]
        mode: Mode,
    },
    /// Validate a configuration file
    Check {
        /// Configuration file (JSON)
        config: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Mode {
    /// Stripe noise with directional smear
    Stripe,
    /// Streaked speck noise, no smear pass
    Streaked,
}

impl Mode {
    pub fn pipeline(self) -> PipelineConfig {
        match self {
            Mode::Stripe => PipelineConfig::stripe(),
            Mode::Streaked => PipelineConfig::streaked(),
        }
    }
}
