mod cli;
mod commands;
mod procedural;
mod readback;

use anyhow::Result;
use clap::Parser;

use commands::apply::ApplyOptions;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = cli::Cli::parse();

    match cli.command {
        cli::Command::Apply {
            input,
            output,
            config,
            assets,
            seed,
            frames,
            delta_time,
            mode,
        } => commands::apply::run(ApplyOptions {
            input,
            output,
            config,
            assets,
            seed,
            frames,
            delta_time,
            mode,
        }),
        cli::Command::Defaults { mode } => commands::defaults::run(mode),
        cli::Command::Check { config } => commands::check::run(config),
    }
}
