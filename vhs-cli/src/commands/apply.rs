use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{ensure, Context};
use rand::rngs::StdRng;
use rand::SeedableRng;
use vhs_render::{CameraId, EffectConfig, FrameContext, VhsSettings};
use vhs_wgpu::render_targets::{self, ASSET_FORMAT};
use vhs_wgpu::{AssetSet, VhsPostProcess};

use crate::cli::Mode;
use crate::{procedural, readback};

/// Format of the uploaded input and the rendered output.
const FRAME_FORMAT: wgpu::TextureFormat = ASSET_FORMAT;

pub struct ApplyOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub config: Option<PathBuf>,
    pub assets: Option<PathBuf>,
    pub seed: u64,
    pub frames: u64,
    pub delta_time: f32,
    pub mode: Mode,
}

pub fn run(opts: ApplyOptions) -> anyhow::Result<()> {
    ensure!(opts.frames > 0, "--frames must be at least 1");

    let config = match &opts.config {
        Some(path) => super::load_config(path)?,
        None => EffectConfig {
            settings: VhsSettings::default(),
            pipeline: opts.mode.pipeline(),
        },
    };

    let input = image::open(&opts.input)
        .with_context(|| format!("failed to open {}", opts.input.display()))?
        .to_rgba8();
    let (width, height) = input.dimensions();

    if !VhsPostProcess::is_enabled(&config.settings, true) {
        println!("Effect is inactive with these settings, copying input unchanged");
        input
            .save(&opts.output)
            .with_context(|| format!("failed to write {}", opts.output.display()))?;
        return Ok(());
    }

    let assets = match &opts.assets {
        Some(dir) => AssetSet::load_dir(dir)?,
        None => procedural::generate(opts.seed),
    };

    let (device, queue, adapter) = vhs_wgpu::request_headless_device("VHS Device")?;
    let device = Arc::new(device);
    let mut post = VhsPostProcess::new(device.clone(), &queue, &assets, config)?;

    let (_source_texture, source_view) =
        render_targets::upload_rgba8(&device, &queue, "VHS Input", width, height, input.as_raw());
    let destination = render_targets::create_render_target(&device, width, height, "VHS Output", FRAME_FORMAT);

    println!("Applying VHS effect...");
    println!("  Input: {} ({width}x{height})", opts.input.display());
    println!("  Adapter: {} ({})", adapter.name, adapter.backend.to_str());

    let mut rng = StdRng::seed_from_u64(opts.seed);
    let mut summary = None;
    for frame_index in 0..opts.frames {
        let frame = FrameContext {
            camera: CameraId(0),
            frame_index,
            width,
            height,
            source_format: ASSET_FORMAT,
            delta_time: opts.delta_time,
        };
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("VHS Frame"),
        });
        summary = Some(post.render(
            &mut encoder,
            &frame,
            &config.settings,
            &source_view,
            &destination.view,
            FRAME_FORMAT,
            &mut rng,
        )?);
        queue.submit(Some(encoder.finish()));
    }

    let image = readback::read_rgba8(&device, &queue, &destination.texture, width, height)?;
    image
        .save(&opts.output)
        .with_context(|| format!("failed to write {}", opts.output.display()))?;

    if let Some(summary) = summary {
        println!(
            "  Blur: {} levels (amount {:.2}), noise {}, smear {}",
            summary.blur_iterations,
            summary.blur_amount,
            if summary.noise_enabled { "on" } else { "off" },
            if summary.smear_enabled { "on" } else { "off" },
        );
    }
    println!(
        "  Rendered {} frame(s), {} pipeline(s), {} pooled target(s)",
        opts.frames,
        post.pipeline_count(),
        post.pool().held()
    );
    println!("Done: {}", opts.output.display());
    Ok(())
}
