//! wgpu executor: owns the device-side resources and replays recorded frames.

use std::collections::HashMap;
use std::sync::Arc;

use rand::Rng;
use vhs_render::{
    AssetCatalog, AssetInfo, AssetKind, Blit, Command, CommandStream, EffectConfig, FrameContext,
    FrameSummary, ResourcePool, ResourceResolver, ShaderId, ShaderPass, TextureRef, VhsEffect,
    VhsSettings,
};
use wgpu::util::DeviceExt;

use crate::assets::AssetSet;
use crate::error::BackendError;
use crate::passes::postprocess;
use crate::pipeline::{self, EffectLayouts, PipelineCache, SamplerKind, ShaderModules};
use crate::render_targets::{self, WgpuTargetAllocator};

/// What the device side can provide, checked once by [`VhsEffect::new`].
struct Available<'a> {
    modules: &'a ShaderModules,
    assets: &'a AssetSet,
}

impl ResourceResolver for Available<'_> {
    fn has_shader(&self, shader: ShaderId) -> bool {
        self.modules.fragment(shader).is_some()
    }

    fn asset_info(&self, asset: AssetKind) -> Option<AssetInfo> {
        self.assets.info(asset)
    }
}

/// Host frame views for one `render` call.
struct FrameViews<'a> {
    source: &'a wgpu::TextureView,
    destination: &'a wgpu::TextureView,
    destination_format: wgpu::TextureFormat,
}

/// The VHS post-process on a wgpu device.
pub struct VhsPostProcess {
    device: Arc<wgpu::Device>,
    effect: VhsEffect<WgpuTargetAllocator>,
    modules: ShaderModules,
    layouts: EffectLayouts,
    pipelines: PipelineCache,
    clamp_sampler: wgpu::Sampler,
    repeat_sampler: wgpu::Sampler,
    asset_views: HashMap<AssetKind, (wgpu::Texture, wgpu::TextureView)>,
    placeholder: (wgpu::Texture, wgpu::TextureView),
    commands: CommandStream,
}

impl VhsPostProcess {
    /// Compile shaders, resolve and upload assets. Fails on the first missing
    /// or invalid resource.
    pub fn new(
        device: Arc<wgpu::Device>,
        queue: &wgpu::Queue,
        assets: &AssetSet,
        config: EffectConfig,
    ) -> Result<Self, BackendError> {
        let modules = ShaderModules::compile(&device)?;

        let effect = VhsEffect::new(
            config,
            &Available {
                modules: &modules,
                assets,
            },
            WgpuTargetAllocator::new(device.clone()),
        )?;

        log::info!("Uploading VHS textures...");
        let mut asset_views = HashMap::new();
        for kind in AssetKind::ALL {
            let image = assets
                .get(kind)
                .ok_or(vhs_render::VhsError::MissingAsset(kind))?;
            let uploaded = render_targets::upload_rgba8(
                &device,
                queue,
                kind.name(),
                image.width(),
                image.height(),
                image.as_raw(),
            );
            asset_views.insert(kind, uploaded);
        }

        let placeholder = render_targets::create_placeholder_texture(&device, queue);

        log::info!("Creating VHS bind group layouts...");
        let layouts = EffectLayouts::new(&device);
        let clamp_sampler = pipeline::create_clamp_sampler(&device);
        let repeat_sampler = pipeline::create_repeat_sampler(&device);

        Ok(Self {
            device,
            effect,
            modules,
            layouts,
            pipelines: PipelineCache::default(),
            clamp_sampler,
            repeat_sampler,
            asset_views,
            placeholder,
            commands: CommandStream::new(),
        })
    }

    /// Whether the host should call [`render`](Self::render) at all.
    pub fn is_enabled(settings: &VhsSettings, base_enabled: bool) -> bool {
        VhsEffect::<WgpuTargetAllocator>::is_enabled(settings, base_enabled)
    }

    /// Record the effect for one camera and encode it into `encoder`.
    ///
    /// `source` must be sampleable as a filterable float texture of
    /// `frame.source_format`; `destination` must be a render attachment of
    /// `destination_format`. Pool retention runs at the end of every call.
    #[allow(clippy::too_many_arguments)]
    pub fn render<R: Rng + ?Sized>(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        frame: &FrameContext,
        settings: &VhsSettings,
        source: &wgpu::TextureView,
        destination: &wgpu::TextureView,
        destination_format: wgpu::TextureFormat,
        rng: &mut R,
    ) -> Result<FrameSummary, BackendError> {
        self.commands.clear();
        let summary = self.effect.record(frame, settings, rng, &mut self.commands)?;

        let views = FrameViews {
            source,
            destination,
            destination_format,
        };
        let result = self.execute(encoder, &views);
        self.effect.end_frame();
        result?;

        Ok(summary)
    }

    fn execute(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        views: &FrameViews<'_>,
    ) -> Result<(), BackendError> {
        let pool = self.effect.pool();
        for command in self.commands.commands() {
            let Command::Blit(blit) = command else {
                continue;
            };

            let format = target_format(blit, pool, views)?;
            let render_pipeline = self.pipelines.get_or_create(
                &self.device,
                &self.modules,
                &self.layouts,
                blit.pass,
                format,
            )?;

            let shader = blit.pass.shader();
            let expected = pipeline::texture_count(shader);
            if blit.inputs.len() != expected {
                return Err(BackendError::BindingCount {
                    pass: blit.pass,
                    expected,
                    actual: blit.inputs.len(),
                });
            }

            let params = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("VHS Pass Params"),
                contents: blit.params.as_bytes(),
                usage: wgpu::BufferUsages::UNIFORM,
            });

            let mut texture_views = Vec::with_capacity(blit.inputs.len());
            for input in &blit.inputs {
                texture_views.push(resolve_view(
                    *input,
                    pool,
                    views,
                    &self.asset_views,
                    &self.placeholder.1,
                )?);
            }

            let mut entries = vec![wgpu::BindGroupEntry {
                binding: 0,
                resource: params.as_entire_binding(),
            }];
            for (i, view) in texture_views.into_iter().enumerate() {
                entries.push(wgpu::BindGroupEntry {
                    binding: 1 + i as u32,
                    resource: wgpu::BindingResource::TextureView(view),
                });
            }
            for (i, kind) in pipeline::samplers(shader).iter().enumerate() {
                let sampler = match kind {
                    SamplerKind::Clamp => &self.clamp_sampler,
                    SamplerKind::Repeat => &self.repeat_sampler,
                };
                entries.push(wgpu::BindGroupEntry {
                    binding: (1 + expected + i) as u32,
                    resource: wgpu::BindingResource::Sampler(sampler),
                });
            }

            let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(shader.name()),
                layout: self.layouts.get(shader),
                entries: &entries,
            });

            let target = resolve_view(blit.target, pool, views, &self.asset_views, &self.placeholder.1)?;
            match blit.pass {
                ShaderPass::NoiseGen => postprocess::render_noise_gen(encoder, target, render_pipeline, &bind_group),
                ShaderPass::DownsampleFirst => {
                    postprocess::render_downsample(encoder, target, render_pipeline, &bind_group, "VHS Downsample First")
                }
                ShaderPass::Downsample => {
                    postprocess::render_downsample(encoder, target, render_pipeline, &bind_group, "VHS Downsample")
                }
                ShaderPass::Upsample => postprocess::render_upsample(encoder, target, render_pipeline, &bind_group),
                ShaderPass::Smear => postprocess::render_smear(encoder, target, render_pipeline, &bind_group),
                ShaderPass::Composite => postprocess::render_composite(encoder, target, render_pipeline, &bind_group),
            }
        }
        Ok(())
    }

    pub fn config(&self) -> &EffectConfig {
        self.effect.config()
    }

    pub fn assets(&self) -> &AssetCatalog {
        self.effect.assets()
    }

    pub fn pool(&self) -> &ResourcePool<WgpuTargetAllocator> {
        self.effect.pool()
    }

    /// Commands of the most recent `render` call.
    pub fn last_commands(&self) -> &CommandStream {
        &self.commands
    }

    pub fn pipeline_count(&self) -> usize {
        self.pipelines.len()
    }
}

fn target_format(
    blit: &Blit,
    pool: &ResourcePool<WgpuTargetAllocator>,
    views: &FrameViews<'_>,
) -> Result<wgpu::TextureFormat, BackendError> {
    match blit.target {
        TextureRef::Destination => Ok(views.destination_format),
        TextureRef::Transient(handle) => pool
            .desc(handle)
            .map(|desc| desc.format)
            .ok_or(BackendError::StaleTarget(handle.slot)),
        target => Err(BackendError::InvalidTarget {
            pass: blit.pass,
            target,
        }),
    }
}

fn resolve_view<'a>(
    texture: TextureRef,
    pool: &'a ResourcePool<WgpuTargetAllocator>,
    views: &FrameViews<'a>,
    asset_views: &'a HashMap<AssetKind, (wgpu::Texture, wgpu::TextureView)>,
    placeholder: &'a wgpu::TextureView,
) -> Result<&'a wgpu::TextureView, BackendError> {
    match texture {
        TextureRef::Source => Ok(views.source),
        TextureRef::Destination => Ok(views.destination),
        TextureRef::Transient(handle) => pool
            .get(handle)
            .map(|target| &target.view)
            .ok_or(BackendError::StaleTarget(handle.slot)),
        TextureRef::Asset(kind) => asset_views
            .get(&kind)
            .map(|(_, view)| view)
            .ok_or(BackendError::Effect(vhs_render::VhsError::MissingAsset(kind))),
        TextureRef::Placeholder => Ok(placeholder),
    }
}
