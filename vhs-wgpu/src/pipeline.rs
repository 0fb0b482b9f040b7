//! Shader modules, bind group layouts, samplers and render pipelines for the
//! VHS passes. Every pass is a fullscreen triangle with one bind group:
//! params uniform at binding 0, then the pass textures, then its samplers.

use std::collections::HashMap;

use vhs_gpu_shared::shaders;
use vhs_render::{ShaderId, ShaderPass};

use crate::error::BackendError;

/// Which sampler a binding expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplerKind {
    Clamp,
    Repeat,
}

/// Number of texture bindings of `shader`, matching its WGSL declaration.
pub fn texture_count(shader: ShaderId) -> usize {
    match shader {
        ShaderId::NoiseGen => 2,
        ShaderId::Downsample => 2,
        ShaderId::Smear => 1,
        ShaderId::Composite => 6,
    }
}

/// Samplers bound after the textures of `shader`, in binding order.
pub fn samplers(shader: ShaderId) -> &'static [SamplerKind] {
    match shader {
        ShaderId::NoiseGen => &[SamplerKind::Repeat],
        ShaderId::Downsample | ShaderId::Smear => &[SamplerKind::Clamp],
        ShaderId::Composite => &[SamplerKind::Clamp, SamplerKind::Repeat],
    }
}

fn fragment_source(shader: ShaderId) -> &'static str {
    match shader {
        ShaderId::NoiseGen => shaders::NOISE_GEN_FRAG,
        ShaderId::Downsample => shaders::DOWNSAMPLE_FRAG,
        ShaderId::Smear => shaders::SMEAR_FRAG,
        ShaderId::Composite => shaders::COMPOSITE_FRAG,
    }
}

/// Every compiled module the effect needs.
pub struct ShaderModules {
    pub vertex: wgpu::ShaderModule,
    fragments: HashMap<ShaderId, wgpu::ShaderModule>,
}

impl ShaderModules {
    /// Compile all modules, failing on the first validation error.
    pub fn compile(device: &wgpu::Device) -> Result<Self, BackendError> {
        log::info!("Compiling VHS shaders...");
        let vertex = compile_module(device, "vhs_fullscreen", shaders::FULLSCREEN_TRIANGLE_VERT)?;
        let mut fragments = HashMap::new();
        for shader in ShaderId::ALL {
            let module = compile_module(device, shader.name(), fragment_source(shader))?;
            fragments.insert(shader, module);
        }
        Ok(Self { vertex, fragments })
    }

    pub fn fragment(&self, shader: ShaderId) -> Option<&wgpu::ShaderModule> {
        self.fragments.get(&shader)
    }
}

fn compile_module(
    device: &wgpu::Device,
    name: &'static str,
    source: &str,
) -> Result<wgpu::ShaderModule, BackendError> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(name),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    match pollster::block_on(device.pop_error_scope()) {
        Some(err) => Err(BackendError::ShaderValidation {
            name,
            message: err.to_string(),
        }),
        None => Ok(module),
    }
}

/// Bind group layout: params uniform, `num_textures` filterable 2D textures,
/// then `num_samplers` filtering samplers.
pub fn create_effect_bind_group_layout(
    device: &wgpu::Device,
    label: &str,
    num_textures: u32,
    num_samplers: u32,
) -> wgpu::BindGroupLayout {
    let mut entries = vec![
        // binding 0: params uniform
        wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        },
    ];

    for i in 0..num_textures {
        entries.push(wgpu::BindGroupLayoutEntry {
            binding: 1 + i,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        });
    }

    for i in 0..num_samplers {
        entries.push(wgpu::BindGroupLayoutEntry {
            binding: 1 + num_textures + i,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        });
    }

    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &entries,
    })
}

/// One layout per kernel.
pub struct EffectLayouts {
    layouts: HashMap<ShaderId, wgpu::BindGroupLayout>,
}

impl EffectLayouts {
    pub fn new(device: &wgpu::Device) -> Self {
        let layouts = ShaderId::ALL
            .into_iter()
            .map(|shader| {
                let bgl = create_effect_bind_group_layout(
                    device,
                    &format!("{} BGL", shader.name()),
                    texture_count(shader) as u32,
                    samplers(shader).len() as u32,
                );
                (shader, bgl)
            })
            .collect();
        Self { layouts }
    }

    pub fn get(&self, shader: ShaderId) -> &wgpu::BindGroupLayout {
        &self.layouts[&shader]
    }
}

pub fn create_clamp_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("VHS Clamp Sampler"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    })
}

pub fn create_repeat_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("VHS Repeat Sampler"),
        address_mode_u: wgpu::AddressMode::Repeat,
        address_mode_v: wgpu::AddressMode::Repeat,
        address_mode_w: wgpu::AddressMode::Repeat,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    })
}

/// Alpha blending over the existing target contents, keeping its alpha.
pub fn upsample_blend_state() -> wgpu::BlendState {
    wgpu::BlendState {
        color: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::SrcAlpha,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
        alpha: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::Zero,
            dst_factor: wgpu::BlendFactor::One,
            operation: wgpu::BlendOperation::Add,
        },
    }
}

/// Shared fullscreen triangle vertex state.
fn fullscreen_vertex_state(module: &wgpu::ShaderModule) -> wgpu::VertexState<'_> {
    wgpu::VertexState {
        module,
        entry_point: Some("vs_main"),
        compilation_options: wgpu::PipelineCompilationOptions::default(),
        buffers: &[],
    }
}

pub fn create_fullscreen_effect_pipeline(
    device: &wgpu::Device,
    label: &str,
    vert_module: &wgpu::ShaderModule,
    frag_module: &wgpu::ShaderModule,
    frag_entry: &str,
    bgl: &wgpu::BindGroupLayout,
    output_format: wgpu::TextureFormat,
    blend: Option<wgpu::BlendState>,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(&format!("{label} Layout")),
        bind_group_layouts: &[bgl],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&layout),
        vertex: fullscreen_vertex_state(vert_module),
        fragment: Some(wgpu::FragmentState {
            module: frag_module,
            entry_point: Some(frag_entry),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: output_format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

/// Render pipelines keyed by pass and output format, built on first use.
#[derive(Default)]
pub struct PipelineCache {
    pipelines: HashMap<(ShaderPass, wgpu::TextureFormat), wgpu::RenderPipeline>,
}

impl PipelineCache {
    pub fn get_or_create(
        &mut self,
        device: &wgpu::Device,
        modules: &ShaderModules,
        layouts: &EffectLayouts,
        pass: ShaderPass,
        format: wgpu::TextureFormat,
    ) -> Result<&wgpu::RenderPipeline, BackendError> {
        let shader = pass.shader();
        let frag = modules
            .fragment(shader)
            .ok_or(vhs_render::VhsError::MissingShader(shader))?;

        let pipeline = self.pipelines.entry((pass, format)).or_insert_with(|| {
            log::info!("Creating {:?} pipeline for {:?}...", pass, format);
            create_fullscreen_effect_pipeline(
                device,
                &format!("{} pass {}", shader.name(), pass.pass_index()),
                &modules.vertex,
                frag,
                pass.entry_point(),
                layouts.get(shader),
                format,
                pass.blends().then(upsample_blend_state),
            )
        });
        Ok(&*pipeline)
    }

    pub fn len(&self) -> usize {
        self.pipelines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipelines.is_empty()
    }
}
