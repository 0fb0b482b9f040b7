//! Per-frame orchestration of the VHS passes.

use rand::Rng;

use crate::commands::CommandStream;
use crate::composite::record_composite;
use crate::config::{EffectConfig, SmearMode};
use crate::error::VhsError;
use crate::noise::record_noise;
use crate::pool::{ResourcePool, TargetAllocator};
use crate::pyramid::build_pyramid;
use crate::resources::{AssetCatalog, ResourceResolver};
use crate::scope::FrameScope;
use crate::settings::VhsSettings;
use crate::smear::record_smear;
use crate::temporal::{CameraId, TemporalStateStore};

/// What the host passes for one camera render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameContext {
    pub camera: CameraId,
    /// Monotonic host frame counter, used for temporal eviction.
    pub frame_index: u64,
    pub width: u32,
    pub height: u32,
    pub source_format: wgpu::TextureFormat,
    /// Seconds since the previous frame.
    pub delta_time: f32,
}

/// What `record` decided for a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSummary {
    pub blur_amount: f32,
    pub blur_iterations: usize,
    pub pyramid_sizes: Vec<(u32, u32)>,
    pub noise_enabled: bool,
    pub smear_enabled: bool,
    pub horizontal_noise_pos: f32,
}

pub struct VhsEffect<A: TargetAllocator> {
    config: EffectConfig,
    assets: AssetCatalog,
    pool: ResourcePool<A>,
    temporal: TemporalStateStore,
    current_frame: u64,
}

impl<A: TargetAllocator> VhsEffect<A> {
    /// Resolve every shader and texture up front; any missing one is an error.
    pub fn new(
        config: EffectConfig,
        resolver: &(impl ResourceResolver + ?Sized),
        allocator: A,
    ) -> Result<Self, VhsError> {
        let assets = AssetCatalog::resolve(resolver)?;
        log::info!(
            "VHS effect ready: {:?} noise, {:?} smear, {:?}",
            config.pipeline.noise_mode,
            config.pipeline.smear_mode,
            config.pipeline.retention
        );
        Ok(Self {
            assets,
            pool: ResourcePool::new(allocator, config.pipeline.retention),
            temporal: TemporalStateStore::new(config.pipeline.temporal_max_idle_frames),
            config,
            current_frame: 0,
        })
    }

    /// Host-facing enable predicate; skip `record` entirely when false.
    pub fn is_enabled(settings: &VhsSettings, base_enabled: bool) -> bool {
        settings.is_active(base_enabled)
    }

    /// Record one frame into `commands`.
    ///
    /// Every target acquired here is released again before returning, on
    /// success and on error. The targets stay valid for execution until
    /// [`end_frame`](Self::end_frame).
    pub fn record<R: Rng + ?Sized>(
        &mut self,
        frame: &FrameContext,
        settings: &VhsSettings,
        rng: &mut R,
        commands: &mut CommandStream,
    ) -> Result<FrameSummary, VhsError> {
        if frame.width == 0 || frame.height == 0 {
            return Err(VhsError::InvalidFrameSize {
                width: frame.width,
                height: frame.height,
            });
        }

        let (settings, clamped) = settings.clamp_report();
        for field in &clamped {
            log::debug!(
                "VHS setting {} clamped from {} to {}",
                field.name,
                field.original,
                field.value
            );
        }

        self.current_frame = frame.frame_index;
        let scroll_pos = self
            .temporal
            .advance(frame.camera, frame.frame_index, frame.delta_time, rng);

        let pipeline = self.config.pipeline;
        let noise_enabled = settings.noise_enabled();
        let smear_enabled = pipeline.smear_mode == SmearMode::Directional && settings.smear_enabled();

        let mut scope = FrameScope::new(&mut self.pool, commands, frame.camera);

        let noise = if noise_enabled {
            Some(record_noise(
                &mut scope,
                frame.width,
                frame.height,
                &settings,
                scroll_pos,
                pipeline.noise_mode,
                &self.assets,
                rng,
            ))
        } else {
            None
        };

        let pyramid = build_pyramid(
            &mut scope,
            frame.width,
            frame.height,
            frame.source_format,
            &settings,
            noise,
        );

        let smear = smear_enabled.then(|| record_smear(&mut scope, frame.width, frame.height, pyramid.level(1)));

        let grain_jitter = [rng.gen::<f32>(), rng.gen::<f32>()];
        record_composite(
            &mut scope,
            &pyramid,
            noise,
            smear,
            &settings,
            pipeline.edge_polarity,
            grain_jitter,
        );
        drop(scope);

        log::debug!(
            "VHS frame {} camera {}: {}x{}, {} blur levels, noise {}, smear {}",
            frame.frame_index,
            frame.camera.0,
            frame.width,
            frame.height,
            pyramid.iterations(),
            noise_enabled,
            smear_enabled
        );

        Ok(FrameSummary {
            blur_amount: pyramid.blur_amount,
            blur_iterations: pyramid.iterations(),
            pyramid_sizes: pyramid.sizes,
            noise_enabled,
            smear_enabled,
            horizontal_noise_pos: scroll_pos,
        })
    }

    /// Apply target retention and evict idle cameras along with their
    /// targets. Call once per host frame, after the recorded commands of
    /// every camera have been executed.
    pub fn end_frame(&mut self) {
        self.pool.end_frame();
        for camera in self.temporal.evict_stale(self.current_frame) {
            self.pool.release_camera(camera);
        }
    }

    pub fn config(&self) -> &EffectConfig {
        &self.config
    }

    pub fn assets(&self) -> &AssetCatalog {
        &self.assets
    }

    pub fn pool(&self) -> &ResourcePool<A> {
        &self.pool
    }

    pub fn temporal(&self) -> &TemporalStateStore {
        &self.temporal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::commands::{Command, PassParams, TextureRef};
    use crate::config::{EdgePolarity, PipelineConfig};
    use crate::pool::RetentionPolicy;
    use crate::pool::{TargetHandle, TargetSlot};
    use crate::resources::{AssetKind, ShaderPass};
    use crate::test_support::{CountingAllocator, StaticResolver};

    fn effect(pipeline: PipelineConfig) -> VhsEffect<CountingAllocator> {
        let config = EffectConfig {
            pipeline,
            ..EffectConfig::default()
        };
        VhsEffect::new(config, &StaticResolver::complete(), CountingAllocator::default()).unwrap()
    }

    fn frame(width: u32, height: u32) -> FrameContext {
        FrameContext {
            camera: CameraId(1),
            frame_index: 0,
            width,
            height,
            source_format: wgpu::TextureFormat::Rgba16Float,
            delta_time: 1.0 / 60.0,
        }
    }

    fn smeary() -> VhsSettings {
        VhsSettings {
            smear_intensity: 0.4,
            ..VhsSettings::default()
        }
    }

    fn smear_pairs(commands: &CommandStream) -> Vec<[f32; 2]> {
        commands
            .blits_of(ShaderPass::Smear)
            .map(|b| match b.params {
                PassParams::Smear(p) => [p.offset_attenuation[0], p.offset_attenuation[1]],
                _ => panic!("expected smear params"),
            })
            .collect()
    }

    fn transients(commands: &CommandStream) -> Vec<TargetHandle> {
        commands
            .blits()
            .flat_map(|b| b.inputs.iter().chain(std::iter::once(&b.target)))
            .filter_map(|t| match t {
                TextureRef::Transient(h) => Some(*h),
                _ => None,
            })
            .collect()
    }

    fn composite(commands: &CommandStream) -> (&crate::commands::Blit, vhs_gpu_shared::uniforms::CompositeParams) {
        let blit = commands.blits_of(ShaderPass::Composite).next().unwrap();
        match blit.params {
            PassParams::Composite(p) => (blit, p),
            _ => panic!("expected composite params"),
        }
    }

    #[test]
    fn test_same_seed_records_same_stream() {
        let record = |seed: u64| {
            let mut fx = effect(PipelineConfig::stripe());
            let mut rng = StdRng::seed_from_u64(seed);
            let mut commands = CommandStream::new();
            fx.record(&frame(1280, 720), &smeary(), &mut rng, &mut commands).unwrap();
            commands
        };
        assert_eq!(record(7), record(7));
        assert_ne!(record(7), record(8));
    }

    #[test]
    fn test_nothing_outstanding_after_record() {
        let mut fx = effect(PipelineConfig::stripe());
        let mut rng = StdRng::seed_from_u64(1);
        let mut commands = CommandStream::new();
        fx.record(&frame(1920, 1080), &smeary(), &mut rng, &mut commands).unwrap();
        assert_eq!(fx.pool().outstanding(), 0);

        let acquires = commands.commands().iter().filter(|c| matches!(c, Command::Acquire { .. })).count();
        let releases = commands.commands().iter().filter(|c| matches!(c, Command::Release { .. })).count();
        assert_eq!(acquires, releases);
        assert!(matches!(commands.commands().last(), Some(Command::Release { .. })));
    }

    #[test]
    fn test_1024x576_summary() {
        let mut fx = effect(PipelineConfig::stripe());
        let mut rng = StdRng::seed_from_u64(3);
        let mut commands = CommandStream::new();
        let summary = fx
            .record(&frame(1024, 576), &VhsSettings::default(), &mut rng, &mut commands)
            .unwrap();
        assert_eq!(summary.blur_iterations, 7);
        assert_eq!(summary.pyramid_sizes.first(), Some(&(512, 288)));
        assert_eq!(summary.pyramid_sizes.last(), Some(&(8, 4)));
        assert!(summary.noise_enabled);
        assert!(!summary.smear_enabled);
    }

    #[test]
    fn test_disabled_noise_binds_placeholder() {
        let settings = VhsSettings {
            stripe_noise_density: 0.0,
            ..smeary()
        };
        let mut fx = effect(PipelineConfig::stripe());
        let mut rng = StdRng::seed_from_u64(5);
        let mut commands = CommandStream::new();
        let summary = fx.record(&frame(800, 600), &settings, &mut rng, &mut commands).unwrap();

        assert!(!summary.noise_enabled);
        assert_eq!(commands.acquisitions(TargetSlot::Noise).count(), 0);
        assert_eq!(commands.blits_of(ShaderPass::NoiseGen).count(), 0);

        let first = commands.blits_of(ShaderPass::DownsampleFirst).next().unwrap();
        assert_eq!(first.inputs[1], TextureRef::Placeholder);

        let (blit, params) = composite(&commands);
        assert_eq!(blit.inputs[3], TextureRef::Placeholder);
        assert_eq!(params.has_noise, 0);
        assert_eq!(params.has_smear, 1);
    }

    #[test]
    fn test_stripe_preset_stream() {
        let mut fx = effect(PipelineConfig::stripe());
        let mut rng = StdRng::seed_from_u64(9);
        let mut commands = CommandStream::new();
        fx.record(&frame(1920, 1080), &smeary(), &mut rng, &mut commands).unwrap();

        let gen = commands.blits_of(ShaderPass::NoiseGen).next().unwrap();
        assert!(gen.reads(TextureRef::Asset(AssetKind::StripeNoise)));
        assert!(gen.reads(TextureRef::Asset(AssetKind::HorizontalNoise)));
        assert_eq!(commands.acquisitions(TargetSlot::NoiseStreak).count(), 0);

        // two smear passes over level 1, nothing else uses the smear kernel
        let smears: Vec<_> = commands.blits_of(ShaderPass::Smear).collect();
        assert_eq!(smears.len(), 2);
        assert!(matches!(smears[0].inputs[0], TextureRef::Transient(h) if h.slot == TargetSlot::Pyramid(1)));
        assert!(matches!(smears[0].target, TextureRef::Transient(h) if h.slot == TargetSlot::Smear));
        assert_eq!(smears[1].inputs[0], smears[0].target);
        assert_eq!(smear_pairs(&commands), vec![[1.0, 0.3], [5.0, 1.2]]);
        let (_, desc) = commands.acquisitions(TargetSlot::Smear2).next().unwrap();
        assert_eq!((desc.width, desc.height), (640, 480));
        assert_eq!(desc.format, wgpu::TextureFormat::Rgba8Unorm);

        let (blit, params) = composite(&commands);
        assert_eq!(blit.target, TextureRef::Destination);
        assert!(matches!(blit.inputs[4], TextureRef::Transient(h) if h.slot == TargetSlot::Smear2));
        assert_eq!(blit.inputs[5], TextureRef::Asset(AssetKind::Grain));
        assert_eq!(params.has_smear, 1);
        assert_eq!(params.edge_distance, -0.002);
    }

    #[test]
    fn test_streaked_preset_stream() {
        let mut fx = effect(PipelineConfig::streaked());
        let mut rng = StdRng::seed_from_u64(9);
        let mut commands = CommandStream::new();
        let summary = fx.record(&frame(1920, 1080), &smeary(), &mut rng, &mut commands).unwrap();

        assert!(!summary.smear_enabled);
        assert_eq!(commands.acquisitions(TargetSlot::Smear).count(), 0);
        assert_eq!(commands.acquisitions(TargetSlot::Smear2).count(), 0);

        let gen = commands.blits_of(ShaderPass::NoiseGen).next().unwrap();
        assert!(gen.reads(TextureRef::Asset(AssetKind::SpeckNoise)));

        // streak passes ping-pong and end in the noise slot
        let streaks: Vec<_> = commands.blits_of(ShaderPass::Smear).collect();
        assert_eq!(streaks.len(), 2);
        assert!(matches!(streaks[0].target, TextureRef::Transient(h) if h.slot == TargetSlot::NoiseStreak));
        assert!(matches!(streaks[1].target, TextureRef::Transient(h) if h.slot == TargetSlot::Noise));
        assert_eq!(streaks[1].inputs[0], streaks[0].target);
        assert_eq!(smear_pairs(&commands), vec![[1.0, 0.2], [5.0, 0.8]]);

        let (blit, params) = composite(&commands);
        assert_eq!(blit.inputs[4], TextureRef::Placeholder);
        assert_eq!(params.has_smear, 0);
        assert_eq!(params.has_noise, 1);
        assert_eq!(params.edge_distance, 0.002);
    }

    #[test]
    fn test_noise_gen_params_follow_frame() {
        let settings = VhsSettings {
            stripe_noise_density: 0.3,
            ..VhsSettings::default()
        };
        let mut fx = effect(PipelineConfig::stripe());
        let mut rng = StdRng::seed_from_u64(12);
        let mut commands = CommandStream::new();
        let summary = fx.record(&frame(1001, 601), &settings, &mut rng, &mut commands).unwrap();

        let (_, desc) = commands.acquisitions(TargetSlot::Noise).next().unwrap();
        assert_eq!((desc.width, desc.height), (500, 300));
        let gen = commands.blits_of(ShaderPass::NoiseGen).next().unwrap();
        let PassParams::NoiseGen(p) = gen.params else {
            panic!("expected noise params");
        };
        // stripe texture is 256x256 in the test resolver
        assert_eq!(p.stripe_scale_offset[0], 500.0 / 256.0);
        assert_eq!(p.stripe_scale_offset[1], 300.0 / 256.0);
        assert!((p.horizontal_noise_power - 0.09).abs() < 1e-6);
        assert_eq!(p.horizontal_noise_pos, summary.horizontal_noise_pos);
    }

    #[test]
    fn test_cameras_in_one_frame_keep_their_targets() {
        let mut fx = effect(PipelineConfig::stripe());
        let mut rng = StdRng::seed_from_u64(8);
        let mut first = CommandStream::new();
        let mut second = CommandStream::new();
        fx.record(&frame(1920, 1080), &smeary(), &mut rng, &mut first).unwrap();
        let other = FrameContext {
            camera: CameraId(2),
            ..frame(1280, 720)
        };
        fx.record(&other, &smeary(), &mut rng, &mut second).unwrap();

        for stream in [&first, &second] {
            let handles = transients(stream);
            assert!(!handles.is_empty());
            for handle in handles {
                assert!(fx.pool().get(handle).is_some(), "{} of camera {}", handle.slot, handle.camera.0);
            }
        }
        assert_eq!(fx.pool().stats().frees, 0);

        let level0 = first.acquisitions(TargetSlot::Pyramid(0)).next().unwrap().0;
        assert_eq!(fx.pool().desc(*level0).unwrap().width, 960);

        fx.end_frame();
        assert_eq!(fx.pool().held(), 0);
    }

    #[test]
    fn test_evicted_camera_frees_cached_targets() {
        let pipeline = PipelineConfig {
            temporal_max_idle_frames: 1,
            retention: RetentionPolicy::KeepAcrossFrames { max_idle_frames: 100 },
            ..PipelineConfig::stripe()
        };
        let mut fx = effect(pipeline);
        let mut rng = StdRng::seed_from_u64(10);
        let mut commands = CommandStream::new();
        fx.record(&frame(64, 64), &VhsSettings::default(), &mut rng, &mut commands).unwrap();
        fx.end_frame();
        assert!(fx.pool().held_by(CameraId(1)) > 0);

        for i in 1..=2 {
            let ctx = FrameContext {
                camera: CameraId(2),
                frame_index: i,
                ..frame(64, 64)
            };
            fx.record(&ctx, &VhsSettings::default(), &mut rng, &mut commands).unwrap();
            fx.end_frame();
        }
        assert_eq!(fx.pool().held_by(CameraId(1)), 0);
        assert!(fx.pool().held_by(CameraId(2)) > 0);
    }

    #[test]
    fn test_edge_polarity_override() {
        let pipeline = PipelineConfig {
            edge_polarity: EdgePolarity::AsIs,
            ..PipelineConfig::stripe()
        };
        let mut fx = effect(pipeline);
        let mut rng = StdRng::seed_from_u64(2);
        let mut commands = CommandStream::new();
        fx.record(&frame(320, 240), &VhsSettings::default(), &mut rng, &mut commands).unwrap();
        assert_eq!(composite(&commands).1.edge_distance, 0.002);
    }

    #[test]
    fn test_targets_reused_across_frames() {
        let mut fx = effect(PipelineConfig::streaked());
        let mut rng = StdRng::seed_from_u64(4);
        let mut commands = CommandStream::new();
        for i in 0..3 {
            commands.clear();
            let ctx = FrameContext {
                frame_index: i,
                ..frame(1280, 720)
            };
            fx.record(&ctx, &VhsSettings::default(), &mut rng, &mut commands).unwrap();
            fx.end_frame();
        }
        let stats = fx.pool().stats();
        assert_eq!(stats.frees, 0);
        assert_eq!(stats.allocations as usize, fx.pool().held());
        assert!(stats.reuses > 0);
    }

    #[test]
    fn test_release_each_frame_frees_targets() {
        let mut fx = effect(PipelineConfig::stripe());
        let mut rng = StdRng::seed_from_u64(4);
        let mut commands = CommandStream::new();
        fx.record(&frame(640, 360), &smeary(), &mut rng, &mut commands).unwrap();
        assert!(fx.pool().held() > 0);
        fx.end_frame();
        assert_eq!(fx.pool().held(), 0);
        assert_eq!(fx.pool().allocator().live(), 0);
    }

    #[test]
    fn test_resize_reallocates() {
        let mut fx = effect(PipelineConfig::streaked());
        let mut rng = StdRng::seed_from_u64(4);
        let mut commands = CommandStream::new();
        fx.record(&frame(1280, 720), &VhsSettings::default(), &mut rng, &mut commands).unwrap();
        fx.end_frame();
        let before = fx.pool().stats().allocations;
        fx.record(&frame(1024, 576), &VhsSettings::default(), &mut rng, &mut commands).unwrap();
        assert!(fx.pool().stats().allocations > before);
        assert!(fx.pool().stats().frees > 0);
    }

    #[test]
    fn test_zero_size_frame_is_rejected() {
        let mut fx = effect(PipelineConfig::stripe());
        let mut rng = StdRng::seed_from_u64(0);
        let mut commands = CommandStream::new();
        let err = fx
            .record(&frame(0, 720), &VhsSettings::default(), &mut rng, &mut commands)
            .unwrap_err();
        assert!(matches!(err, VhsError::InvalidFrameSize { width: 0, height: 720 }));
        assert!(commands.is_empty());
        assert!(fx.temporal().is_empty());
    }

    #[test]
    fn test_missing_asset_fails_construction() {
        let resolver = StaticResolver::complete().without_asset(AssetKind::SpeckNoise);
        let result = VhsEffect::new(EffectConfig::default(), &resolver, CountingAllocator::default());
        assert!(matches!(result, Err(VhsError::MissingAsset(AssetKind::SpeckNoise))));
    }

    #[test]
    fn test_idle_cameras_are_evicted() {
        let pipeline = PipelineConfig {
            temporal_max_idle_frames: 2,
            ..PipelineConfig::stripe()
        };
        let mut fx = effect(pipeline);
        let mut rng = StdRng::seed_from_u64(6);
        let mut commands = CommandStream::new();

        fx.record(&frame(64, 64), &VhsSettings::default(), &mut rng, &mut commands).unwrap();
        fx.end_frame();
        for i in 1..=3 {
            let ctx = FrameContext {
                camera: CameraId(2),
                frame_index: i,
                ..frame(64, 64)
            };
            fx.record(&ctx, &VhsSettings::default(), &mut rng, &mut commands).unwrap();
            fx.end_frame();
        }
        assert!(fx.temporal().get(CameraId(1)).is_none());
        assert!(fx.temporal().get(CameraId(2)).is_some());
    }

    #[test]
    fn test_scroll_position_advances() {
        let mut fx = effect(PipelineConfig::stripe());
        let mut rng = rand::rngs::mock::StepRng::new(u64::MAX / 2, 0);
        let mut commands = CommandStream::new();
        let ctx = FrameContext {
            delta_time: 10.0,
            ..frame(64, 64)
        };
        let summary = fx.record(&ctx, &VhsSettings::default(), &mut rng, &mut commands).unwrap();
        assert!((summary.horizontal_noise_pos - 0.04).abs() < 1e-6);
    }

    #[test]
    fn test_out_of_range_settings_are_clamped() {
        let settings = VhsSettings {
            smear_intensity: 5.0,
            ..VhsSettings::default()
        };
        let mut fx = effect(PipelineConfig::stripe());
        let mut rng = StdRng::seed_from_u64(0);
        let mut commands = CommandStream::new();
        fx.record(&frame(640, 480), &settings, &mut rng, &mut commands).unwrap();
        assert_eq!(composite(&commands).1.smear_intensity, 0.8);
    }
}
