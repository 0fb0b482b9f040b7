//! Shader and texture identities, resolved once when the effect is built.

use crate::error::VhsError;

/// GPU kernels used by the effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderId {
    NoiseGen,
    Downsample,
    Smear,
    Composite,
}

impl ShaderId {
    pub const ALL: [ShaderId; 4] = [
        ShaderId::NoiseGen,
        ShaderId::Downsample,
        ShaderId::Smear,
        ShaderId::Composite,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ShaderId::NoiseGen => "vhs_noise_gen",
            ShaderId::Downsample => "vhs_downsample",
            ShaderId::Smear => "vhs_smear",
            ShaderId::Composite => "vhs_composite",
        }
    }
}

/// A `(shader, pass index)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderPass {
    NoiseGen,
    DownsampleFirst,
    Downsample,
    Upsample,
    Smear,
    Composite,
}

impl ShaderPass {
    pub fn shader(self) -> ShaderId {
        match self {
            ShaderPass::NoiseGen => ShaderId::NoiseGen,
            ShaderPass::DownsampleFirst | ShaderPass::Downsample | ShaderPass::Upsample => {
                ShaderId::Downsample
            }
            ShaderPass::Smear => ShaderId::Smear,
            ShaderPass::Composite => ShaderId::Composite,
        }
    }

    pub fn pass_index(self) -> u32 {
        match self {
            ShaderPass::DownsampleFirst => 0,
            ShaderPass::Downsample => 1,
            ShaderPass::Upsample => 2,
            ShaderPass::NoiseGen | ShaderPass::Smear | ShaderPass::Composite => 0,
        }
    }

    /// Fragment entry point in the WGSL module.
    pub fn entry_point(self) -> &'static str {
        match self {
            ShaderPass::DownsampleFirst => "fs_downsample_first",
            ShaderPass::Downsample => "fs_downsample",
            ShaderPass::Upsample => "fs_upsample",
            ShaderPass::NoiseGen | ShaderPass::Smear | ShaderPass::Composite => "fs_main",
        }
    }

    /// Whether the pass blends over the target instead of overwriting it.
    pub fn blends(self) -> bool {
        matches!(self, ShaderPass::Upsample)
    }
}

/// Static textures sampled by the kernels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Grain,
    HorizontalNoise,
    SpeckNoise,
    StripeNoise,
}

impl AssetKind {
    pub const ALL: [AssetKind; 4] = [
        AssetKind::Grain,
        AssetKind::HorizontalNoise,
        AssetKind::SpeckNoise,
        AssetKind::StripeNoise,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AssetKind::Grain => "vhs_grain",
            AssetKind::HorizontalNoise => "horizontal_noise",
            AssetKind::SpeckNoise => "speck_noise",
            AssetKind::StripeNoise => "stripe_noise",
        }
    }

    fn index(self) -> usize {
        match self {
            AssetKind::Grain => 0,
            AssetKind::HorizontalNoise => 1,
            AssetKind::SpeckNoise => 2,
            AssetKind::StripeNoise => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetInfo {
    pub width: u32,
    pub height: u32,
}

/// What a backend can provide; queried once at construction.
pub trait ResourceResolver {
    fn has_shader(&self, shader: ShaderId) -> bool;

    fn asset_info(&self, asset: AssetKind) -> Option<AssetInfo>;
}

/// Dimensions of every asset, known to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetCatalog {
    infos: [AssetInfo; 4],
}

impl AssetCatalog {
    /// Check every shader and asset, failing on the first one missing.
    pub fn resolve(resolver: &(impl ResourceResolver + ?Sized)) -> Result<Self, VhsError> {
        for shader in ShaderId::ALL {
            if !resolver.has_shader(shader) {
                return Err(VhsError::MissingShader(shader));
            }
        }

        let mut infos = [AssetInfo { width: 0, height: 0 }; 4];
        for asset in AssetKind::ALL {
            let info = resolver
                .asset_info(asset)
                .ok_or(VhsError::MissingAsset(asset))?;
            if info.width == 0 || info.height == 0 {
                return Err(VhsError::EmptyAsset(asset));
            }
            infos[asset.index()] = info;
        }
        Ok(Self { infos })
    }

    pub fn info(&self, asset: AssetKind) -> AssetInfo {
        self.infos[asset.index()]
    }
}
