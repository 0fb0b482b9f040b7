//! The four static textures the kernels sample.

use std::collections::HashMap;
use std::path::Path;

use image::RgbaImage;
use vhs_render::{AssetInfo, AssetKind};

use crate::error::BackendError;

/// Decoded asset images keyed by kind.
#[derive(Debug, Clone, Default)]
pub struct AssetSet {
    images: HashMap<AssetKind, RgbaImage>,
}

impl AssetSet {
    /// Load `<name>.png` for every asset kind from `dir`.
    pub fn load_dir(dir: &Path) -> Result<Self, BackendError> {
        let mut images = HashMap::new();
        for kind in AssetKind::ALL {
            let path = dir.join(format!("{}.png", kind.name()));
            if !path.is_file() {
                return Err(BackendError::MissingAsset { path });
            }
            let image = image::open(&path)
                .map_err(|source| BackendError::Image {
                    path: path.clone(),
                    source,
                })?
                .to_rgba8();
            log::info!(
                "Loaded {} ({}x{}) from {}",
                kind.name(),
                image.width(),
                image.height(),
                path.display()
            );
            images.insert(kind, image);
        }
        Ok(Self { images })
    }

    /// Build from in-memory images. Missing kinds surface when the effect is created.
    pub fn from_images(images: impl IntoIterator<Item = (AssetKind, RgbaImage)>) -> Self {
        Self {
            images: images.into_iter().collect(),
        }
    }

    pub fn get(&self, kind: AssetKind) -> Option<&RgbaImage> {
        self.images.get(&kind)
    }

    pub fn info(&self, kind: AssetKind) -> Option<AssetInfo> {
        self.get(kind).map(|image| AssetInfo {
            width: image.width(),
            height: image.height(),
        })
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_images_reports_sizes() {
        let set = AssetSet::from_images([
            (AssetKind::Grain, RgbaImage::new(64, 32)),
            (AssetKind::StripeNoise, RgbaImage::new(8, 8)),
        ]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.info(AssetKind::Grain), Some(AssetInfo { width: 64, height: 32 }));
        assert_eq!(set.info(AssetKind::SpeckNoise), None);
    }

    #[test]
    fn test_load_dir_reports_missing_file() {
        let dir = std::env::temp_dir().join(format!("vhs-assets-missing-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let err = AssetSet::load_dir(&dir).unwrap_err();
        match err {
            BackendError::MissingAsset { path } => {
                assert_eq!(path.file_name().unwrap(), "vhs_grain.png");
            }
            other => panic!("unexpected error: {other}"),
        }
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_dir_round_trips_png() {
        let dir = std::env::temp_dir().join(format!("vhs-assets-ok-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        for (i, kind) in AssetKind::ALL.into_iter().enumerate() {
            let size = 4 + i as u32;
            RgbaImage::from_pixel(size, size, image::Rgba([10, 20, 30, 255]))
                .save(dir.join(format!("{}.png", kind.name())))
                .unwrap();
        }
        let set = AssetSet::load_dir(&dir).unwrap();
        assert_eq!(set.len(), 4);
        assert_eq!(set.info(AssetKind::StripeNoise), Some(AssetInfo { width: 7, height: 7 }));
        assert_eq!(set.get(AssetKind::Grain).unwrap().get_pixel(0, 0).0, [10, 20, 30, 255]);
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
