//! Seeded stand-ins for the four texture assets, used when no asset
//! directory is given.

use image::{Rgba, RgbaImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use vhs_render::AssetKind;
use vhs_wgpu::AssetSet;

const TILE: u32 = 256;
/// The scroll band is sampled along one column only.
const BAND_HEIGHT: u32 = 512;

fn grey(v: f32) -> Rgba<u8> {
    let g = (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    Rgba([g, g, g, 255])
}

/// Uniform film grain centred on mid grey.
fn grain(rng: &mut StdRng) -> RgbaImage {
    RgbaImage::from_fn(TILE, TILE, |_, _| grey(rng.gen()))
}

/// Per-scanline band: mostly dark with sparse bright lines.
fn horizontal_noise(rng: &mut StdRng) -> RgbaImage {
    let rows: Vec<f32> = (0..BAND_HEIGHT).map(|_| rng.gen::<f32>().powi(3)).collect();
    RgbaImage::from_fn(4, BAND_HEIGHT, |_, y| grey(0.4 + 0.6 * rows[y as usize]))
}

/// Isolated bright specks on black.
fn speck_noise(rng: &mut StdRng) -> RgbaImage {
    RgbaImage::from_fn(TILE, TILE, |_, _| {
        if rng.gen::<f32>() > 0.96 {
            grey(rng.gen_range(0.8..=1.0))
        } else {
            grey(0.0)
        }
    })
}

/// Horizontal streaks: a random level per row with light per-texel variation.
fn stripe_noise(rng: &mut StdRng) -> RgbaImage {
    let rows: Vec<f32> = (0..TILE).map(|_| rng.gen::<f32>()).collect();
    RgbaImage::from_fn(TILE, TILE, |_, y| {
        grey(rows[y as usize] * rng.gen_range(0.85..=1.0))
    })
}

/// All four assets derived from `seed`.
pub fn generate(seed: u64) -> AssetSet {
    let mut rng = StdRng::seed_from_u64(seed);
    log::info!("Generating procedural VHS textures from seed {seed}");
    AssetSet::from_images([
        (AssetKind::Grain, grain(&mut rng)),
        (AssetKind::HorizontalNoise, horizontal_noise(&mut rng)),
        (AssetKind::SpeckNoise, speck_noise(&mut rng)),
        (AssetKind::StripeNoise, stripe_noise(&mut rng)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generates_every_asset() {
        let set = generate(1);
        assert_eq!(set.len(), AssetKind::ALL.len());
        for kind in AssetKind::ALL {
            let info = set.info(kind).unwrap();
            assert!(info.width > 0 && info.height > 0, "{}", kind.name());
        }
    }

    #[test]
    fn test_same_seed_same_textures() {
        let a = generate(42);
        let b = generate(42);
        let c = generate(43);
        assert_eq!(a.get(AssetKind::StripeNoise), b.get(AssetKind::StripeNoise));
        assert_ne!(a.get(AssetKind::Grain), c.get(AssetKind::Grain));
    }
}
