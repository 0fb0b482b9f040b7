//! Per-frame effect parameters.

use serde::{Deserialize, Serialize};

/// Editable VHS settings, snapshotted once per frame.
///
/// Ranges are documented per field; `clamped()` enforces them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VhsSettings {
    /// [0, 1] weight of the chroma bleed.
    pub color_bleeding_intensity: f32,
    /// [0, 1] log-scaled depth of the blur pyramid.
    pub color_bleed_radius: f32,
    /// [-1, 1] horizontal bias of the downsample kernel.
    pub color_bleed_direction: f32,
    /// [0, 0.8] weight of the smear overlay; zero skips the smear pass.
    pub smear_intensity: f32,
    /// [0, 1]
    pub grain_intensity: f32,
    /// [0.01, 2]
    pub grain_scale: f32,
    /// [0, 1] noise threshold; zero skips noise generation.
    pub stripe_noise_density: f32,
    /// [0, 1] noise overlay weight; zero skips noise generation.
    pub stripe_noise_opacity: f32,
    /// [0, 2]
    pub edge_intensity: f32,
    /// [0, 0.005] in UV units.
    pub edge_distance: f32,
}

impl Default for VhsSettings {
    fn default() -> Self {
        Self {
            color_bleeding_intensity: 0.5,
            color_bleed_radius: 0.5,
            color_bleed_direction: 0.0,
            smear_intensity: 0.0,
            grain_intensity: 0.1,
            grain_scale: 0.1,
            stripe_noise_density: 0.1,
            stripe_noise_opacity: 1.0,
            edge_intensity: 0.5,
            edge_distance: 0.002,
        }
    }
}

/// A field that `clamped()` had to change.
#[derive(Debug, Clone, PartialEq)]
pub struct ClampedField {
    pub name: &'static str,
    pub original: f32,
    pub value: f32,
}

impl VhsSettings {
    /// Whether the effect contributes anything visible.
    /// `base_enabled` is the host's own enable flag for the effect.
    pub fn is_active(&self, base_enabled: bool) -> bool {
        base_enabled
            && (self.color_bleeding_intensity > 0.0
                || self.edge_intensity > 0.0
                || self.noise_enabled()
                || self.grain_intensity > 0.0)
    }

    pub fn noise_enabled(&self) -> bool {
        self.stripe_noise_density > 0.0 && self.stripe_noise_opacity > 0.0
    }

    pub fn smear_enabled(&self) -> bool {
        self.smear_intensity > 0.0
    }

    /// Copy with every field clamped into its range. Non-finite values fall
    /// back to the default.
    pub fn clamped(&self) -> Self {
        self.clamp_report().0
    }

    /// Like [`clamped`](Self::clamped), also listing the fields that changed.
    pub fn clamp_report(&self) -> (Self, Vec<ClampedField>) {
        let defaults = Self::default();
        let mut changed = Vec::new();
        let mut fix = |name: &'static str, value: f32, fallback: f32, min: f32, max: f32| -> f32 {
            let fixed = if value.is_finite() {
                value.clamp(min, max)
            } else {
                fallback
            };
            if fixed.to_bits() != value.to_bits() {
                changed.push(ClampedField {
                    name,
                    original: value,
                    value: fixed,
                });
            }
            fixed
        };

        let out = Self {
            color_bleeding_intensity: fix(
                "color_bleeding_intensity",
                self.color_bleeding_intensity,
                defaults.color_bleeding_intensity,
                0.0,
                1.0,
            ),
            color_bleed_radius: fix(
                "color_bleed_radius",
                self.color_bleed_radius,
                defaults.color_bleed_radius,
                0.0,
                1.0,
            ),
            color_bleed_direction: fix(
                "color_bleed_direction",
                self.color_bleed_direction,
                defaults.color_bleed_direction,
                -1.0,
                1.0,
            ),
            smear_intensity: fix(
                "smear_intensity",
                self.smear_intensity,
                defaults.smear_intensity,
                0.0,
                0.8,
            ),
            grain_intensity: fix(
                "grain_intensity",
                self.grain_intensity,
                defaults.grain_intensity,
                0.0,
                1.0,
            ),
            grain_scale: fix("grain_scale", self.grain_scale, defaults.grain_scale, 0.01, 2.0),
            stripe_noise_density: fix(
                "stripe_noise_density",
                self.stripe_noise_density,
                defaults.stripe_noise_density,
                0.0,
                1.0,
            ),
            stripe_noise_opacity: fix(
                "stripe_noise_opacity",
                self.stripe_noise_opacity,
                defaults.stripe_noise_opacity,
                0.0,
                1.0,
            ),
            edge_intensity: fix(
                "edge_intensity",
                self.edge_intensity,
                defaults.edge_intensity,
                0.0,
                2.0,
            ),
            edge_distance: fix(
                "edge_distance",
                self.edge_distance,
                defaults.edge_distance,
                0.0,
                0.005,
            ),
        };
        (out, changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_off() -> VhsSettings {
        VhsSettings {
            color_bleeding_intensity: 0.0,
            edge_intensity: 0.0,
            stripe_noise_density: 0.0,
            stripe_noise_opacity: 0.0,
            grain_intensity: 0.0,
            ..VhsSettings::default()
        }
    }

    #[test]
    fn test_defaults_are_active() {
        assert!(VhsSettings::default().is_active(true));
    }

    #[test]
    fn test_base_disabled_is_never_active() {
        assert!(!VhsSettings::default().is_active(false));
    }

    #[test]
    fn test_all_off_is_inactive() {
        assert!(!all_off().is_active(true));
    }

    #[test]
    fn test_each_contributor_activates() {
        let s = VhsSettings { color_bleeding_intensity: 0.1, ..all_off() };
        assert!(s.is_active(true));
        let s = VhsSettings { edge_intensity: 0.1, ..all_off() };
        assert!(s.is_active(true));
        let s = VhsSettings { grain_intensity: 0.1, ..all_off() };
        assert!(s.is_active(true));
        let s = VhsSettings {
            stripe_noise_density: 0.1,
            stripe_noise_opacity: 0.1,
            ..all_off()
        };
        assert!(s.is_active(true));
    }

    #[test]
    fn test_noise_needs_density_and_opacity() {
        let s = VhsSettings { stripe_noise_density: 0.5, ..all_off() };
        assert!(!s.noise_enabled());
        assert!(!s.is_active(true));
        let s = VhsSettings { stripe_noise_opacity: 0.5, ..all_off() };
        assert!(!s.noise_enabled());
    }

    #[test]
    fn test_smear_alone_does_not_activate() {
        let s = VhsSettings { smear_intensity: 0.5, ..all_off() };
        assert!(s.smear_enabled());
        assert!(!s.is_active(true));
    }

    #[test]
    fn test_clamp_ranges() {
        let s = VhsSettings {
            smear_intensity: 1.0,
            grain_scale: 0.0,
            color_bleed_direction: -3.0,
            edge_distance: 0.01,
            ..VhsSettings::default()
        };
        let (c, changed) = s.clamp_report();
        assert_eq!(c.smear_intensity, 0.8);
        assert_eq!(c.grain_scale, 0.01);
        assert_eq!(c.color_bleed_direction, -1.0);
        assert_eq!(c.edge_distance, 0.005);
        assert_eq!(changed.len(), 4);
    }

    #[test]
    fn test_clamp_non_finite_uses_default() {
        let s = VhsSettings {
            color_bleed_radius: f32::NAN,
            grain_intensity: f32::INFINITY,
            ..VhsSettings::default()
        };
        let c = s.clamped();
        assert_eq!(c.color_bleed_radius, 0.5);
        assert_eq!(c.grain_intensity, 0.1);
    }

    #[test]
    fn test_clamp_in_range_is_unchanged() {
        let (c, changed) = VhsSettings::default().clamp_report();
        assert_eq!(c, VhsSettings::default());
        assert!(changed.is_empty());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let s: VhsSettings = serde_json::from_str(r#"{ "grain_intensity": 0.7 }"#).unwrap();
        assert_eq!(s.grain_intensity, 0.7);
        assert_eq!(s.edge_distance, 0.002);
    }
}
