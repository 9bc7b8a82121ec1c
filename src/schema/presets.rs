//! Named starting configurations (spec §4.3 "Presets").
//!
//! Each preset seeds channel 0 of a freshly constructed substrate; the
//! `orbium` and `geminium` presets additionally override the growth
//! function bound to growth index 0 so the shape is stable under the
//! default kernel (spec §9 "preset growth overrides").

use crate::rng::Rng;
use crate::schema::{GrowthConfig, GrowthFamily, Preset, SubstrateConfig};

/// Seed channel 0 of a `width * height` flat buffer for `preset`.
/// `Preset::Empty` leaves the buffer untouched (all zero).
pub fn seed_channel(preset: Preset, width: usize, height: usize, rng: &mut dyn Rng) -> Vec<f32> {
    let mut buf = vec![0.0f32; width * height];
    match preset {
        Preset::Empty => {}
        Preset::Noise => seed_noise(&mut buf, width, height, rng),
        Preset::Blob => seed_blob(&mut buf, width, height),
        Preset::Orbium => seed_orbium(&mut buf, width, height),
        Preset::Geminium => seed_geminium(&mut buf, width, height),
    }
    buf
}

/// Apply the preset's growth override to `growths[0]`, if any (spec §4.3
/// "Preset growth overrides" — `orbium` and `geminium` tune `mu`/`sigma`
/// to the shape they seed; the other presets leave the default growth
/// configuration untouched).
pub fn apply_growth_override(config: &mut SubstrateConfig, preset: Preset) {
    let Some(growth) = config.growths.first_mut() else {
        return;
    };
    match preset {
        Preset::Orbium => {
            growth.family = GrowthFamily::Gaussian;
            growth.mu = 0.15;
            growth.sigma = 0.015;
        }
        Preset::Geminium => {
            growth.family = GrowthFamily::Gaussian;
            growth.mu = 0.27;
            growth.sigma = 0.02;
        }
        Preset::Empty | Preset::Noise | Preset::Blob => {}
    }
}

/// Uniform random noise in `[0, 0.5]` (spec §4.3 "noise").
fn seed_noise(buf: &mut [f32], width: usize, height: usize, rng: &mut dyn Rng) {
    for y in 0..height {
        for x in 0..width {
            buf[y * width + x] = rng.next_f32() * 0.5;
        }
    }
}

/// A single disc, linearly decaying from `1.0` at the centre to `0.0` at
/// radius 20, centred on the grid (spec §4.3 "blob").
fn seed_blob(buf: &mut [f32], width: usize, height: usize) {
    let cx = width as f32 / 2.0;
    let cy = height as f32 / 2.0;
    let radius = 20.0f32;
    for y in 0..height {
        for x in 0..width {
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            let dist = (dx * dx + dy * dy).sqrt();
            if dist <= radius {
                buf[y * width + x] = (1.0 - dist / radius).max(0.0);
            }
        }
    }
}

/// Gaussian-weighted asymmetric blob, `exp(-2r²) * (1 + 0.3 cos θ)`,
/// radius 15, centred on the grid (spec §4.3 "orbium").
fn seed_orbium(buf: &mut [f32], width: usize, height: usize) {
    let cx = width as f32 / 2.0;
    let cy = height as f32 / 2.0;
    let radius = 15.0f32;
    for y in 0..height {
        for x in 0..width {
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            let r = (dx * dx + dy * dy).sqrt() / radius;
            if r > 1.0 {
                continue;
            }
            let theta = dy.atan2(dx);
            let value = (-2.0 * r * r).exp() * (1.0 + 0.3 * theta.cos());
            buf[y * width + x] = value.max(0.0);
        }
    }
}

/// Two `orbium` blobs offset `±10` cells along the x-axis from centre
/// (spec §4.3 "geminium").
fn seed_geminium(buf: &mut [f32], width: usize, height: usize) {
    let cy = height as f32 / 2.0;
    let radius = 15.0f32;
    let offset = 10.0f32;
    for &cx in &[width as f32 / 2.0 - offset, width as f32 / 2.0 + offset] {
        for y in 0..height {
            for x in 0..width {
                let dx = x as f32 - cx;
                let dy = y as f32 - cy;
                let r = (dx * dx + dy * dy).sqrt() / radius;
                if r > 1.0 {
                    continue;
                }
                let theta = dy.atan2(dx);
                let value = (-2.0 * r * r).exp() * (1.0 + 0.3 * theta.cos());
                let i = y * width + x;
                buf[i] = (buf[i] + value.max(0.0)).min(1.0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::Mulberry32;

    #[test]
    fn empty_preset_is_all_zero() {
        let mut rng = Mulberry32::new(1);
        let buf = seed_channel(Preset::Empty, 16, 16, &mut rng);
        assert!(buf.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn noise_preset_bounded_and_reproducible() {
        let mut rng_a = Mulberry32::new(5);
        let mut rng_b = Mulberry32::new(5);
        let a = seed_channel(Preset::Noise, 16, 16, &mut rng_a);
        let b = seed_channel(Preset::Noise, 16, 16, &mut rng_b);
        assert_eq!(a, b);
        assert!(a.iter().all(|&v| (0.0..=0.5).contains(&v)));
    }

    #[test]
    fn blob_preset_peaks_at_center() {
        let mut rng = Mulberry32::new(1);
        let buf = seed_channel(Preset::Blob, 64, 64, &mut rng);
        let center = buf[32 * 64 + 32];
        assert!((center - 1.0).abs() < 1e-5, "center={center}");
        assert_eq!(buf[0], 0.0);
    }

    #[test]
    fn orbium_preset_peaks_near_center() {
        let mut rng = Mulberry32::new(1);
        let buf = seed_channel(Preset::Orbium, 64, 64, &mut rng);
        let center = buf[32 * 64 + 32];
        let corner = buf[0];
        assert!(center > corner);
        assert!(center > 0.5, "center={center}");
    }

    #[test]
    fn geminium_preset_has_two_lobes() {
        let mut rng = Mulberry32::new(1);
        let buf = seed_channel(Preset::Geminium, 64, 64, &mut rng);
        let left = buf[32 * 64 + 22];
        let right = buf[32 * 64 + 42];
        let center = buf[32 * 64 + 32];
        assert!(left > 0.3, "left={left}");
        assert!(right > 0.3, "right={right}");
        // The dead zone between lobes should be lower than either peak.
        assert!(center <= left.max(right) + 1e-3);
    }

    #[test]
    fn growth_override_applies_only_to_growth_index_zero() {
        let mut config = SubstrateConfig::default();
        config.growths.push(GrowthConfig {
            family: GrowthFamily::Step,
            mu: 0.9,
            sigma: 0.1,
            amplitude: 1.0,
        });
        apply_growth_override(&mut config, Preset::Orbium);
        assert_eq!(config.growths[0].mu, 0.15);
        assert_eq!(config.growths[1].mu, 0.9);
    }
}
