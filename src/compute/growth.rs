//! Growth function for the Flow-Lenia substrate (spec §4.2).
//!
//! Pure pointwise, stateless: maps a convolved potential in (roughly)
//! `[0, 1]` to a signed growth rate in `[-A, A]`.

use crate::schema::{GrowthConfig, GrowthFamily};

/// A growth non-linearity bound to one configuration.
#[derive(Debug, Clone)]
pub struct GrowthFn {
    family: GrowthFamily,
    mu: f32,
    sigma: f32,
    amplitude: f32,
}

impl GrowthFn {
    pub fn new(config: &GrowthConfig) -> Self {
        Self {
            family: config.family,
            mu: config.mu,
            sigma: config.sigma,
            amplitude: config.amplitude,
        }
    }

    /// Evaluate at a single potential value `u`. Output is in
    /// `[-amplitude, amplitude]`.
    #[inline]
    pub fn apply(&self, u: f32) -> f32 {
        let g = match self.family {
            GrowthFamily::Gaussian => {
                let diff = u - self.mu;
                (-(diff * diff) / (2.0 * self.sigma * self.sigma)).exp()
            }
            GrowthFamily::Polynomial => {
                let t = (u - self.mu) / self.sigma;
                (1.0 - t * t).max(0.0)
            }
            GrowthFamily::Step => {
                if (u - self.mu).abs() <= self.sigma {
                    1.0
                } else {
                    0.0
                }
            }
        };
        (2.0 * g - 1.0) * self.amplitude
    }

    /// Apply pointwise over `input`, writing into `output` (same length).
    pub fn apply_grid(&self, input: &[f32], output: &mut [f32]) {
        debug_assert_eq!(input.len(), output.len());
        for (o, &i) in output.iter_mut().zip(input.iter()) {
            *o = self.apply(i);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gaussian(mu: f32, sigma: f32, amplitude: f32) -> GrowthFn {
        GrowthFn::new(&GrowthConfig {
            family: GrowthFamily::Gaussian,
            mu,
            sigma,
            amplitude,
        })
    }

    #[test]
    fn gaussian_peaks_at_mu() {
        let g = gaussian(0.15, 0.015, 1.0);
        let v = g.apply(0.15);
        assert!((v - 1.0).abs() < 1e-5, "got {v}");
    }

    #[test]
    fn gaussian_far_from_mu_approaches_negative_amplitude() {
        let g = gaussian(0.15, 0.015, 1.0);
        let v = g.apply(1.0);
        assert!((v - (-1.0)).abs() < 1e-2, "got {v}");
    }

    #[test]
    fn gaussian_symmetric_around_mu() {
        let g = gaussian(0.5, 0.1, 1.0);
        let left = g.apply(0.4);
        let right = g.apply(0.6);
        assert!((left - right).abs() < 1e-6);
    }

    #[test]
    fn output_bounded_by_amplitude() {
        let g = gaussian(0.5, 0.1, 0.7);
        for i in 0..1000 {
            let u = i as f32 * 0.01 - 5.0;
            let v = g.apply(u);
            assert!(
                v >= -0.7 - 1e-6 && v <= 0.7 + 1e-6,
                "growth {v} out of range for u={u}"
            );
        }
    }

    #[test]
    fn polynomial_peaks_at_mu_and_zero_at_edge() {
        let g = GrowthFn::new(&GrowthConfig {
            family: GrowthFamily::Polynomial,
            mu: 0.5,
            sigma: 0.2,
            amplitude: 1.0,
        });
        assert!((g.apply(0.5) - 1.0).abs() < 1e-6);
        // at u - mu = sigma, (u-mu)/sigma = 1, g=0 -> output = -amplitude
        assert!((g.apply(0.7) - (-1.0)).abs() < 1e-5);
    }

    #[test]
    fn step_is_binary() {
        let g = GrowthFn::new(&GrowthConfig {
            family: GrowthFamily::Step,
            mu: 0.5,
            sigma: 0.1,
            amplitude: 1.0,
        });
        assert_eq!(g.apply(0.5), 1.0);
        assert_eq!(g.apply(0.55), 1.0);
        assert_eq!(g.apply(0.7), -1.0);
    }

    #[test]
    fn apply_grid_matches_scalar() {
        let g = gaussian(0.15, 0.015, 1.0);
        let input: Vec<f32> = (0..100).map(|i| i as f32 * 0.01).collect();
        let mut output = vec![0.0f32; 100];
        g.apply_grid(&input, &mut output);
        for (i, &u) in input.iter().enumerate() {
            assert!((output[i] - g.apply(u)).abs() < 1e-6);
        }
    }

    #[test]
    fn zero_amplitude_is_identically_zero() {
        let g = gaussian(0.15, 0.015, 0.0);
        for i in 0..50 {
            let u = i as f32 * 0.02;
            assert_eq!(g.apply(u), 0.0);
        }
    }
}
