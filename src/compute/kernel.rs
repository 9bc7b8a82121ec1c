//! Kernel generation and direct convolution (spec §4.1).
//!
//! A kernel is a dense, L1-normalised `S×S` weight grid generated from one
//! of several radial families. Convolution is direct (`O(W·H·S²)`) rather
//! than frequency-domain — the spec treats GPU/FFT acceleration as an
//! optional optimisation, not a correctness requirement, and direct
//! convolution is the form that admits both the wrap and no-wrap boundary
//! policies spec §4.5 requires bit-for-bit.

use crate::schema::{KernelConfig, KernelFamily};

/// Precomputed kernel grid ready for convolution.
#[derive(Debug, Clone)]
pub struct Kernel {
    /// 2D kernel values, row-major, size `size * size`.
    data: Vec<f32>,
    /// Side length `S = 2r + 1`.
    size: usize,
    /// Radius `r`.
    radius: usize,
}

impl Kernel {
    /// Generate a kernel from configuration (spec §4.1 "Construction").
    pub fn generate(config: &KernelConfig) -> Self {
        let radius = config.radius.max(1) as usize;
        let size = radius * 2 + 1;
        let center = radius as f32;

        let mut data = vec![0.0f32; size * size];

        if config.family == KernelFamily::Custom {
            if let Some(weights) = &config.custom_weights {
                let n = size * size;
                for (i, w) in weights.iter().take(n).enumerate() {
                    data[i] = *w;
                }
                return Self::normalized(data, size, radius);
            }
            // No weights supplied: fall through to gaussian (spec §9).
            return Self::generate(&KernelConfig {
                family: KernelFamily::Gaussian,
                ..config.clone()
            });
        }

        for y in 0..size {
            for x in 0..size {
                let dx = x as f32 - center;
                let dy = y as f32 - center;
                let dist = (dx * dx + dy * dy).sqrt();
                let d = dist / radius as f32;

                if d > 1.0 {
                    continue;
                }

                data[y * size + x] = evaluate_family(config.family, d, config);
            }
        }

        Self::normalized(data, size, radius)
    }

    fn normalized(mut data: Vec<f32>, size: usize, radius: usize) -> Self {
        let sum: f32 = data.iter().sum();
        if sum != 0.0 {
            let inv_sum = 1.0 / sum;
            for v in &mut data {
                *v *= inv_sum;
            }
        } else {
            data.fill(0.0);
        }
        Self { data, size, radius }
    }

    /// Side length `S = 2r + 1`.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Radius `r`.
    #[inline]
    pub fn radius(&self) -> usize {
        self.radius
    }

    /// Kernel weight at offset `(kx, ky)` in `[0, size)²`.
    #[inline]
    pub fn get(&self, kx: usize, ky: usize) -> f32 {
        self.data[ky * self.size + kx]
    }

    pub fn weights(&self) -> &[f32] {
        &self.data
    }

    /// Direct convolution: `input` and `output` must be `width * height`
    /// and must not alias (spec §9 "buffer swapping" — no in-place
    /// convolution). `wrap` selects the global boundary policy: wrapped
    /// out-of-range samples, or zero contribution when disabled (spec
    /// §4.1, §4.5).
    pub fn convolve(&self, input: &[f32], output: &mut [f32], width: usize, height: usize, wrap: bool) {
        debug_assert_eq!(input.len(), width * height);
        debug_assert_eq!(output.len(), width * height);

        let r = self.radius as i64;
        let size = self.size;

        for y in 0..height {
            for x in 0..width {
                let mut sum = 0.0f32;

                for ky in 0..size {
                    let dy = ky as i64 - r;
                    let sy = y as i64 + dy;
                    let sy = if wrap {
                        Some(wrap_coord(sy, height))
                    } else if sy >= 0 && (sy as usize) < height {
                        Some(sy as usize)
                    } else {
                        None
                    };
                    let Some(sy) = sy else { continue };

                    for kx in 0..size {
                        let w = self.data[ky * size + kx];
                        if w == 0.0 {
                            continue;
                        }
                        let dx = kx as i64 - r;
                        let sx = x as i64 + dx;
                        let sx = if wrap {
                            Some(wrap_coord(sx, width))
                        } else if sx >= 0 && (sx as usize) < width {
                            Some(sx as usize)
                        } else {
                            None
                        };
                        let Some(sx) = sx else { continue };

                        sum += input[sy * width + sx] * w;
                    }
                }

                output[y * width + x] = sum;
            }
        }
    }
}

fn evaluate_family(family: KernelFamily, d: f32, config: &KernelConfig) -> f32 {
    let beta0 = config.beta.first().copied().unwrap_or(0.5);
    match family {
        KernelFamily::Gaussian => {
            let sigma = 1.0 / config.alpha;
            let diff = d - beta0;
            (-(diff * diff) / (2.0 * sigma * sigma)).exp()
        }
        KernelFamily::Polynomial => {
            let k = (config.peaks as usize).max(1);
            if k <= 1 || config.beta.len() <= 1 {
                let t = (d - beta0) * config.alpha;
                (1.0 - t * t).max(0.0)
            } else {
                let n = k.min(config.beta.len());
                let sum: f32 = config.beta[..n]
                    .iter()
                    .map(|&b| {
                        let t = (d - b) * config.alpha;
                        (1.0 - t * t).max(0.0)
                    })
                    .sum();
                sum / n as f32
            }
        }
        KernelFamily::Exponential => (-config.alpha * (d - beta0).abs()).exp(),
        KernelFamily::Donut => {
            let beta1 = config.beta.get(1).copied().unwrap_or(0.2);
            let dist = (d - beta0).abs();
            if dist > beta1 {
                0.0
            } else {
                1.0 - dist / beta1
            }
        }
        KernelFamily::Custom => unreachable!("custom handled before evaluate_family"),
    }
}

/// Wrap an arbitrary (possibly negative) coordinate into `[0, size)`.
#[inline]
pub fn wrap_coord(coord: i64, size: usize) -> usize {
    let s = size as i64;
    (((coord % s) + s) % s) as usize
}
