//! Configuration types for the Flow-Lenia substrate.

use serde::{Deserialize, Serialize};

fn default_width() -> usize {
    256
}
fn default_height() -> usize {
    256
}
fn default_resolution() -> f32 {
    4.0
}
fn default_dt() -> f32 {
    0.1
}
fn default_steps_per_tick() -> u32 {
    1
}
fn default_wrap() -> bool {
    true
}
fn default_peaks() -> u32 {
    1
}

/// Top-level substrate configuration.
///
/// Constructed by merging a caller-supplied partial config over
/// [`SubstrateConfig::default`] (see [`SubstrateConfig::merged`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubstrateConfig {
    /// Grid width in cells.
    #[serde(default = "default_width")]
    pub width: usize,
    /// Grid height in cells.
    #[serde(default = "default_height")]
    pub height: usize,
    /// Cells per world unit, used by `sense_at`/`deposit_at` coordinate conversion.
    #[serde(default = "default_resolution")]
    pub resolution: f32,
    /// Integration time step.
    #[serde(default = "default_dt")]
    pub dt: f32,
    /// Internal steps performed per public `update()` call.
    #[serde(default = "default_steps_per_tick")]
    pub steps_per_tick: u32,
    /// Toroidal boundary policy, applied globally.
    #[serde(default = "default_wrap")]
    pub wrap_boundary: bool,
    /// Per-channel configuration.
    pub channels: Vec<ChannelConfig>,
    /// Convolution kernels, indexed by `ChannelConfig::kernel_index`.
    pub kernels: Vec<KernelConfig>,
    /// Growth functions, indexed by `ChannelConfig::growth_index`.
    pub growths: Vec<GrowthConfig>,
    /// Flow field configuration.
    #[serde(default)]
    pub flow: FlowConfig,
}

impl Default for SubstrateConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            resolution: default_resolution(),
            dt: default_dt(),
            steps_per_tick: default_steps_per_tick(),
            wrap_boundary: default_wrap(),
            channels: vec![
                ChannelConfig {
                    name: "density".into(),
                    min_value: 0.0,
                    max_value: 1.0,
                    decay_rate: 0.0,
                    diffusion_rate: 0.01,
                    kernel_index: 0,
                    growth_index: 0,
                },
                ChannelConfig {
                    name: "pheromone_a".into(),
                    min_value: 0.0,
                    max_value: 1.0,
                    decay_rate: 0.01,
                    diffusion_rate: 0.05,
                    kernel_index: 0,
                    growth_index: 0,
                },
                ChannelConfig {
                    name: "pheromone_b".into(),
                    min_value: 0.0,
                    max_value: 1.0,
                    decay_rate: 0.01,
                    diffusion_rate: 0.05,
                    kernel_index: 0,
                    growth_index: 0,
                },
            ],
            kernels: vec![KernelConfig::default()],
            growths: vec![GrowthConfig::default()],
            flow: FlowConfig::default(),
        }
    }
}

impl SubstrateConfig {
    /// Merge a caller-supplied partial config atop the default. Rust has
    /// no native partial-struct literal, so callers override fields on a
    /// `SubstrateConfig::default()` directly; this free function exists
    /// for the `Option<SubstrateConfig>` constructor surface used by
    /// `Substrate::new`.
    pub fn merged(partial: Option<SubstrateConfig>) -> SubstrateConfig {
        partial.unwrap_or_default()
    }

    /// Validate structural invariants from spec §3: channel kernel/growth
    /// indices must be in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidDimensions);
        }
        if self.channels.is_empty() {
            return Err(ConfigError::InvalidChannels);
        }
        for (i, ch) in self.channels.iter().enumerate() {
            if ch.kernel_index >= self.kernels.len() {
                return Err(ConfigError::InvalidKernelIndex {
                    channel: i,
                    index: ch.kernel_index,
                });
            }
            if ch.growth_index >= self.growths.len() {
                return Err(ConfigError::InvalidGrowthIndex {
                    channel: i,
                    index: ch.growth_index,
                });
            }
        }
        Ok(())
    }
}

/// Per-channel configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Informational name, not used in computation.
    #[serde(default)]
    pub name: String,
    /// Clamp range minimum.
    pub min_value: f32,
    /// Clamp range maximum.
    pub max_value: f32,
    /// Fraction of value lost per unit time, in `[0, 1]`.
    pub decay_rate: f32,
    /// Blend weight toward neighbour average per unit time, in `[0, 1]`.
    pub diffusion_rate: f32,
    /// Index into `SubstrateConfig::kernels`.
    pub kernel_index: usize,
    /// Index into `SubstrateConfig::growths`.
    pub growth_index: usize,
}

/// Radial family used to generate a [`crate::compute::Kernel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KernelFamily {
    Gaussian,
    Polynomial,
    Exponential,
    Donut,
    Custom,
}

/// Configuration for a single kernel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KernelConfig {
    pub family: KernelFamily,
    /// Integer radius `r >= 1`; side length is `2r+1`.
    pub radius: u32,
    /// Peak positions `β`.
    pub beta: Vec<f32>,
    /// Sharpness `α > 0`.
    pub alpha: f32,
    /// Ring count for polynomial-with-multiple-peaks; ignored otherwise.
    #[serde(default = "default_peaks")]
    pub peaks: u32,
    /// Pre-computed weights for `KernelFamily::Custom`; normalised like
    /// any other kernel. If absent when `family == Custom`, falls back
    /// to `Gaussian` (spec §9 "custom fallthrough").
    #[serde(default)]
    pub custom_weights: Option<Vec<f32>>,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            family: KernelFamily::Gaussian,
            radius: 13,
            beta: vec![0.5],
            alpha: 4.0,
            peaks: 1,
            custom_weights: None,
        }
    }
}

/// Scalar non-linearity family used by [`crate::compute::GrowthFn`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthFamily {
    Gaussian,
    Polynomial,
    Step,
}

/// Configuration for a growth function.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrowthConfig {
    pub family: GrowthFamily,
    /// Centre `μ`.
    pub mu: f32,
    /// Width `σ`.
    pub sigma: f32,
    /// Amplitude `A`; output is scaled to `[-A, A]`.
    pub amplitude: f32,
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            family: GrowthFamily::Gaussian,
            mu: 0.15,
            sigma: 0.015,
            amplitude: 1.0,
        }
    }
}

/// Flow field configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowConfig {
    pub enabled: bool,
    /// Viscosity diffusion weight, in `[0, 1]`.
    pub viscosity: f32,
    /// Reserved field — declared but unused in the step logic, per spec.
    #[serde(default)]
    pub diffusion: f32,
    /// Semi-Lagrangian advection blend weight, in `[0, 1]`.
    pub advection_strength: f32,
    /// Velocity decay multiplier applied each step, in `[0, 1]`.
    pub velocity_decay: f32,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            viscosity: 0.1,
            diffusion: 0.0,
            advection_strength: 0.5,
            velocity_decay: 0.95,
        }
    }
}

/// Named starting configurations (spec §4.3 "Preset construction").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    Empty,
    Noise,
    Blob,
    Orbium,
    Geminium,
}

/// Falloff shape for a deposit operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Falloff {
    #[default]
    Constant,
    Linear,
    Gaussian,
}

/// Configuration validation errors (spec §7 "invalid-configuration").
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("grid dimensions (width, height) must be non-zero")]
    InvalidDimensions,
    #[error("channel count must be non-zero")]
    InvalidChannels,
    #[error("channel {channel} references invalid kernel index {index}")]
    InvalidKernelIndex { channel: usize, index: usize },
    #[error("channel {channel} references invalid growth index {index}")]
    InvalidGrowthIndex { channel: usize, index: usize },
}
