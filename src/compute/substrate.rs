//! The substrate orchestrator (spec §4, §5, §7).
//!
//! Owns one double-buffered [`Field`] per channel plus a shared
//! convolution scratch buffer and a [`FlowField`]. `update()` runs
//! `steps_per_tick` internal steps; each internal step convolves every
//! channel, applies growth/decay/diffusion/advection, updates the flow
//! field from the pre-swap primary channel, and only then swaps every
//! buffer — so no channel within a step ever reads another channel's
//! post-update value.

use log::{debug, info, log_enabled, Level};
use serde::{Deserialize, Serialize};

use super::field::Field;
use super::flow::FlowField;
use super::growth::GrowthFn;
use super::kernel::Kernel;
use crate::error::SubstrateError;
use crate::rng::Rng;
use crate::schema::{self, Falloff, Preset, SubstrateConfig};

/// Aggregate statistics recomputed once per [`Substrate::update`] call
/// (spec §6.2 "Stats").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub total_mass: Vec<f32>,
    pub max_value: Vec<f32>,
    pub mean_value: Vec<f32>,
    pub flow_energy: f32,
    pub update_time_ms: f32,
    pub tick_count: u64,
}

/// Falloff-shaped deposit request (spec §4.3 "deposit_at").
#[derive(Debug, Clone, Copy)]
pub struct Deposit {
    pub channel: usize,
    pub amount: f32,
    pub radius: f32,
    pub falloff: Falloff,
}

/// A bilinear sample of one channel: value, central-difference gradient,
/// and the flow velocity at that point (spec §4.3 "sense_at").
#[derive(Debug, Clone, Copy, Default)]
pub struct Sense {
    pub value: f32,
    pub gradient: (f32, f32),
    pub flow: (f32, f32),
}

/// On-disk/wire representation (spec §6.2 "Serialization wire format").
/// `velocity_x`/`velocity_y` are present iff `config.flow.enabled`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Wire {
    config: SubstrateConfig,
    channels: Vec<Vec<f32>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    velocity_x: Option<Vec<f32>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    velocity_y: Option<Vec<f32>>,
    stats: Stats,
}

/// The Flow-Lenia cellular substrate.
pub struct Substrate {
    config: SubstrateConfig,
    kernels: Vec<Kernel>,
    growths: Vec<GrowthFn>,

    channels: Vec<Field>,
    channels_back: Vec<Field>,
    scratch: Field,

    flow: FlowField,
    stats: Stats,
    tick_count: u64,
}

impl Substrate {
    /// Construct a substrate from a (partial, merged-over-default)
    /// configuration (spec §4.3 "new").
    pub fn new(config: Option<SubstrateConfig>) -> Self {
        let config = SubstrateConfig::merged(config);
        config
            .validate()
            .expect("invalid substrate configuration; see SubstrateConfig::validate");
        Self::build(config, Vec::new())
    }

    /// Construct a substrate from a named preset, optionally overriding
    /// the base configuration first (spec §4.3 "new_from_preset").
    pub fn new_from_preset(preset: Preset, config: Option<SubstrateConfig>, rng: &mut dyn Rng) -> Self {
        let mut config = SubstrateConfig::merged(config);
        schema::apply_growth_override(&mut config, preset);
        config
            .validate()
            .expect("invalid substrate configuration; see SubstrateConfig::validate");

        let width = config.width;
        let height = config.height;
        let mut channel_data: Vec<Vec<f32>> = config
            .channels
            .iter()
            .map(|_| vec![0.0; width * height])
            .collect();
        if let Some(first) = channel_data.first_mut() {
            *first = schema::seed_channel(preset, width, height, rng);
        }

        info!(
            "constructing substrate from preset {:?} ({}x{}, {} channels)",
            preset,
            width,
            height,
            config.channels.len()
        );
        Self::build(config, channel_data)
    }

    fn build(config: SubstrateConfig, initial: Vec<Vec<f32>>) -> Self {
        let width = config.width;
        let height = config.height;

        let kernels: Vec<Kernel> = config.kernels.iter().map(Kernel::generate).collect();
        let growths: Vec<GrowthFn> = config.growths.iter().map(GrowthFn::new).collect();

        let mut channels: Vec<Field> = Vec::with_capacity(config.channels.len());
        for (i, _ch) in config.channels.iter().enumerate() {
            let mut field = Field::zeros(width, height);
            if let Some(data) = initial.get(i) {
                field.as_mut_slice().copy_from_slice(&data[..width * height]);
            }
            channels.push(field);
        }
        let channels_back: Vec<Field> = (0..channels.len())
            .map(|_| Field::zeros(width, height))
            .collect();

        info!(
            "substrate constructed: {}x{} grid, {} channels",
            width,
            height,
            channels.len()
        );

        let n = channels.len();
        Self {
            config,
            kernels,
            growths,
            channels,
            channels_back,
            scratch: Field::zeros(width, height),
            flow: FlowField::zeros(width, height),
            stats: Stats {
                total_mass: vec![0.0; n],
                max_value: vec![0.0; n],
                mean_value: vec![0.0; n],
                flow_energy: 0.0,
                update_time_ms: 0.0,
                tick_count: 0,
            },
            tick_count: 0,
        }
    }

    /// Reset every channel and the flow field to zero, preserving
    /// configuration and tick count (spec §4.3 "clear").
    pub fn clear(&mut self) {
        for field in self.channels.iter_mut().chain(self.channels_back.iter_mut()) {
            field.fill(0.0);
        }
        self.flow = FlowField::zeros(self.config.width, self.config.height);
    }

    /// Overwrite `channel` with uniform noise in `[0, max_value]`, clamped
    /// to the channel's configured range (spec §6.1 "initialize_noise",
    /// §8 invariant 1). Out-of-range channel is a silent no-op.
    pub fn initialize_noise(&mut self, channel: usize, max_value: f32, rng: &mut dyn Rng) {
        let Some(ch_config) = self.config.channels.get(channel) else {
            return;
        };
        let (min_v, max_v) = (ch_config.min_value, ch_config.max_value);
        if let Some(field) = self.channels.get_mut(channel) {
            for v in field.as_mut_slice() {
                *v = (rng.next_f32() * max_value).clamp(min_v, max_v);
            }
        }
    }

    /// Add a linearly-decaying disc of unit peak amplitude, centred at
    /// `(cx, cy)` in cell coordinates, to `channel` (spec §6.1
    /// "initialize_blob", shape per §4.3 "blob" preset). Out-of-range
    /// channel is a silent no-op.
    pub fn initialize_blob(&mut self, channel: usize, cx: f32, cy: f32, radius: f32) {
        let Some(field) = self.channels.get_mut(channel) else {
            return;
        };
        let width = field.width();
        let height = field.height();
        let min_v = self.config.channels[channel].min_value;
        let max_v = self.config.channels[channel].max_value;
        for y in 0..height {
            for x in 0..width {
                let dx = x as f32 - cx;
                let dy = y as f32 - cy;
                let dist = (dx * dx + dy * dy).sqrt();
                if dist <= radius {
                    let add = (1.0 - dist / radius).max(0.0);
                    let idx = y * width + x;
                    let v = (field.as_slice()[idx] + add).clamp(min_v, max_v);
                    field.as_mut_slice()[idx] = v;
                }
            }
        }
    }

    /// Run `steps_per_tick` internal integration steps, then recompute
    /// [`Stats`] once (spec §5 "update").
    pub fn update(&mut self) {
        let start = std::time::Instant::now();
        for _ in 0..self.config.steps_per_tick {
            self.step();
        }
        self.tick_count += 1;
        self.recompute_stats(start.elapsed().as_secs_f32() * 1000.0);

        if log_enabled!(Level::Debug) {
            debug!(
                "tick {} complete: mass={:?} flow_energy={:.4}",
                self.tick_count, self.stats.total_mass, self.stats.flow_energy
            );
        }
    }

    /// One internal integration step (spec §4.3 "Per-step algorithm").
    fn step(&mut self) {
        let width = self.config.width;
        let height = self.config.height;
        let wrap = self.config.wrap_boundary;
        let dt = self.config.dt;

        // 1. For each channel: convolve `in` into scratch, then for every
        // cell apply growth, decay, diffusion, and (if enabled) advection,
        // in that order, reading only pre-swap ("current") data throughout.
        let flow_enabled = self.config.flow.enabled;
        for (i, ch_config) in self.config.channels.iter().enumerate() {
            let kernel = &self.kernels[ch_config.kernel_index];
            let growth = &self.growths[ch_config.growth_index];
            let read = self.channels[i].as_slice();

            kernel.convolve(read, self.scratch.as_mut_slice(), width, height, wrap);

            let min_v = ch_config.min_value;
            let max_v = ch_config.max_value;

            for y in 0..height {
                for x in 0..width {
                    let idx = y * width + x;

                    let g = growth.apply(self.scratch.as_slice()[idx]);
                    let mut v = read[idx] + g * dt;
                    v *= 1.0 - ch_config.decay_rate * dt;

                    if ch_config.diffusion_rate > 0.0 {
                        let avg = super::field::neighbour_average(read, width, height, x, y, wrap);
                        v += (avg - v) * ch_config.diffusion_rate * dt;
                    }

                    if flow_enabled {
                        v = self
                            .flow
                            .advect_cell(read, x, y, v, self.config.flow.advection_strength, dt, wrap);
                    }

                    self.channels_back[i].as_mut_slice()[idx] = v.clamp(min_v, max_v);
                }
            }
        }

        // 2. Update flow velocity from the pre-swap primary channel.
        if flow_enabled {
            if let Some(primary) = self.channels.first() {
                self.flow
                    .update_velocity(primary.as_slice(), &self.config.flow, dt, wrap);
            }
        }

        // 3. Swap everything atomically.
        for i in 0..self.channels.len() {
            std::mem::swap(&mut self.channels[i], &mut self.channels_back[i]);
        }
        if self.config.flow.enabled {
            self.flow.swap();
        }
    }

    fn recompute_stats(&mut self, update_time_ms: f32) {
        for (i, field) in self.channels.iter().enumerate() {
            let data = field.as_slice();
            let total: f32 = data.iter().sum();
            let max = data.iter().cloned().fold(f32::MIN, f32::max);
            let mean = total / data.len() as f32;
            self.stats.total_mass[i] = total;
            self.stats.max_value[i] = max;
            self.stats.mean_value[i] = mean;
        }
        self.stats.flow_energy = self.flow.kinetic_energy();
        self.stats.update_time_ms = update_time_ms;
        self.stats.tick_count = self.tick_count;
    }

    /// Bilinear value, central-difference gradient, and flow velocity of
    /// every channel at world coordinates `(wx, wy)` (spec §4.3
    /// "sense_at"). World coordinates are converted to cell coordinates
    /// via `resolution`.
    pub fn sense_at(&self, wx: f32, wy: f32) -> Vec<Sense> {
        let fx = wx * self.config.resolution;
        let fy = wy * self.config.resolution;
        let wrap = self.config.wrap_boundary;
        let width = self.config.width;
        let height = self.config.height;

        const EPS: f32 = 0.5;
        self.channels
            .iter()
            .map(|field| {
                let data = field.as_slice();
                let value = super::field::bilinear_sample(data, width, height, fx, fy, wrap);
                let gx = (super::field::bilinear_sample(data, width, height, fx + EPS, fy, wrap)
                    - super::field::bilinear_sample(data, width, height, fx - EPS, fy, wrap))
                    / (2.0 * EPS);
                let gy = (super::field::bilinear_sample(data, width, height, fx, fy + EPS, wrap)
                    - super::field::bilinear_sample(data, width, height, fx, fy - EPS, wrap))
                    / (2.0 * EPS);
                let vx = super::field::bilinear_sample(self.flow.vx(), width, height, fx, fy, wrap);
                let vy = super::field::bilinear_sample(self.flow.vy(), width, height, fx, fy, wrap);
                Sense {
                    value,
                    gradient: (gx, gy),
                    flow: (vx, vy),
                }
            })
            .collect()
    }

    /// Write `deposit.amount` directly into the READ buffer of
    /// `deposit.channel`, shaped by `deposit.falloff` over `deposit.radius`
    /// cells, centred at world coordinates `(wx, wy)` (spec §4.3
    /// "deposit_at"). A channel index out of range is a silent no-op.
    pub fn deposit_at(&mut self, wx: f32, wy: f32, deposit: Deposit) {
        let Some(field) = self.channels.get_mut(deposit.channel) else {
            return;
        };
        let ch_config = &self.config.channels[deposit.channel];
        let width = field.width();
        let height = field.height();
        let wrap = self.config.wrap_boundary;
        let resolution = self.config.resolution;

        let cx = wx * resolution;
        let cy = wy * resolution;
        let radius = deposit.radius * resolution;
        if radius <= 0.0 {
            return;
        }
        let min_v = ch_config.min_value;
        let max_v = ch_config.max_value;

        let r_cells = radius.ceil() as i64;
        let cxi = cx.floor() as i64;
        let cyi = cy.floor() as i64;

        for dy in -r_cells..=r_cells {
            for dx in -r_cells..=r_cells {
                let x = cxi + dx;
                let y = cyi + dy;
                let fdx = x as f32 - cx;
                let fdy = y as f32 - cy;
                let dist = (fdx * fdx + fdy * fdy).sqrt();
                if dist > radius {
                    continue;
                }
                let weight = match deposit.falloff {
                    Falloff::Constant => 1.0,
                    Falloff::Linear => (1.0 - dist / radius).max(0.0),
                    Falloff::Gaussian => {
                        let sigma = radius / 2.0;
                        (-(dist * dist) / (2.0 * sigma * sigma)).exp()
                    }
                };
                let add = deposit.amount * weight;
                if add == 0.0 {
                    continue;
                }
                let current = field.get(x, y, wrap);
                let updated = (current + add).clamp(min_v, max_v);
                field.set(x, y, updated, min_v, max_v, wrap);
            }
        }
    }

    /// Floor-indexed read of one channel cell (spec §4.3
    /// "get_channel_at" — nearest/floor sampling, not bilinear).
    pub fn get_channel_at(&self, channel: usize, x: i64, y: i64) -> f32 {
        match self.channels.get(channel) {
            Some(field) => field.get(x, y, self.config.wrap_boundary),
            None => 0.0,
        }
    }

    /// Floor-indexed write of one channel cell, clamped to the channel's
    /// configured range (spec §4.3 "set_channel_at").
    pub fn set_channel_at(&mut self, channel: usize, x: i64, y: i64, value: f32) {
        let wrap = self.config.wrap_boundary;
        let Some(ch_config) = self.config.channels.get(channel) else {
            return;
        };
        let (min_v, max_v) = (ch_config.min_value, ch_config.max_value);
        if let Some(field) = self.channels.get_mut(channel) {
            field.set(x, y, value, min_v, max_v, wrap);
        }
    }

    /// A defensive copy of one channel's full buffer (spec §4.3
    /// "get_channel_data").
    pub fn get_channel_data(&self, channel: usize) -> Option<Vec<f32>> {
        self.channels.get(channel).map(|f| f.as_slice().to_vec())
    }

    /// A raw borrow of one channel's full buffer, avoiding the copy
    /// (spec §4.3 "get_channel_data_raw").
    pub fn get_channel_data_raw(&self, channel: usize) -> Option<&[f32]> {
        self.channels.get(channel).map(|f| f.as_slice())
    }

    /// `(vx, vy)` defensive copies of the flow field (spec §4.3
    /// "get_flow_data").
    pub fn get_flow_data(&self) -> (Vec<f32>, Vec<f32>) {
        (self.flow.vx().to_vec(), self.flow.vy().to_vec())
    }

    pub fn get_stats(&self) -> &Stats {
        &self.stats
    }

    pub fn get_dimensions(&self) -> (usize, usize) {
        (self.config.width, self.config.height)
    }

    pub fn get_resolution(&self) -> f32 {
        self.config.resolution
    }

    pub fn get_config(&self) -> &SubstrateConfig {
        &self.config
    }

    /// Serialize to the documented JSON wire format (spec §6.2).
    pub fn to_json(&self) -> String {
        let (velocity_x, velocity_y) = if self.config.flow.enabled {
            (Some(self.flow.vx().to_vec()), Some(self.flow.vy().to_vec()))
        } else {
            (None, None)
        };
        let wire = Wire {
            config: self.config.clone(),
            channels: self.channels.iter().map(|f| f.as_slice().to_vec()).collect(),
            velocity_x,
            velocity_y,
            stats: self.stats.clone(),
        };
        serde_json::to_string(&wire).expect("Wire serialization is infallible for owned data")
    }

    /// Deserialize from the documented JSON wire format, restoring the
    /// full stats record (round-trip law, spec §8). Channel arrays are
    /// length-reconciled against `width * height`: short arrays are
    /// zero-padded, long ones truncated (spec §6.2, §7
    /// "InvalidSerializedSubstrate").
    pub fn from_json(json: &str) -> Result<Self, SubstrateError> {
        let wire: Wire = serde_json::from_str(json)
            .map_err(|e| SubstrateError::InvalidSerializedSubstrate(e.to_string()))?;

        wire.config
            .validate()
            .map_err(|e| SubstrateError::InvalidSerializedSubstrate(e.to_string()))?;

        if wire.channels.len() != wire.config.channels.len() {
            return Err(SubstrateError::InvalidSerializedSubstrate(format!(
                "expected {} channel buffers, found {}",
                wire.config.channels.len(),
                wire.channels.len()
            )));
        }

        let expected_len = wire.config.width * wire.config.height;
        let mut channel_data = Vec::with_capacity(wire.channels.len());
        for mut data in wire.channels {
            data.resize(expected_len, 0.0);
            channel_data.push(data);
        }

        let tick_count = wire.stats.tick_count;
        let mut substrate = Self::build(wire.config, channel_data);

        let mut vx = wire.velocity_x.unwrap_or_default();
        let mut vy = wire.velocity_y.unwrap_or_default();
        vx.resize(expected_len, 0.0);
        vy.resize(expected_len, 0.0);
        substrate.flow = FlowField::zeros(substrate.config.width, substrate.config.height);
        substrate.flow.vx_mut().copy_from_slice(&vx);
        substrate.flow.vy_mut().copy_from_slice(&vy);

        substrate.stats = wire.stats;
        substrate.tick_count = tick_count;

        Ok(substrate)
    }
}
