//! Flow field: a velocity buffer driving semi-Lagrangian advection
//! (spec §4.4).
//!
//! Each step, the primary channel's local gradient nudges velocity,
//! velocity decays and diffuses against its neighbours, and every
//! channel is advected per-cell by blending its own value with an
//! upstream sample taken along the *pre-update* velocity — advection
//! uses this step's starting flow, not the flow produced by this same
//! step's velocity update.

use super::field::{bilinear_sample, central_gradient, neighbour_average};
use crate::schema::FlowConfig;

/// Velocity buffers plus the back buffers needed to update them without
/// aliasing the buffer currently being read.
#[derive(Debug, Clone)]
pub struct FlowField {
    vx: Vec<f32>,
    vy: Vec<f32>,
    vx_back: Vec<f32>,
    vy_back: Vec<f32>,
    width: usize,
    height: usize,
}

impl FlowField {
    pub fn zeros(width: usize, height: usize) -> Self {
        let len = width * height;
        Self {
            vx: vec![0.0; len],
            vy: vec![0.0; len],
            vx_back: vec![0.0; len],
            vy_back: vec![0.0; len],
            width,
            height,
        }
    }

    #[inline]
    pub fn vx(&self) -> &[f32] {
        &self.vx
    }

    #[inline]
    pub fn vy(&self) -> &[f32] {
        &self.vy
    }

    #[inline]
    pub fn vx_mut(&mut self) -> &mut [f32] {
        &mut self.vx
    }

    #[inline]
    pub fn vy_mut(&mut self) -> &mut [f32] {
        &mut self.vy
    }

    /// Per-cell advected value for one channel (spec §4.4 "Advection").
    /// `v` is the value already produced by growth/decay/diffusion for
    /// this cell; `input` is that channel's *current read* buffer (not
    /// the partially-written output). Uses this [`FlowField`]'s current
    /// (pre-update) velocity, per the per-step ordering in spec §4.3.
    pub fn advect_cell(
        &self,
        input: &[f32],
        x: usize,
        y: usize,
        v: f32,
        advection_strength: f32,
        dt: f32,
        wrap: bool,
    ) -> f32 {
        let i = y * self.width + x;
        let dx = self.vx[i] * advection_strength * dt;
        let dy = self.vy[i] * advection_strength * dt;
        if dx.abs() < 0.001 && dy.abs() < 0.001 {
            return v;
        }
        let upstream = bilinear_sample(input, self.width, self.height, x as f32 - dx, y as f32 - dy, wrap);
        v * (1.0 - advection_strength) + upstream * advection_strength
    }

    /// Update velocity from the primary channel's gradient, decay, and
    /// viscosity (spec §4.4 "Velocity update"). Reads `primary` (the
    /// pre-swap read buffer), writes the result into the back buffers;
    /// call [`FlowField::swap`] afterward.
    pub fn update_velocity(&mut self, primary: &[f32], config: &FlowConfig, dt: f32, wrap: bool) {
        for y in 0..self.height {
            for x in 0..self.width {
                let i = y * self.width + x;
                let (gx, gy) = central_gradient(primary, self.width, self.height, x, y, wrap);

                let mut nvx = self.vx[i] - gx * dt;
                let mut nvy = self.vy[i] - gy * dt;

                nvx *= config.velocity_decay;
                nvy *= config.velocity_decay;

                if config.viscosity > 0.0 {
                    let avg_vx = neighbour_average(&self.vx, self.width, self.height, x, y, wrap);
                    let avg_vy = neighbour_average(&self.vy, self.width, self.height, x, y, wrap);
                    nvx = nvx * (1.0 - config.viscosity) + avg_vx * config.viscosity;
                    nvy = nvy * (1.0 - config.viscosity) + avg_vy * config.viscosity;
                }

                self.vx_back[i] = nvx;
                self.vy_back[i] = nvy;
            }
        }
    }

    /// Atomically swap the primary and back velocity buffers.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.vx, &mut self.vx_back);
        std::mem::swap(&mut self.vy, &mut self.vy_back);
    }

    /// Kinetic energy of the velocity field, `½Σ(vx² + vy²)` (spec §6.2
    /// "flow_energy" stat).
    pub fn kinetic_energy(&self) -> f32 {
        self.vx
            .iter()
            .zip(self.vy.iter())
            .map(|(&vx, &vy)| 0.5 * (vx * vx + vy * vy))
            .sum()
    }
}
