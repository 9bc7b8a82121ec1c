//! Flow-Lenia cellular substrate.
//!
//! A multi-channel continuous cellular automaton: each channel is
//! convolved against a radial kernel, passed through a growth
//! non-linearity, decayed and diffused, and advected by a shared flow
//! field driven by the primary channel's gradient.
//!
//! # Architecture
//!
//! - [`schema`]: configuration types and named preset seeding
//! - [`compute`]: the numerical core — kernels, growth, flow, and the
//!   [`compute::Substrate`] orchestrator
//! - [`rng`]: the injectable randomness seam used by noise seeding
//! - [`error`]: the substrate's narrow error taxonomy
//!
//! # Example
//!
//! ```rust,no_run
//! use flow_lenia_substrate::compute::{Deposit, Substrate};
//! use flow_lenia_substrate::schema::{Falloff, Preset};
//! use flow_lenia_substrate::rng::Mulberry32;
//!
//! let mut rng = Mulberry32::new(42);
//! let mut substrate = Substrate::new_from_preset(Preset::Orbium, None, &mut rng);
//!
//! for _ in 0..100 {
//!     substrate.update();
//! }
//!
//! substrate.deposit_at(
//!     64.0,
//!     64.0,
//!     Deposit { channel: 0, amount: 0.5, radius: 3.0, falloff: Falloff::Gaussian },
//! );
//!
//! println!("mass after 100 ticks: {:?}", substrate.get_stats().total_mass);
//! ```

pub mod compute;
pub mod error;
pub mod rng;
pub mod schema;

pub use compute::{Deposit, Sense, Stats, Substrate};
pub use error::SubstrateError;
pub use schema::{Preset, SubstrateConfig};
