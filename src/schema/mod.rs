//! Schema module — configuration and preset seeding for the substrate.

mod config;
mod presets;

pub use config::{
    ChannelConfig, ConfigError, Falloff, FlowConfig, GrowthConfig, GrowthFamily, KernelConfig,
    KernelFamily, Preset, SubstrateConfig,
};
pub use presets::{apply_growth_override, seed_channel};
