//! Compute module — numerical core of the Flow-Lenia substrate.

mod field;
mod flow;
mod growth;
mod kernel;
mod substrate;

pub use field::{bilinear_sample, central_gradient, neighbour_average, Field};
pub use flow::FlowField;
pub use growth::GrowthFn;
pub use kernel::{wrap_coord, Kernel};
pub use substrate::{Deposit, Sense, Stats, Substrate};
