//! Small feedforward neural networks, trained by per-sample backpropagation
//! and stored as JSON.

pub mod activator;
pub mod buffers;
pub mod error;
pub mod layer;
pub mod network;
pub mod neuron;
pub mod sample;
pub mod state;
pub mod trainer;

mod utils;

/// The numeric type used by every network.
pub type Scalar = f64;

pub use crate::activator::Activator;
pub use crate::buffers::Buffers;
pub use crate::error::{Error, Result};
pub use crate::layer::Layer;
pub use crate::network::Network;
pub use crate::neuron::Neuron;
pub use crate::sample::{Sample, Samples};
pub use crate::state::{LayerConnection, LayerState, NetworkType, NeuronState, State};
pub use crate::trainer::{Logging, TrainResult, Trainable, Trainer, INFINITY};
