//! Error types.

use std::io;
use std::result;

use thiserror::Error;

/// Result type used throughout the crate.
pub type Result<T> = result::Result<T, Error>;

/// Errors raised while building, importing or training a network.
#[derive(Debug, Error)]
pub enum Error {
    /// The state's type tag names no known network variant.
    #[error("unsupported network type: {0:?}")]
    UnsupportedNetworkType(String),

    /// The state holds no layer records.
    #[error("network state has no layers")]
    MissingLayers,

    /// The requested layer layout cannot form a network.
    #[error("invalid topology: {0}")]
    InvalidTopology(String),

    /// A layer record holds a different number of neurons than it declares.
    #[error("layer {layer}: expected {expected} neurons, found {found}")]
    NeuronCount {
        layer: usize,
        expected: usize,
        found: usize,
    },

    /// A neuron record holds a different number of weights than its layer
    /// declares inputs.
    #[error("layer {layer}, neuron {neuron}: expected {expected} weights, found {found}")]
    WeightCount {
        layer: usize,
        neuron: usize,
        expected: usize,
        found: usize,
    },

    /// A connection names a layer or buffer that does not exist.
    #[error("invalid connection ({input_id}, {output_id})")]
    InvalidConnection { input_id: i64, output_id: i64 },

    /// A layer is wired to a buffer of the wrong length.
    #[error("layer {layer}: wired to a buffer of length {found}, expected {expected}")]
    BufferLength {
        layer: usize,
        expected: usize,
        found: usize,
    },

    /// A weight or bias is NaN or infinite and cannot be encoded.
    #[error("layer {layer}, neuron {neuron}: weights are not finite")]
    NonFinite { layer: usize, neuron: usize },

    /// An input vector does not match the network's input length.
    #[error("expected an input of length {expected}, found {found}")]
    InputLength { expected: usize, found: usize },

    /// A target vector does not match the network's output length.
    #[error("expected a target of length {expected}, found {found}")]
    TargetLength { expected: usize, found: usize },

    #[error("json codec error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}
