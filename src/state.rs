//! The stored form of a network.
//!
//! A `State` is a plain record of a network's layers and of how they are
//! wired. It is encoded as JSON:
//!
//! ```text
//! {
//!   "type": "MultilayerPerceptron",
//!   "layers": [
//!     { "id": 0, "input_length": 2, "output_length": 1,
//!       "activator": "SigmoidActivatorClass",
//!       "neurons": [ { "id": 0, "weights": [0.1, -0.3], "bias": 0.0 } ] }
//!   ],
//!   "connections": [
//!     { "input_id": -1, "output_id": 0 },
//!     { "input_id": 0, "output_id": -1 }
//!   ]
//! }
//! ```

use crate::error::{Error, Result};
use crate::Scalar;

use serde_derive::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Connection id standing for the network's own input or output.
pub const BOUNDARY: i64 = -1;

/// The network variants a `State` can describe.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NetworkType {
    /// A single step-activated layer with one output.
    Perceptron,
    /// A chain of one or more layers.
    MultilayerPerceptron,
}

impl NetworkType {
    pub fn as_str(&self) -> &'static str {
        match *self {
            NetworkType::Perceptron => "Perceptron",
            NetworkType::MultilayerPerceptron => "MultilayerPerceptron",
        }
    }
}

impl FromStr for NetworkType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Perceptron" => Ok(NetworkType::Perceptron),
            "MultilayerPerceptron" => Ok(NetworkType::MultilayerPerceptron),
            other => Err(Error::UnsupportedNetworkType(other.to_string())),
        }
    }
}

impl fmt::Display for NetworkType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NeuronState {
    pub id: usize,
    pub weights: Vec<Scalar>,
    pub bias: Scalar,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayerState {
    pub id: usize,
    #[serde(default)]
    pub neurons: Vec<NeuronState>,
    /// Name of the layer's activator. Missing or unknown names load as
    /// `Linear`.
    #[serde(default)]
    pub activator: String,
    pub input_length: usize,
    pub output_length: usize,
}

/// A directed edge of the layer graph.
///
/// Layer `input_id` writes buffer `output_id`, and layer `output_id` reads
/// buffer `input_id + 1`. `BOUNDARY` on either side means the network's
/// external input or output.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerConnection {
    pub input_id: i64,
    pub output_id: i64,
}

impl LayerConnection {
    /// Returns the connections of a linear chain of `layers` layers.
    pub fn chain(layers: usize) -> Vec<LayerConnection> {
        let mut connections = Vec::with_capacity(layers + 1);
        connections.push(LayerConnection {
            input_id: BOUNDARY,
            output_id: 0,
        });
        for i in 1..layers as i64 {
            connections.push(LayerConnection {
                input_id: i - 1,
                output_id: i,
            });
        }
        connections.push(LayerConnection {
            input_id: layers as i64 - 1,
            output_id: BOUNDARY,
        });
        connections
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct State {
    /// Raw type tag; checked when the state is imported.
    #[serde(rename = "type")]
    pub network_type: String,
    #[serde(default)]
    pub layers: Vec<LayerState>,
    #[serde(default)]
    pub connections: Vec<LayerConnection>,
}

impl State {
    /// Writes the JSON encoding of this state to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = to_json(self)?;
        fs::write(path.as_ref(), bytes)?;
        debug!(path = %path.as_ref().display(), "saved network state");
        Ok(())
    }

    /// Reads a JSON encoded state from `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<State> {
        let bytes = fs::read(path.as_ref())?;
        from_json(&bytes)
    }
}

/// Encodes a state as JSON.
///
/// JSON has no encoding for NaN or infinities, so a state holding one is
/// rejected rather than written out as `null`.
pub fn to_json(state: &State) -> Result<Vec<u8>> {
    for layer in &state.layers {
        for neuron in &layer.neurons {
            if !neuron.bias.is_finite() || neuron.weights.iter().any(|w| !w.is_finite()) {
                return Err(Error::NonFinite {
                    layer: layer.id,
                    neuron: neuron.id,
                });
            }
        }
    }
    Ok(serde_json::to_vec(state)?)
}

/// Decodes a JSON encoded state.
pub fn from_json(bytes: &[u8]) -> Result<State> {
    Ok(serde_json::from_slice(bytes)?)
}
