//! A [Feedforward neural network]
//! (https://en.wikipedia.org/wiki/Feedforward_neural_network).
//!
//! # Example
//!
//! Let's train a simple neural network to compute the XOR function:
//!
//! ```
//! # use neuronet::{Network, Sample, Samples};
//! # use rand::rngs::StdRng;
//! # use rand::SeedableRng;
//! // Create examples of the XOR function
//! let mut samples: Samples = vec![
//!     Sample::new(vec![0.0, 0.0], vec![0.0]),
//!     Sample::new(vec![1.0, 0.0], vec![1.0]),
//!     Sample::new(vec![0.0, 1.0], vec![1.0]),
//!     Sample::new(vec![1.0, 1.0], vec![0.0]),
//! ].into();
//!
//! // Train a 2-3-1 network on them
//! let mut rng = StdRng::seed_from_u64(42);
//! let mut network = Network::multilayer(&[2, 3, 1]).unwrap();
//! network.init_random(&mut rng);
//! let result = network.train(&mut samples, 5000, 0.1, &mut rng).unwrap();
//! assert!(!result.errors.is_empty());
//!
//! // Run the network on a new input
//! let output = network.solve(&[1.0, 0.0]).unwrap();
//! assert_eq!(output.len(), 1);
//! ```

use crate::activator::Activator;
use crate::buffers::Buffers;
use crate::error::{Error, Result};
use crate::layer::Layer;
use crate::sample::{Sample, Samples};
use crate::state::{self, LayerConnection, NetworkType, State, BOUNDARY};
use crate::trainer::{Logging, TrainResult, Trainable, Trainer};
use crate::Scalar;

use itertools::izip;
use rand::Rng;
use std::fmt;
use std::path::Path;
use tracing::debug;

/// A feedforward neural network.
///
/// Layers are evaluated in order. Each reads one buffer and writes another;
/// buffer 0 holds the network input and the last buffer its output.
#[derive(Clone, Debug, PartialEq)]
pub struct Network {
    network_type: NetworkType,
    layers: Vec<Layer>,
    buffers: Buffers,
    /// The wiring, as stored; re-emitted by `export`.
    connections: Vec<LayerConnection>,
}

impl Network {
    /// Creates a new, untrained multilayer perceptron.
    ///
    /// Arguments:
    ///  * `layer_sizes` - the width of every buffer, input first and output
    ///                    last. Must contain at least 2 non-zero elements.
    ///
    /// Every layer uses a sigmoid activation and starts with zero weights.
    pub fn multilayer(layer_sizes: &[usize]) -> Result<Self> {
        if layer_sizes.len() < 2 {
            return Err(Error::InvalidTopology(format!(
                "need at least 2 layer sizes, got {}",
                layer_sizes.len()
            )));
        }
        if layer_sizes.iter().any(|&size| size == 0) {
            return Err(Error::InvalidTopology(format!("empty layer in {:?}", layer_sizes)));
        }
        let layers = layer_sizes
            .windows(2)
            .map(|pair| Layer::new(pair[0], pair[1], Activator::Sigmoid))
            .collect();
        Ok(Network::chain(NetworkType::MultilayerPerceptron, layers))
    }

    /// Creates a new, untrained perceptron: a single step-activated neuron
    /// with `inputs` inputs.
    pub fn perceptron(inputs: usize) -> Result<Self> {
        if inputs == 0 {
            return Err(Error::InvalidTopology("perceptron needs at least one input".to_string()));
        }
        let layer = Layer::new(inputs, 1, Activator::Step);
        Ok(Network::chain(NetworkType::Perceptron, vec![layer]))
    }

    /// Wires `layers` into a linear chain, layer `i` reading buffer `i` and
    /// writing buffer `i + 1`.
    fn chain(network_type: NetworkType, mut layers: Vec<Layer>) -> Self {
        let mut lengths = Vec::with_capacity(layers.len() + 1);
        lengths.push(layers[0].input_len());
        for (i, layer) in layers.iter_mut().enumerate() {
            layer.connect_to_input(i);
            layer.connect_to_output(i + 1);
            lengths.push(layer.output_len());
        }
        Network {
            network_type,
            connections: LayerConnection::chain(layers.len()),
            buffers: Buffers::new(&lengths),
            layers,
        }
    }

    pub fn network_type(&self) -> NetworkType {
        self.network_type
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Returns the size of the network input.
    pub fn input_len(&self) -> usize {
        self.buffers.first().len()
    }

    /// Returns the size of the network output.
    pub fn output_len(&self) -> usize {
        self.buffers.last().len()
    }

    /// Sets the activation function of every layer.
    pub fn set_activator(&mut self, activator: Activator) {
        for layer in &mut self.layers {
            layer.set_activator(activator);
        }
    }

    /// Sets every weight to a uniform value in `[-0.5, 0.5)`.
    pub fn init_random<R>(&mut self, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        for layer in &mut self.layers {
            layer.init_random(rng);
        }
    }

    /// Sets every weight to `c`.
    pub fn init_const(&mut self, c: Scalar) {
        for layer in &mut self.layers {
            layer.init_const(c);
        }
    }

    /// Feeds the provided `input` through the network, returning the output
    /// buffer.
    pub fn solve(&mut self, input: &[Scalar]) -> Result<&[Scalar]> {
        if input.len() != self.input_len() {
            return Err(Error::InputLength {
                expected: self.input_len(),
                found: input.len(),
            });
        }
        self.assign_input(input);
        self.evaluate();
        Ok(self.buffers.last())
    }

    /// Trains the network on `samples` for at most `epochs` epochs, stopping
    /// early once an epoch's summed error is at most `max_error`.
    ///
    /// Pass `trainer::INFINITY` to train until the threshold is reached. Use
    /// `Trainer` directly to control logging.
    pub fn train<R>(&mut self,
                    samples: &mut Samples,
                    epochs: usize,
                    max_error: Scalar,
                    rng: &mut R)
                    -> Result<TrainResult>
    where
        R: Rng + ?Sized,
    {
        Trainer::new(self)
            .epochs(epochs)
            .max_error(max_error)
            .logging(Logging::Completion)
            .train(samples, rng)
    }

    fn assign_input(&mut self, input: &[Scalar]) {
        self.buffers.get_mut(0).copy_from_slice(input);
    }

    /// Evaluates every layer in order.
    fn evaluate(&mut self) {
        for layer in &mut self.layers {
            layer.evaluate(&mut self.buffers);
        }
    }

    /// Returns the stored form of this network.
    pub fn export(&self) -> State {
        debug!(network_type = %self.network_type, layers = self.layers.len(), "exporting network");
        let layers = self.layers.iter().enumerate().map(|(i, l)| l.export(i));
        State {
            network_type: self.network_type.as_str().to_string(),
            layers: layers.collect(),
            connections: self.connections.clone(),
        }
    }

    /// Rebuilds a network from its stored form.
    ///
    /// Buffer 0 takes the first layer's input length and buffer `i + 1` the
    /// output length of layer `i`. Layers start out wired as a chain; each
    /// connection then rebinds the layers it names.
    pub fn import(state: State) -> Result<Self> {
        let network_type: NetworkType = state.network_type.parse()?;
        if state.layers.is_empty() {
            return Err(Error::MissingLayers);
        }
        if network_type == NetworkType::Perceptron {
            let layer = &state.layers[0];
            if state.layers.len() != 1 || layer.output_length != 1 {
                return Err(Error::InvalidTopology(format!(
                    "perceptron must be a single layer with one output, got {} layers",
                    state.layers.len()
                )));
            }
        }
        debug!(network_type = %network_type, layers = state.layers.len(), "importing network");

        let mut lengths = Vec::with_capacity(state.layers.len() + 1);
        lengths.push(state.layers[0].input_length);
        let mut layers = Vec::with_capacity(state.layers.len());
        for (i, layer_state) in state.layers.into_iter().enumerate() {
            lengths.push(layer_state.output_length);
            let mut layer = Layer::import(layer_state)?;
            layer.connect_to_input(i);
            layer.connect_to_output(i + 1);
            layers.push(layer);
        }

        let last = layers.len() as i64;
        for conn in &state.connections {
            let invalid = || Error::InvalidConnection {
                input_id: conn.input_id,
                output_id: conn.output_id,
            };
            // Both ids name a layer or the boundary.
            let ids = BOUNDARY..last;
            if !ids.contains(&conn.input_id) || !ids.contains(&conn.output_id) {
                return Err(invalid());
            }
            if conn.output_id != BOUNDARY {
                let buffer = (conn.input_id + 1) as usize;
                layers[conn.output_id as usize].connect_to_input(buffer);
            }
            if conn.input_id != BOUNDARY {
                let buffer = if conn.output_id == BOUNDARY { last } else { conn.output_id };
                layers[conn.input_id as usize].connect_to_output(buffer as usize);
            }
        }

        for (i, layer) in layers.iter().enumerate() {
            if layer.input() == layer.output() {
                return Err(Error::InvalidTopology(format!("layer {} reads its own output", i)));
            }
            check_length(i, layer.input_len(), lengths[layer.input()])?;
            check_length(i, layer.output_len(), lengths[layer.output()])?;
        }

        Ok(Network {
            network_type,
            layers,
            buffers: Buffers::new(&lengths),
            connections: state.connections,
        })
    }
}

fn check_length(layer: usize, expected: usize, found: usize) -> Result<()> {
    if expected != found {
        return Err(Error::BufferLength {
            layer,
            expected,
            found,
        });
    }
    Ok(())
}

impl Trainable for Network {
    /// Error gradients, one vector per buffer.
    type Scratch = Buffers;

    fn input_len(&self) -> usize {
        Network::input_len(self)
    }

    fn output_len(&self) -> usize {
        Network::output_len(self)
    }

    fn new_scratch(&self) -> Buffers {
        Buffers::new(&self.buffers.lengths())
    }

    fn step(&mut self, sample: &Sample, deltas: &mut Buffers) -> Scalar {
        self.assign_input(&sample.input);
        self.evaluate();

        let last = self.buffers.len() - 1;
        let mut error = 0.0;
        for (delta, y, t) in
            izip!(deltas.get_mut(last), self.buffers.last(), &sample.target) {
            *delta = y - t;
            error += delta.abs();
        }

        for layer in self.layers.iter_mut().rev() {
            let (delta_error, delta_err_next) = deltas.pair_mut(layer.output(), layer.input());
            layer.back_propagate(&self.buffers, delta_error, sample.speed, delta_err_next);
        }
        error
    }
}

/// Prints every layer's weights, separated by blank lines.
impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, layer) in self.layers.iter().enumerate() {
            if i > 0 {
                write!(f, "\n\n")?;
            }
            write!(f, "{}", layer)?;
        }
        Ok(())
    }
}

/// Decodes a JSON encoded state and rebuilds the network it describes.
pub fn import(bytes: &[u8]) -> Result<Network> {
    Network::import(state::from_json(bytes)?)
}

/// Encodes a network's state as JSON.
pub fn export(network: &Network) -> Result<Vec<u8>> {
    state::to_json(&network.export())
}

/// Reads a network saved with `State::save`.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Network> {
    Network::import(State::load(path)?)
}
