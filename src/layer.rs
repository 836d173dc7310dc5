use crate::activator::Activator;
use crate::buffers::Buffers;
use crate::error::{Error, Result};
use crate::neuron::Neuron;
use crate::state::LayerState;
use crate::utils::ZeroOut;
use crate::Scalar;

use itertools::izip;
use rand::Rng;
use std::fmt;

/// A fully connected layer of a neural network.
///
/// The layer owns its neurons but not the vectors it reads and writes: it
/// holds the indices of an input and an output buffer inside a `Buffers`
/// arena, which lets adjacent layers share a buffer without copying.
#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
    /// The activation function to be used for every neuron in the layer.
    activator: Activator,
    /// One neuron per output.
    neurons: Vec<Neuron>,
    /// Weighted sums from the most recent forward pass, before activation.
    sum: Vec<Scalar>,
    /// Number of inputs to each neuron.
    input_len: usize,
    /// Buffer this layer reads from.
    input: usize,
    /// Buffer this layer writes to.
    output: usize,
}

impl Layer {
    /// Initializes a new layer with zero weights and biases.
    ///
    /// Arguments:
    ///
    ///  * `inputs` - the number of inputs to this layer.
    ///  * `outputs` - the number of outputs from this layer.
    ///  * `activator` - the activation function to be used for this layer's
    ///                  output. `Activator::default()` is `Linear`.
    ///
    /// The layer starts out reading buffer 0 and writing buffer 1.
    pub fn new(inputs: usize, outputs: usize, activator: Activator) -> Self {
        Layer {
            activator,
            neurons: (0..outputs).map(|_| Neuron::new(inputs)).collect(),
            sum: vec![0.0; outputs],
            input_len: inputs,
            input: 0,
            output: 1,
        }
    }

    /// Returns the number of inputs to this layer.
    pub fn input_len(&self) -> usize {
        self.input_len
    }

    /// Returns the number of outputs from this layer.
    pub fn output_len(&self) -> usize {
        self.neurons.len()
    }

    /// Returns the index of the buffer this layer reads from.
    pub fn input(&self) -> usize {
        self.input
    }

    /// Returns the index of the buffer this layer writes to.
    pub fn output(&self) -> usize {
        self.output
    }

    pub fn activator(&self) -> Activator {
        self.activator
    }

    pub fn set_activator(&mut self, activator: Activator) {
        self.activator = activator;
    }

    pub fn neurons(&self) -> &[Neuron] {
        &self.neurons
    }

    /// Binds this layer's input to buffer `id`.
    pub fn connect_to_input(&mut self, id: usize) {
        self.input = id;
    }

    /// Binds this layer's output to buffer `id`.
    pub fn connect_to_output(&mut self, id: usize) {
        self.output = id;
    }

    /// Sets every weight to a uniform value in `[-0.5, 0.5)`.
    ///
    /// Biases are left as they are.
    pub fn init_random<R>(&mut self, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        for neuron in &mut self.neurons {
            for w in &mut neuron.weights {
                *w = rng.gen::<Scalar>() - 0.5;
            }
        }
    }

    /// Sets every weight to `c`. Biases are left as they are.
    pub fn init_const(&mut self, c: Scalar) {
        for neuron in &mut self.neurons {
            for w in &mut neuron.weights {
                *w = c;
            }
        }
    }

    /// Feeds the input buffer forward through the layer into the output
    /// buffer, caching the weighted sums for a later `back_propagate`.
    pub fn evaluate(&mut self, buffers: &mut Buffers) {
        let (inputs, outputs) = buffers.pair_mut(self.input, self.output);
        assert_eq!(inputs.len(), self.input_len());
        assert_eq!(outputs.len(), self.output_len());
        for (neuron, sum, y) in izip!(&self.neurons, &mut self.sum, outputs.iter_mut()) {
            let mut total = 0.0;
            for (w, x) in neuron.weights.iter().zip(inputs.iter()) {
                total += w * x;
            }
            *sum = total + neuron.bias;
            *y = self.activator.f(*sum);
        }
    }

    /// Evaluates the layer and returns its output buffer.
    pub fn evaluate_get<'a>(&mut self, buffers: &'a mut Buffers) -> &'a [Scalar] {
        self.evaluate(buffers);
        buffers.get(self.output)
    }

    /// Feeds `delta_error` backwards through the layer and applies the
    /// gradient step.
    ///
    /// Arguments:
    ///
    ///  * `buffers` - the buffers used by the last `evaluate`.
    ///  * `delta_error` - the error gradient with respect to this layer's
    ///                    output. It is scaled in place by the activation
    ///                    derivative.
    ///  * `speed` - the learning rate.
    ///  * `delta_err_next` - receives the error gradient with respect to this
    ///                       layer's input, computed from the weights as they
    ///                       were before this step.
    pub fn back_propagate(&mut self,
                          buffers: &Buffers,
                          delta_error: &mut [Scalar],
                          speed: Scalar,
                          delta_err_next: &mut [Scalar]) {
        let inputs = buffers.get(self.input);
        assert_eq!(inputs.len(), self.input_len());
        assert_eq!(delta_error.len(), self.output_len());
        assert_eq!(delta_err_next.len(), self.input_len());

        delta_err_next.zero_out();
        for (neuron, sum, delta) in izip!(&self.neurons, &self.sum, delta_error.iter_mut()) {
            *delta *= self.activator.fprime(*sum);
            for (next, w) in delta_err_next.iter_mut().zip(&neuron.weights) {
                *next += *delta * w;
            }
        }

        // Weights change only once the error for the previous layer is known.
        for (neuron, delta) in self.neurons.iter_mut().zip(delta_error.iter()) {
            let err = speed * delta;
            for (w, x) in neuron.weights.iter_mut().zip(inputs.iter()) {
                *w -= err * x;
            }
            neuron.bias -= err;
        }
    }

    pub fn export(&self, id: usize) -> LayerState {
        let neurons = self.neurons.iter().enumerate().map(|(i, n)| n.export(i));
        LayerState {
            id,
            neurons: neurons.collect(),
            activator: self.activator.name().to_string(),
            input_length: self.input_len(),
            output_length: self.output_len(),
        }
    }

    /// Rebuilds a layer from its stored record.
    ///
    /// The activator name falls back to `Linear` if unknown. The record must
    /// hold exactly `output_length` neurons of `input_length` weights each.
    pub fn import(state: LayerState) -> Result<Self> {
        if state.neurons.len() != state.output_length {
            return Err(Error::NeuronCount {
                layer: state.id,
                expected: state.output_length,
                found: state.neurons.len(),
            });
        }
        for (i, neuron) in state.neurons.iter().enumerate() {
            if neuron.weights.len() != state.input_length {
                return Err(Error::WeightCount {
                    layer: state.id,
                    neuron: i,
                    expected: state.input_length,
                    found: neuron.weights.len(),
                });
            }
        }
        Ok(Layer {
            activator: Activator::from_name(&state.activator),
            neurons: state.neurons.into_iter().map(Neuron::import).collect(),
            sum: vec![0.0; state.output_length],
            input_len: state.input_length,
            input: 0,
            output: 1,
        })
    }
}

/// Prints one row per neuron: its weights followed by its bias.
impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, neuron) in self.neurons.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for w in &neuron.weights {
                write!(f, "{:6.3} ", w)?;
            }
            write!(f, "{:6.3}", neuron.bias)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::NeuronState;

    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn layer_with(weights: &[&[Scalar]], biases: &[Scalar], activator: Activator) -> Layer {
        let mut layer = Layer::new(weights[0].len(), weights.len(), activator);
        for (neuron, (w, b)) in layer.neurons.iter_mut().zip(weights.iter().zip(biases)) {
            neuron.weights.copy_from_slice(w);
            neuron.bias = *b;
        }
        layer
    }

    fn run(layer: &mut Layer, input: &[Scalar]) -> (Buffers, Vec<Scalar>) {
        let mut buffers = Buffers::for_layer(layer);
        buffers.get_mut(0).copy_from_slice(input);
        let output = layer.evaluate_get(&mut buffers).to_vec();
        (buffers, output)
    }

    fn half_square_error(layer: &Layer, input: &[Scalar], target: Scalar) -> Scalar {
        let mut layer = layer.clone();
        let (_, output) = run(&mut layer, input);
        0.5 * (output[0] - target) * (output[0] - target)
    }

    #[test]
    fn new_layer_shape() {
        let layer = Layer::new(3, 2, Activator::Sigmoid);
        assert_eq!(layer.input_len(), 3);
        assert_eq!(layer.output_len(), 2);
        assert_eq!(layer.activator(), Activator::Sigmoid);
        assert_eq!((layer.input(), layer.output()), (0, 1));
        for neuron in layer.neurons() {
            assert_eq!(neuron, &Neuron::new(3));
        }
    }

    #[test]
    fn default_activator_is_linear() {
        assert_eq!(Layer::new(1, 1, Activator::default()).activator(), Activator::Linear);
    }

    #[test]
    fn init_leaves_biases() {
        let mut layer = layer_with(&[&[1.0, 1.0], &[1.0, 1.0]], &[0.25, -0.25], Activator::Linear);
        layer.init_const(0.5);
        assert_eq!(layer.neurons()[1].weights, vec![0.5, 0.5]);
        assert_eq!(layer.neurons()[1].bias, -0.25);

        let mut rng = StdRng::seed_from_u64(7);
        layer.init_random(&mut rng);
        for neuron in layer.neurons() {
            for &w in &neuron.weights {
                assert!(w >= -0.5 && w < 0.5);
            }
        }
        assert_eq!(layer.neurons()[0].bias, 0.25);
    }

    #[test]
    fn evaluate_weighted_sum() {
        let mut layer = layer_with(&[&[1.0, 2.0], &[-1.0, 0.5]], &[0.5, 0.0], Activator::Linear);
        let (_, output) = run(&mut layer, &[1.0, 2.0]);
        assert_eq!(output, vec![5.5, 0.0]);

        layer.set_activator(Activator::Sigmoid);
        let (_, output) = run(&mut layer, &[1.0, 2.0]);
        assert_relative_eq!(output[0], 1.0 / (1.0 + (-5.5f64).exp()));
        assert_relative_eq!(output[1], 0.5);
    }

    #[test]
    fn evaluate_is_repeatable() {
        let mut layer = Layer::new(4, 3, Activator::Sigmoid);
        layer.init_random(&mut StdRng::seed_from_u64(1));
        let input = [0.3, -1.2, 0.7, 2.0];
        let (_, first) = run(&mut layer, &input);
        let (_, second) = run(&mut layer, &input);
        assert_eq!(first, second);
    }

    #[test]
    fn reconnected_buffers() {
        let mut layer = layer_with(&[&[1.0, 1.0, 1.0]], &[0.0], Activator::Linear);
        let mut buffers = Buffers::new(&[1, 3, 1]);
        buffers.get_mut(1).copy_from_slice(&[1.0, 2.0, 3.0]);
        layer.connect_to_input(1);
        layer.connect_to_output(0);
        layer.evaluate(&mut buffers);
        assert_eq!(buffers.get(0), &[6.0]);
        assert_eq!(buffers.get(2), &[0.0]);
    }

    #[test]
    #[should_panic]
    fn wrong_input_length_panics() {
        let mut layer = Layer::new(2, 1, Activator::Linear);
        let mut buffers = Buffers::new(&[3, 1]);
        layer.evaluate(&mut buffers);
    }

    #[test]
    fn back_propagate_uses_previous_weights() {
        let mut layer = layer_with(&[&[1.0, 2.0]], &[0.0], Activator::Linear);
        let (buffers, output) = run(&mut layer, &[1.0, 1.0]);
        assert_eq!(output, vec![3.0]);

        let mut delta = [output[0] - 2.0];
        let mut delta_next = [9.0, 9.0];
        layer.back_propagate(&buffers, &mut delta, 0.5, &mut delta_next);
        assert_eq!(delta_next, [1.0, 2.0]);
        assert_eq!(layer.neurons()[0].weights, vec![0.5, 1.5]);
        assert_eq!(layer.neurons()[0].bias, -0.5);
    }

    #[test]
    fn back_propagate_scales_by_derivative() {
        let mut layer = layer_with(&[&[4.0]], &[0.0], Activator::HardSigmoid);
        let (buffers, _) = run(&mut layer, &[1.0]);
        let mut delta = [1.0];
        let mut delta_next = [0.0];
        layer.back_propagate(&buffers, &mut delta, 1.0, &mut delta_next);
        // Saturated: no gradient flows and nothing moves.
        assert_eq!(delta, [0.0]);
        assert_eq!(delta_next, [0.0]);
        assert_eq!(layer.neurons()[0].weights, vec![4.0]);
    }

    #[test]
    fn gradient_matches_finite_difference() {
        let input = [1.0, 0.5, -2.0];
        let target = 0.7;
        let speed = 0.1;
        let h = 1e-6;
        let original = layer_with(&[&[0.2, -0.4, 0.1]], &[0.3], Activator::Linear);

        let mut layer = original.clone();
        let (buffers, output) = run(&mut layer, &input);
        let mut delta = [output[0] - target];
        let mut delta_next = [0.0; 3];
        layer.back_propagate(&buffers, &mut delta, speed, &mut delta_next);

        for j in 0..input.len() {
            let mut plus = original.clone();
            plus.neurons[0].weights[j] += h;
            let mut minus = original.clone();
            minus.neurons[0].weights[j] -= h;
            let numeric = (half_square_error(&plus, &input, target)
                - half_square_error(&minus, &input, target)) / (2.0 * h);
            let analytic = (original.neurons[0].weights[j] - layer.neurons[0].weights[j]) / speed;
            assert_abs_diff_eq!(numeric, analytic, epsilon = 1e-6);
        }

        let mut plus = original.clone();
        plus.neurons[0].bias += h;
        let mut minus = original.clone();
        minus.neurons[0].bias -= h;
        let numeric = (half_square_error(&plus, &input, target)
            - half_square_error(&minus, &input, target)) / (2.0 * h);
        let analytic = (original.neurons[0].bias - layer.neurons[0].bias) / speed;
        assert_abs_diff_eq!(numeric, analytic, epsilon = 1e-6);

        let (_, after) = run(&mut layer, &input);
        assert!((after[0] - target).abs() < (output[0] - target).abs());
    }

    #[test]
    fn display() {
        let layer = layer_with(&[&[1.0, -0.5], &[0.25, 0.0]], &[2.0, -1.125], Activator::Linear);
        assert_eq!(layer.to_string(), " 1.000 -0.500  2.000\n 0.250  0.000 -1.125");
    }

    #[test]
    fn export_import() {
        let mut layer = Layer::new(3, 2, Activator::HardSigmoid);
        layer.init_random(&mut StdRng::seed_from_u64(3));
        let state = layer.export(4);
        assert_eq!(state.id, 4);
        assert_eq!(state.activator, "HardSigmoidActivatorClass");
        assert_eq!(state.neurons[1].id, 1);
        assert_eq!(Layer::import(state).unwrap(), layer);
    }

    #[test]
    fn import_checks_shape() {
        let mut state = Layer::new(2, 2, Activator::Linear).export(0);
        state.neurons.pop();
        assert!(matches!(
            Layer::import(state),
            Err(Error::NeuronCount { expected: 2, found: 1, .. })
        ));

        let mut state = Layer::new(2, 1, Activator::Linear).export(3);
        state.neurons[0] = NeuronState { id: 0, weights: vec![1.0], bias: 0.0 };
        assert!(matches!(
            Layer::import(state),
            Err(Error::WeightCount { layer: 3, neuron: 0, expected: 2, found: 1 })
        ));
    }
}
