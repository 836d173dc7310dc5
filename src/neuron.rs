use crate::state::NeuronState;
use crate::Scalar;

/// A single summing unit: one weight per layer input plus a bias.
#[derive(Clone, Debug, PartialEq)]
pub struct Neuron {
    pub weights: Vec<Scalar>,
    pub bias: Scalar,
}

impl Neuron {
    /// Creates a neuron with `inputs` zero weights and a zero bias.
    pub fn new(inputs: usize) -> Self {
        Neuron {
            weights: vec![0.0; inputs],
            bias: 0.0,
        }
    }

    pub fn export(&self, id: usize) -> NeuronState {
        NeuronState {
            id,
            weights: self.weights.clone(),
            bias: self.bias,
        }
    }

    pub fn import(state: NeuronState) -> Self {
        Neuron {
            weights: state.weights,
            bias: state.bias,
        }
    }
}
