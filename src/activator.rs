//! Activation function types.

use crate::Scalar;

/// [Activation function](https://en.wikipedia.org/wiki/Activation_function)
/// types.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Activator {
    /// Logistic sigmoid, `1 / (1 + e^-x)`.
    Sigmoid,
    /// Piecewise linear approximation of the sigmoid.
    ///
    /// Saturates to 0 below -2.5 and to 1 above 2.5, and is `0.2x + 0.5` in
    /// between.
    HardSigmoid,
    /// Identity function.
    Linear,
    /// Heaviside step function.
    ///
    /// Its derivative is reported as 1 everywhere so that errors still flow
    /// through it during training.
    Step,
}

impl Default for Activator {
    fn default() -> Self {
        Activator::Linear
    }
}

impl Activator {
    /// Evaluates `f(x)` for the selected activation function.
    pub fn f(&self, x: Scalar) -> Scalar {
        match *self {
            Activator::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Activator::HardSigmoid => {
                if x < -2.5 {
                    0.0
                } else if x > 2.5 {
                    1.0
                } else {
                    0.2 * x + 0.5
                }
            }
            Activator::Linear => x,
            Activator::Step => if x > 0.0 { 1.0 } else { 0.0 },
        }
    }

    /// Evaluates the derivative `f'(x)`.
    ///
    /// Unlike the output-based shortcut some networks use, this takes the
    /// weighted sum *before* activation, which the layer caches on every
    /// forward pass.
    pub fn fprime(&self, x: Scalar) -> Scalar {
        match *self {
            Activator::Sigmoid => {
                let exp = (-x).exp();
                exp / ((exp + 1.0) * (exp + 1.0))
            }
            Activator::HardSigmoid => if x < -2.5 || x > 2.5 { 0.0 } else { 0.2 },
            Activator::Linear => 1.0,
            Activator::Step => 1.0,
        }
    }

    /// Returns the name this activator is stored under.
    pub fn name(&self) -> &'static str {
        match *self {
            Activator::Sigmoid => "SigmoidActivatorClass",
            Activator::HardSigmoid => "HardSigmoidActivatorClass",
            Activator::Linear => "LinearActivatorClass",
            Activator::Step => "StepActivatorClass",
        }
    }

    /// Looks up an activator by its stored name.
    ///
    /// Unknown names fall back to `Linear`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "SigmoidActivatorClass" => Activator::Sigmoid,
            "HardSigmoidActivatorClass" => Activator::HardSigmoid,
            "StepActivatorClass" => Activator::Step,
            _ => Activator::Linear,
        }
    }
}
