//! Utilities for training neural networks.
//!
//! Training is stochastic gradient descent: the weights are updated after
//! every sample, using that sample's own learning rate.

use crate::error::{Error, Result};
use crate::sample::{Sample, Samples};
use crate::Scalar;

use rand::Rng;
use std::time::Instant;
use tracing::{debug, info};

/// Epoch budget meaning "train until the error threshold is reached".
pub const INFINITY: usize = usize::MAX;

/// Makes a model trainable using per-sample gradient descent.
pub trait Trainable {
    /// Working memory reused across training steps.
    type Scratch;

    /// Returns the input length every sample must have.
    fn input_len(&self) -> usize;

    /// Returns the target length every sample must have.
    fn output_len(&self) -> usize;

    /// Returns new, zeroed working memory.
    fn new_scratch(&self) -> Self::Scratch;

    /// Feeds `sample` forward, backpropagates its error and updates the
    /// weights. Returns the summed absolute error of the prediction made
    /// before the update.
    fn step(&mut self, sample: &Sample, scratch: &mut Self::Scratch) -> Scalar;
}

/// The outcome of a training run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrainResult {
    /// Summed absolute error of every epoch, in order.
    pub errors: Vec<Scalar>,
    /// Whether the last epoch reached the error threshold.
    pub converged: bool,
}

impl TrainResult {
    /// Returns the number of epochs run.
    pub fn epochs(&self) -> usize {
        self.errors.len()
    }

    /// Returns the error of the last epoch run.
    pub fn final_error(&self) -> Option<Scalar> {
        self.errors.last().cloned()
    }
}

/// A builder for training runs.
#[derive(Debug)]
pub struct Trainer<'a, T: Trainable> {
    model: &'a mut T,
    epochs: usize,
    max_error: Scalar,
    logging: Logging,
}

impl<'a, T: Trainable> Trainer<'a, T> {
    /// Creates a new Trainer instance.
    ///
    /// The trainer is initialized with some default values. These defaults are:
    ///
    /// * No epoch limit.
    /// * Stops once an epoch's error is 0.
    /// * Logs on training completion.
    pub fn new(model: &'a mut T) -> Self {
        Trainer {
            model,
            epochs: INFINITY,
            max_error: 0.0,
            logging: Logging::Completion,
        }
    }

    /// Sets the maximum number of epochs. `INFINITY` removes the limit.
    pub fn epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    /// Sets the epoch error at or below which training stops.
    pub fn max_error(mut self, max_error: Scalar) -> Self {
        self.max_error = max_error;
        self
    }

    /// Sets the type of logging to be emitted during training.
    pub fn logging(mut self, logging: Logging) -> Self {
        self.logging = logging;
        self
    }

    /// Trains the model on `samples`, shuffling them with `rng` before every
    /// epoch.
    ///
    /// Each epoch's error is the sum over all samples of `|output - target|`
    /// per output. Training ends when an epoch's error is at most the
    /// threshold, or when the epoch budget runs out; the returned history
    /// tells which.
    ///
    /// Returns an error, without training, if any sample has the wrong
    /// input or target length.
    pub fn train<R>(self, samples: &mut Samples, rng: &mut R) -> Result<TrainResult>
    where
        R: Rng + ?Sized,
    {
        self.validate(samples)?;

        let mut scratch = self.model.new_scratch();
        let start_time = Instant::now();
        let mut result = TrainResult::default();
        for epoch in 0..self.epochs {
            samples.shuffle(rng);
            let mut epoch_error = 0.0;
            for sample in samples.iter() {
                epoch_error += self.model.step(sample, &mut scratch);
            }
            result.errors.push(epoch_error);

            self.logging.epoch(epoch + 1, epoch_error);
            if epoch_error <= self.max_error {
                debug!(epoch = epoch + 1, error = epoch_error, "error threshold reached");
                result.converged = true;
                break;
            }
        }
        self.logging.completion(&result, start_time);
        Ok(result)
    }

    /// Verifies that every sample fits the model, returning an error if
    /// something is wrong.
    fn validate(&self, samples: &Samples) -> Result<()> {
        for sample in samples.iter() {
            if sample.input.len() != self.model.input_len() {
                return Err(Error::InputLength {
                    expected: self.model.input_len(),
                    found: sample.input.len(),
                });
            }
            if sample.target.len() != self.model.output_len() {
                return Err(Error::TargetLength {
                    expected: self.model.output_len(),
                    found: sample.target.len(),
                });
            }
        }
        Ok(())
    }
}

/// Logging frequency to use during training
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Logging {
    /// Nothing is logged
    Silent,
    /// A summary is logged at completion
    Completion,
    /// A summary is logged at completion and after every `n` epochs
    Iterations(usize),
}

impl Logging {
    /// Performs logging after `epoch` epochs.
    fn epoch(&self, epoch: usize, error: Scalar) {
        if let Logging::Iterations(freq) = *self {
            if freq > 0 && epoch % freq == 0 {
                info!(epoch, error, "training progress");
            }
        }
    }

    /// Performs logging at the end of training.
    fn completion(&self, result: &TrainResult, start_time: Instant) {
        if let Logging::Silent = *self {
            return;
        }
        info!(
            epochs = result.epochs(),
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            error = result.final_error().unwrap_or(0.0),
            converged = result.converged,
            "training finished"
        );
    }
}
