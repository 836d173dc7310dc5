use crate::Scalar;

use rand::seq::SliceRandom;
use rand::Rng;
use std::fmt;
use std::iter::FromIterator;
use std::ops::Deref;

/// A labelled training example.
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    pub input: Vec<Scalar>,
    pub target: Vec<Scalar>,
    /// Learning rate used when training on this example.
    pub speed: Scalar,
}

impl Sample {
    /// Creates a sample with a learning rate of 1.
    pub fn new(input: Vec<Scalar>, target: Vec<Scalar>) -> Self {
        Sample::with_speed(input, target, 1.0)
    }

    pub fn with_speed(input: Vec<Scalar>, target: Vec<Scalar>, speed: Scalar) -> Self {
        Sample {
            input,
            target,
            speed,
        }
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "f({:?})->{:?}", self.input, self.target)
    }
}

/// An ordered collection of samples, shuffled in place between epochs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Samples(Vec<Sample>);

impl Samples {
    pub fn new() -> Self {
        Samples(Vec::new())
    }

    pub fn push(&mut self, sample: Sample) {
        self.0.push(sample);
    }

    /// Applies a uniformly random permutation drawn from `rng`.
    pub fn shuffle<R>(&mut self, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        self.0.shuffle(rng);
    }

    pub fn into_inner(self) -> Vec<Sample> {
        self.0
    }
}

impl Deref for Samples {
    type Target = [Sample];

    fn deref(&self) -> &[Sample] {
        &self.0
    }
}

impl From<Vec<Sample>> for Samples {
    fn from(samples: Vec<Sample>) -> Self {
        Samples(samples)
    }
}

impl FromIterator<Sample> for Samples {
    fn from_iter<I: IntoIterator<Item = Sample>>(iter: I) -> Self {
        Samples(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Samples {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
