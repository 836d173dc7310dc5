//! Storage for the vectors layers read from and write to.
//!
//! A network keeps every inter-layer vector in one `Buffers` arena. Layers
//! only remember buffer *indices*, so the producing and consuming layer of a
//! buffer share it without either owning it.

use crate::layer::Layer;
use crate::utils;
use crate::Scalar;

#[derive(Clone, Debug, PartialEq)]
pub struct Buffers {
    data: Vec<Vec<Scalar>>,
}

impl Buffers {
    /// Allocates one zeroed buffer for every entry of `lengths`.
    pub fn new(lengths: &[usize]) -> Self {
        Buffers {
            data: lengths.iter().map(|&len| vec![0.0; len]).collect(),
        }
    }

    /// Allocates an input/output pair for a standalone layer, matching the
    /// layer's default bindings.
    pub fn for_layer(layer: &Layer) -> Self {
        Buffers::new(&[layer.input_len(), layer.output_len()])
    }

    /// Returns the number of buffers.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, id: usize) -> &[Scalar] {
        &self.data[id]
    }

    pub fn get_mut(&mut self, id: usize) -> &mut [Scalar] {
        &mut self.data[id]
    }

    /// The network input buffer, or an empty slice if there are no buffers.
    pub fn first(&self) -> &[Scalar] {
        self.data.first().map_or(&[][..], Vec::as_slice)
    }

    /// The network output buffer, or an empty slice if there are no buffers.
    pub fn last(&self) -> &[Scalar] {
        self.data.last().map_or(&[][..], Vec::as_slice)
    }

    /// Borrows two distinct buffers mutably at once.
    pub fn pair_mut(&mut self, first: usize, second: usize) -> (&mut [Scalar], &mut [Scalar]) {
        let (a, b) = utils::pair_mut(&mut self.data, first, second);
        (a.as_mut_slice(), b.as_mut_slice())
    }

    /// Returns the length of every buffer, in order.
    pub fn lengths(&self) -> Vec<usize> {
        self.data.iter().map(Vec::len).collect()
    }
}
