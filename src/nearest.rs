// MIT License
//
// Copyright (c) 2024 Erik Holum
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

//! Nearest neighbor queries over the configurations stored in a tree.
use crate::configuration::Distance;
use ordered_float::OrderedFloat;

/// Closest-point index over inserted values.
///
/// Values are identified by insertion order: the `n`th inserted value has index `n`,
/// which lets a [`crate::tree::Tree`] use the answer directly as a node index.
/// Implementations must support incremental insertion and answer with the same metric
/// as [`Distance`], since the tree compares the result against its step size.
pub trait NearestNeighborIndex<T> {
    fn insert(&mut self, value: T);

    /// Index of the closest inserted value, or `None` when empty.
    fn nearest(&self, query: &T) -> Option<usize>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Brute force index, scanning every stored value.
///
/// Ties resolve to the earliest inserted value.
// TODO: A KD tree would make `nearest` sublinear for large trees.
#[derive(Debug, Clone)]
pub struct LinearIndex<T> {
    values: Vec<T>,
}

impl<T> LinearIndex<T> {
    #[must_use]
    pub fn new() -> Self {
        LinearIndex { values: Vec::new() }
    }
}

impl<T> Default for LinearIndex<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Distance> NearestNeighborIndex<T> for LinearIndex<T> {
    fn insert(&mut self, value: T) {
        self.values.push(value);
    }

    fn nearest(&self, query: &T) -> Option<usize> {
        self.values
            .iter()
            .enumerate()
            .min_by_key(|(_, value)| OrderedFloat(query.distance(value)))
            .map(|(index, _)| index)
    }

    fn len(&self) -> usize {
        self.values.len()
    }
}

//
// Unit tests
//
