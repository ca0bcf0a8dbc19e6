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

//! Joint-space points and the metric used to compare them.
use std::fmt;
use std::ops::Index;
use std::sync::Arc;

/// Define a distance trait for values stored in a planning tree.
pub trait Distance {
    fn distance(&self, other: &Self) -> f64;
}

/// A point in the robot's joint space.
///
/// Immutable once created. Cloning shares the underlying storage, so the tree and
/// the nearest neighbor index can both hold the same configuration cheaply.
#[derive(Clone, PartialEq)]
pub struct Configuration(Arc<[f64]>);

impl Configuration {
    #[must_use]
    pub fn new(joints: Vec<f64>) -> Self {
        Configuration(joints.into())
    }

    /// Number of joints, the dimension `D` of the configuration space.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.0.iter()
    }

    /// True when every joint value is neither NaN nor infinite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }

    /// Returns the point `step` along the straight line towards `target`.
    ///
    /// `length` must be the (non-zero) distance between `self` and `target`.
    pub(crate) fn step_towards(&self, target: &Configuration, step: f64, length: f64) -> Self {
        let scale = step / length;
        self.0
            .iter()
            .zip(target.0.iter())
            .map(|(from, to)| from + scale * (to - from))
            .collect()
    }
}

// Euclidean norm of the joint difference
impl Distance for Configuration {
    fn distance(&self, other: &Self) -> f64 {
        debug_assert_eq!(self.dimension(), other.dimension());
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>()
            .sqrt()
    }
}

impl From<Vec<f64>> for Configuration {
    fn from(joints: Vec<f64>) -> Self {
        Configuration::new(joints)
    }
}

impl From<&[f64]> for Configuration {
    fn from(joints: &[f64]) -> Self {
        Configuration(joints.into())
    }
}

impl<const D: usize> From<[f64; D]> for Configuration {
    fn from(joints: [f64; D]) -> Self {
        Configuration(Arc::new(joints))
    }
}

impl FromIterator<f64> for Configuration {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Configuration(iter.into_iter().collect())
    }
}

impl Index<usize> for Configuration {
    type Output = f64;

    fn index(&self, joint: usize) -> &Self::Output {
        &self.0[joint]
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

// Handy for debugging
impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{v:.3}")?;
        }
        write!(f, ")")
    }
}

//
// Unit tests
//
