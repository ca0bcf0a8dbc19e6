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

//! Feasibility checks against the environment and self-collision model.
use crate::configuration::Configuration;
use crate::error::OracleError;

/// Largest accumulated penetration still treated as contact-free.
pub const DEFAULT_TOLERANCE: f64 = 1e-10;

/// Boolean feasibility test for a configuration.
///
/// Implementations must not depend on planner state. Any failure to answer aborts the
/// planning run; planners never retry.
pub trait CollisionOracle {
    /// Returns true when `q` is collision free.
    ///
    /// # Errors
    ///
    /// If the underlying checker cannot evaluate `q`.
    fn is_free(&mut self, q: &Configuration) -> Result<bool, OracleError>;
}

// Plain predicates never fail
impl<F> CollisionOracle for F
where
    F: FnMut(&Configuration) -> bool,
{
    fn is_free(&mut self, q: &Configuration) -> Result<bool, OracleError> {
        Ok(self(q))
    }
}

/// Adapts a checker that can fail, such as one backed by a remote service.
pub struct Fallible<F>(pub F);

impl<F> CollisionOracle for Fallible<F>
where
    F: FnMut(&Configuration) -> Result<bool, OracleError>,
{
    fn is_free(&mut self, q: &Configuration) -> Result<bool, OracleError> {
        (self.0)(q)
    }
}

/// Treats a configuration as free when its accumulated penetration depth does not exceed
/// the tolerance. A NaN depth counts as a collision.
pub struct PenetrationOracle<F> {
    measure: F,
    tolerance: f64,
}

impl<F> PenetrationOracle<F>
where
    F: FnMut(&Configuration) -> f64,
{
    #[must_use]
    pub fn new(measure: F) -> Self {
        PenetrationOracle {
            measure,
            tolerance: DEFAULT_TOLERANCE,
        }
    }

    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }
}

impl<F> CollisionOracle for PenetrationOracle<F>
where
    F: FnMut(&Configuration) -> f64,
{
    fn is_free(&mut self, q: &Configuration) -> Result<bool, OracleError> {
        Ok((self.measure)(q) <= self.tolerance)
    }
}

//
// Unit tests
//
