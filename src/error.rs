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

//! Error types for planning runs.
//!
//! Running out of iterations is not an error, see [`crate::planning::PlanOutcome`].

/// Boxed failure raised by an external collaborator such as a collision checker.
pub type OracleError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Planner error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Step size must be finite and strictly positive
    #[error("Invalid step size: {0}")]
    InvalidStepSize(f64),

    /// Time limit is negative, NaN, or too large to represent
    #[error("Invalid time limit: {0} seconds")]
    InvalidDuration(f64),

    /// Goal bias is a probability
    #[error("Invalid goal bias: {0} is not within [0, 1]")]
    InvalidGoalBias(f64),

    /// A configuration does not have the planner's joint count
    #[error("Dimension mismatch: expected {expected} joints, found {found}")]
    DimensionMismatch {
        /// Joint count of the tree
        expected: usize,
        /// Joint count of the offending configuration
        found: usize,
    },

    /// Start or goal has no joints
    #[error("Configuration has no joints")]
    EmptyConfiguration,

    /// Start or goal holds NaN or an infinite joint value
    #[error("Configuration contains a non-finite joint value")]
    NonFiniteConfiguration,

    /// Sampling range is empty or inverted
    #[error("Invalid joint limits: {0}")]
    InvalidJointLimits(String),

    /// Node index is not present in the tree
    #[error("Node {0} is not present in the tree")]
    UnknownNode(usize),

    /// A tree was handed an index that already holds values
    #[error("Nearest neighbor index must start empty, it holds {0} values")]
    NonEmptyIndex(usize),

    /// The nearest neighbor index gave no answer for a non-empty tree
    #[error("Nearest neighbor index returned no result for a tree of {0} nodes")]
    NearestNeighborUnavailable(usize),

    /// The collision checker failed; the run is aborted
    #[error("Collision oracle unavailable at iteration {iteration}: {source}")]
    CollisionOracleUnavailable {
        /// Iteration during which the oracle failed
        iteration: u64,
        /// Underlying failure
        #[source]
        source: OracleError,
    },

    /// I/O error while reading configuration
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed YAML configuration
    #[error("Configuration parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
