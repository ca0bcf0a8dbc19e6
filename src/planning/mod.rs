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

//! Sampling-based planners growing trees through joint space.
//!
//! Every iteration samples a target, proposes a bounded step from the closest node,
//! asks the collision oracle about the step and adds it when free. Planning ends when
//! the goal is reached or the iteration, time, or cancellation budget runs out.
pub mod birrt;
pub mod rrt;

pub use birrt::{birrt, BiRrtPlanner};
pub use rrt::{rrt, RrtPlanner};

use crate::collision::CollisionOracle;
use crate::configuration::Configuration;
use crate::error::{Error, Result};
use crate::events::{EdgeEvent, PlanObserver, TreeSide};
use crate::nearest::NearestNeighborIndex;
use crate::path::Path;
use crate::tree::{Proposal, Tree};
use log::trace;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Why a planner stopped without a solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    MaxIterations,
    Deadline,
    Cancelled,
}

/// Lifecycle of a planner. `Solved` and `Exhausted` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerState {
    Growing,
    Solved,
    Exhausted(StopReason),
}

impl PlannerState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        self != PlannerState::Growing
    }
}

/// Result of a complete planning run. Not finding a path is a normal outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanOutcome {
    Solved(Path),
    Exhausted(StopReason),
}

impl PlanOutcome {
    #[must_use]
    pub fn is_solved(&self) -> bool {
        matches!(self, PlanOutcome::Solved(_))
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            PlanOutcome::Solved(path) => Some(path),
            PlanOutcome::Exhausted(_) => None,
        }
    }

    #[must_use]
    pub fn into_path(self) -> Option<Path> {
        match self {
            PlanOutcome::Solved(path) => Some(path),
            PlanOutcome::Exhausted(_) => None,
        }
    }
}

/// Outcome for a terminal state, `None` while growing.
pub(crate) fn outcome(state: PlannerState, solution: Option<&Path>) -> Option<PlanOutcome> {
    match (state, solution) {
        (PlannerState::Exhausted(reason), _) => Some(PlanOutcome::Exhausted(reason)),
        (PlannerState::Solved, Some(path)) => Some(PlanOutcome::Solved(path.clone())),
        _ => None,
    }
}

/// Iteration, time and cancellation limits, polled between iterations only.
#[derive(Debug, Clone)]
pub(crate) struct Budget {
    max_iterations: u64,
    max_duration: Option<Duration>,
    started: Option<Instant>,
    cancel: Option<Arc<AtomicBool>>,
}

impl Budget {
    pub(crate) fn new(max_iterations: u64, max_duration: Option<Duration>) -> Self {
        Budget {
            max_iterations,
            max_duration,
            started: None,
            cancel: None,
        }
    }

    pub(crate) fn set_cancel_flag(&mut self, flag: Arc<AtomicBool>) {
        self.cancel = Some(flag);
    }

    /// Returns why no further iteration may start, if any. The clock starts on first use.
    pub(crate) fn exhausted(&mut self, iterations: u64) -> Option<StopReason> {
        let started = *self.started.get_or_insert_with(Instant::now);
        if iterations >= self.max_iterations {
            return Some(StopReason::MaxIterations);
        }
        if self
            .cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
        {
            return Some(StopReason::Cancelled);
        }
        if self
            .max_duration
            .is_some_and(|limit| started.elapsed() >= limit)
        {
            return Some(StopReason::Deadline);
        }
        None
    }
}

/// Start and goal must be non-empty, finite and of equal dimension.
pub(crate) fn validate_endpoints(start: &Configuration, goal: &Configuration) -> Result<()> {
    if start.dimension() == 0 {
        return Err(Error::EmptyConfiguration);
    }
    if goal.dimension() != start.dimension() {
        return Err(Error::DimensionMismatch {
            expected: start.dimension(),
            found: goal.dimension(),
        });
    }
    if !start.is_finite() || !goal.is_finite() {
        return Err(Error::NonFiniteConfiguration);
    }
    Ok(())
}

pub(crate) fn check_dimension(expected: usize, q: &Configuration) -> Result<()> {
    if q.dimension() == expected {
        Ok(())
    } else {
        Err(Error::DimensionMismatch {
            expected,
            found: q.dimension(),
        })
    }
}

/// Attempts to grow the tree one step towards `target`.
/// Return the index of the new node, or None if the step collides or goes nowhere.
pub(crate) fn extend_tree<I, O, B>(
    tree: &mut Tree<I>,
    side: TreeSide,
    target: &Configuration,
    step_size: f64,
    iteration: u64,
    oracle: &mut O,
    observer: &mut B,
) -> Result<Option<usize>>
where
    I: NearestNeighborIndex<Configuration>,
    O: CollisionOracle + ?Sized,
    B: PlanObserver + ?Sized,
{
    let Proposal {
        candidate,
        nearest,
        distance,
    } = tree.propose_step(target, step_size)?;

    // Target already in the tree, nothing new to add
    if distance == 0.0 {
        return Ok(None);
    }

    let free = oracle
        .is_free(&candidate)
        .map_err(|source| Error::CollisionOracleUnavailable { iteration, source })?;
    if !free {
        trace!("[{side:?}] rejected {candidate}");
        return Ok(None);
    }

    let from = tree.get(nearest).cloned().ok_or(Error::UnknownNode(nearest))?;
    let child = tree.add(candidate.clone(), nearest)?;
    trace!("[{side:?}] edge {nearest} -> {child}: {candidate}");
    observer.on_edge(&EdgeEvent {
        side,
        parent: nearest,
        child,
        from,
        to: candidate,
    });
    Ok(Some(child))
}

//
// Unit tests
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OracleError;
    use crate::events::EdgeLog;

    #[test]
    fn test_budget_iterations() {
        let mut budget = Budget::new(2, None);
        assert_eq!(budget.exhausted(0), None);
        assert_eq!(budget.exhausted(1), None);
        assert_eq!(budget.exhausted(2), Some(StopReason::MaxIterations));
        assert_eq!(
            Budget::new(0, None).exhausted(0),
            Some(StopReason::MaxIterations)
        );
    }

    #[test]
    fn test_budget_cancel_and_deadline() {
        let flag = Arc::new(AtomicBool::new(false));
        let mut budget = Budget::new(100, None);
        budget.set_cancel_flag(flag.clone());
        assert_eq!(budget.exhausted(0), None);
        flag.store(true, Ordering::Relaxed);
        assert_eq!(budget.exhausted(1), Some(StopReason::Cancelled));

        let mut budget = Budget::new(100, Some(Duration::ZERO));
        assert_eq!(budget.exhausted(0), Some(StopReason::Deadline));
    }

    #[test]
    fn test_validate_endpoints() {
        let a = Configuration::from([0.0, 0.0]);
        assert!(validate_endpoints(&a, &Configuration::from([1.0, 1.0])).is_ok());
        assert!(matches!(
            validate_endpoints(&a, &Configuration::from([1.0])),
            Err(Error::DimensionMismatch {
                expected: 2,
                found: 1
            })
        ));
        assert!(matches!(
            validate_endpoints(&Configuration::new(Vec::new()), &Configuration::new(Vec::new())),
            Err(Error::EmptyConfiguration)
        ));
        assert!(matches!(
            validate_endpoints(&a, &Configuration::from([f64::NAN, 0.0])),
            Err(Error::NonFiniteConfiguration)
        ));
    }

    #[test]
    fn test_extend_tree() {
        let mut tree = Tree::new(Configuration::from([0.0]));
        let mut log = EdgeLog::new();
        let mut oracle = |q: &Configuration| q[0] < 0.15;

        let target = Configuration::from([1.0]);
        let added = extend_tree(
            &mut tree,
            TreeSide::Forward,
            &target,
            0.1,
            0,
            &mut oracle,
            &mut log,
        );
        assert_eq!(added.unwrap(), Some(1));

        // Second step lands at 0.2, inside the obstacle
        let added = extend_tree(
            &mut tree,
            TreeSide::Forward,
            &target,
            0.1,
            1,
            &mut oracle,
            &mut log,
        );
        assert_eq!(added.unwrap(), None);
        assert_eq!(tree.size(), 2);

        assert_eq!(log.edges.len(), 1);
        assert_eq!(log.edges[0].parent, 0);
        assert_eq!(log.edges[0].child, 1);
        assert_eq!(log.edges[0].from, Configuration::from([0.0]));
    }

    #[test]
    fn test_extend_tree_skips_existing_target() {
        let mut tree = Tree::new(Configuration::from([0.0]));
        let mut calls = 0;
        let mut oracle = |_: &Configuration| {
            calls += 1;
            true
        };
        let root = Configuration::from([0.0]);
        let added = extend_tree(
            &mut tree,
            TreeSide::Backward,
            &root,
            0.1,
            0,
            &mut oracle,
            &mut EdgeLog::new(),
        );
        assert_eq!(added.unwrap(), None);
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_extend_tree_oracle_failure() {
        use crate::collision::Fallible;

        let mut tree = Tree::new(Configuration::from([0.0]));
        let mut oracle =
            Fallible(|_: &Configuration| -> std::result::Result<bool, OracleError> {
                Err("offline".into())
            });
        let result = extend_tree(
            &mut tree,
            TreeSide::Forward,
            &Configuration::from([1.0]),
            0.1,
            7,
            &mut oracle,
            &mut EdgeLog::new(),
        );
        assert!(matches!(
            result,
            Err(Error::CollisionOracleUnavailable { iteration: 7, .. })
        ));
        assert_eq!(tree.size(), 1);
    }
}
