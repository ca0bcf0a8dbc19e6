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

//! Bidirectional RRT: one tree from the start, one from the goal.
//!
//! Each iteration extends the forward tree, then the backward tree, then tests whether
//! either tree can reach the other's newest node in a single step. The order is fixed so
//! a seeded run is reproducible. The test only looks at the newest nodes as they stand
//! after both extensions of the iteration.

use super::{
    check_dimension, extend_tree, outcome, validate_endpoints, Budget, PlanOutcome, PlannerState,
    StopReason,
};
use crate::collision::CollisionOracle;
use crate::config::PlannerSettings;
use crate::configuration::Configuration;
use crate::error::{Error, Result};
use crate::events::{PlanObserver, TreeSide};
use crate::nearest::{LinearIndex, NearestNeighborIndex};
use crate::path::Path;
use crate::sampler::Sampler;
use crate::tree::Tree;
use log::{debug, info};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Meeting point of the two trees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connection {
    /// Node of the forward tree
    pub forward: usize,

    /// Node of the backward tree
    pub backward: usize,

    /// Joint-space gap between the two nodes, below the step size
    pub distance: f64,
}

/// Bidirectional RRT planner.
#[derive(Debug)]
pub struct BiRrtPlanner<I = LinearIndex<Configuration>> {
    forward: Tree<I>,
    backward: Tree<I>,
    settings: PlannerSettings,
    budget: Budget,
    state: PlannerState,
    iterations: u64,
    connection: Option<Connection>,
    solution: Option<Path>,
}

impl BiRrtPlanner<LinearIndex<Configuration>> {
    /// # Errors
    ///
    /// If the settings are invalid, or start and goal are empty, non-finite, or differ
    /// in dimension.
    pub fn new(
        start: Configuration,
        goal: Configuration,
        settings: PlannerSettings,
    ) -> Result<Self> {
        BiRrtPlanner::with_indices(start, goal, settings, LinearIndex::new(), LinearIndex::new())
    }
}

impl<I: NearestNeighborIndex<Configuration>> BiRrtPlanner<I> {
    /// Planner whose trees use the provided, empty, nearest neighbor indices.
    ///
    /// # Errors
    ///
    /// See [`BiRrtPlanner::new`], and [`Tree::with_index`] for the index requirements.
    pub fn with_indices(
        start: Configuration,
        goal: Configuration,
        settings: PlannerSettings,
        forward_index: I,
        backward_index: I,
    ) -> Result<Self> {
        settings.validate()?;
        validate_endpoints(&start, &goal)?;
        let budget = Budget::new(settings.max_iterations, settings.max_duration());
        Ok(BiRrtPlanner {
            forward: Tree::with_index(start, forward_index)?,
            backward: Tree::with_index(goal, backward_index)?,
            settings,
            budget,
            state: PlannerState::Growing,
            iterations: 0,
            connection: None,
            solution: None,
        })
    }

    /// Stop at the next iteration boundary once `flag` is set.
    #[must_use]
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.budget.set_cancel_flag(flag);
        self
    }

    /// Runs one iteration: forward extension, backward extension, connection test.
    ///
    /// Does nothing once the planner is solved or exhausted.
    ///
    /// # Errors
    ///
    /// If the sampler produces a configuration of the wrong dimension.
    /// If the collision oracle or nearest neighbor index fails; the run cannot continue.
    pub fn step<S, O, B>(
        &mut self,
        sampler: &mut S,
        oracle: &mut O,
        observer: &mut B,
    ) -> Result<PlannerState>
    where
        S: Sampler + ?Sized,
        O: CollisionOracle + ?Sized,
        B: PlanObserver + ?Sized,
    {
        if self.state.is_terminal() {
            return Ok(self.state);
        }
        if let Some(reason) = self.budget.exhausted(self.iterations) {
            self.exhaust(reason);
            return Ok(self.state);
        }

        let iteration = self.iterations;
        self.iterations += 1;

        // Pull the trees towards each other's roots, or explore independently
        let goal_biased = sampler.goal_biased(self.settings.goal_bias);
        let (forward_target, backward_target) = if goal_biased {
            (self.backward.root().clone(), self.forward.root().clone())
        } else {
            (sampler.uniform(), sampler.uniform())
        };
        check_dimension(self.forward.dimension(), &forward_target)?;
        check_dimension(self.backward.dimension(), &backward_target)?;

        let step_size = self.settings.step_size;
        extend_tree(
            &mut self.forward,
            TreeSide::Forward,
            &forward_target,
            step_size,
            iteration,
            oracle,
            observer,
        )?;
        extend_tree(
            &mut self.backward,
            TreeSide::Backward,
            &backward_target,
            step_size,
            iteration,
            oracle,
            observer,
        )?;

        if self.settings.progress_interval > 0 && iteration % self.settings.progress_interval == 0 {
            debug!(
                "[BiRRT] samples = {iteration}, forward tree size = {}, backward tree size = {}",
                self.forward.size(),
                self.backward.size()
            );
        }

        if let Some(connection) = self.connect()? {
            let path = Path::join(
                &self.forward,
                connection.forward,
                &self.backward,
                connection.backward,
            )?;
            info!(
                "[BiRRT] solved after {} samples, tree sizes = {}/{}, path of {} waypoints",
                self.iterations,
                self.forward.size(),
                self.backward.size(),
                path.len()
            );
            observer.on_path(&path);
            self.connection = Some(connection);
            self.solution = Some(path);
            self.state = PlannerState::Solved;
        } else if self.iterations >= self.settings.max_iterations {
            self.exhaust(StopReason::MaxIterations);
        }
        Ok(self.state)
    }

    /// Checks whether either tree reaches the other's newest node within one step.
    ///
    /// Forward first, then backward. Nothing is added to either tree.
    fn connect(&self) -> Result<Option<Connection>> {
        let step_size = self.settings.step_size;

        let backward_newest = self.backward.latest();
        let target = self
            .backward
            .get(backward_newest)
            .ok_or(Error::UnknownNode(backward_newest))?;
        let proposal = self.forward.propose_step(target, step_size)?;
        if proposal.distance < step_size {
            return Ok(Some(Connection {
                forward: proposal.nearest,
                backward: backward_newest,
                distance: proposal.distance,
            }));
        }

        let forward_newest = self.forward.latest();
        let target = self
            .forward
            .get(forward_newest)
            .ok_or(Error::UnknownNode(forward_newest))?;
        let proposal = self.backward.propose_step(target, step_size)?;
        if proposal.distance < step_size {
            return Ok(Some(Connection {
                forward: forward_newest,
                backward: proposal.nearest,
                distance: proposal.distance,
            }));
        }
        Ok(None)
    }

    fn exhaust(&mut self, reason: StopReason) {
        info!(
            "[BiRRT] exhausted ({reason:?}) after {} samples, tree sizes = {}/{}",
            self.iterations,
            self.forward.size(),
            self.backward.size()
        );
        self.state = PlannerState::Exhausted(reason);
    }

    /// Iterates until solved or exhausted.
    ///
    /// # Errors
    ///
    /// If the sampler's dimension disagrees with the start, or as for [`BiRrtPlanner::step`].
    pub fn solve<S, O, B>(
        &mut self,
        sampler: &mut S,
        oracle: &mut O,
        observer: &mut B,
    ) -> Result<PlanOutcome>
    where
        S: Sampler + ?Sized,
        O: CollisionOracle + ?Sized,
        B: PlanObserver + ?Sized,
    {
        match sampler.dimension() {
            Some(found) if found != self.forward.dimension() => {
                return Err(Error::DimensionMismatch {
                    expected: self.forward.dimension(),
                    found,
                });
            }
            _ => {}
        }
        loop {
            if let Some(outcome) = self.try_outcome() {
                return Ok(outcome);
            }
            self.step(sampler, oracle, observer)?;
        }
    }

    /// Current outcome, `None` while still growing.
    #[must_use]
    pub fn try_outcome(&self) -> Option<PlanOutcome> {
        outcome(self.state, self.solution.as_ref())
    }
}

impl<I> BiRrtPlanner<I> {
    #[must_use]
    pub fn state(&self) -> PlannerState {
        self.state
    }

    #[must_use]
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Tree rooted at the start.
    #[must_use]
    pub fn forward(&self) -> &Tree<I> {
        &self.forward
    }

    /// Tree rooted at the goal.
    #[must_use]
    pub fn backward(&self) -> &Tree<I> {
        &self.backward
    }

    #[must_use]
    pub fn into_trees(self) -> (Tree<I>, Tree<I>) {
        (self.forward, self.backward)
    }

    #[must_use]
    pub fn settings(&self) -> &PlannerSettings {
        &self.settings
    }

    /// The node pair that closed the gap, once solved.
    #[must_use]
    pub fn connection(&self) -> Option<Connection> {
        self.connection
    }

    #[must_use]
    pub fn solution(&self) -> Option<&Path> {
        self.solution.as_ref()
    }
}

/// Bidirectional RRT implementation.
///
/// # Returns
/// Returns the outcome with the forward and backward trees.
///
/// # Errors
///
/// If the inputs are invalid or a collaborator fails, see [`BiRrtPlanner::step`].
pub fn birrt<S, O>(
    start: &Configuration,
    goal: &Configuration,
    sampler: &mut S,
    oracle: &mut O,
    settings: PlannerSettings,
) -> Result<(PlanOutcome, (Tree, Tree))>
where
    S: Sampler + ?Sized,
    O: CollisionOracle + ?Sized,
{
    let mut planner = BiRrtPlanner::new(start.clone(), goal.clone(), settings)?;
    let outcome = planner.solve(sampler, oracle, &mut crate::events::NoopObserver)?;
    Ok((outcome, planner.into_trees()))
}

//
// Unit tests
//
