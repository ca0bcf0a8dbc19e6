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

// q_goal                          // solved once the newest node is within a step
// counter = 0
// T = tree rooted at q_start
// while counter < max_iterations:
//     q_target = goal with probability p, else random
//     q_new, nearest = Step(T, q_target)
//     if IsFree(q_new):
//         T.add(q_new, parent = nearest)
//     if |newest(T) - q_goal| < step:
//         return Path(T, newest) + q_goal
// return Exhausted

use super::{
    check_dimension, extend_tree, outcome, validate_endpoints, Budget, PlanOutcome, PlannerState,
    StopReason,
};
use crate::collision::CollisionOracle;
use crate::config::PlannerSettings;
use crate::configuration::{Configuration, Distance};
use crate::error::{Error, Result};
use crate::events::{PlanObserver, TreeSide};
use crate::nearest::{LinearIndex, NearestNeighborIndex};
use crate::path::Path;
use crate::sampler::Sampler;
use crate::tree::Tree;
use log::{debug, info};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Single tree RRT, grown from the start towards goal-biased samples.
#[derive(Debug)]
pub struct RrtPlanner<I = LinearIndex<Configuration>> {
    tree: Tree<I>,
    goal: Configuration,
    settings: PlannerSettings,
    budget: Budget,
    state: PlannerState,
    iterations: u64,

    // Most recently added node, the root until the first extension succeeds
    last_added: usize,
    solution: Option<Path>,
}

impl RrtPlanner<LinearIndex<Configuration>> {
    /// # Errors
    ///
    /// If the settings are invalid, or start and goal are empty, non-finite, or differ
    /// in dimension.
    pub fn new(
        start: Configuration,
        goal: Configuration,
        settings: PlannerSettings,
    ) -> Result<Self> {
        RrtPlanner::with_index(start, goal, settings, LinearIndex::new())
    }
}

impl<I: NearestNeighborIndex<Configuration>> RrtPlanner<I> {
    /// Planner whose tree uses the provided, empty, nearest neighbor index.
    ///
    /// # Errors
    ///
    /// See [`RrtPlanner::new`], and [`Tree::with_index`] for the index requirements.
    pub fn with_index(
        start: Configuration,
        goal: Configuration,
        settings: PlannerSettings,
        index: I,
    ) -> Result<Self> {
        settings.validate()?;
        validate_endpoints(&start, &goal)?;
        let budget = Budget::new(settings.max_iterations, settings.max_duration());
        Ok(RrtPlanner {
            tree: Tree::with_index(start, index)?,
            goal,
            settings,
            budget,
            state: PlannerState::Growing,
            iterations: 0,
            last_added: 0,
            solution: None,
        })
    }

    /// Stop at the next iteration boundary once `flag` is set.
    #[must_use]
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.budget.set_cancel_flag(flag);
        self
    }

    /// Runs one sample, extend, validate, insert cycle.
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
            info!(
                "[RRT] exhausted ({reason:?}) after {} samples, tree size = {}",
                self.iterations,
                self.tree.size()
            );
            self.state = PlannerState::Exhausted(reason);
            return Ok(self.state);
        }

        let iteration = self.iterations;
        self.iterations += 1;

        let target = sampler.sample(&self.goal, self.settings.goal_bias);
        check_dimension(self.tree.dimension(), &target)?;
        if let Some(child) = extend_tree(
            &mut self.tree,
            TreeSide::Forward,
            &target,
            self.settings.step_size,
            iteration,
            oracle,
            observer,
        )? {
            self.last_added = child;
        }

        if self.settings.progress_interval > 0 && iteration % self.settings.progress_interval == 0 {
            debug!("[RRT] samples = {iteration}, tree size = {}", self.tree.size());
        }

        let newest = self.tree.get(self.last_added).unwrap_or(self.tree.root());
        if newest.distance(&self.goal) < self.settings.step_size {
            let path = Path::from_tree(&self.tree, self.last_added, &self.goal)?;
            info!(
                "[RRT] solved after {} samples, tree size = {}, path of {} waypoints",
                self.iterations,
                self.tree.size(),
                path.len()
            );
            observer.on_path(&path);
            self.solution = Some(path);
            self.state = PlannerState::Solved;
        } else if self.iterations >= self.settings.max_iterations {
            info!(
                "[RRT] exhausted (MaxIterations) after {} samples, tree size = {}",
                self.iterations,
                self.tree.size()
            );
            self.state = PlannerState::Exhausted(StopReason::MaxIterations);
        }
        Ok(self.state)
    }

    /// Iterates until solved or exhausted.
    ///
    /// # Errors
    ///
    /// If the sampler's dimension disagrees with the start, or as for [`RrtPlanner::step`].
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
            Some(found) if found != self.tree.dimension() => {
                return Err(Error::DimensionMismatch {
                    expected: self.tree.dimension(),
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

impl<I> RrtPlanner<I> {
    #[must_use]
    pub fn state(&self) -> PlannerState {
        self.state
    }

    #[must_use]
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    #[must_use]
    pub fn tree(&self) -> &Tree<I> {
        &self.tree
    }

    #[must_use]
    pub fn into_tree(self) -> Tree<I> {
        self.tree
    }

    #[must_use]
    pub fn goal(&self) -> &Configuration {
        &self.goal
    }

    #[must_use]
    pub fn settings(&self) -> &PlannerSettings {
        &self.settings
    }

    /// Index of the most recently added node.
    #[must_use]
    pub fn last_added(&self) -> usize {
        self.last_added
    }

    #[must_use]
    pub fn solution(&self) -> Option<&Path> {
        self.solution.as_ref()
    }
}

/// Basic RRT implementation.
///
/// Grows a single tree from `start` until its newest node is within one step of `goal`
/// or the settings' budget is spent.
///
/// # Returns
/// Returns the outcome along with the tree itself, for inspection or drawing.
///
/// # Errors
///
/// If the inputs are invalid or a collaborator fails, see [`RrtPlanner::step`].
///
/// # Example
///
/// Refer to the planar arm demo or integration tests.
pub fn rrt<S, O>(
    start: &Configuration,
    goal: &Configuration,
    sampler: &mut S,
    oracle: &mut O,
    settings: PlannerSettings,
) -> Result<(PlanOutcome, Tree)>
where
    S: Sampler + ?Sized,
    O: CollisionOracle + ?Sized,
{
    let mut planner = RrtPlanner::new(start.clone(), goal.clone(), settings)?;
    let outcome = planner.solve(sampler, oracle, &mut crate::events::NoopObserver)?;
    Ok((outcome, planner.into_tree()))
}

//
// Unit tests
//
