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

//! Target configurations for tree growth.
//!
//! Planners draw targets through the [Sampler] trait so tests can replace the random
//! source with a fixed script.
use crate::configuration::Configuration;
use crate::error::{Error, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::TAU;

/// Source of target configurations.
pub trait Sampler {
    /// Decides whether the next target is the goal itself, with probability `goal_bias`.
    fn goal_biased(&mut self, goal_bias: f64) -> bool;

    /// Draws a configuration independently per joint from the sampling range.
    fn uniform(&mut self) -> Configuration;

    /// Joint count of produced configurations, if known up front.
    fn dimension(&self) -> Option<usize> {
        None
    }

    /// Returns `goal` unchanged when goal biased, a uniform draw otherwise.
    fn sample(&mut self, goal: &Configuration, goal_bias: f64) -> Configuration {
        if self.goal_biased(goal_bias) {
            goal.clone()
        } else {
            self.uniform()
        }
    }
}

/// Per-joint sampling range `[lower, upper)`.
#[derive(Debug, Clone, PartialEq)]
pub struct JointLimits {
    lower: Vec<f64>,
    upper: Vec<f64>,
}

impl JointLimits {
    /// Builds limits from per-joint bounds.
    ///
    /// # Errors
    ///
    /// If the bound lists differ in length or are empty.
    /// If any bound is not finite or a lower bound is not below its upper bound.
    pub fn new(lower: Vec<f64>, upper: Vec<f64>) -> Result<Self> {
        if lower.len() != upper.len() {
            return Err(Error::InvalidJointLimits(format!(
                "{} lower bounds but {} upper bounds",
                lower.len(),
                upper.len()
            )));
        }
        if lower.is_empty() {
            return Err(Error::InvalidJointLimits("no joints".to_string()));
        }
        for (joint, (lo, hi)) in lower.iter().zip(upper.iter()).enumerate() {
            if !lo.is_finite() || !hi.is_finite() || lo >= hi {
                return Err(Error::InvalidJointLimits(format!(
                    "joint {joint} has range [{lo}, {hi})"
                )));
            }
        }
        Ok(JointLimits { lower, upper })
    }

    /// Same range for every joint.
    ///
    /// # Errors
    ///
    /// See [`JointLimits::new`].
    pub fn uniform(dimension: usize, lower: f64, upper: f64) -> Result<Self> {
        JointLimits::new(vec![lower; dimension], vec![upper; dimension])
    }

    /// `[-2π, 2π)` on every joint.
    ///
    /// # Errors
    ///
    /// If `dimension` is zero.
    pub fn revolute(dimension: usize) -> Result<Self> {
        JointLimits::uniform(dimension, -TAU, TAU)
    }

    #[must_use]
    pub fn dimension(&self) -> usize {
        self.lower.len()
    }

    /// True when every joint of `q` lies in its range.
    #[must_use]
    pub fn contains(&self, q: &Configuration) -> bool {
        q.dimension() == self.dimension()
            && q
                .iter()
                .zip(self.lower.iter().zip(self.upper.iter()))
                .all(|(v, (lo, hi))| lo <= v && v < hi)
    }

    fn draw<R: Rng>(&self, rng: &mut R) -> Configuration {
        self.lower
            .iter()
            .zip(self.upper.iter())
            .map(|(&lo, &hi)| rng.gen_range(lo..hi))
            .collect()
    }
}

/// Random targets: goal decisions and joint values both come from `rng`.
#[derive(Debug, Clone)]
pub struct RandomSampler<R> {
    rng: R,
    limits: JointLimits,
}

impl<R: Rng> RandomSampler<R> {
    #[must_use]
    pub fn new(rng: R, limits: JointLimits) -> Self {
        RandomSampler { rng, limits }
    }

    #[must_use]
    pub fn limits(&self) -> &JointLimits {
        &self.limits
    }
}

impl RandomSampler<StdRng> {
    /// Reproducible sampler for a fixed seed.
    #[must_use]
    pub fn seeded(seed: u64, limits: JointLimits) -> Self {
        RandomSampler::new(StdRng::seed_from_u64(seed), limits)
    }

    /// Sampler seeded from system entropy.
    #[must_use]
    pub fn from_entropy(limits: JointLimits) -> Self {
        RandomSampler::new(StdRng::from_entropy(), limits)
    }
}

impl<R: Rng> Sampler for RandomSampler<R> {
    fn goal_biased(&mut self, goal_bias: f64) -> bool {
        self.rng.gen::<f64>() < goal_bias
    }

    fn uniform(&mut self) -> Configuration {
        self.limits.draw(&mut self.rng)
    }

    fn dimension(&self) -> Option<usize> {
        Some(self.limits.dimension())
    }
}

/// Replays fixed decisions and configurations, cycling when exhausted.
#[derive(Debug, Clone)]
pub struct ScriptedSampler {
    goal_pattern: Vec<bool>,
    configurations: Vec<Configuration>,
    next_decision: usize,
    next_configuration: usize,
}

impl ScriptedSampler {
    /// Without a goal pattern only a bias of 1 heads for the goal.
    ///
    /// # Panics
    ///
    /// If `configurations` is empty.
    #[must_use]
    pub fn new(configurations: Vec<Configuration>) -> Self {
        assert!(
            !configurations.is_empty(),
            "a scripted sampler needs at least one configuration"
        );
        ScriptedSampler {
            goal_pattern: Vec::new(),
            configurations,
            next_decision: 0,
            next_configuration: 0,
        }
    }

    /// Only ever heads for the goal.
    #[must_use]
    pub fn always_goal(dimension: usize) -> Self {
        ScriptedSampler::new(vec![Configuration::new(vec![0.0; dimension])])
            .with_goal_pattern(vec![true])
    }

    #[must_use]
    pub fn with_goal_pattern(mut self, pattern: Vec<bool>) -> Self {
        self.goal_pattern = pattern;
        self
    }
}

impl Sampler for ScriptedSampler {
    fn goal_biased(&mut self, goal_bias: f64) -> bool {
        if self.goal_pattern.is_empty() {
            return goal_bias >= 1.0;
        }
        let decision = self.goal_pattern[self.next_decision % self.goal_pattern.len()];
        self.next_decision += 1;
        decision
    }

    fn uniform(&mut self) -> Configuration {
        let q = self.configurations[self.next_configuration % self.configurations.len()].clone();
        self.next_configuration += 1;
        q
    }

    fn dimension(&self) -> Option<usize> {
        Some(self.configurations[0].dimension())
    }
}

//
// Unit tests
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joint_limits_validation() {
        assert!(JointLimits::new(vec![0.0], vec![1.0, 2.0]).is_err());
        assert!(JointLimits::new(vec![], vec![]).is_err());
        assert!(JointLimits::new(vec![1.0], vec![1.0]).is_err());
        assert!(JointLimits::new(vec![f64::NAN], vec![1.0]).is_err());
        assert!(JointLimits::revolute(0).is_err());
        assert_eq!(JointLimits::revolute(7).unwrap().dimension(), 7);
    }

    #[test]
    fn test_uniform_within_limits() {
        let limits = JointLimits::new(vec![-1.0, 0.0, 10.0], vec![1.0, 0.5, 11.0]).unwrap();
        let mut sampler = RandomSampler::seeded(11, limits.clone());
        let goal = Configuration::from([0.0, 0.0, 0.0]);
        for _ in 0..500 {
            let q = sampler.sample(&goal, 0.0);
            assert_ne!(q, goal);
            assert!(limits.contains(&q));
        }
    }

    #[test]
    fn test_full_goal_bias() {
        let mut sampler = RandomSampler::seeded(5, JointLimits::revolute(2).unwrap());
        let goal = Configuration::from([0.3, 0.4]);
        for _ in 0..100 {
            assert_eq!(sampler.sample(&goal, 1.0), goal);
        }
    }

    #[test]
    fn test_goal_bias_frequency() {
        let mut sampler = RandomSampler::seeded(2, JointLimits::revolute(1).unwrap());
        let hits = (0..10_000).filter(|_| sampler.goal_biased(0.5)).count();
        assert!((4_500..5_500).contains(&hits), "{hits} goal draws");
        let hits = (0..10_000).filter(|_| sampler.goal_biased(0.1)).count();
        assert!((800..1_200).contains(&hits), "{hits} goal draws");
    }

    #[test]
    fn test_seeded_is_reproducible() {
        let limits = JointLimits::revolute(4).unwrap();
        let mut a = RandomSampler::seeded(42, limits.clone());
        let mut b = RandomSampler::seeded(42, limits);
        let goal = Configuration::from([0.0, 0.0, 0.0, 0.0]);
        for _ in 0..50 {
            assert_eq!(a.sample(&goal, 0.5), b.sample(&goal, 0.5));
        }
    }

    #[test]
    fn test_scripted_cycles() {
        let mut sampler =
            ScriptedSampler::new(vec![Configuration::from([1.0]), Configuration::from([2.0])])
                .with_goal_pattern(vec![false, true]);
        let goal = Configuration::from([9.0]);
        let drawn: Vec<f64> = (0..4).map(|_| sampler.sample(&goal, 0.5)[0]).collect();
        assert_eq!(drawn, vec![1.0, 9.0, 2.0, 9.0]);
        assert_eq!(sampler.dimension(), Some(1));
    }

    #[test]
    fn test_scripted_without_pattern_follows_bias_extremes() {
        let mut sampler = ScriptedSampler::new(vec![Configuration::from([1.0])]);
        let goal = Configuration::from([9.0]);
        assert_eq!(sampler.sample(&goal, 1.0), goal);
        assert_eq!(sampler.sample(&goal, 0.5)[0], 1.0);
        assert_eq!(sampler.sample(&goal, 0.0)[0], 1.0);
    }
}
