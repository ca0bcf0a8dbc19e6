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

//! Planner settings, loadable from YAML.
//!
//! ```yaml
//! planner:
//!   step_size: 0.1
//!   goal_bias: 0.5
//!   max_iterations: 10000
//! sampling:
//!   lower: -6.283185307179586
//!   upper: 6.283185307179586
//!   seed: 7
//! ```
use crate::error::{Error, Result};
use crate::sampler::{JointLimits, RandomSampler};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use std::path::Path;
use std::time::Duration;

mod defaults {
    pub fn step_size() -> f64 {
        0.1
    }

    pub fn goal_bias() -> f64 {
        0.5
    }

    pub fn max_iterations() -> u64 {
        10_000
    }

    pub fn progress_interval() -> u64 {
        100
    }

    pub fn lower() -> f64 {
        -super::TAU
    }

    pub fn upper() -> f64 {
        super::TAU
    }
}

/// Full planning configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct PlanningConfig {
    /// Tree growth settings
    #[serde(default)]
    pub planner: PlannerSettings,

    /// Target sampling settings
    #[serde(default)]
    pub sampling: SamplingSettings,
}

impl PlanningConfig {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    ///
    /// If the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Parse from YAML string
    ///
    /// # Errors
    ///
    /// If the YAML is malformed or holds out of range settings.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: PlanningConfig = serde_yaml::from_str(yaml)?;
        config.planner.validate()?;
        Ok(config)
    }

    /// Serialize to a YAML string
    ///
    /// # Errors
    ///
    /// If serialization fails.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Random sampler for `dimension` joints, seeded when a seed is configured.
    ///
    /// # Errors
    ///
    /// If the sampling range is invalid.
    pub fn sampler(&self, dimension: usize) -> Result<RandomSampler<StdRng>> {
        let limits = self.sampling.limits(dimension)?;
        Ok(match self.sampling.seed {
            Some(seed) => RandomSampler::seeded(seed, limits),
            None => RandomSampler::from_entropy(limits),
        })
    }
}

/// Tree growth settings
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PlannerSettings {
    /// Maximum joint-space distance covered by one extension
    #[serde(default = "defaults::step_size")]
    pub step_size: f64,

    /// Probability of heading straight for the goal
    #[serde(default = "defaults::goal_bias")]
    pub goal_bias: f64,

    /// Iterations before giving up
    #[serde(default = "defaults::max_iterations")]
    pub max_iterations: u64,

    /// Wall clock limit, checked between iterations
    #[serde(default)]
    pub max_duration_secs: Option<f64>,

    /// Iterations between progress log lines (0=disabled)
    #[serde(default = "defaults::progress_interval")]
    pub progress_interval: u64,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            step_size: defaults::step_size(),
            goal_bias: defaults::goal_bias(),
            max_iterations: defaults::max_iterations(),
            max_duration_secs: None,
            progress_interval: defaults::progress_interval(),
        }
    }
}

impl PlannerSettings {
    #[must_use]
    pub fn with_step_size(mut self, step_size: f64) -> Self {
        self.step_size = step_size;
        self
    }

    #[must_use]
    pub fn with_goal_bias(mut self, goal_bias: f64) -> Self {
        self.goal_bias = goal_bias;
        self
    }

    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u64) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    #[must_use]
    pub fn with_max_duration(mut self, max_duration: Duration) -> Self {
        self.max_duration_secs = Some(max_duration.as_secs_f64());
        self
    }

    /// Wall clock limit, `None` when unset or not representable.
    #[must_use]
    pub fn max_duration(&self) -> Option<Duration> {
        self.max_duration_secs.and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }

    /// Checks the settings a planner cannot run with.
    ///
    /// # Errors
    ///
    /// If the step size is not finite and positive.
    /// If the goal bias is outside `[0, 1]`.
    /// If the time limit is negative, NaN, or too large for a [`Duration`].
    pub fn validate(&self) -> Result<()> {
        if !self.step_size.is_finite() || self.step_size <= 0.0 {
            return Err(Error::InvalidStepSize(self.step_size));
        }
        if !(0.0..=1.0).contains(&self.goal_bias) {
            return Err(Error::InvalidGoalBias(self.goal_bias));
        }
        if let Some(secs) = self.max_duration_secs {
            if Duration::try_from_secs_f64(secs).is_err() {
                return Err(Error::InvalidDuration(secs));
            }
        }
        Ok(())
    }
}

/// Target sampling settings
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SamplingSettings {
    /// Lower bound of every joint
    #[serde(default = "defaults::lower")]
    pub lower: f64,

    /// Upper bound of every joint
    #[serde(default = "defaults::upper")]
    pub upper: f64,

    /// RNG seed for reproducible runs (entropy when absent)
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for SamplingSettings {
    fn default() -> Self {
        Self {
            lower: defaults::lower(),
            upper: defaults::upper(),
            seed: None,
        }
    }
}

impl SamplingSettings {
    /// # Errors
    ///
    /// If the range is empty or `dimension` is zero.
    pub fn limits(&self, dimension: usize) -> Result<JointLimits> {
        JointLimits::uniform(dimension, self.lower, self.upper)
    }
}

//
// Unit tests
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::Configuration;
    use crate::sampler::Sampler;

    #[test]
    fn test_defaults() {
        let config = PlanningConfig::from_yaml("{}").unwrap();
        assert_eq!(config, PlanningConfig::default());
        assert_eq!(config.planner.step_size, 0.1);
        assert_eq!(config.planner.goal_bias, 0.5);
        assert_eq!(config.planner.max_iterations, 10_000);
        assert_eq!(config.planner.max_duration(), None);
        assert_eq!(config.sampling.upper, TAU);
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = "planner:\n  step_size: 0.05\n  max_duration_secs: 2.5\nsampling:\n  seed: 9\n";
        let config = PlanningConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.planner.step_size, 0.05);
        assert_eq!(config.planner.goal_bias, 0.5);
        assert_eq!(
            config.planner.max_duration(),
            Some(Duration::from_millis(2500))
        );
        assert_eq!(config.sampling.seed, Some(9));
    }

    #[test]
    fn test_rejects_invalid_settings() {
        assert!(matches!(
            PlanningConfig::from_yaml("planner:\n  step_size: 0.0\n"),
            Err(Error::InvalidStepSize(_))
        ));
        assert!(matches!(
            PlanningConfig::from_yaml("planner:\n  goal_bias: 2.0\n"),
            Err(Error::InvalidGoalBias(_))
        ));
        assert!(matches!(
            PlanningConfig::from_yaml("planner: 5"),
            Err(Error::Yaml(_))
        ));
    }

    #[test]
    fn test_rejects_invalid_durations() {
        assert!(matches!(
            PlanningConfig::from_yaml("planner:\n  max_duration_secs: 1.0e30\n"),
            Err(Error::InvalidDuration(_))
        ));
        assert!(matches!(
            PlanningConfig::from_yaml("planner:\n  max_duration_secs: -5.0\n"),
            Err(Error::InvalidDuration(_))
        ));

        let mut settings = PlannerSettings::default();
        settings.max_duration_secs = Some(f64::NAN);
        assert!(matches!(settings.validate(), Err(Error::InvalidDuration(_))));
        assert_eq!(settings.max_duration(), None);

        settings.max_duration_secs = Some(1.0e30);
        assert_eq!(settings.max_duration(), None);

        settings.max_duration_secs = Some(0.0);
        assert!(settings.validate().is_ok());
        assert_eq!(settings.max_duration(), Some(Duration::ZERO));
    }

    #[test]
    fn test_yaml_round_trip() {
        let mut config = PlanningConfig::default();
        config.planner = config.planner.with_step_size(0.2).with_max_iterations(50);
        config.sampling.seed = Some(3);
        let parsed = PlanningConfig::from_yaml(&config.to_yaml().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_seeded_sampler() {
        let mut config = PlanningConfig::default();
        config.sampling.seed = Some(1);
        let goal = Configuration::from([0.0, 0.0]);
        let mut a = config.sampler(2).unwrap();
        let mut b = config.sampler(2).unwrap();
        for _ in 0..10 {
            assert_eq!(a.sample(&goal, 0.5), b.sample(&goal, 0.5));
        }
        assert!(config.sampler(0).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let result = PlanningConfig::load(Path::new("/nonexistent/armplanning.yaml"));
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
