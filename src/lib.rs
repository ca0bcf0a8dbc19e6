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

//! Joint-space sampling planners for robotic manipulators.
//!
//! Two planners grow trees of joint configurations by bounded steps:
//!
//! * [`planning::RrtPlanner`] grows a single tree from the start and stops once its newest
//!   node lands within one step of the goal.
//! * [`planning::BiRrtPlanner`] grows one tree from each endpoint and stops once their
//!   newest nodes are within one step of each other.
//!
//! Collision checking is supplied by the caller through [`collision::CollisionOracle`] and
//! sampling through [`sampler::Sampler`]. Tree growth can be watched with an
//! [`events::PlanObserver`], for example to draw the trees in work space with
//! [`projection::EdgeProjector`].
//!
//! ```no_run
//! use armplanning::planning::rrt;
//! use armplanning::sampler::{JointLimits, RandomSampler};
//! use armplanning::{Configuration, PlannerSettings};
//!
//! let start = Configuration::from([0.0, 0.0, 0.0]);
//! let goal = Configuration::from([1.0, -0.5, 0.25]);
//! let mut sampler = RandomSampler::seeded(7, JointLimits::revolute(3)?);
//! let mut free = |_: &Configuration| true;
//! let (outcome, _tree) = rrt(&start, &goal, &mut sampler, &mut free, PlannerSettings::default())?;
//! assert!(outcome.is_solved());
//! # Ok::<(), armplanning::Error>(())
//! ```
pub mod collision;
pub mod config;
pub mod configuration;
pub mod error;
pub mod events;
pub mod nearest;
pub mod path;
pub mod planning;
pub mod projection;
pub mod sampler;
pub mod tree;

pub use config::{PlannerSettings, PlanningConfig};
pub use configuration::{Configuration, Distance};
pub use error::{Error, Result};
pub use path::Path;
pub use planning::{PlanOutcome, PlannerState, StopReason};
pub use tree::Tree;
