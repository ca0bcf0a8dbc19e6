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

//! Ordered waypoint sequences extracted from solved trees.
use crate::configuration::{Configuration, Distance};
use crate::error::Result;
use crate::tree::Tree;

// Relative slack when comparing float-computed steps against the step size.
const STEP_SLACK: f64 = 1e-9;

/// Waypoints from start to goal.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    waypoints: Vec<Configuration>,

    // Last waypoint contributed by the forward tree of a bidirectional search.
    seam: Option<usize>,
}

impl Path {
    #[must_use]
    pub fn new(waypoints: Vec<Configuration>) -> Self {
        Path {
            waypoints,
            seam: None,
        }
    }

    /// Root-to-`end` walk of a single tree, finished with `goal`.
    ///
    /// `goal` is not repeated when `end` already holds it exactly.
    ///
    /// # Errors
    ///
    /// If `end` is not in the tree.
    pub fn from_tree<I>(tree: &Tree<I>, end: usize, goal: &Configuration) -> Result<Self> {
        let mut waypoints = tree.path(end)?;
        if waypoints.last() != Some(goal) {
            waypoints.push(goal.clone());
        }
        Ok(Path::new(waypoints))
    }

    /// Joins the forward tree's walk to `forward_end` with the backward tree's walk from
    /// `backward_end` to its root, giving start, seam, goal order.
    ///
    /// # Errors
    ///
    /// If either node is not in its tree.
    pub fn join<I, J>(
        forward: &Tree<I>,
        forward_end: usize,
        backward: &Tree<J>,
        backward_end: usize,
    ) -> Result<Self> {
        let mut waypoints = forward.path(forward_end)?;
        let seam = waypoints.len() - 1;

        let mut tail = backward.path(backward_end)?;
        tail.reverse();
        if waypoints.last() == tail.first() {
            // Both trees hold the meeting configuration
            tail.remove(0);
        }
        waypoints.extend(tail);

        Ok(Path {
            waypoints,
            seam: Some(seam),
        })
    }

    #[must_use]
    pub fn waypoints(&self) -> &[Configuration] {
        &self.waypoints
    }

    #[must_use]
    pub fn into_waypoints(self) -> Vec<Configuration> {
        self.waypoints
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    #[must_use]
    pub fn first(&self) -> Option<&Configuration> {
        self.waypoints.first()
    }

    #[must_use]
    pub fn last(&self) -> Option<&Configuration> {
        self.waypoints.last()
    }

    /// Index of the last waypoint taken from the forward tree, for bidirectional solutions.
    #[must_use]
    pub fn seam(&self) -> Option<usize> {
        self.seam
    }

    /// Distances between consecutive waypoints.
    pub fn gaps(&self) -> impl Iterator<Item = f64> + '_ {
        self.waypoints.windows(2).map(|w| w[0].distance(&w[1]))
    }

    /// Total joint-space length.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.gaps().sum()
    }

    /// Largest distance between consecutive waypoints, zero for fewer than two.
    #[must_use]
    pub fn max_gap(&self) -> f64 {
        self.gaps().fold(0.0, f64::max)
    }

    /// True when no consecutive pair is further apart than `step_size`, up to rounding.
    #[must_use]
    pub fn respects_step(&self, step_size: f64) -> bool {
        self.max_gap() <= step_size * (1.0 + STEP_SLACK)
    }
}

//
// Unit tests
//

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    fn chain(values: &[f64]) -> Tree {
        let mut tree = Tree::new(Configuration::from([values[0]]));
        for (i, &v) in values.iter().enumerate().skip(1) {
            tree.add(Configuration::from([v]), i - 1).unwrap();
        }
        tree
    }

    fn joints(path: &Path) -> Vec<f64> {
        path.waypoints().iter().map(|q| q[0]).collect()
    }

    #[test]
    fn test_from_tree_appends_goal() {
        let tree = chain(&[0.0, 0.1, 0.2]);
        let path = Path::from_tree(&tree, 2, &Configuration::from([0.25])).unwrap();
        assert_eq!(joints(&path), vec![0.0, 0.1, 0.2, 0.25]);
        assert_eq!(path.seam(), None);
        assert!(path.respects_step(0.1));
    }

    #[test]
    fn test_from_tree_does_not_repeat_goal() {
        let tree = chain(&[0.0, 0.1, 0.2]);
        let path = Path::from_tree(&tree, 2, &Configuration::from([0.2])).unwrap();
        assert_eq!(path.len(), 3);
        assert!(Path::from_tree(&tree, 5, &Configuration::from([0.2])).is_err());
    }

    #[test]
    fn test_join_orders_start_to_goal() {
        let forward = chain(&[0.0, 0.1, 0.2]);
        let backward = chain(&[0.5, 0.4, 0.3]);
        let path = Path::join(&forward, 2, &backward, 2).unwrap();
        assert_eq!(joints(&path), vec![0.0, 0.1, 0.2, 0.3, 0.4, 0.5]);
        assert_eq!(path.seam(), Some(2));
        assert!(approx_eq!(f64, path.length(), 0.5, epsilon = 1e-12));
        assert!(approx_eq!(f64, path.max_gap(), 0.1, epsilon = 1e-12));
    }

    #[test]
    fn test_join_shared_meeting_point() {
        let forward = chain(&[0.0, 0.1]);
        let backward = chain(&[0.2, 0.1]);
        let path = Path::join(&forward, 1, &backward, 1).unwrap();
        assert_eq!(joints(&path), vec![0.0, 0.1, 0.2]);
    }

    #[test]
    fn test_step_bound() {
        let path = Path::new(vec![
            Configuration::from([0.0]),
            Configuration::from([0.1]),
            Configuration::from([0.35]),
        ]);
        assert!(!path.respects_step(0.1));
        assert!(path.respects_step(0.25));
        assert!(Path::new(Vec::new()).is_empty());
        assert_eq!(Path::new(Vec::new()).max_gap(), 0.0);
    }
}
