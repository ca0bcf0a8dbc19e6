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

//! Projects joint-space edges into work space for drawing.
//!
//! Joint-space trees can't be drawn directly once there are more than three joints,
//! but the reference point of the arm (say, the tool tip) can be. Nothing here feeds back
//! into planning.
use crate::configuration::Configuration;
use crate::events::{EdgeEvent, PlanObserver};
use crate::path::Path;

/// Maps a configuration to the world-frame position of a reference point.
pub trait ForwardKinematics {
    fn position(&self, q: &Configuration) -> [f64; 3];
}

impl<F> ForwardKinematics for F
where
    F: Fn(&Configuration) -> [f64; 3],
{
    fn position(&self, q: &Configuration) -> [f64; 3] {
        self(q)
    }
}

/// Line segments as a vertex list plus index pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineMesh {
    pub vertices: Vec<[f64; 3]>,
    pub segments: Vec<[usize; 2]>,
}

impl LineMesh {
    pub fn push_segment(&mut self, from: [f64; 3], to: [f64; 3]) {
        let first = self.vertices.len();
        self.vertices.push(from);
        self.vertices.push(to);
        self.segments.push([first, first + 1]);
    }

    /// Polyline through every waypoint of the path.
    #[must_use]
    pub fn from_path<K: ForwardKinematics + ?Sized>(kinematics: &K, path: &Path) -> Self {
        let vertices: Vec<[f64; 3]> = path
            .waypoints()
            .iter()
            .map(|q| kinematics.position(q))
            .collect();
        let segments = (1..vertices.len()).map(|i| [i - 1, i]).collect();
        LineMesh { vertices, segments }
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.segments.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Observer accumulating projected tree edges and the projected solution.
pub struct EdgeProjector<K> {
    kinematics: K,
    tree: LineMesh,
    path: LineMesh,
}

impl<K: ForwardKinematics> EdgeProjector<K> {
    #[must_use]
    pub fn new(kinematics: K) -> Self {
        EdgeProjector {
            kinematics,
            tree: LineMesh::default(),
            path: LineMesh::default(),
        }
    }

    /// Projected edges of every tree, in the order they were added.
    #[must_use]
    pub fn tree_mesh(&self) -> &LineMesh {
        &self.tree
    }

    /// Projected solution, empty until a planner reports one.
    #[must_use]
    pub fn path_mesh(&self) -> &LineMesh {
        &self.path
    }
}

impl<K: ForwardKinematics> PlanObserver for EdgeProjector<K> {
    fn on_edge(&mut self, edge: &EdgeEvent) {
        let from = self.kinematics.position(&edge.from);
        let to = self.kinematics.position(&edge.to);
        self.tree.push_segment(from, to);
    }

    fn on_path(&mut self, path: &Path) {
        self.path = LineMesh::from_path(&self.kinematics, path);
    }
}

//
// Unit tests
//
