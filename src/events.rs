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

//! Append-only stream of tree growth events for renderers and loggers.
//!
//! Planners only ever push into a [`PlanObserver`]; they never read anything back and
//! never wait on it.
use crate::configuration::Configuration;
use crate::path::Path;
use std::sync::mpsc::Sender;

/// Which tree of a planner grew.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TreeSide {
    /// Tree rooted at the start, the only tree of a single-tree planner.
    Forward,
    /// Tree rooted at the goal.
    Backward,
}

/// A node was added to a tree.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeEvent {
    pub side: TreeSide,
    pub parent: usize,
    pub child: usize,
    pub from: Configuration,
    pub to: Configuration,
}

/// Receives planner events.
pub trait PlanObserver {
    fn on_edge(&mut self, _edge: &EdgeEvent) {}

    /// Called once with the solution of a solved run.
    fn on_path(&mut self, _path: &Path) {}
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl PlanObserver for NoopObserver {}

impl<F> PlanObserver for F
where
    F: FnMut(&EdgeEvent),
{
    fn on_edge(&mut self, edge: &EdgeEvent) {
        self(edge);
    }
}

/// Forwards edges to another thread, typically a renderer.
///
/// A disconnected receiver is ignored so a closed window cannot stop planning.
#[derive(Debug, Clone)]
pub struct ChannelObserver(pub Sender<EdgeEvent>);

impl PlanObserver for ChannelObserver {
    fn on_edge(&mut self, edge: &EdgeEvent) {
        let _ = self.0.send(edge.clone());
    }
}

/// Records everything in memory.
#[derive(Debug, Clone, Default)]
pub struct EdgeLog {
    pub edges: Vec<EdgeEvent>,
    pub path: Option<Path>,
}

impl EdgeLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Edges added to one side, in order.
    pub fn side(&self, side: TreeSide) -> impl Iterator<Item = &EdgeEvent> {
        self.edges.iter().filter(move |edge| edge.side == side)
    }
}

impl PlanObserver for EdgeLog {
    fn on_edge(&mut self, edge: &EdgeEvent) {
        self.edges.push(edge.clone());
    }

    fn on_path(&mut self, path: &Path) {
        self.path = Some(path.clone());
    }
}

//
// Unit tests
//
