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

//! Append-only tree of configurations grown by bounded steps.
//!
//! Nodes are referenced by their position in the tree's storage. A node's parent always
//! has a smaller index than the node itself, so walking parents always ends at the root.
use crate::configuration::{Configuration, Distance};
use crate::error::{Error, Result};
use crate::nearest::{LinearIndex, NearestNeighborIndex};
use rand::Rng;

/// Basic node element for the tree.
///
/// Must be used with [Tree] since parent and children are referenced by index in the
/// [Tree]'s node vector.
#[derive(Debug)]
struct Node {
    // The configuration held by this node.
    value: Configuration,

    // Location of the node's parent. The root is its own parent.
    parent: usize,

    // Children in insertion order, for traversals from the root.
    children: Vec<usize>,
}

impl Node {
    fn new(value: Configuration, parent: usize) -> Self {
        Node {
            value,
            parent,
            children: Vec::new(),
        }
    }
}

/// A bounded extension computed by [`Tree::propose_step`].
///
/// `nearest` must be handed back to [`Tree::add`] together with `candidate`.
#[derive(Debug, Clone, PartialEq)]
pub struct Proposal {
    /// Configuration to validate and possibly add.
    pub candidate: Configuration,

    /// Index of the tree node closest to the target.
    pub nearest: usize,

    /// Distance from the nearest node to the target, not to the candidate.
    pub distance: f64,
}

/// DFS Iterator for a [Tree], yielding node indices with their configuration.
pub struct DepthFirstIterator<'a, I> {
    tree: &'a Tree<I>,
    stack: Vec<usize>,
}

impl<'a, I> DepthFirstIterator<'a, I> {
    fn new(tree: &'a Tree<I>) -> Self {
        // Root is always idx 0
        DepthFirstIterator {
            tree,
            stack: vec![0],
        }
    }
}

impl<'a, I> Iterator for DepthFirstIterator<'a, I> {
    type Item = (usize, &'a Configuration);

    fn next(&mut self) -> Option<Self::Item> {
        self.stack.pop().map(|index| {
            // Children should be pushed onto the stack in reverse order to ensure left-most
            // are processed first
            let node = &self.tree.nodes[index];
            self.stack.extend(node.children.iter().rev());
            (index, &node.value)
        })
    }
}

/// Tree of configurations for RRT style planners.
///
/// Nodes are never removed or modified once added. All configurations share the
/// dimension of the root.
#[derive(Debug)]
pub struct Tree<I = LinearIndex<Configuration>> {
    // Detailed node data for the tree.
    nodes: Vec<Node>,

    // Closest-point queries over the same configurations, in the same order.
    index: I,

    dimension: usize,
}

impl Tree<LinearIndex<Configuration>> {
    /// Construct a new tree with the specified configuration as the root node.
    #[must_use]
    pub fn new(root: Configuration) -> Self {
        Tree::rooted(root, LinearIndex::new())
    }
}

impl<I: NearestNeighborIndex<Configuration>> Tree<I> {
    /// Construct a new tree backed by the provided nearest neighbor index.
    ///
    /// # Errors
    ///
    /// If the index already holds values, since its answers would not line up with
    /// node indices.
    pub fn with_index(root: Configuration, index: I) -> Result<Self> {
        if !index.is_empty() {
            return Err(Error::NonEmptyIndex(index.len()));
        }
        Ok(Tree::rooted(root, index))
    }

    fn rooted(root: Configuration, mut index: I) -> Self {
        let dimension = root.dimension();
        index.insert(root.clone());
        Tree {
            nodes: vec![Node::new(root, 0)],
            index,
            dimension,
        }
    }

    /// Computes a step of at most `step_size` from the closest node towards `target`.
    ///
    /// The tree is not modified. If the target is within `step_size` of its nearest node
    /// the target itself is the candidate. If the target coincides with a node, that
    /// node's configuration is returned with a distance of zero.
    ///
    /// # Errors
    ///
    /// If the nearest neighbor index has no answer or answers with an unknown node.
    pub fn propose_step(&self, target: &Configuration, step_size: f64) -> Result<Proposal> {
        let nearest = self
            .index
            .nearest(target)
            .ok_or(Error::NearestNeighborUnavailable(self.nodes.len()))?;
        let from = &self.nodes.get(nearest).ok_or(Error::UnknownNode(nearest))?.value;
        let distance = from.distance(target);

        let candidate = if distance == 0.0 {
            // Nothing to normalize, stay on the existing node
            from.clone()
        } else if distance <= step_size {
            target.clone()
        } else {
            from.step_towards(target, step_size, distance)
        };

        Ok(Proposal {
            candidate,
            nearest,
            distance,
        })
    }

    /// Adds the candidate as a child of `parent` and returns its index.
    ///
    /// `parent` should be the `nearest` field of the [Proposal] that produced the candidate.
    ///
    /// # Errors
    ///
    /// If the parent is not in the tree.
    /// If the candidate's dimension differs from the tree's.
    pub fn add(&mut self, candidate: Configuration, parent: usize) -> Result<usize> {
        if parent >= self.nodes.len() {
            return Err(Error::UnknownNode(parent));
        }
        if candidate.dimension() != self.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.dimension,
                found: candidate.dimension(),
            });
        }

        let child = self.nodes.len();
        self.index.insert(candidate.clone());
        self.nodes.push(Node::new(candidate, parent));
        self.nodes[parent].children.push(child);
        Ok(child)
    }
}

impl<I> Tree<I> {
    // Return the size of the tree
    #[must_use]
    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    #[must_use]
    pub fn root(&self) -> &Configuration {
        &self.nodes[0].value
    }

    /// Index of the most recently added node, the root if nothing was added yet.
    #[must_use]
    pub fn latest(&self) -> usize {
        self.nodes.len() - 1
    }

    #[must_use]
    pub fn get(&self, node: usize) -> Option<&Configuration> {
        self.nodes.get(node).map(|n| &n.value)
    }

    /// Returns the parent index of the node, which is the node itself for the root.
    #[must_use]
    pub fn parent(&self, node: usize) -> Option<usize> {
        self.nodes.get(node).map(|n| n.parent)
    }

    #[must_use]
    pub fn children(&self, node: usize) -> Option<&[usize]> {
        self.nodes.get(node).map(|n| n.children.as_slice())
    }

    /// Returns a [`DepthFirstIterator`] for the tree
    #[must_use]
    pub fn iter_depth_first(&self) -> DepthFirstIterator<'_, I> {
        DepthFirstIterator::new(self)
    }

    /// Every `(parent, child)` pair in insertion order of the child.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .skip(1)
            .map(|(child, node)| (node.parent, child))
    }

    /// Returns a uniformly chosen configuration from the tree.
    pub fn random_node<R: Rng>(&self, rng: &mut R) -> &Configuration {
        &self.nodes[rng.gen_range(0..self.nodes.len())].value
    }

    /// Returns the path from the root to the specified node.
    ///
    /// # Errors
    ///
    /// If the specified node is not found in the Tree
    pub fn path(&self, end: usize) -> Result<Vec<Configuration>> {
        if end >= self.nodes.len() {
            return Err(Error::UnknownNode(end));
        }

        // Build the path from end to beginning, the root is its own parent
        let mut path = Vec::new();
        let mut cur_idx = end;
        loop {
            path.push(self.nodes[cur_idx].value.clone());
            let parent = self.nodes[cur_idx].parent;
            if parent == cur_idx {
                break;
            }
            cur_idx = parent;
        }

        // Reverse it to get the path in order
        path.reverse();
        Ok(path)
    }
}

//
// Unit tests
//

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Mutex;

    fn line_tree() -> Tree {
        // 0 -> 1 -> 2
        //   -> 3
        let mut tree = Tree::new(Configuration::from([0.0]));
        assert_eq!(tree.add(Configuration::from([1.0]), 0).unwrap(), 1);
        assert_eq!(tree.add(Configuration::from([2.0]), 1).unwrap(), 2);
        assert_eq!(tree.add(Configuration::from([-1.0]), 0).unwrap(), 3);
        tree
    }

    #[test]
    fn test_tree_root() {
        let tree = Tree::new(Configuration::from([0.0, 1.0]));
        assert_eq!(tree.size(), 1);
        assert_eq!(tree.dimension(), 2);
        assert_eq!(tree.parent(0), Some(0));
        assert_eq!(tree.latest(), 0);
        assert_eq!(tree.path(0).unwrap(), vec![Configuration::from([0.0, 1.0])]);
    }

    #[test]
    fn test_propose_partial_step() {
        let tree = Tree::new(Configuration::from([0.0]));
        let proposal = tree.propose_step(&Configuration::from([1.0]), 0.1).unwrap();
        assert!(approx_eq!(f64, proposal.candidate[0], 0.1, ulps = 2));
        assert_eq!(proposal.nearest, 0);
        assert!(approx_eq!(f64, proposal.distance, 1.0, ulps = 2));

        // Proposing never grows the tree
        assert_eq!(tree.size(), 1);
    }

    #[test]
    fn test_propose_exact_reach() {
        let tree = line_tree();
        let target = Configuration::from([2.05]);
        let proposal = tree.propose_step(&target, 0.1).unwrap();
        assert_eq!(proposal.candidate, target);
        assert_eq!(proposal.nearest, 2);
    }

    #[test]
    fn test_propose_existing_node() {
        let tree = line_tree();
        let proposal = tree.propose_step(&Configuration::from([-1.0]), 0.1).unwrap();
        assert_eq!(proposal.candidate, Configuration::from([-1.0]));
        assert_eq!(proposal.nearest, 3);
        assert_eq!(proposal.distance, 0.0);
        assert!(proposal.candidate.is_finite());
    }

    #[test]
    fn test_propose_is_bounded() {
        let mut tree = Tree::new(Configuration::from([0.0, 0.0, 0.0]));
        let mut rng = StdRng::seed_from_u64(3);
        let step_size = 0.25;
        for _ in 0..200 {
            let target: Configuration = (0..3).map(|_| rng.gen_range(-2.0..2.0)).collect();
            let proposal = tree.propose_step(&target, step_size).unwrap();
            let from = tree.get(proposal.nearest).unwrap();
            let gap = from.distance(&proposal.candidate);
            assert!(gap <= step_size + 1e-12);
            if proposal.candidate != target {
                assert!(proposal.distance > step_size);
            }
            tree.add(proposal.candidate, proposal.nearest).unwrap();
        }

        for (parent, child) in tree.edges() {
            assert!(parent < child);
        }
    }

    #[test]
    fn test_add_errors() {
        let mut tree = line_tree();
        assert!(matches!(
            tree.add(Configuration::from([3.0]), 4),
            Err(Error::UnknownNode(4))
        ));
        assert!(matches!(
            tree.add(Configuration::from([3.0, 0.0]), 0),
            Err(Error::DimensionMismatch {
                expected: 1,
                found: 2
            })
        ));
        assert_eq!(tree.size(), 4);
    }

    #[test]
    fn test_tree_compute_back_path() {
        let tree = line_tree();
        let path = tree.path(2).unwrap();
        assert_eq!(
            path,
            vec![
                Configuration::from([0.0]),
                Configuration::from([1.0]),
                Configuration::from([2.0])
            ]
        );
        assert_eq!(tree.path(3).unwrap().len(), 2);

        // Invalid node
        assert!(tree.path(8).is_err());
    }

    #[test]
    fn test_tree_dfs() {
        let tree = line_tree();
        let order: Vec<usize> = tree.iter_depth_first().map(|(i, _)| i).collect();
        assert_eq!(order, vec![0, 1, 2, 3]);
        assert_eq!(tree.children(0), Some(&[1, 3][..]));
    }

    #[test]
    fn test_edges() {
        let tree = line_tree();
        let edges: Vec<_> = tree.edges().collect();
        assert_eq!(edges, vec![(0, 1), (1, 2), (0, 3)]);
    }

    #[test]
    fn test_random_node() {
        let tree = line_tree();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let node = tree.random_node(&mut rng);
            assert!(tree.iter_depth_first().any(|(_, value)| value == node));
        }
    }

    #[test]
    fn test_concurrent_proposals_serialized_adds() {
        // Proposals read a shared snapshot, adds happen one at a time with their own parent.
        let tree = line_tree();
        let targets = [3.0, -3.0, 0.5, 1.5];
        let proposals: Vec<Proposal> = std::thread::scope(|s| {
            let handles: Vec<_> = targets
                .iter()
                .map(|&t| {
                    let tree = &tree;
                    s.spawn(move || tree.propose_step(&Configuration::from([t]), 0.1).unwrap())
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let tree = Mutex::new(tree);
        for proposal in proposals {
            let mut guard = tree.lock().unwrap();
            let expected_parent = proposal.nearest;
            let child = guard.add(proposal.candidate, proposal.nearest).unwrap();
            assert_eq!(guard.parent(child), Some(expected_parent));
        }
        let tree = tree.into_inner().unwrap();
        assert_eq!(tree.size(), 8);
        assert_eq!(tree.parent(4), Some(2));
        assert_eq!(tree.parent(5), Some(3));
    }

    // Index that answers the same node whatever was inserted
    struct FixedAnswer {
        answer: Option<usize>,
        len: usize,
    }

    impl NearestNeighborIndex<Configuration> for FixedAnswer {
        fn insert(&mut self, _: Configuration) {
            self.len += 1;
        }

        fn nearest(&self, _: &Configuration) -> Option<usize> {
            self.answer
        }

        fn len(&self) -> usize {
            self.len
        }
    }

    #[test]
    fn test_index_without_answer() {
        let index = FixedAnswer {
            answer: None,
            len: 0,
        };
        let tree = Tree::with_index(Configuration::from([0.0]), index).unwrap();
        assert!(matches!(
            tree.propose_step(&Configuration::from([1.0]), 0.1),
            Err(Error::NearestNeighborUnavailable(1))
        ));
    }

    #[test]
    fn test_index_answers_unknown_node() {
        let index = FixedAnswer {
            answer: Some(7),
            len: 0,
        };
        let tree = Tree::with_index(Configuration::from([0.0]), index).unwrap();
        assert!(matches!(
            tree.propose_step(&Configuration::from([1.0]), 0.1),
            Err(Error::UnknownNode(7))
        ));
    }

    #[test]
    fn test_rejects_filled_index() {
        let mut index: LinearIndex<Configuration> = LinearIndex::new();
        index.insert(Configuration::from([5.0]));
        assert!(matches!(
            Tree::with_index(Configuration::from([0.0]), index),
            Err(Error::NonEmptyIndex(1))
        ));

        let index = LinearIndex::<Configuration>::new();
        let tree = Tree::with_index(Configuration::from([0.0]), index).unwrap();
        assert_eq!(tree.size(), 1);
    }
}
