//! Arena-based MCTS tree.
//!
//! Uses a flat `Vec<MCTSNode>` with index-based references. One tree is
//! shared by every trial of a decision and dropped afterward.

use serde::{Deserialize, Serialize};

use super::node::{Expansion, MCTSNode, NodeId};
use crate::core::{Card, Seat};

/// Arena-based MCTS tree.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MCTSTree {
    nodes: Vec<MCTSNode>,

    /// The root node ID (always 0).
    root: NodeId,
}

impl MCTSTree {
    #[must_use]
    pub fn new(root_seat: Seat) -> Self {
        Self::with_capacity(root_seat, 1024)
    }

    #[must_use]
    pub fn with_capacity(root_seat: Seat, capacity: usize) -> Self {
        let mut nodes = Vec::with_capacity(capacity.max(1));
        nodes.push(MCTSNode::root(root_seat));
        Self {
            nodes,
            root: NodeId::new(0),
        }
    }

    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[inline]
    #[must_use]
    pub fn get(&self, id: NodeId) -> &MCTSNode {
        &self.nodes[id.0 as usize]
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut MCTSNode {
        &mut self.nodes[id.0 as usize]
    }

    /// Allocate a child of `parent` reached by playing `card`.
    pub fn add_child(&mut self, parent: NodeId, card: Card, to_move: Seat, prior: f32) -> NodeId {
        let depth = self.get(parent).depth + 1;
        let id = NodeId::new(self.nodes.len() as u32);
        self.nodes
            .push(MCTSNode::new(parent, Some(card), to_move, depth, prior));
        self.get_mut(parent).children.push((card, id));
        id
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn root_node(&self) -> &MCTSNode {
        self.get(self.root)
    }

    #[must_use]
    pub fn stats(&self) -> TreeStats {
        TreeStats {
            node_count: self.nodes.len(),
            max_depth: self.nodes.iter().map(|n| n.depth).max().unwrap_or(0),
            total_children: self.nodes.iter().map(|n| n.children.len()).sum(),
            fully_expanded: self
                .nodes
                .iter()
                .filter(|n| n.expansion == Expansion::FullyExpanded)
                .count(),
        }
    }
}

/// Statistics about the MCTS tree.
#[derive(Clone, Debug, Default)]
pub struct TreeStats {
    pub node_count: usize,
    pub max_depth: u16,
    pub total_children: usize,
    pub fully_expanded: usize,
}

impl TreeStats {
    /// Average children per node.
    #[must_use]
    pub fn branching_factor(&self) -> f64 {
        if self.node_count == 0 {
            0.0
        } else {
            self.total_children as f64 / self.node_count as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(code: &str) -> Card {
        code.parse().unwrap()
    }

    #[test]
    fn test_tree_new() {
        let tree = MCTSTree::new(Seat::new(0));
        assert_eq!(tree.len(), 1);
        assert!(!tree.is_empty());
        assert_eq!(tree.root(), NodeId::new(0));
        assert_eq!(tree.root_node().to_move, Seat::new(0));
    }

    #[test]
    fn test_add_child_links_parent() {
        let mut tree = MCTSTree::new(Seat::new(0));
        let root = tree.root();
        let child = tree.add_child(root, c("AH"), Seat::new(1), 0.25);

        assert_eq!(child, NodeId::new(1));
        assert_eq!(tree.get(child).parent, root);
        assert_eq!(tree.get(child).depth, 1);
        assert_eq!(tree.get(child).prior, 0.25);
        assert_eq!(tree.root_node().child(c("AH")), Some(child));
    }

    #[test]
    fn test_tree_stats() {
        let mut tree = MCTSTree::new(Seat::new(0));
        let root = tree.root();
        let a = tree.add_child(root, c("AH"), Seat::new(1), 0.5);
        tree.add_child(root, c("KH"), Seat::new(1), 0.5);
        tree.add_child(a, c("7H"), Seat::new(2), 1.0);
        tree.get_mut(root).sync_expansion(&[c("AH"), c("KH")]);

        let stats = tree.stats();
        assert_eq!(stats.node_count, 4);
        assert_eq!(stats.max_depth, 2);
        assert_eq!(stats.total_children, 3);
        assert_eq!(stats.fully_expanded, 1);
        assert_eq!(stats.branching_factor(), 0.75);
    }

    #[test]
    fn test_tree_serialization() {
        let mut tree = MCTSTree::new(Seat::new(3));
        let root = tree.root();
        tree.add_child(root, c("9D"), Seat::new(0), 1.0);

        let json = serde_json::to_string(&tree).unwrap();
        let back: MCTSTree = serde_json::from_str(&json).unwrap();
        assert_eq!(back.len(), 2);
        assert_eq!(back.root_node().to_move, Seat::new(3));
    }
}
