//! MCTS node structures.
//!
//! Uses arena-based allocation with index references (NodeId). Children
//! are keyed by the card played, which stays meaningful across sampled
//! worlds where hand positions do not.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{Card, Seat, HAND_SIZE};

/// Index into the MCTSTree node arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Sentinel value representing no node.
    pub const NONE: NodeId = NodeId(u32::MAX);

    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline]
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == u32::MAX
    }

    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_none() {
            write!(f, "NodeId(NONE)")
        } else {
            write!(f, "NodeId({})", self.0)
        }
    }
}

/// Cards, inline.
pub type CardList = SmallVec<[Card; HAND_SIZE]>;

/// Expansion state of a node, as of the last world that visited it.
///
/// A node can return from `FullyExpanded` to `PartiallyExpanded` when a
/// later world makes cards legal that it has no child for yet.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expansion {
    #[default]
    Unexpanded,
    PartiallyExpanded(CardList),
    FullyExpanded,
}

/// A node in the MCTS tree.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MCTSNode {
    /// Card whose play led here (None for root).
    pub mv: Option<Card>,

    /// Parent node (NONE for root).
    pub parent: NodeId,

    /// Seat to move at this node.
    pub to_move: Seat,

    /// Depth in tree (root = 0).
    pub depth: u16,

    pub visits: u32,

    /// Sum of trial rewards, from the searching team's perspective.
    pub total_reward: f64,

    /// Prior probability of `mv` at the parent.
    pub prior: f32,

    pub children: SmallVec<[(Card, NodeId); HAND_SIZE]>,

    pub expansion: Expansion,
}

impl MCTSNode {
    #[must_use]
    pub fn new(parent: NodeId, mv: Option<Card>, to_move: Seat, depth: u16, prior: f32) -> Self {
        Self {
            mv,
            parent,
            to_move,
            depth,
            visits: 0,
            total_reward: 0.0,
            prior,
            children: SmallVec::new(),
            expansion: Expansion::Unexpanded,
        }
    }

    #[must_use]
    pub fn root(to_move: Seat) -> Self {
        Self::new(NodeId::NONE, None, to_move, 0, 1.0)
    }

    /// Mean reward for the searching team, 0 before any visit.
    #[must_use]
    pub fn mean_reward(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.total_reward / f64::from(self.visits)
        }
    }

    /// Value of this node to the seat choosing it. `opposing` flips the
    /// searching team's reward for the other team. Unvisited nodes are 0.
    #[must_use]
    pub fn q(&self, opposing: bool) -> f64 {
        match (self.visits, opposing) {
            (0, _) => 0.0,
            (_, false) => self.mean_reward(),
            (_, true) => 1.0 - self.mean_reward(),
        }
    }

    #[must_use]
    pub fn child(&self, card: Card) -> Option<NodeId> {
        self.children
            .iter()
            .find(|&&(c, _)| c == card)
            .map(|&(_, id)| id)
    }

    /// Record which of `legal` have no child yet, updating the expansion
    /// state. Returns those cards.
    pub fn sync_expansion(&mut self, legal: &[Card]) -> CardList {
        let untried: CardList = legal
            .iter()
            .copied()
            .filter(|&card| self.child(card).is_none())
            .collect();
        self.expansion = if untried.is_empty() {
            Expansion::FullyExpanded
        } else {
            Expansion::PartiallyExpanded(untried.clone())
        };
        untried
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(code: &str) -> Card {
        code.parse().unwrap()
    }

    #[test]
    fn test_node_id() {
        let id = NodeId::new(5);
        assert_eq!(id.raw(), 5);
        assert!(!id.is_none());
        assert_eq!(format!("{}", id), "NodeId(5)");
        assert_eq!(format!("{}", NodeId::NONE), "NodeId(NONE)");
    }

    #[test]
    fn test_root() {
        let node = MCTSNode::root(Seat::new(2));
        assert!(node.parent.is_none());
        assert_eq!(node.mv, None);
        assert_eq!(node.depth, 0);
        assert_eq!(node.expansion, Expansion::Unexpanded);
    }

    #[test]
    fn test_q_flips_for_opponents() {
        let mut node = MCTSNode::new(NodeId::new(0), Some(c("AH")), Seat::new(1), 1, 0.5);
        assert_eq!(node.q(false), 0.0);
        assert_eq!(node.q(true), 0.0);

        node.visits = 4;
        node.total_reward = 3.0;
        assert_eq!(node.q(false), 0.75);
        assert_eq!(node.q(true), 0.25);
    }

    #[test]
    fn test_expansion_can_reopen() {
        let mut node = MCTSNode::root(Seat::new(0));
        node.children.push((c("AH"), NodeId::new(1)));

        assert!(node.sync_expansion(&[c("AH")]).is_empty());
        assert_eq!(node.expansion, Expansion::FullyExpanded);

        // A new world makes KH legal too.
        let untried = node.sync_expansion(&[c("AH"), c("KH")]);
        assert_eq!(untried.as_slice(), &[c("KH")]);
        assert!(matches!(node.expansion, Expansion::PartiallyExpanded(ref cards) if cards.len() == 1));
    }

    #[test]
    fn test_serialization() {
        let mut node = MCTSNode::root(Seat::new(1));
        node.children.push((c("7S"), NodeId::new(3)));
        node.visits = 100;

        let json = serde_json::to_string(&node).unwrap();
        let back: MCTSNode = serde_json::from_str(&json).unwrap();
        assert_eq!(back.to_move, Seat::new(1));
        assert_eq!(back.visits, 100);
        assert_eq!(back.child(c("7S")), Some(NodeId::new(3)));
    }
}
