//! MCTS search statistics for diagnostics and tuning.

use serde::{Deserialize, Serialize};

/// Statistics collected during one search.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Trials completed.
    pub iterations: u32,

    /// Nodes added to the tree.
    pub nodes_expanded: u32,

    /// Rollouts performed.
    pub simulations: u32,

    /// Worlds the search asked for and did not get.
    pub missing_worlds: u32,

    /// Deepest node reached.
    pub max_depth: u16,

    /// Total time spent searching (microseconds).
    pub time_us: u64,
}

impl SearchStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn iterations_per_second(&self) -> f64 {
        if self.time_us == 0 {
            0.0
        } else {
            f64::from(self.iterations) / (self.time_us as f64 / 1_000_000.0)
        }
    }

    #[must_use]
    pub fn avg_nodes_per_iteration(&self) -> f64 {
        if self.iterations == 0 {
            0.0
        } else {
            f64::from(self.nodes_expanded) / f64::from(self.iterations)
        }
    }
}
