//! MCTS configuration parameters.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Playout policy used when no custom one is installed on the solver.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RolloutKind {
    /// [`crate::sim::HeuristicRollout`] with default tuning.
    #[default]
    Heuristic,
    /// [`crate::sim::RandomRollout`].
    Random,
}

/// MCTS configuration parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MCTSConfig {
    /// Exploration constant shared by UCB1 and PUCT (default: sqrt(2)).
    /// Higher values favor exploration over exploitation.
    pub exploration_constant: f64,

    /// Maximum nodes to allocate in the tree. Trials keep running once the
    /// tree is full, they just stop adding nodes.
    pub max_nodes: usize,

    /// Random seed for expansion and rollouts.
    /// Same seed and same worlds produce identical searches.
    pub seed: u64,

    /// Point difference that maps to a full reward swing of 0.5.
    pub reward_scale: f64,

    pub rollout: RolloutKind,
}

impl Default for MCTSConfig {
    fn default() -> Self {
        Self {
            exploration_constant: std::f64::consts::SQRT_2,
            max_nodes: 100_000,
            seed: 42,
            reward_scale: 100.0,
            rollout: RolloutKind::Heuristic,
        }
    }
}

impl MCTSConfig {
    #[must_use]
    pub fn with_exploration(mut self, c: f64) -> Self {
        self.exploration_constant = c;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    #[must_use]
    pub fn with_reward_scale(mut self, scale: f64) -> Self {
        self.reward_scale = scale;
        self
    }

    #[must_use]
    pub fn with_rollout(mut self, rollout: RolloutKind) -> Self {
        self.rollout = rollout;
        self
    }
}

/// How long one search may run. Checked before every trial.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchBudget {
    pub max_iterations: u32,

    /// Wall-clock cap. `None` runs all iterations.
    pub time_limit: Option<Duration>,
}

impl SearchBudget {
    /// Iteration cap only.
    #[must_use]
    pub fn iterations(max_iterations: u32) -> Self {
        Self {
            max_iterations,
            time_limit: None,
        }
    }

    #[must_use]
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }
}

impl Default for SearchBudget {
    fn default() -> Self {
        Self::iterations(800).with_time_limit(Duration::from_millis(1500))
    }
}
