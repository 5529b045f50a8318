//! Selection policies: how to choose which child to explore.
//!
//! Scores are computed from the point of view of the seat choosing at the
//! parent; the caller flips `q` for the opposing team before scoring.

use super::config::MCTSConfig;

/// Inputs to a selection score.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChildStats {
    /// Mean reward for the chooser, 0 when unvisited.
    pub q: f64,
    pub visits: u32,
    pub parent_visits: u32,
    pub prior: f32,
}

/// Policy for scoring children during selection. Highest score wins.
pub trait SelectionPolicy: Send + Sync {
    fn score(&self, child: &ChildStats, config: &MCTSConfig) -> f64;
}

/// UCB1 (Upper Confidence Bound) selection policy.
///
/// Formula: Q(a) + c * sqrt(ln(N) / n(a)). Unvisited children score
/// infinity so each is tried once.
#[derive(Clone, Debug, Default)]
pub struct UCB1;

impl SelectionPolicy for UCB1 {
    fn score(&self, child: &ChildStats, config: &MCTSConfig) -> f64 {
        if child.visits == 0 {
            return f64::INFINITY;
        }
        let ln_parent = f64::from(child.parent_visits.max(1)).ln();
        child.q + config.exploration_constant * (ln_parent / f64::from(child.visits)).sqrt()
    }
}

/// PUCT selection policy (Predictor + UCB for Trees).
///
/// Uses prior probabilities from a move-probability oracle.
/// Formula: Q(a) + c * P(a) * sqrt(N) / (1 + n(a))
#[derive(Clone, Debug, Default)]
pub struct PUCT;

impl SelectionPolicy for PUCT {
    fn score(&self, child: &ChildStats, config: &MCTSConfig) -> f64 {
        let sqrt_parent = f64::from(child.parent_visits.max(1)).sqrt();
        child.q
            + config.exploration_constant * f64::from(child.prior) * sqrt_parent
                / (1.0 + f64::from(child.visits))
    }
}
