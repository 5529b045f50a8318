//! Decision results and failures.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::budget::BudgetMode;
use crate::belief::SamplingError;
use crate::core::Seat;
use crate::sim::GameError;

/// Search statistics for one candidate move.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MoveReport {
    pub visits: u32,
    pub cumulative_reward: f64,
    pub win_rate: f64,
    pub prior: f32,
}

/// The move to play, with the evidence behind it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    /// Index into the caller's hand as given.
    pub chosen_hand_index: usize,
    pub justification: String,
    /// Keyed by caller hand index.
    pub per_move_stats: BTreeMap<usize, MoveReport>,
    pub budget_mode: BudgetMode,
}

impl Decision {
    #[must_use]
    pub fn chosen_report(&self) -> Option<&MoveReport> {
        self.per_move_stats.get(&self.chosen_hand_index)
    }
}

/// Reasons a decision could not be made.
#[derive(Debug, Error)]
pub enum DecisionError {
    #[error("acting hand holds no playable card")]
    EmptyHand,

    #[error("no legal move for the acting seat")]
    NoLegalMove,

    #[error("trick on the table expects {expected} to play, not the acting seat")]
    OutOfTurn { expected: Seat },

    #[error(transparent)]
    Game(#[from] GameError),

    #[error(transparent)]
    Sampling(#[from] SamplingError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chosen_report() {
        let mut per_move_stats = BTreeMap::new();
        per_move_stats.insert(
            2,
            MoveReport {
                visits: 10,
                cumulative_reward: 6.0,
                win_rate: 0.6,
                prior: 0.5,
            },
        );
        let decision = Decision {
            chosen_hand_index: 2,
            justification: String::new(),
            per_move_stats,
            budget_mode: BudgetMode::Baseline,
        };
        assert_eq!(decision.chosen_report().map(|r| r.visits), Some(10));
    }

    #[test]
    fn test_error_conversion() {
        let err: DecisionError = SamplingError::CountMismatch {
            required: 7,
            unseen: 9,
        }
        .into();
        assert!(matches!(err, DecisionError::Sampling(_)));
        assert!(err.to_string().contains('7'));
    }
}
