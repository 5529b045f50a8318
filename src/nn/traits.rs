//! Move-probability oracle traits.
//!
//! The search asks an oracle for priors over the legal moves of a state.
//! Oracles see states through [`PolicyView`], which both the simulator and
//! the real table implement, so a trained model never depends on either.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::Card;
use crate::sim::{FastGame, MoveList};

use super::encoder::TableEncoder;

/// Encoded state as a flat tensor for model input.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EncodedState {
    /// Flattened tensor data (row-major order).
    pub tensor: Vec<f32>,

    /// Shape of the tensor.
    pub shape: Vec<usize>,
}

impl EncodedState {
    pub fn new(tensor: Vec<f32>, shape: Vec<usize>) -> Self {
        debug_assert_eq!(
            tensor.len(),
            shape.iter().product::<usize>(),
            "Tensor length must match shape product"
        );
        Self { tensor, shape }
    }

    pub fn zeros(shape: Vec<usize>) -> Self {
        let size = shape.iter().product();
        Self::new(vec![0.0; size], shape)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tensor.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tensor.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<f32> {
        self.tensor.get(index).copied()
    }

    /// Set element at a flat index. Out-of-range writes are ignored.
    pub fn set(&mut self, index: usize, value: f32) {
        if let Some(slot) = self.tensor.get_mut(index) {
            *slot = value;
        }
    }
}

/// A decision point as an oracle sees it.
pub trait PolicyView {
    /// Hand of the seat to move. Moves index into this slice.
    fn current_hand(&self) -> &[Card];

    /// Legal hand indices for the seat to move.
    fn legal_moves(&self) -> MoveList;

    /// Features of the state from the mover's point of view.
    fn encode_state(&self) -> EncodedState;
}

impl PolicyView for FastGame {
    fn current_hand(&self) -> &[Card] {
        FastGame::current_hand(self)
    }

    fn legal_moves(&self) -> MoveList {
        FastGame::legal_moves(self)
    }

    fn encode_state(&self) -> EncodedState {
        TableEncoder.encode(
            FastGame::current_hand(self),
            self.played(),
            self.trick(),
            self.contract(),
            self.turn(),
        )
    }
}

/// Source of prior move probabilities.
///
/// Returned maps are keyed by hand index. Entries for illegal moves are
/// ignored and missing legal moves count as zero; see [`normalize_priors`].
pub trait PolicyOracle: Send + Sync {
    fn predict_policy(&self, view: &dyn PolicyView) -> FxHashMap<usize, f32>;
}

/// Equal probability for every legal move.
#[derive(Clone, Copy, Debug, Default)]
pub struct UniformOracle;

impl PolicyOracle for UniformOracle {
    fn predict_policy(&self, view: &dyn PolicyView) -> FxHashMap<usize, f32> {
        let moves = view.legal_moves();
        if moves.is_empty() {
            return FxHashMap::default();
        }
        let p = 1.0 / moves.len() as f32;
        moves.into_iter().map(|m| (m, p)).collect()
    }
}

/// Restrict `raw` to `legal` and rescale to sum to 1.
///
/// Negative, NaN and missing entries count as zero. When nothing is left
/// the result is uniform over `legal`.
#[must_use]
pub fn normalize_priors(raw: &FxHashMap<usize, f32>, legal: &[usize]) -> FxHashMap<usize, f32> {
    let clean = |m: &usize| {
        raw.get(m)
            .copied()
            .filter(|p| p.is_finite() && *p > 0.0)
            .unwrap_or(0.0)
    };
    let total: f32 = legal.iter().map(clean).sum();
    if total <= 0.0 {
        let p = 1.0 / legal.len().max(1) as f32;
        return legal.iter().map(|&m| (m, p)).collect();
    }
    legal.iter().map(|&m| (m, clean(&m) / total)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Contract, Seat};

    fn game() -> FastGame {
        let cards = |codes: &[&str]| -> Vec<Card> { codes.iter().map(|c| c.parse().unwrap()).collect() };
        FastGame::endgame(
            [
                cards(&["AH", "7S", "QD"]),
                cards(&["KH", "8C", "JD"]),
                cards(&["10H", "9D", "8S"]),
                cards(&["7H", "JS", "KC"]),
            ],
            Contract::sun(),
            Seat::new(0),
        )
        .unwrap()
    }

    #[test]
    fn test_encoded_state_access() {
        let mut state = EncodedState::zeros(vec![2, 2]);
        state.set(3, 5.0);
        state.set(10, 1.0);
        assert_eq!(state.len(), 4);
        assert_eq!(state.get(3), Some(5.0));
        assert_eq!(state.get(4), None);
        assert!(!state.is_empty());
    }

    #[test]
    fn test_fast_game_is_a_policy_view() {
        let game = game();
        let view: &dyn PolicyView = &game;
        assert_eq!(view.current_hand().len(), 3);
        assert_eq!(view.legal_moves().as_slice(), &[0, 1, 2]);
        assert_eq!(view.encode_state().len(), crate::nn::FEATURE_COUNT);
    }

    #[test]
    fn test_uniform_oracle() {
        let game = game();
        let priors = UniformOracle.predict_policy(&game);
        assert_eq!(priors.len(), 3);
        assert!((priors.values().sum::<f32>() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_priors() {
        let mut raw = FxHashMap::default();
        raw.insert(0, 3.0);
        raw.insert(1, f32::NAN);
        raw.insert(5, 10.0); // illegal
        let priors = normalize_priors(&raw, &[0, 1, 2]);
        assert_eq!(priors[&0], 1.0);
        assert_eq!(priors[&1], 0.0);
        assert_eq!(priors[&2], 0.0);

        let priors = normalize_priors(&FxHashMap::default(), &[3, 4]);
        assert_eq!(priors[&3], 0.5);
        assert_eq!(priors[&4], 0.5);
    }

    #[test]
    fn test_serialization() {
        let state = EncodedState::new(vec![1.0, 0.0, 1.0], vec![3]);
        let json = serde_json::to_string(&state).unwrap();
        let back: EncodedState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, back);
    }
}
