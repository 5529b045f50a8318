//! Rollout policies used to finish a simulated deal.
//!
//! Fully random playouts are too noisy at the iteration counts a real-time
//! bot can afford, so the default is a cheap deterministic card-play
//! heuristic. Its thresholds are tuned values and live in [`RolloutTuning`].

use serde::{Deserialize, Serialize};

use crate::core::{Card, CardSet, Contract, GameRng};

use super::game::FastGame;

/// Policy choosing the next move during a playout.
pub trait RolloutPolicy: Send + Sync {
    /// Pick a hand index for the seat to move, or `None` if it has no move.
    fn choose(&self, game: &FastGame, rng: &mut GameRng) -> Option<usize>;
}

/// Uniformly random legal moves.
#[derive(Clone, Debug, Default)]
pub struct RandomRollout;

impl RolloutPolicy for RandomRollout {
    fn choose(&self, game: &FastGame, rng: &mut GameRng) -> Option<usize> {
        let moves = game.legal_moves();
        rng.choose(&moves).copied()
    }
}

/// Tuned constants for [`HeuristicRollout`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RolloutTuning {
    /// Lead score bonus for a card no unseen card can beat.
    pub master_lead_bonus: i32,

    /// Extra lead score for a master per card missing from its suit.
    pub short_suit_weight: i32,

    /// Lead score penalty for a high card that is not a master.
    pub unsupported_high_penalty: i32,

    /// Point value from which a card counts as "high" when leading.
    pub unsupported_high_min_points: u16,

    /// Lead score penalty for a trump that is not a master.
    pub trump_lead_penalty: i32,
}

impl Default for RolloutTuning {
    fn default() -> Self {
        Self {
            master_lead_bonus: 40,
            short_suit_weight: 4,
            unsupported_high_penalty: 25,
            unsupported_high_min_points: 10,
            trump_lead_penalty: 12,
        }
    }
}

/// Deterministic card-play heuristic.
///
/// Uses only what the seat to move can know: its own hand, completed
/// tricks and the trick on the table.
#[derive(Clone, Debug, Default)]
pub struct HeuristicRollout {
    tuning: RolloutTuning,
}

impl HeuristicRollout {
    #[must_use]
    pub fn new(tuning: RolloutTuning) -> Self {
        Self { tuning }
    }

    #[must_use]
    pub fn tuning(&self) -> &RolloutTuning {
        &self.tuning
    }

    /// Choose a move for the seat to move. Never consults randomness.
    #[must_use]
    pub fn pick(&self, game: &FastGame) -> Option<usize> {
        let moves = game.legal_moves();
        match moves.len() {
            0 => None,
            1 => Some(moves[0]),
            _ if game.trick().is_empty() => self.pick_lead(game, &moves),
            _ => self.pick_follow(game, &moves),
        }
    }

    fn pick_lead(&self, game: &FastGame, moves: &[usize]) -> Option<usize> {
        let contract = game.contract();
        let hand = game.current_hand();
        let known = game.known_to(game.turn());
        let t = &self.tuning;

        moves
            .iter()
            .copied()
            .max_by_key(|&i| {
                let card = hand[i];
                let suit_len = hand.iter().filter(|c| c.suit == card.suit).count() as i32;
                let points = contract.points(card);
                let score = if is_master(card, contract, known) {
                    t.master_lead_bonus + t.short_suit_weight * (8 - suit_len) + points as i32
                } else {
                    let mut s = -(points as i32);
                    if points >= t.unsupported_high_min_points {
                        s -= t.unsupported_high_penalty;
                    }
                    if contract.is_trump(card) {
                        s -= t.trump_lead_penalty;
                    }
                    s
                };
                // Earlier hand positions win ties.
                score * 16 - i as i32
            })
    }

    fn pick_follow(&self, game: &FastGame, moves: &[usize]) -> Option<usize> {
        let contract = game.contract();
        let hand = game.current_hand();
        let me = game.turn();
        let trick = game.trick();
        let led = trick.led_suit()?;
        let (winner, winning_card) = trick.winner(contract)?;
        let best = contract.trick_strength(winning_card, led)?;
        let last_to_play = trick.len() == 3;

        if winner.is_partner_of(me) {
            let safe = last_to_play || is_master(winning_card, contract, game.known_to(me));
            return if safe {
                feed(hand, moves, contract)
            } else {
                lowest_value(hand, moves, contract)
            };
        }

        // Finesse: the cheapest card that takes the trick.
        let cheapest_winner = moves
            .iter()
            .copied()
            .filter_map(|i| contract.trick_strength(hand[i], led).map(|s| (s, i)))
            .filter(|&(s, _)| s > best)
            .min_by_key(|&(s, i)| (s, i))
            .map(|(_, i)| i);

        // Duck when the trick cannot be won.
        cheapest_winner.or_else(|| lowest_value(hand, moves, contract))
    }
}

impl RolloutPolicy for HeuristicRollout {
    fn choose(&self, game: &FastGame, _rng: &mut GameRng) -> Option<usize> {
        self.pick(game)
    }
}

/// Play moves chosen by `policy` until the deal ends or no move exists.
///
/// Returns the number of moves played.
pub fn play_out(game: &mut FastGame, policy: &dyn RolloutPolicy, rng: &mut GameRng) -> usize {
    let mut moves = 0;
    while !game.is_terminal() {
        let Some(index) = policy.choose(game, rng) else {
            break;
        };
        if game.apply_move(index).is_err() {
            break;
        }
        moves += 1;
    }
    moves
}

/// True when no card outside `known` can beat `card` within its suit.
#[must_use]
pub fn is_master(card: Card, contract: Contract, known: CardSet) -> bool {
    let strength = contract.rank_strength(card);
    let mut outside = CardSet::full().difference(known);
    outside.remove(card);
    outside
        .of_suit(card.suit)
        .iter()
        .all(|other| contract.rank_strength(other) < strength)
}

/// Highest-point card, keeping trumps back when anything else is legal.
fn feed(hand: &[Card], moves: &[usize], contract: Contract) -> Option<usize> {
    moves.iter().copied().max_by_key(|&i| {
        let card = hand[i];
        (
            !contract.is_trump(card),
            contract.points(card),
            std::cmp::Reverse(contract.rank_strength(card)),
            std::cmp::Reverse(i),
        )
    })
}

/// Lowest-value card, keeping trumps back when anything else is legal.
fn lowest_value(hand: &[Card], moves: &[usize], contract: Contract) -> Option<usize> {
    moves.iter().copied().min_by_key(|&i| {
        let card = hand[i];
        (
            contract.is_trump(card),
            contract.points(card),
            contract.rank_strength(card),
            i,
        )
    })
}
