//! What the table knows about the hidden hands.
//!
//! Beliefs come in three strengths: voids are hard constraints, remaining
//! counts are exact, and per-suit probabilities are soft weights for the
//! sampler.

use serde::{Deserialize, Serialize};

use crate::core::{Card, Contract, Rank, Seat, SeatMap, Suit, HAND_SIZE};
use crate::sim::Trick;

/// Probability assigned to a suit before any evidence.
pub const NEUTRAL_PROBABILITY: f32 = 0.5;

/// Read access to beliefs about every seat.
pub trait BeliefSource {
    /// True when `seat` is known to hold no card of `suit`.
    fn is_void(&self, seat: Seat, suit: Suit) -> bool;

    /// Exact number of cards `seat` still holds.
    fn remaining_cards(&self, seat: Seat) -> usize;

    /// Soft estimate in `[0, 1]` that `seat` holds cards of `suit`.
    fn suit_probability(&self, seat: Seat, suit: Suit) -> f32;
}

/// Set of suits packed into a byte.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SuitMask(u8);

impl SuitMask {
    pub const EMPTY: SuitMask = SuitMask(0);

    #[inline]
    #[must_use]
    pub const fn contains(self, suit: Suit) -> bool {
        self.0 & (1 << suit.index()) != 0
    }

    #[inline]
    pub fn insert(&mut self, suit: Suit) {
        self.0 |= 1 << suit.index();
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Suit> {
        Suit::ALL.into_iter().filter(move |&suit| self.contains(suit))
    }
}

/// Plain-data beliefs, indexed by absolute seat.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BeliefState {
    voids: SeatMap<SuitMask>,
    remaining: SeatMap<u8>,
    probabilities: SeatMap<[f32; 4]>,
}

impl Default for BeliefState {
    fn default() -> Self {
        Self::new([HAND_SIZE; 4])
    }
}

impl BeliefState {
    /// No voids, neutral probabilities, the given card counts.
    #[must_use]
    pub fn new(remaining: [usize; 4]) -> Self {
        Self {
            voids: SeatMap::with_value(SuitMask::EMPTY),
            remaining: SeatMap::from_array(remaining.map(|n| n.min(HAND_SIZE) as u8)),
            probabilities: SeatMap::with_value([NEUTRAL_PROBABILITY; 4]),
        }
    }

    /// Builder form of [`BeliefState::set_void`].
    #[must_use]
    pub fn with_void(mut self, seat: Seat, suit: Suit) -> Self {
        self.set_void(seat, suit);
        self
    }

    /// Builder form of [`BeliefState::set_probability`].
    #[must_use]
    pub fn with_probability(mut self, seat: Seat, suit: Suit, probability: f32) -> Self {
        self.set_probability(seat, suit, probability);
        self
    }

    /// Mark `seat` void in `suit`. Its probability for the suit drops to 0.
    pub fn set_void(&mut self, seat: Seat, suit: Suit) {
        self.voids[seat].insert(suit);
        self.probabilities[seat][suit.index()] = 0.0;
    }

    /// Set a soft probability. Ignored for suits the seat is void in.
    pub fn set_probability(&mut self, seat: Seat, suit: Suit, probability: f32) {
        if self.voids[seat].contains(suit) {
            return;
        }
        let p = if probability.is_finite() {
            probability.clamp(0.0, 1.0)
        } else {
            NEUTRAL_PROBABILITY
        };
        self.probabilities[seat][suit.index()] = p;
    }

    pub fn set_remaining(&mut self, seat: Seat, count: usize) {
        self.remaining[seat] = count.min(HAND_SIZE) as u8;
    }

    #[must_use]
    pub fn voids(&self, seat: Seat) -> SuitMask {
        self.voids[seat]
    }
}

impl BeliefSource for BeliefState {
    fn is_void(&self, seat: Seat, suit: Suit) -> bool {
        self.voids[seat].contains(suit)
    }

    fn remaining_cards(&self, seat: Seat) -> usize {
        usize::from(self.remaining[seat])
    }

    fn suit_probability(&self, seat: Seat, suit: Suit) -> f32 {
        self.probabilities[seat][suit.index()]
    }
}

/// Tuning for the discard inferences made by [`BeliefTracker`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BeliefConfig {
    /// Multiplier applied to a suit after its owner discards a 7, 8 or 9 of it.
    pub low_discard_decay: f32,

    /// Minimum probability for a suit after its owner discards its A or 10.
    pub high_discard_floor: f32,
}

impl Default for BeliefConfig {
    fn default() -> Self {
        Self {
            low_discard_decay: 0.5,
            high_discard_floor: 0.8,
        }
    }
}

/// Builds a [`BeliefState`] from the plays seen so far.
///
/// Inferences:
/// - a seat that does not follow the led suit is void in it;
/// - under Hokum, a seat that neither follows nor trumps while an opponent
///   holds the trick is void in trump as well;
/// - an off-suit discard of a low card weakens the discarded suit, one of
///   an ace or ten strengthens it.
#[derive(Clone, Debug)]
pub struct BeliefTracker {
    contract: Contract,
    config: BeliefConfig,
    played_by: SeatMap<u8>,
    state: BeliefState,
}

impl BeliefTracker {
    #[must_use]
    pub fn new(contract: Contract, config: BeliefConfig) -> Self {
        Self {
            contract,
            config,
            played_by: SeatMap::with_value(0),
            state: BeliefState::default(),
        }
    }

    /// Replay a trick in which some cards could not be read. Inferences
    /// stop at the first unknown card; later plays are only counted.
    pub fn observe_partial(&mut self, plays: &[(Seat, Option<Card>)]) {
        let mut partial = Trick::new();
        let mut blind = false;
        for &(seat, card) in plays {
            match card {
                Some(card) if !blind => {
                    self.observe_play(&partial, seat, card);
                    partial.push(seat, card);
                }
                Some(_) => self.count_play(seat),
                None => {
                    self.count_play(seat);
                    blind = true;
                }
            }
        }
    }

    /// Count a play by `seat` without drawing any inference from it.
    pub fn count_play(&mut self, seat: Seat) {
        self.played_by[seat] = self.played_by[seat].saturating_add(1);
        let remaining = HAND_SIZE.saturating_sub(usize::from(self.played_by[seat]));
        self.state.set_remaining(seat, remaining);
    }

    /// Record `seat` playing `card` onto `before`, the trick as it stood.
    pub fn observe_play(&mut self, before: &Trick, seat: Seat, card: Card) {
        self.count_play(seat);

        let Some(led) = before.led_suit() else {
            return;
        };
        if card.suit == led {
            return;
        }
        self.state.set_void(seat, led);

        let trumped = self.contract.is_trump(card);
        if let Some(trump) = self.contract.trump() {
            let opponent_holds = before
                .winner(self.contract)
                .is_some_and(|(winner, _)| !winner.is_partner_of(seat));
            if opponent_holds && !trumped {
                self.state.set_void(seat, trump);
            }
        }
        if trumped {
            return;
        }

        let current = self.state.suit_probability(seat, card.suit);
        match card.rank {
            Rank::Seven | Rank::Eight | Rank::Nine => {
                let decayed = current * self.config.low_discard_decay;
                self.state.set_probability(seat, card.suit, decayed);
            }
            Rank::Ace | Rank::Ten => {
                let raised = current.max(self.config.high_discard_floor);
                self.state.set_probability(seat, card.suit, raised);
            }
            _ => {}
        }
    }

    #[must_use]
    pub fn beliefs(&self) -> &BeliefState {
        &self.state
    }

    #[must_use]
    pub fn into_beliefs(self) -> BeliefState {
        self.state
    }
}

impl BeliefSource for BeliefTracker {
    fn is_void(&self, seat: Seat, suit: Suit) -> bool {
        self.state.is_void(seat, suit)
    }

    fn remaining_cards(&self, seat: Seat) -> usize {
        self.state.remaining_cards(seat)
    }

    fn suit_probability(&self, seat: Seat, suit: Suit) -> f32 {
        self.state.suit_probability(seat, suit)
    }
}

/// Presents an absolute-seat belief source with `origin` renumbered to seat 0.
#[derive(Clone, Copy)]
pub struct RelativeBeliefs<'a> {
    inner: &'a dyn BeliefSource,
    origin: Seat,
}

impl<'a> RelativeBeliefs<'a> {
    #[must_use]
    pub fn new(inner: &'a dyn BeliefSource, origin: Seat) -> Self {
        Self { inner, origin }
    }
}

impl BeliefSource for RelativeBeliefs<'_> {
    fn is_void(&self, seat: Seat, suit: Suit) -> bool {
        self.inner.is_void(seat.absolute_from(self.origin), suit)
    }

    fn remaining_cards(&self, seat: Seat) -> usize {
        self.inner.remaining_cards(seat.absolute_from(self.origin))
    }

    fn suit_probability(&self, seat: Seat, suit: Suit) -> f32 {
        self.inner.suit_probability(seat.absolute_from(self.origin), suit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(code: &str) -> Card {
        code.parse().unwrap()
    }

    fn trick(leader: u8, cards: &[&str]) -> Vec<(Seat, Option<Card>)> {
        cards
            .iter()
            .enumerate()
            .map(|(i, code)| (Seat::new(leader).offset(i), Some(c(code))))
            .collect()
    }

    #[test]
    fn test_void_clears_probability() {
        let state = BeliefState::default()
            .with_probability(Seat::new(1), Suit::Hearts, 0.9)
            .with_void(Seat::new(1), Suit::Hearts)
            .with_probability(Seat::new(1), Suit::Hearts, 0.7);
        assert!(state.is_void(Seat::new(1), Suit::Hearts));
        assert_eq!(state.suit_probability(Seat::new(1), Suit::Hearts), 0.0);
        assert_eq!(state.voids(Seat::new(1)).iter().collect::<Vec<_>>(), vec![Suit::Hearts]);
    }

    #[test]
    fn test_probability_is_clamped() {
        let state = BeliefState::default()
            .with_probability(Seat::new(2), Suit::Clubs, 3.0)
            .with_probability(Seat::new(3), Suit::Clubs, f32::NAN);
        assert_eq!(state.suit_probability(Seat::new(2), Suit::Clubs), 1.0);
        assert_eq!(state.suit_probability(Seat::new(3), Suit::Clubs), NEUTRAL_PROBABILITY);
    }

    #[test]
    fn test_tracker_counts_and_voids() {
        let mut tracker = BeliefTracker::new(Contract::sun(), BeliefConfig::default());
        tracker.observe_partial(&trick(0, &["AH", "7H", "8C", "KH"]));

        assert_eq!(tracker.remaining_cards(Seat::new(0)), 7);
        assert!(tracker.is_void(Seat::new(2), Suit::Hearts));
        assert!(!tracker.is_void(Seat::new(1), Suit::Hearts));
        // Low discard weakens clubs for seat 2.
        assert_eq!(
            tracker.suit_probability(Seat::new(2), Suit::Clubs),
            NEUTRAL_PROBABILITY * 0.5
        );
    }

    #[test]
    fn test_high_discard_raises_suit() {
        let mut tracker = BeliefTracker::new(Contract::sun(), BeliefConfig::default());
        tracker.observe_partial(&trick(1, &["7D", "AC"]));
        assert_eq!(tracker.suit_probability(Seat::new(2), Suit::Clubs), 0.8);
        assert!(tracker.is_void(Seat::new(2), Suit::Diamonds));
    }

    #[test]
    fn test_unknown_card_counts_but_stops_inference() {
        let mut tracker = BeliefTracker::new(Contract::sun(), BeliefConfig::default());
        tracker.observe_partial(&[
            (Seat::new(0), Some(c("AH"))),
            (Seat::new(1), Some(c("7C"))),
            (Seat::new(2), None),
            (Seat::new(3), Some(c("8D"))),
        ]);

        for seat in Seat::ALL {
            assert_eq!(tracker.remaining_cards(seat), 7);
        }
        assert!(tracker.is_void(Seat::new(1), Suit::Hearts));
        // Seat 3 played after the unknown card, so nothing is inferred.
        assert!(!tracker.is_void(Seat::new(3), Suit::Hearts));
    }

    #[test]
    fn test_hokum_failure_to_trump_implies_trump_void() {
        let mut tracker =
            BeliefTracker::new(Contract::hokum(Suit::Spades), BeliefConfig::default());
        // Seat 1 is void in hearts and discards while seat 0 (an opponent) leads.
        tracker.observe_partial(&trick(0, &["AH", "7C"]));
        assert!(tracker.is_void(Seat::new(1), Suit::Hearts));
        assert!(tracker.is_void(Seat::new(1), Suit::Spades));

        // Seat 3 discards while its partner holds the trick: no trump inference.
        let mut tracker =
            BeliefTracker::new(Contract::hokum(Suit::Spades), BeliefConfig::default());
        tracker.observe_partial(&trick(0, &["7H", "AH", "8H", "7D"]));
        assert!(tracker.is_void(Seat::new(3), Suit::Hearts));
        assert!(!tracker.is_void(Seat::new(3), Suit::Spades));
    }

    #[test]
    fn test_relative_beliefs_renumber_seats() {
        let state = BeliefState::new([8, 7, 6, 5]).with_void(Seat::new(3), Suit::Diamonds);
        let relative = RelativeBeliefs::new(&state, Seat::new(2));

        // Absolute seat 3 is relative seat 1 when seat 2 acts.
        assert!(relative.is_void(Seat::new(1), Suit::Diamonds));
        assert_eq!(relative.remaining_cards(Seat::new(0)), 6);
        assert_eq!(relative.remaining_cards(Seat::new(2)), 8);
    }

    #[test]
    fn test_config_serialization() {
        let config = BeliefConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: BeliefConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);

        let state = BeliefState::default().with_void(Seat::new(1), Suit::Clubs);
        let json = serde_json::to_string(&state).unwrap();
        let back: BeliefState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, back);
    }
}
