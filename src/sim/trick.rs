//! The trick in progress and its resolution.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{Card, Contract, Seat, Suit, SEAT_COUNT};

/// Cards played so far in the current trick, in play order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trick {
    plays: SmallVec<[(Seat, Card); SEAT_COUNT]>,
}

impl Trick {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a trick from plays in order. Seat order is not checked here.
    #[must_use]
    pub fn from_plays(plays: &[(Seat, Card)]) -> Self {
        Self {
            plays: plays.iter().copied().collect(),
        }
    }

    #[inline]
    #[must_use]
    pub fn plays(&self) -> &[(Seat, Card)] {
        &self.plays
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.plays.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plays.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.plays.len() == SEAT_COUNT
    }

    #[must_use]
    pub fn leader(&self) -> Option<Seat> {
        self.plays.first().map(|&(seat, _)| seat)
    }

    #[must_use]
    pub fn led_suit(&self) -> Option<Suit> {
        self.plays.first().map(|&(_, card)| card.suit)
    }

    /// Seat due to play next, if the trick has started.
    #[must_use]
    pub fn next_seat(&self) -> Option<Seat> {
        self.leader().map(|leader| leader.offset(self.plays.len()))
    }

    /// True when every play follows clockwise from the leader.
    #[must_use]
    pub fn is_in_turn_order(&self) -> bool {
        match self.leader() {
            Some(leader) => self
                .plays
                .iter()
                .enumerate()
                .all(|(i, &(seat, _))| seat == leader.offset(i)),
            None => true,
        }
    }

    pub fn cards(&self) -> impl Iterator<Item = Card> + '_ {
        self.plays.iter().map(|&(_, card)| card)
    }

    pub fn push(&mut self, seat: Seat, card: Card) {
        debug_assert!(!self.is_full(), "trick already holds four cards");
        self.plays.push((seat, card));
    }

    pub fn clear(&mut self) {
        self.plays.clear();
    }

    /// The play currently holding the trick.
    ///
    /// The leader's card always has strength, so a non-empty trick always
    /// has exactly one winner.
    #[must_use]
    pub fn winner(&self, contract: Contract) -> Option<(Seat, Card)> {
        let led = self.led_suit()?;
        self.plays
            .iter()
            .copied()
            .filter_map(|(seat, card)| contract.trick_strength(card, led).map(|s| (s, seat, card)))
            .max_by_key(|&(strength, _, _)| strength)
            .map(|(_, seat, card)| (seat, card))
    }

    /// Strength a card must exceed to take the trick right now.
    #[must_use]
    pub fn winning_strength(&self, contract: Contract) -> Option<u8> {
        let led = self.led_suit()?;
        let (_, card) = self.winner(contract)?;
        contract.trick_strength(card, led)
    }

    /// Card points currently in the trick.
    #[must_use]
    pub fn points(&self, contract: Contract) -> u16 {
        self.cards().map(|card| contract.points(card)).sum()
    }
}
