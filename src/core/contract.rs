//! Contract modes, rank orders and point tables.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::card::{Card, Rank, Suit};

/// Contract mode of a deal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// No trump; highest card of the led suit wins.
    Sun,
    /// One suit is trump with its own rank order and point table.
    Hokum,
}

/// Plain-suit strength by face rank (7, 8, 9, 10, J, Q, K, A).
/// Resulting order low to high: 7 8 9 J Q K 10 A.
const PLAIN_STRENGTH: [u8; 8] = [0, 1, 2, 6, 3, 4, 5, 7];

/// Trump strength by face rank. Order low to high: 7 8 Q K 10 A 9 J.
const TRUMP_STRENGTH: [u8; 8] = [0, 1, 6, 4, 7, 2, 3, 5];

const PLAIN_POINTS: [u16; 8] = [0, 0, 0, 10, 2, 3, 4, 11];
const TRUMP_POINTS: [u16; 8] = [0, 0, 14, 10, 20, 3, 4, 11];

/// Bonus awarded to the winner of the final trick.
pub const LAST_TRICK_BONUS: u16 = 10;

/// A contract: mode plus the trump suit in Hokum.
///
/// The trump suit is present exactly when the mode is `Hokum`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Contract {
    mode: Mode,
    trump: Option<Suit>,
}

impl Contract {
    #[must_use]
    pub const fn sun() -> Self {
        Self {
            mode: Mode::Sun,
            trump: None,
        }
    }

    #[must_use]
    pub const fn hokum(trump: Suit) -> Self {
        Self {
            mode: Mode::Hokum,
            trump: Some(trump),
        }
    }

    #[inline]
    #[must_use]
    pub const fn mode(self) -> Mode {
        self.mode
    }

    #[inline]
    #[must_use]
    pub const fn trump(self) -> Option<Suit> {
        self.trump
    }

    #[inline]
    #[must_use]
    pub fn is_trump(self, card: Card) -> bool {
        self.trump == Some(card.suit)
    }

    /// Strength of a card within its own suit (0 = weakest, 7 = strongest).
    #[inline]
    #[must_use]
    pub fn rank_strength(self, card: Card) -> u8 {
        if self.is_trump(card) {
            TRUMP_STRENGTH[card.rank.index()]
        } else {
            PLAIN_STRENGTH[card.rank.index()]
        }
    }

    /// Strength of a card in a trick led with `led`.
    ///
    /// Trumps beat every led-suit card; cards that neither follow nor trump
    /// have no strength at all.
    #[inline]
    #[must_use]
    pub fn trick_strength(self, card: Card, led: Suit) -> Option<u8> {
        if self.is_trump(card) {
            Some(16 + self.rank_strength(card))
        } else if card.suit == led {
            Some(self.rank_strength(card))
        } else {
            None
        }
    }

    /// Point value of a card under this contract.
    #[inline]
    #[must_use]
    pub fn points(self, card: Card) -> u16 {
        if self.is_trump(card) {
            TRUMP_POINTS[card.rank.index()]
        } else {
            PLAIN_POINTS[card.rank.index()]
        }
    }

    /// Ranks of a suit ordered from strongest to weakest.
    #[must_use]
    pub fn ranks_high_to_low(self, suit: Suit) -> [Rank; 8] {
        let mut ranks = Rank::ALL;
        ranks.sort_by_key(|&rank| std::cmp::Reverse(self.rank_strength(Card::new(rank, suit))));
        ranks
    }

    /// Total card points in the deck, excluding the last-trick bonus.
    #[must_use]
    pub fn deck_points(self) -> u16 {
        Card::deck().map(|card| self.points(card)).sum()
    }
}

impl Default for Contract {
    fn default() -> Self {
        Self::sun()
    }
}

impl fmt::Display for Contract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.trump {
            Some(trump) => write!(f, "Hokum({})", trump),
            None => f.write_str("Sun"),
        }
    }
}
