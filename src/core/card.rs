//! Cards of the 32-card Baloot deck.
//!
//! ## Card
//!
//! An immutable `(rank, suit)` pair with a dense id in `0..32`
//! (`suit * 8 + rank`), so card sets fit in a single `u32`.
//!
//! ## CardSet
//!
//! Bitmask set of cards. Copying it is free, which matters for the
//! simulator clones made on every search trial.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of cards in the deck.
pub const DECK_SIZE: usize = 32;

/// Cards dealt to each seat.
pub const HAND_SIZE: usize = 8;

/// Card suit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Suit {
    Spades = 0,
    Hearts = 1,
    Diamonds = 2,
    Clubs = 3,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Spades, Suit::Hearts, Suit::Diamonds, Suit::Clubs];

    /// Dense index in `0..4`.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn from_index(index: usize) -> Option<Suit> {
        match index {
            0 => Some(Suit::Spades),
            1 => Some(Suit::Hearts),
            2 => Some(Suit::Diamonds),
            3 => Some(Suit::Clubs),
            _ => None,
        }
    }

    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Suit::Spades => '♠',
            Suit::Hearts => '♥',
            Suit::Diamonds => '♦',
            Suit::Clubs => '♣',
        }
    }

    fn parse(code: &str) -> Option<Suit> {
        match code {
            "S" | "s" | "♠" => Some(Suit::Spades),
            "H" | "h" | "♥" => Some(Suit::Hearts),
            "D" | "d" | "♦" => Some(Suit::Diamonds),
            "C" | "c" | "♣" => Some(Suit::Clubs),
            _ => None,
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Card rank, declared in face order (not play strength).
///
/// Play strength depends on the contract; see [`crate::core::Contract`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rank {
    Seven = 0,
    Eight = 1,
    Nine = 2,
    Ten = 3,
    Jack = 4,
    Queen = 5,
    King = 6,
    Ace = 7,
}

impl Rank {
    pub const ALL: [Rank; 8] = [
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];

    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn from_index(index: usize) -> Option<Rank> {
        if index < Self::ALL.len() {
            Some(Self::ALL[index])
        } else {
            None
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ace => "A",
        }
    }

    fn parse(code: &str) -> Option<Rank> {
        match code {
            "7" => Some(Rank::Seven),
            "8" => Some(Rank::Eight),
            "9" => Some(Rank::Nine),
            "10" | "T" | "t" => Some(Rank::Ten),
            "J" | "j" => Some(Rank::Jack),
            "Q" | "q" => Some(Rank::Queen),
            "K" | "k" => Some(Rank::King),
            "A" | "a" => Some(Rank::Ace),
            _ => None,
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A playing card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    #[must_use]
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    /// Dense id in `0..32`.
    #[inline]
    #[must_use]
    pub const fn id(self) -> u8 {
        (self.suit.index() * 8 + self.rank.index()) as u8
    }

    #[must_use]
    pub const fn from_id(id: u8) -> Option<Card> {
        let id = id as usize;
        match (Rank::from_index(id % 8), Suit::from_index(id / 8)) {
            (Some(rank), Some(suit)) if id < DECK_SIZE => Some(Card { rank, suit }),
            _ => None,
        }
    }

    /// Iterate over the full deck in id order.
    pub fn deck() -> impl Iterator<Item = Card> {
        (0..DECK_SIZE as u8).filter_map(Card::from_id)
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}

/// Error returned when a card code cannot be parsed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("malformed card code {0:?}")]
pub struct ParseCardError(pub String);

impl FromStr for Card {
    type Err = ParseCardError;

    /// Parses codes such as `"JS"`, `"10h"`, `"TD"` or `"A♣"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let split = trimmed
            .char_indices()
            .last()
            .map(|(i, _)| i)
            .ok_or_else(|| ParseCardError(s.to_string()))?;
        let (rank, suit) = trimmed.split_at(split);

        match (Rank::parse(rank), Suit::parse(suit)) {
            (Some(rank), Some(suit)) => Ok(Card::new(rank, suit)),
            _ => Err(ParseCardError(s.to_string())),
        }
    }
}

/// Set of cards backed by a 32-bit mask.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardSet(u32);

impl CardSet {
    pub const EMPTY: CardSet = CardSet(0);

    /// Every card in the deck.
    #[must_use]
    pub const fn full() -> Self {
        CardSet(u32::MAX)
    }

    #[inline]
    #[must_use]
    pub const fn contains(self, card: Card) -> bool {
        self.0 & (1 << card.id()) != 0
    }

    /// Insert a card, returning false if it was already present.
    #[inline]
    pub fn insert(&mut self, card: Card) -> bool {
        let bit = 1 << card.id();
        let fresh = self.0 & bit == 0;
        self.0 |= bit;
        fresh
    }

    #[inline]
    pub fn remove(&mut self, card: Card) -> bool {
        let bit = 1 << card.id();
        let present = self.0 & bit != 0;
        self.0 &= !bit;
        present
    }

    #[inline]
    #[must_use]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn union(self, other: CardSet) -> CardSet {
        CardSet(self.0 | other.0)
    }

    #[must_use]
    pub const fn difference(self, other: CardSet) -> CardSet {
        CardSet(self.0 & !other.0)
    }

    /// Cards of one suit.
    #[must_use]
    pub const fn of_suit(self, suit: Suit) -> CardSet {
        CardSet(self.0 & (0xFF << (suit.index() * 8)))
    }

    /// Iterate in id order.
    pub fn iter(self) -> impl Iterator<Item = Card> {
        let mask = self.0;
        (0..DECK_SIZE as u8)
            .filter(move |id| mask & (1 << id) != 0)
            .filter_map(Card::from_id)
    }
}

impl FromIterator<Card> for CardSet {
    fn from_iter<I: IntoIterator<Item = Card>>(iter: I) -> Self {
        let mut set = CardSet::EMPTY;
        for card in iter {
            set.insert(card);
        }
        set
    }
}

impl<'a> FromIterator<&'a Card> for CardSet {
    fn from_iter<I: IntoIterator<Item = &'a Card>>(iter: I) -> Self {
        iter.into_iter().copied().collect()
    }
}
