//! Core types: cards, contracts, seats, RNG.
//!
//! Everything here is plain data with no knowledge of search or sampling.

pub mod card;
pub mod contract;
pub mod rng;
pub mod seat;

pub use card::{Card, CardSet, ParseCardError, Rank, Suit, DECK_SIZE, HAND_SIZE};
pub use contract::{Contract, Mode, LAST_TRICK_BONUS};
pub use rng::GameRng;
pub use seat::{Seat, SeatMap, Team, SEAT_COUNT};
