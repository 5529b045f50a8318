//! State encoding for model input.
//!
//! Layout of the flat feature vector, all entries 0 or 1:
//!
//! | offset | size   | meaning                                      |
//! |--------|--------|----------------------------------------------|
//! | 0      | 32     | cards in the mover's hand                    |
//! | 32     | 32     | cards of completed tricks                    |
//! | 64     | 4 x 32 | trick cards, one block per seat relative to the mover |
//! | 192    | 4      | trump suit (all zero under Sun)              |
//! | 196    | 2      | mode: Sun, Hokum                             |

use crate::core::{Card, CardSet, Contract, Mode, Seat, DECK_SIZE, SEAT_COUNT};
use crate::sim::Trick;

use super::traits::EncodedState;

const HAND_OFFSET: usize = 0;
const PLAYED_OFFSET: usize = HAND_OFFSET + DECK_SIZE;
const TRICK_OFFSET: usize = PLAYED_OFFSET + DECK_SIZE;
const TRUMP_OFFSET: usize = TRICK_OFFSET + SEAT_COUNT * DECK_SIZE;
const MODE_OFFSET: usize = TRUMP_OFFSET + 4;

/// Length of every encoding produced by [`TableEncoder`].
pub const FEATURE_COUNT: usize = MODE_OFFSET + 2;

/// Encodes a decision point from the mover's perspective.
///
/// Only information the mover can see goes in: hidden hands are never
/// encoded, so the same encoding comes out of every sampled world.
#[derive(Clone, Copy, Debug, Default)]
pub struct TableEncoder;

impl TableEncoder {
    #[must_use]
    pub fn encode(
        &self,
        hand: &[Card],
        played: CardSet,
        trick: &Trick,
        contract: Contract,
        mover: Seat,
    ) -> EncodedState {
        let mut state = EncodedState::zeros(vec![FEATURE_COUNT]);

        for &card in hand {
            state.set(HAND_OFFSET + card.id() as usize, 1.0);
        }
        for card in played.iter() {
            state.set(PLAYED_OFFSET + card.id() as usize, 1.0);
        }
        for &(seat, card) in trick.plays() {
            let block = seat.relative_to(mover).index();
            state.set(TRICK_OFFSET + block * DECK_SIZE + card.id() as usize, 1.0);
        }
        if let Some(trump) = contract.trump() {
            state.set(TRUMP_OFFSET + trump.index(), 1.0);
        }
        let mode = match contract.mode() {
            Mode::Sun => 0,
            Mode::Hokum => 1,
        };
        state.set(MODE_OFFSET + mode, 1.0);

        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Suit;

    fn c(code: &str) -> Card {
        code.parse().unwrap()
    }

    #[test]
    fn test_shape() {
        assert_eq!(FEATURE_COUNT, 198);
        let encoded = TableEncoder.encode(&[], CardSet::EMPTY, &Trick::new(), Contract::sun(), Seat::new(0));
        assert_eq!(encoded.shape, vec![198]);
        assert_eq!(encoded.len(), 198);
    }

    #[test]
    fn test_encode_sections() {
        let hand = [c("JS"), c("AH")];
        let played: CardSet = [c("7D")].iter().collect();
        let trick = Trick::from_plays(&[(Seat::new(3), c("KC"))]);
        let encoded = TableEncoder.encode(
            &hand,
            played,
            &trick,
            Contract::hokum(Suit::Spades),
            Seat::new(0),
        );

        assert_eq!(encoded.tensor.iter().filter(|&&v| v == 1.0).count(), 6);
        assert_eq!(encoded.get(HAND_OFFSET + c("JS").id() as usize), Some(1.0));
        assert_eq!(encoded.get(PLAYED_OFFSET + c("7D").id() as usize), Some(1.0));
        // Seat 3 sits at relative position 3 from seat 0.
        let slot = TRICK_OFFSET + 3 * DECK_SIZE + c("KC").id() as usize;
        assert_eq!(encoded.get(slot), Some(1.0));
        assert_eq!(encoded.get(TRUMP_OFFSET + Suit::Spades.index()), Some(1.0));
        assert_eq!(encoded.get(MODE_OFFSET + 1), Some(1.0));
    }

    #[test]
    fn test_sun_has_no_trump_bits() {
        let encoded = TableEncoder.encode(&[], CardSet::EMPTY, &Trick::new(), Contract::sun(), Seat::new(2));
        assert!(encoded.tensor[TRUMP_OFFSET..MODE_OFFSET].iter().all(|&v| v == 0.0));
        assert_eq!(encoded.get(MODE_OFFSET), Some(1.0));
    }
}
