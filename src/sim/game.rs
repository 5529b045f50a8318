//! Lightweight full-rules simulator.
//!
//! `FastGame` re-implements the trick-taking rules with no I/O and no heap
//! traffic on the hot path: hands are inline `SmallVec`s and the played
//! cards are a bitmask, so a clone is a flat copy. The search engine clones
//! one of these per trial.

use smallvec::SmallVec;
use thiserror::Error;

use crate::core::{
    Card, CardSet, Contract, Seat, SeatMap, Team, DECK_SIZE, HAND_SIZE, LAST_TRICK_BONUS,
};

use super::trick::Trick;

/// A seat's hand. Moves address cards by their index in this sequence.
pub type Hand = SmallVec<[Card; HAND_SIZE]>;

/// Hand indices of legal moves.
pub type MoveList = SmallVec<[usize; HAND_SIZE]>;

/// Errors raised when building or advancing a [`FastGame`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("card {0} appears more than once in the deal")]
    DuplicateCard(Card),

    #[error("deal accounts for {found} cards, expected {DECK_SIZE}")]
    CardCount { found: usize },

    #[error("trick in progress holds {0} cards; a full trick must already be resolved")]
    OverfullTrick(usize),

    #[error("trick plays are not in clockwise order or do not end before {0}")]
    TrickOrder(Seat),

    #[error("move index {index} out of range for a hand of {len}")]
    MoveOutOfRange { index: usize, len: usize },

    #[error("card {0} is not in the hand of {1}")]
    CardNotInHand(Card, Seat),

    #[error("the deal is already finished")]
    Finished,
}

/// Outcome of a completed trick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrickResult {
    pub winner: Seat,
    /// Points credited to the winner's team, including any last-trick bonus.
    pub points: u16,
}

/// Compute legal hand indices for `seat` holding `hand`.
///
/// Follow suit when possible. When void in the led suit under Hokum, a
/// trump must be played if one is held and an opponent currently holds
/// the trick. Otherwise any card.
#[must_use]
pub fn legal_indices(hand: &[Card], trick: &Trick, contract: Contract, seat: Seat) -> MoveList {
    let Some(led) = trick.led_suit() else {
        return (0..hand.len()).collect();
    };

    let following: MoveList = indices_where(hand, |card| card.suit == led);
    if !following.is_empty() {
        return following;
    }

    if let Some(trump) = contract.trump() {
        let opponent_winning = trick
            .winner(contract)
            .is_some_and(|(winner, _)| !winner.is_partner_of(seat));
        if opponent_winning {
            let trumps: MoveList = indices_where(hand, |card| card.suit == trump);
            if !trumps.is_empty() {
                return trumps;
            }
        }
    }

    (0..hand.len()).collect()
}

fn indices_where(hand: &[Card], pred: impl Fn(Card) -> bool) -> MoveList {
    hand.iter()
        .enumerate()
        .filter(|&(_, &card)| pred(card))
        .map(|(i, _)| i)
        .collect()
}

/// In-memory deal state for simulation.
#[derive(Clone, Debug)]
pub struct FastGame {
    hands: SeatMap<Hand>,
    contract: Contract,
    turn: Seat,
    scores: [u16; 2],
    tricks_played: u8,
    trick: Trick,
    played: CardSet,
}

impl FastGame {
    /// Build a simulator state.
    ///
    /// `played` holds the cards of every trick completed before this point;
    /// the cards of `trick` must not be included in it. Together with the
    /// hands they must account for the full deck exactly once.
    pub fn new(
        hands: [Vec<Card>; 4],
        contract: Contract,
        turn: Seat,
        trick: Trick,
        played: CardSet,
    ) -> Result<Self, GameError> {
        if trick.len() >= 4 {
            return Err(GameError::OverfullTrick(trick.len()));
        }
        if !trick.is_in_turn_order() || trick.next_seat().is_some_and(|next| next != turn) {
            return Err(GameError::TrickOrder(turn));
        }

        let mut seen = played;
        let mut found = played.len();
        for card in hands.iter().flatten().copied().chain(trick.cards()) {
            if !seen.insert(card) {
                return Err(GameError::DuplicateCard(card));
            }
            found += 1;
        }
        if found != DECK_SIZE {
            return Err(GameError::CardCount { found });
        }

        let [h0, h1, h2, h3] = hands;
        Ok(Self {
            hands: SeatMap::from_array([
                Hand::from_vec(h0),
                Hand::from_vec(h1),
                Hand::from_vec(h2),
                Hand::from_vec(h3),
            ]),
            contract,
            turn,
            scores: [0; 2],
            tricks_played: (played.len() / 4) as u8,
            trick,
            played,
        })
    }

    /// Build a state at a trick boundary, treating every card not in a hand
    /// as already played.
    pub fn endgame(hands: [Vec<Card>; 4], contract: Contract, turn: Seat) -> Result<Self, GameError> {
        let held: CardSet = hands.iter().flatten().collect();
        Self::new(hands, contract, turn, Trick::new(), CardSet::full().difference(held))
    }

    /// Like [`FastGame::endgame`] but with a trick already under way. The
    /// seat to move is derived from the trick.
    pub fn endgame_mid_trick(
        hands: [Vec<Card>; 4],
        contract: Contract,
        trick: Trick,
    ) -> Result<Self, GameError> {
        let turn = trick.next_seat().unwrap_or(Seat::new(0));
        let mut held: CardSet = hands.iter().flatten().collect();
        for card in trick.cards() {
            held.insert(card);
        }
        Self::new(hands, contract, turn, trick, CardSet::full().difference(held))
    }

    #[inline]
    #[must_use]
    pub fn contract(&self) -> Contract {
        self.contract
    }

    /// Seat to move.
    #[inline]
    #[must_use]
    pub fn turn(&self) -> Seat {
        self.turn
    }

    #[inline]
    #[must_use]
    pub fn hand(&self, seat: Seat) -> &[Card] {
        &self.hands[seat]
    }

    /// Hand of the seat to move.
    #[inline]
    #[must_use]
    pub fn current_hand(&self) -> &[Card] {
        &self.hands[self.turn]
    }

    #[inline]
    #[must_use]
    pub fn trick(&self) -> &Trick {
        &self.trick
    }

    /// Cards of completed tricks.
    #[inline]
    #[must_use]
    pub fn played(&self) -> CardSet {
        self.played
    }

    #[inline]
    #[must_use]
    pub fn tricks_played(&self) -> u8 {
        self.tricks_played
    }

    /// Points scored by `team` since this state was built.
    #[inline]
    #[must_use]
    pub fn score(&self, team: Team) -> u16 {
        self.scores[team.index()]
    }

    /// Seat currently holding the trick in progress.
    #[must_use]
    pub fn current_winner(&self) -> Option<Seat> {
        self.trick.winner(self.contract).map(|(seat, _)| seat)
    }

    /// Cards `seat` can account for: its own hand, completed tricks and
    /// the trick on the table.
    #[must_use]
    pub fn known_to(&self, seat: Seat) -> CardSet {
        let mut known = self.played;
        for card in self.trick.cards().chain(self.hands[seat].iter().copied()) {
            known.insert(card);
        }
        known
    }

    /// Total cards across hands, completed tricks and the trick in progress.
    #[must_use]
    pub fn card_count(&self) -> usize {
        self.hands.values().map(|h| h.len()).sum::<usize>() + self.played.len() + self.trick.len()
    }

    /// Legal hand indices for the seat to move. Empty once the deal is over.
    #[must_use]
    pub fn legal_moves(&self) -> MoveList {
        legal_indices(&self.hands[self.turn], &self.trick, self.contract, self.turn)
    }

    #[must_use]
    pub fn legal_cards(&self) -> SmallVec<[Card; HAND_SIZE]> {
        let hand = &self.hands[self.turn];
        self.legal_moves().into_iter().map(|i| hand[i]).collect()
    }

    /// True once every card has been played.
    #[inline]
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.hands.values().all(|hand| hand.is_empty())
    }

    /// Play the card at `hand_index` for the seat to move.
    ///
    /// Legality is not checked. Returns the trick outcome when this play
    /// completes a trick.
    pub fn apply_move(&mut self, hand_index: usize) -> Result<Option<TrickResult>, GameError> {
        if self.is_terminal() {
            return Err(GameError::Finished);
        }
        let hand = &mut self.hands[self.turn];
        if hand_index >= hand.len() {
            return Err(GameError::MoveOutOfRange {
                index: hand_index,
                len: hand.len(),
            });
        }
        let card = hand.remove(hand_index);
        Ok(self.push_play(card))
    }

    /// Play a specific card for the seat to move.
    pub fn play_card(&mut self, card: Card) -> Result<Option<TrickResult>, GameError> {
        let index = self.hands[self.turn]
            .iter()
            .position(|&c| c == card)
            .ok_or(GameError::CardNotInHand(card, self.turn))?;
        self.apply_move(index)
    }

    fn push_play(&mut self, card: Card) -> Option<TrickResult> {
        self.trick.push(self.turn, card);
        if !self.trick.is_full() {
            self.turn = self.turn.next();
            return None;
        }

        let (winner, _) = self.trick.winner(self.contract)?;
        let mut points = self.trick.points(self.contract);
        if self.is_terminal() {
            points += LAST_TRICK_BONUS;
        }

        self.scores[winner.team().index()] += points;
        for card in self.trick.cards() {
            self.played.insert(card);
        }
        self.trick.clear();
        self.tricks_played += 1;
        self.turn = winner;

        Some(TrickResult { winner, points })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Suit;

    fn cards(codes: &[&str]) -> Vec<Card> {
        codes.iter().map(|c| c.parse().unwrap()).collect()
    }

    fn small_endgame(contract: Contract) -> FastGame {
        FastGame::endgame(
            [
                cards(&["AH", "7S"]),
                cards(&["KH", "8C"]),
                cards(&["10H", "9D"]),
                cards(&["7H", "JS"]),
            ],
            contract,
            Seat::new(0),
        )
        .unwrap()
    }

    #[test]
    fn test_endgame_conserves_cards() {
        let game = small_endgame(Contract::sun());
        assert_eq!(game.card_count(), DECK_SIZE);
        assert_eq!(game.played().len(), 24);
        assert_eq!(game.tricks_played(), 6);
    }

    #[test]
    fn test_rejects_duplicate_cards() {
        let err = FastGame::endgame(
            [cards(&["AH"]), cards(&["AH"]), cards(&["7D"]), cards(&["8D"])],
            Contract::sun(),
            Seat::new(0),
        )
        .unwrap_err();
        assert_eq!(err, GameError::DuplicateCard("AH".parse().unwrap()));
    }

    #[test]
    fn test_rejects_short_deal() {
        let err = FastGame::new(
            [cards(&["AH"]), cards(&["KH"]), cards(&["7D"]), cards(&["8D"])],
            Contract::sun(),
            Seat::new(0),
            Trick::new(),
            CardSet::EMPTY,
        )
        .unwrap_err();
        assert_eq!(err, GameError::CardCount { found: 4 });
    }

    #[test]
    fn test_rejects_trick_out_of_turn() {
        let trick = Trick::from_plays(&[(Seat::new(1), "7H".parse().unwrap())]);
        let game = FastGame::endgame_mid_trick(
            [cards(&["AH"]), vec![], cards(&["10H"]), cards(&["KH"])],
            Contract::sun(),
            trick.clone(),
        )
        .unwrap();
        assert_eq!(game.turn(), Seat::new(2));

        let held: CardSet = cards(&["AH", "10H", "KH", "7H"]).iter().collect();
        let err = FastGame::new(
            [cards(&["AH"]), vec![], cards(&["10H"]), cards(&["KH"])],
            Contract::sun(),
            Seat::new(0),
            trick,
            CardSet::full().difference(held),
        )
        .unwrap_err();
        assert_eq!(err, GameError::TrickOrder(Seat::new(0)));
    }

    #[test]
    fn test_follow_suit_is_mandatory() {
        let mut game = small_endgame(Contract::sun());
        game.apply_move(0).unwrap(); // AH led
        // Seat 1 holds KH and 8C: only the heart is legal.
        assert_eq!(game.legal_cards().as_slice(), &cards(&["KH"])[..]);
    }

    #[test]
    fn test_must_trump_when_opponent_holds_trick() {
        let mut game = FastGame::endgame(
            [
                cards(&["AH", "7D"]),
                cards(&["9S", "8C"]),
                cards(&["10H", "9D"]),
                cards(&["7H", "JS"]),
            ],
            Contract::hokum(Suit::Spades),
            Seat::new(0),
        )
        .unwrap();
        game.apply_move(0).unwrap(); // AH led by seat 0
        // Seat 1 is void in hearts, an opponent holds the trick: trump is forced.
        assert_eq!(game.legal_cards().as_slice(), &cards(&["9S"])[..]);
    }

    #[test]
    fn test_no_forced_trump_when_partner_holds_trick() {
        let mut game = FastGame::endgame(
            [
                cards(&["7H", "7D"]),
                cards(&["AH", "8C"]),
                cards(&["8H", "9D"]),
                cards(&["JS", "9C"]),
            ],
            Contract::hokum(Suit::Spades),
            Seat::new(0),
        )
        .unwrap();
        game.apply_move(0).unwrap(); // 7H
        game.apply_move(0).unwrap(); // AH, seat 1 now holds the trick
        game.apply_move(0).unwrap(); // 8H

        // Seat 3 is void in hearts but its partner holds the trick.
        assert_eq!(game.current_winner(), Some(Seat::new(1)));
        assert_eq!(game.legal_moves().as_slice(), &[0, 1]);
    }

    #[test]
    fn test_void_in_sun_plays_anything() {
        let mut game = FastGame::endgame(
            [
                cards(&["AH", "7D"]),
                cards(&["9S", "8C"]),
                cards(&["10H", "9D"]),
                cards(&["7H", "JS"]),
            ],
            Contract::sun(),
            Seat::new(0),
        )
        .unwrap();
        game.apply_move(0).unwrap();
        assert_eq!(game.legal_moves().as_slice(), &[0, 1]);
    }

    #[test]
    fn test_trick_resolution_and_last_trick_bonus() {
        let mut game = small_endgame(Contract::sun());

        assert_eq!(game.apply_move(0).unwrap(), None); // AH
        assert_eq!(game.apply_move(0).unwrap(), None); // KH
        assert_eq!(game.apply_move(0).unwrap(), None); // 10H
        let result = game.apply_move(0).unwrap().unwrap(); // 7H
        assert_eq!(result, TrickResult { winner: Seat::new(0), points: 11 + 4 + 10 });
        assert_eq!(game.turn(), Seat::new(0));
        assert_eq!(game.score(Seat::new(0).team()), 25);

        // Last trick: 7S led; 8C, 9D off-suit; JS follows and wins.
        game.apply_move(0).unwrap();
        game.apply_move(0).unwrap();
        game.apply_move(0).unwrap();
        let last = game.apply_move(0).unwrap().unwrap();
        assert_eq!(last.winner, Seat::new(3));
        assert_eq!(last.points, 2 + LAST_TRICK_BONUS);
        assert!(game.is_terminal());
        assert_eq!(game.card_count(), DECK_SIZE);
        assert_eq!(game.apply_move(0), Err(GameError::Finished));
    }

    #[test]
    fn test_apply_move_out_of_range() {
        let mut game = small_endgame(Contract::sun());
        assert_eq!(
            game.apply_move(5),
            Err(GameError::MoveOutOfRange { index: 5, len: 2 })
        );
    }

    #[test]
    fn test_play_card_by_identity() {
        let mut game = small_endgame(Contract::sun());
        game.play_card("7S".parse().unwrap()).unwrap();
        assert_eq!(game.hand(Seat::new(0)), &cards(&["AH"])[..]);
        assert!(matches!(
            game.play_card("AH".parse().unwrap()),
            Err(GameError::CardNotInHand(_, _))
        ));
    }

    #[test]
    fn test_known_to() {
        let game = small_endgame(Contract::sun());
        let known = game.known_to(Seat::new(0));
        assert_eq!(known.len(), 26);
        assert!(!known.contains("KH".parse().unwrap()));
    }
}
