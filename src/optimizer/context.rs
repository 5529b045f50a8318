//! What the caller hands over for one decision, and how it is cleaned up.

use tracing::debug;

use crate::belief::BeliefSource;
use crate::core::{Card, CardSet, Contract, Seat, SEAT_COUNT};
use crate::nn::{EncodedState, PolicyView, TableEncoder};
use crate::sim::{legal_indices, MoveList, Trick};

/// Running match totals, from the acting player's side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MatchScore {
    pub us: i32,
    pub them: i32,
}

impl MatchScore {
    #[must_use]
    pub const fn new(us: i32, them: i32) -> Self {
        Self { us, them }
    }

    /// `us - them`. Positive when ahead.
    #[must_use]
    pub const fn differential(self) -> i32 {
        self.us - self.them
    }
}

/// The table as the acting player sees it, in absolute seats.
///
/// Cards arrive as raw codes from the enclosing application. Codes that do
/// not parse, and repeats of a card already seen, are dropped when the
/// context is parsed; hand positions in any decision still refer to
/// `hand` as given.
#[derive(Clone)]
pub struct BotContext<'a> {
    pub seat: Seat,
    pub hand: Vec<String>,
    /// Completed tricks in play order, each as `(seat, card)` plays.
    pub completed_tricks: Vec<Vec<(Seat, String)>>,
    pub current_trick: Vec<(Seat, String)>,
    pub contract: Contract,
    pub score: MatchScore,
    /// Beliefs about the other seats. When absent they are inferred from
    /// the tricks in this context.
    pub beliefs: Option<&'a dyn BeliefSource>,
}

impl<'a> BotContext<'a> {
    pub fn new<I, S>(seat: Seat, hand: I, contract: Contract) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            seat,
            hand: hand.into_iter().map(Into::into).collect(),
            completed_tricks: Vec::new(),
            current_trick: Vec::new(),
            contract,
            score: MatchScore::default(),
            beliefs: None,
        }
    }

    #[must_use]
    pub fn with_completed_trick<S: Into<String>>(mut self, plays: Vec<(Seat, S)>) -> Self {
        self.completed_tricks
            .push(plays.into_iter().map(|(seat, code)| (seat, code.into())).collect());
        self
    }

    #[must_use]
    pub fn with_current_trick<S: Into<String>>(mut self, plays: Vec<(Seat, S)>) -> Self {
        self.current_trick = plays.into_iter().map(|(seat, code)| (seat, code.into())).collect();
        self
    }

    #[must_use]
    pub fn with_score(mut self, us: i32, them: i32) -> Self {
        self.score = MatchScore::new(us, them);
        self
    }

    #[must_use]
    pub fn with_beliefs(mut self, beliefs: &'a dyn BeliefSource) -> Self {
        self.beliefs = Some(beliefs);
        self
    }

    /// Parse every card code, filtering malformed and repeated cards.
    ///
    /// A trick play that does not parse keeps its place as an unknown
    /// card: the seat still played, only the card is lost.
    pub(crate) fn parse(&self) -> ParsedContext {
        let mut seen = CardSet::EMPTY;

        let mut completed = Vec::with_capacity(self.completed_tricks.len());
        let mut played = CardSet::EMPTY;
        for plays in &self.completed_tricks {
            let plays = parse_plays(plays, &mut seen);
            played = played.union(plays.iter().filter_map(|&(_, card)| card).collect());
            completed.push(plays);
        }
        let table = parse_plays(&self.current_trick, &mut seen);
        let known: Vec<(Seat, Card)> = table
            .iter()
            .filter_map(|&(seat, card)| card.map(|card| (seat, card)))
            .collect();
        let trick = Trick::from_plays(&known);

        // Own cards that also show up as played are kept here so the
        // sampler can report the conflict.
        let mut own = CardSet::EMPTY;
        let hand = self
            .hand
            .iter()
            .enumerate()
            .filter_map(|(index, code)| match code.parse::<Card>() {
                Ok(card) if own.insert(card) => Some((index, card)),
                Ok(card) => {
                    debug!(%card, index, "dropping repeated hand card");
                    None
                }
                Err(err) => {
                    debug!(%err, index, "dropping malformed hand card");
                    None
                }
            })
            .collect();

        ParsedContext {
            hand,
            completed,
            table,
            trick,
            played,
        }
    }
}

/// One trick's plays in order; `None` where the card could not be read.
pub(crate) type Plays = Vec<(Seat, Option<Card>)>;

fn parse_plays(plays: &[(Seat, String)], seen: &mut CardSet) -> Plays {
    let mut parsed = Plays::with_capacity(SEAT_COUNT);
    for (seat, code) in plays {
        if parsed.len() == SEAT_COUNT {
            debug!(seat = %seat, "dropping play past the fourth");
            continue;
        }
        let card = match code.parse::<Card>() {
            Ok(card) if seen.insert(card) => Some(card),
            Ok(card) => {
                debug!(%card, seat = %seat, "repeated trick card, treating it as unknown");
                None
            }
            Err(err) => {
                debug!(%err, seat = %seat, "malformed trick card, treating it as unknown");
                None
            }
        };
        parsed.push((*seat, card));
    }
    parsed
}

/// A [`BotContext`] with its cards parsed.
#[derive(Clone, Debug)]
pub(crate) struct ParsedContext {
    /// `(caller index, card)` in caller order.
    pub hand: Vec<(usize, Card)>,
    pub completed: Vec<Plays>,
    /// The trick on the table, unknown cards included.
    pub table: Plays,
    /// Known cards of the trick on the table.
    pub trick: Trick,
    /// Known cards of the completed tricks.
    pub played: CardSet,
}

impl ParsedContext {
    pub fn cards(&self) -> Vec<Card> {
        self.hand.iter().map(|&(_, card)| card).collect()
    }

    /// Seat due to play on the table, counting unknown plays.
    pub fn next_seat(&self) -> Option<Seat> {
        self.table
            .first()
            .map(|&(leader, _)| leader.offset(self.table.len()))
    }

    /// Completed-trick plays whose card is unknown.
    pub fn unknown_played(&self) -> usize {
        self.completed
            .iter()
            .flatten()
            .filter(|(_, card)| card.is_none())
            .count()
    }

    /// Completed tricks plus the trick on the table.
    pub fn seen(&self) -> CardSet {
        self.played.union(self.trick.cards().collect())
    }
}

/// The real table offered to a [`crate::nn::PolicyOracle`].
#[derive(Clone, Debug)]
pub struct ContextView {
    hand: Vec<Card>,
    played: CardSet,
    trick: Trick,
    contract: Contract,
    seat: Seat,
}

impl ContextView {
    #[must_use]
    pub fn new(hand: Vec<Card>, played: CardSet, trick: Trick, contract: Contract, seat: Seat) -> Self {
        Self {
            hand,
            played,
            trick,
            contract,
            seat,
        }
    }
}

impl PolicyView for ContextView {
    fn current_hand(&self) -> &[Card] {
        &self.hand
    }

    fn legal_moves(&self) -> MoveList {
        legal_indices(&self.hand, &self.trick, self.contract, self.seat)
    }

    fn encode_state(&self) -> EncodedState {
        TableEncoder.encode(&self.hand, self.played, &self.trick, self.contract, self.seat)
    }
}

/// The authoritative answer to "may `seat` play `card` now?".
///
/// Seats are absolute; teams are seat parity.
pub trait LegalMoveOracle: Send + Sync {
    fn is_legal(&self, card: Card, hand: &[Card], trick: &Trick, contract: Contract, seat: Seat) -> bool;
}

/// [`LegalMoveOracle`] backed by the simulator's own rules.
#[derive(Clone, Copy, Debug, Default)]
pub struct SimulatorRules;

impl LegalMoveOracle for SimulatorRules {
    fn is_legal(&self, card: Card, hand: &[Card], trick: &Trick, contract: Contract, seat: Seat) -> bool {
        legal_indices(hand, trick, contract, seat)
            .into_iter()
            .any(|i| hand[i] == card)
    }
}
