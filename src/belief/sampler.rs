//! Determinization: deal the unseen cards into a concrete world.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{trace, warn};

use crate::core::{Card, CardSet, GameRng, Seat, SeatMap, Suit};
use crate::sim::Hand;

use super::state::BeliefSource;

/// Errors meaning the caller's view of the deal is inconsistent.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SamplingError {
    #[error("opponents should hold {required} cards but {unseen} are unseen")]
    CountMismatch { required: usize, unseen: usize },

    #[error("card {0} is both in the acting hand and already played")]
    OwnHandConflict(Card),

    #[error("no unseen card is left for the unreadable play of {0}")]
    NothingToDraw(Seat),
}

/// Sampler tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SamplerConfig {
    /// Weighted passes attempted before the first-fit fallback.
    pub max_retries: usize,

    /// Floor applied to suit probabilities so no eligible seat is starved.
    pub min_weight: f32,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            max_retries: 10,
            min_weight: 0.05,
        }
    }
}

/// Counters over one or more sampling calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SamplingStats {
    pub attempts: usize,
    pub succeeded: usize,
    pub fallbacks: usize,
    pub relaxed_voids: usize,
    /// Unseen cards dealt to nobody; see [`World::held_out`].
    pub held_out: usize,
}

/// Everything the sampler needs to know about one decision point.
#[derive(Clone, Copy)]
pub struct SampleRequest<'a> {
    /// Seat whose hand is known.
    pub seat: Seat,
    pub hand: &'a [Card],
    /// Cards no hidden hand can hold: completed tricks and the trick on
    /// the table.
    pub played: CardSet,
    pub beliefs: &'a dyn BeliefSource,
    /// Completed-trick plays whose card is unknown. That many unseen cards
    /// are out of play without being identifiable.
    pub unknown_played: usize,
}

/// One complete deal of the remaining cards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct World {
    hands: SeatMap<Hand>,
    held_out: CardSet,
}

impl World {
    /// Unseen cards dealt to nobody: stand-ins for unknown plays and for
    /// acting-hand cards the caller could not name. Treat them as played.
    #[must_use]
    pub fn held_out(&self) -> CardSet {
        self.held_out
    }

    #[must_use]
    pub fn hand(&self, seat: Seat) -> &[Card] {
        &self.hands[seat]
    }

    #[must_use]
    pub fn hands(&self) -> &SeatMap<Hand> {
        &self.hands
    }

    /// Hands as plain vectors, ready for [`crate::sim::FastGame::new`].
    #[must_use]
    pub fn into_hands(self) -> [Vec<Card>; 4] {
        self.hands.into_array().map(|hand| hand.into_vec())
    }
}

/// Constraint-aware world sampler.
#[derive(Clone, Debug, Default)]
pub struct WorldSampler {
    config: SamplerConfig,
}

impl WorldSampler {
    #[must_use]
    pub fn new(config: SamplerConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    pub fn sample(&self, request: &SampleRequest<'_>, rng: &mut GameRng) -> Result<World, SamplingError> {
        let mut stats = SamplingStats::default();
        self.sample_with_stats(request, rng, &mut stats)
    }

    /// Sample a world, accumulating counters into `stats`.
    ///
    /// Voids and counts are always respected, except when the beliefs
    /// themselves are contradictory: then a void is relaxed and a warning
    /// logged so that a complete deal is still produced.
    ///
    /// Spare unseen cards, from unknown plays or from an acting hand
    /// shorter than the beliefs expect, are held out of the deal; see
    /// [`World::held_out`].
    pub fn sample_with_stats(
        &self,
        request: &SampleRequest<'_>,
        rng: &mut GameRng,
        stats: &mut SamplingStats,
    ) -> Result<World, SamplingError> {
        let mut problem = Problem::new(request)?;
        stats.held_out += problem.hold_out(rng);

        for attempt in 0..self.config.max_retries {
            stats.attempts += 1;
            if let Some(hands) = self.weighted_pass(&problem, rng) {
                stats.succeeded += 1;
                return Ok(problem.into_world(request, hands));
            }
            trace!(attempt, "weighted deal hit a dead end");
        }

        stats.fallbacks += 1;
        warn!(
            retries = self.config.max_retries,
            "weighted sampling failed, falling back to first-fit"
        );
        let (hands, relaxed) = problem.first_fit()?;
        stats.relaxed_voids += relaxed;
        Ok(problem.into_world(request, hands))
    }

    /// Pick the card behind an unreadable play by `seat`, from cards not in
    /// `excluded`. Suits `seat` is void in are avoided while any other
    /// card remains.
    pub fn draw_unknown(
        &self,
        seat: Seat,
        excluded: CardSet,
        beliefs: &dyn BeliefSource,
        rng: &mut GameRng,
    ) -> Result<Card, SamplingError> {
        let pool: Vec<Card> = CardSet::full().difference(excluded).iter().collect();
        let allowed: Vec<Card> = pool
            .iter()
            .copied()
            .filter(|card| !beliefs.is_void(seat, card.suit))
            .collect();
        let from = if allowed.is_empty() { &pool } else { &allowed };
        rng.choose(from).copied().ok_or(SamplingError::NothingToDraw(seat))
    }

    fn weighted_pass(&self, problem: &Problem<'_>, rng: &mut GameRng) -> Option<SeatMap<Hand>> {
        let mut cards = problem.unseen.clone();
        rng.shuffle(&mut cards);
        // Stable sort keeps the shuffled order among equally constrained cards.
        cards.sort_by_key(|&card| problem.candidates(card.suit).count());

        let mut room = problem.required;
        let mut hands: SeatMap<Hand> = SeatMap::default();
        let mut eligible: Vec<Seat> = Vec::with_capacity(3);
        let mut weights: Vec<f32> = Vec::with_capacity(3);

        for card in cards {
            eligible.clear();
            eligible.extend(problem.candidates(card.suit).filter(|&seat| room[seat] > 0));
            weights.clear();
            weights.extend(eligible.iter().map(|&seat| {
                problem
                    .beliefs
                    .suit_probability(seat, card.suit)
                    .max(self.config.min_weight)
            }));

            let seat = eligible[rng.choose_weighted(&weights)?];
            room[seat] -= 1;
            hands[seat].push(card);
        }
        Some(hands)
    }
}

/// Validated inputs shared by every pass.
struct Problem<'a> {
    seat: Seat,
    unseen: Vec<Card>,
    required: SeatMap<usize>,
    /// Unseen cards beyond what the other seats hold.
    spare: usize,
    held_out: CardSet,
    beliefs: &'a dyn BeliefSource,
}

impl<'a> Problem<'a> {
    fn new(request: &SampleRequest<'a>) -> Result<Self, SamplingError> {
        let mut own = CardSet::EMPTY;
        for &card in request.hand {
            if request.played.contains(card) || !own.insert(card) {
                return Err(SamplingError::OwnHandConflict(card));
            }
        }

        let unseen: Vec<Card> = CardSet::full()
            .difference(own)
            .difference(request.played)
            .iter()
            .collect();

        let required = SeatMap::new(|seat| {
            if seat == request.seat {
                0
            } else {
                request.beliefs.remaining_cards(seat)
            }
        });
        let total: usize = required.values().sum();
        let shortfall = request
            .beliefs
            .remaining_cards(request.seat)
            .saturating_sub(request.hand.len());
        let spare = shortfall + request.unknown_played;
        if total != unseen.len() && total + spare != unseen.len() {
            return Err(SamplingError::CountMismatch {
                required: total,
                unseen: unseen.len(),
            });
        }

        Ok(Self {
            seat: request.seat,
            spare: unseen.len() - total,
            unseen,
            required,
            held_out: CardSet::EMPTY,
            beliefs: request.beliefs,
        })
    }

    /// Set aside the spare unseen cards, least placeable first, and
    /// return how many were taken.
    fn hold_out(&mut self, rng: &mut GameRng) -> usize {
        if self.spare == 0 {
            return 0;
        }
        let mut cards = self.unseen.clone();
        rng.shuffle(&mut cards);
        cards.sort_by_key(|&card| self.candidates(card.suit).count());
        for &card in cards.iter().take(self.spare) {
            self.held_out.insert(card);
        }
        let held_out = self.held_out;
        self.unseen.retain(|&card| !held_out.contains(card));
        trace!(count = self.spare, "holding cards out of the deal");
        self.spare
    }

    /// Opponents allowed to hold a card of `suit`, ignoring room.
    fn candidates(&self, suit: Suit) -> impl Iterator<Item = Seat> + '_ {
        Seat::ALL.into_iter().filter(move |&seat| {
            seat != self.seat && self.required[seat] > 0 && !self.beliefs.is_void(seat, suit)
        })
    }

    /// Deterministic deal: most constrained card first, to the seat with
    /// the most room. Returns the hands and the number of relaxed voids.
    fn first_fit(&self) -> Result<(SeatMap<Hand>, usize), SamplingError> {
        let mut cards = self.unseen.clone();
        cards.sort_by_key(|&card| (self.candidates(card.suit).count(), card.id()));

        let mut room = self.required;
        let mut hands: SeatMap<Hand> = SeatMap::default();
        let mut relaxed = 0;

        for card in cards {
            let fits = self
                .candidates(card.suit)
                .filter(|&seat| room[seat] > 0)
                .max_by_key(|&seat| (room[seat], std::cmp::Reverse(seat)));

            let seat = match fits {
                Some(seat) => seat,
                None => {
                    let relax = Seat::ALL
                        .into_iter()
                        .filter(|&seat| seat != self.seat && room[seat] > 0)
                        .max_by_key(|&seat| (room[seat], std::cmp::Reverse(seat)))
                        .ok_or(SamplingError::CountMismatch {
                            required: self.required.values().sum(),
                            unseen: self.unseen.len(),
                        })?;
                    warn!(%card, seat = %relax, "beliefs are contradictory, relaxing a void");
                    relaxed += 1;
                    relax
                }
            };
            room[seat] -= 1;
            hands[seat].push(card);
        }
        Ok((hands, relaxed))
    }

    fn into_world(&self, request: &SampleRequest<'_>, mut hands: SeatMap<Hand>) -> World {
        hands[self.seat] = request.hand.iter().copied().collect();
        World {
            hands,
            held_out: self.held_out,
        }
    }
}
