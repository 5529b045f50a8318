//! One decision, end to end: parse, sample, search, validate.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::belief::{
    BeliefConfig, BeliefSource, BeliefTracker, RelativeBeliefs, SampleRequest, SamplerConfig,
    WorldSampler,
};
use crate::core::{Card, CardSet, Contract, GameRng, Seat};
use crate::mcts::{MCTSConfig, MCTSSolver, RolloutKind, SearchOutcome};
use crate::nn::{normalize_priors, PolicyOracle, PolicyView};
use crate::sim::{FastGame, HeuristicRollout, RolloutTuning, Trick};

use super::budget::{AdaptiveBudget, BudgetConfig, BudgetMode};
use super::context::{BotContext, ContextView, LegalMoveOracle, ParsedContext};
use super::decision::{Decision, DecisionError, MoveReport};

/// Everything tunable about a decision.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OptimizerConfig {
    pub mcts: MCTSConfig,
    pub sampler: SamplerConfig,
    pub beliefs: BeliefConfig,
    pub rollout: RolloutTuning,
    pub budget: BudgetConfig,
    /// Sample a fresh world for every trial. When false, one world is
    /// sampled per decision and searched repeatedly.
    pub resample_per_trial: bool,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            mcts: MCTSConfig::default(),
            sampler: SamplerConfig::default(),
            beliefs: BeliefConfig::default(),
            rollout: RolloutTuning::default(),
            budget: BudgetConfig::default(),
            resample_per_trial: true,
        }
    }
}

/// Chooses a card for the acting seat by searching sampled deals.
///
/// Holds configuration and collaborators only; every decision builds its
/// own tree, worlds and RNG, so one optimizer may serve many tables.
pub struct CognitiveOptimizer {
    config: OptimizerConfig,
    budget: AdaptiveBudget,
    oracle: Option<Arc<dyn PolicyOracle>>,
    rules: Option<Arc<dyn LegalMoveOracle>>,
}

impl CognitiveOptimizer {
    #[must_use]
    pub fn new(config: OptimizerConfig) -> Self {
        let budget = AdaptiveBudget::new(config.budget.clone());
        Self {
            config,
            budget,
            oracle: None,
            rules: None,
        }
    }

    /// Move-probability oracle for priors. Switches selection to PUCT.
    #[must_use]
    pub fn with_oracle(mut self, oracle: Arc<dyn PolicyOracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    /// Authoritative rules the chosen card is checked against.
    #[must_use]
    pub fn with_rules(mut self, rules: Arc<dyn LegalMoveOracle>) -> Self {
        self.rules = Some(rules);
        self
    }

    #[must_use]
    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Best card for the acting seat, or `None` so the caller can fall
    /// back to another strategy.
    pub fn decide(&self, ctx: &BotContext<'_>) -> Option<Decision> {
        match self.try_decide(ctx) {
            Ok(decision) => Some(decision),
            Err(err) => {
                warn!(%err, seat = %ctx.seat, "no decision");
                None
            }
        }
    }

    pub fn try_decide(&self, ctx: &BotContext<'_>) -> Result<Decision, DecisionError> {
        let parsed = ctx.parse();
        if parsed.hand.is_empty() {
            return Err(DecisionError::EmptyHand);
        }
        if let Some(expected) = parsed.next_seat() {
            if expected != ctx.seat {
                return Err(DecisionError::OutOfTurn { expected });
            }
        }
        let hand = parsed.cards();

        let tracker;
        let absolute: &dyn BeliefSource = match ctx.beliefs {
            Some(beliefs) => beliefs,
            None => {
                tracker = self.track(ctx.contract, &parsed);
                &tracker
            }
        };
        let beliefs = RelativeBeliefs::new(absolute, ctx.seat);

        // The simulator sees the acting seat as seat 0.
        let table: Vec<(Seat, Option<Card>)> = parsed
            .table
            .iter()
            .map(|&(seat, card)| (seat.relative_to(ctx.seat), card))
            .collect();
        let own: CardSet = hand.iter().copied().collect();
        let unknown_played = parsed.unknown_played();

        let sampler = WorldSampler::new(self.config.sampler.clone());
        let build = |rng: &mut GameRng| -> Result<FastGame, DecisionError> {
            // Unknown cards on the table are drawn first so the deal
            // below cannot hand them out again.
            let mut seen = parsed.seen();
            let mut plays = Vec::with_capacity(table.len());
            for &(seat, card) in &table {
                let card = match card {
                    Some(card) => card,
                    None => {
                        let card = sampler.draw_unknown(seat, own.union(seen), &beliefs, rng)?;
                        seen.insert(card);
                        card
                    }
                };
                plays.push((seat, card));
            }

            let request = SampleRequest {
                seat: Seat::new(0),
                hand: &hand,
                played: seen,
                beliefs: &beliefs,
                unknown_played,
            };
            let world = sampler.sample(&request, rng)?;
            let played = parsed.played.union(world.held_out());
            let game = FastGame::new(
                world.into_hands(),
                ctx.contract,
                Seat::new(0),
                Trick::from_plays(&plays),
                played,
            )?;
            Ok(game)
        };

        let (mode, budget) = self.budget.plan(ctx.score.differential());
        let mut rng = GameRng::new(self.config.mcts.seed).for_context("worlds");
        let first = build(&mut rng)?;

        let view = ContextView::new(
            hand.clone(),
            parsed.played,
            parsed.trick.clone(),
            ctx.contract,
            ctx.seat,
        );
        let solver = self.solver(&view);

        let outcome = if self.config.resample_per_trial {
            let mut first = Some(first);
            solver.search_worlds(
                || {
                    first.take().or_else(|| match build(&mut rng) {
                        Ok(game) => Some(game),
                        Err(err) => {
                            warn!(%err, "world sampling failed mid-search");
                            None
                        }
                    })
                },
                &budget,
            )
        } else {
            solver.search_with_details(&first, &budget)
        };

        let chosen = self.validate(&outcome, &hand, &parsed.trick, ctx)?;
        let per_move_stats = outcome
            .moves
            .iter()
            .map(|m| {
                let report = MoveReport {
                    visits: m.visits,
                    cumulative_reward: m.cumulative_reward,
                    win_rate: m.win_rate,
                    prior: m.prior,
                };
                (parsed.hand[m.hand_index].0, report)
            })
            .collect();

        let chosen_hand_index = parsed.hand[chosen].0;
        debug!(
            mode = %mode,
            iterations = outcome.stats.iterations,
            card = %hand[chosen],
            index = chosen_hand_index,
            "decision made"
        );

        Ok(Decision {
            chosen_hand_index,
            justification: justify(mode, &outcome, hand[chosen]),
            per_move_stats,
            budget_mode: mode,
        })
    }

    fn track(&self, contract: Contract, parsed: &ParsedContext) -> BeliefTracker {
        let mut tracker = BeliefTracker::new(contract, self.config.beliefs.clone());
        for plays in parsed.completed.iter().chain(std::iter::once(&parsed.table)) {
            tracker.observe_partial(plays);
        }
        tracker
    }

    fn solver(&self, view: &ContextView) -> MCTSSolver {
        let mut solver = MCTSSolver::new(self.config.mcts.clone());
        if self.config.mcts.rollout == RolloutKind::Heuristic {
            solver = solver.with_rollout(HeuristicRollout::new(self.config.rollout.clone()));
        }
        if let Some(oracle) = &self.oracle {
            let hand = view.current_hand();
            let priors = normalize_priors(&oracle.predict_policy(view), &view.legal_moves())
                .into_iter()
                .map(|(i, p)| (hand[i], p))
                .collect();
            solver = solver.with_oracle(Arc::clone(oracle)).with_root_priors(priors);
        }
        solver
    }

    /// Hand index (parsed order) of the move to play.
    ///
    /// A search pick the rules reject is replaced by the most-visited move
    /// they accept, then by the first card they accept.
    fn validate(
        &self,
        outcome: &SearchOutcome,
        hand: &[Card],
        trick: &Trick,
        ctx: &BotContext<'_>,
    ) -> Result<usize, DecisionError> {
        let best = outcome.best_move.ok_or(DecisionError::NoLegalMove)?;
        let Some(rules) = &self.rules else {
            return Ok(best);
        };
        let accepted = |i: usize| rules.is_legal(hand[i], hand, trick, ctx.contract, ctx.seat);
        if accepted(best) {
            return Ok(best);
        }
        warn!(card = %hand[best], "search picked a card the rules reject");

        let mut ranked: Vec<_> = outcome.moves.iter().filter(|m| m.visits > 0).collect();
        ranked.sort_by(|a, b| b.visits.cmp(&a.visits));
        ranked
            .iter()
            .map(|m| m.hand_index)
            .find(|&i| accepted(i))
            .or_else(|| (0..hand.len()).find(|&i| accepted(i)))
            .ok_or(DecisionError::NoLegalMove)
    }
}

fn justify(mode: BudgetMode, outcome: &SearchOutcome, card: Card) -> String {
    let stats = &outcome.stats;
    match outcome.move_for(card).filter(|m| m.visits > 0) {
        Some(m) => format!(
            "{card}: {} of {} trials, win rate {:.3} ({mode} budget, {} nodes, {} ms)",
            m.visits,
            stats.iterations,
            m.win_rate,
            stats.nodes_expanded,
            stats.time_us / 1000
        ),
        None => format!("{card}: fallback after {} trials ({mode} budget)", stats.iterations),
    }
}
