//! Determinized MCTS over simulated deals.
//!
//! Each trial plays out one concrete world: either a clone of a fixed
//! [`FastGame`] or a fresh world from a sampler. The tree is shared by
//! every trial of a search, so its edges are keyed by card rather than by
//! hand position, and only children legal in the current world are
//! candidates during selection.

use std::sync::Arc;
use std::time::Instant;

use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::core::{Card, GameRng, Seat, Team};
use crate::nn::{normalize_priors, PolicyOracle};
use crate::sim::{play_out, FastGame, Hand, HeuristicRollout, RandomRollout, RolloutPolicy};

use super::config::{MCTSConfig, RolloutKind, SearchBudget};
use super::node::{CardList, NodeId};
use super::policy::{ChildStats, SelectionPolicy, PUCT, UCB1};
use super::stats::SearchStats;
use super::tree::{MCTSTree, TreeStats};

/// Root statistics for one legal move.
#[derive(Clone, Debug, PartialEq)]
pub struct MoveStats {
    /// Position of `card` in the acting hand.
    pub hand_index: usize,
    pub card: Card,
    pub visits: u32,
    pub cumulative_reward: f64,
    /// Mean reward for the acting team, 0 when unvisited.
    pub win_rate: f64,
    pub prior: f32,
}

/// Result of a search.
#[derive(Clone, Debug, Default)]
pub struct SearchOutcome {
    /// Hand index of the chosen move. `None` only when there was nothing
    /// to choose from.
    pub best_move: Option<usize>,
    pub best_card: Option<Card>,
    /// One entry per legal root move, in hand order.
    pub moves: Vec<MoveStats>,
    pub stats: SearchStats,
    /// Shape of the tree when the search stopped.
    pub tree: TreeStats,
}

impl SearchOutcome {
    /// Sum of root move visits; equals the number of completed trials.
    #[must_use]
    pub fn total_visits(&self) -> u32 {
        self.moves.iter().map(|m| m.visits).sum()
    }

    #[must_use]
    pub fn move_for(&self, card: Card) -> Option<&MoveStats> {
        self.moves.iter().find(|m| m.card == card)
    }
}

/// What every world agrees on at the root.
struct RootInfo {
    seat: Seat,
    hand: Hand,
    legal: CardList,
}

/// Monte Carlo Tree Search solver.
///
/// UCB1 by default, PUCT once an oracle is installed, unless a selection
/// policy is set explicitly. The solver holds no per-search state, so one
/// instance can serve many decisions.
pub struct MCTSSolver {
    config: MCTSConfig,
    selection: Option<Box<dyn SelectionPolicy>>,
    rollout: Box<dyn RolloutPolicy>,
    oracle: Option<Arc<dyn PolicyOracle>>,
    root_priors: Option<FxHashMap<Card, f32>>,
}

impl MCTSSolver {
    #[must_use]
    pub fn new(config: MCTSConfig) -> Self {
        let rollout: Box<dyn RolloutPolicy> = match config.rollout {
            RolloutKind::Heuristic => Box::new(HeuristicRollout::default()),
            RolloutKind::Random => Box::new(RandomRollout),
        };
        Self {
            config,
            selection: None,
            rollout,
            oracle: None,
            root_priors: None,
        }
    }

    #[must_use]
    pub fn with_selection<S: SelectionPolicy + 'static>(mut self, selection: S) -> Self {
        self.selection = Some(Box::new(selection));
        self
    }

    #[must_use]
    pub fn with_rollout<R: RolloutPolicy + 'static>(mut self, rollout: R) -> Self {
        self.rollout = Box::new(rollout);
        self
    }

    #[must_use]
    pub fn with_oracle(mut self, oracle: Arc<dyn PolicyOracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    /// Priors for the root moves, used instead of asking the oracle at the
    /// root. Only consulted when an oracle is installed.
    #[must_use]
    pub fn with_root_priors(mut self, priors: FxHashMap<Card, f32>) -> Self {
        self.root_priors = Some(priors);
        self
    }

    #[must_use]
    pub fn config(&self) -> &MCTSConfig {
        &self.config
    }

    fn selection(&self) -> &dyn SelectionPolicy {
        match (&self.selection, &self.oracle) {
            (Some(selection), _) => selection.as_ref(),
            (None, Some(_)) => &PUCT,
            (None, None) => &UCB1,
        }
    }

    /// Best hand index for the seat to move in `game`.
    pub fn search(&self, game: &FastGame, budget: &SearchBudget) -> Option<usize> {
        self.search_with_details(game, budget).best_move
    }

    /// Search a single fixed world.
    pub fn search_with_details(&self, game: &FastGame, budget: &SearchBudget) -> SearchOutcome {
        self.search_worlds(|| Some(game.clone()), budget)
    }

    /// Search with a fresh world for every trial.
    ///
    /// Every world must have the same seat to move holding the same hand in
    /// the same order; the first world fixes them. The search stops early
    /// if `next_world` returns `None` or a world that disagrees.
    pub fn search_worlds<F>(&self, mut next_world: F, budget: &SearchBudget) -> SearchOutcome
    where
        F: FnMut() -> Option<FastGame>,
    {
        let start = Instant::now();
        let mut stats = SearchStats::default();

        let Some(first) = next_world() else {
            stats.missing_worlds += 1;
            warn!("search started without a world");
            return SearchOutcome {
                stats,
                ..SearchOutcome::default()
            };
        };
        let root = RootInfo {
            seat: first.turn(),
            hand: first.current_hand().iter().copied().collect(),
            legal: first.legal_cards(),
        };
        if root.legal.is_empty() {
            return SearchOutcome {
                stats,
                ..SearchOutcome::default()
            };
        }

        let mut tree = MCTSTree::with_capacity(root.seat, self.config.max_nodes.min(4096));
        let mut rng = GameRng::new(self.config.seed);
        let mut pending = Some(first);
        let single_move = root.legal.len() == 1;

        while stats.iterations < budget.max_iterations {
            if budget.time_limit.is_some_and(|limit| start.elapsed() >= limit) {
                break;
            }
            let Some(world) = pending.take().or_else(&mut next_world) else {
                stats.missing_worlds += 1;
                warn!(iterations = stats.iterations, "world source ran dry");
                break;
            };
            if world.turn() != root.seat || world.current_hand() != root.hand.as_slice() {
                stats.missing_worlds += 1;
                warn!(seat = %world.turn(), "world disagrees with the root, stopping");
                break;
            }

            let mut trial_rng = rng.fork();
            self.run_trial(&mut tree, world, root.seat.team(), &mut trial_rng, &mut stats);
            stats.iterations += 1;
            if single_move {
                break;
            }
        }
        stats.time_us = start.elapsed().as_micros() as u64;

        let outcome = self.collect(&tree, &root, stats);
        debug!(
            iterations = outcome.stats.iterations,
            per_second = outcome.stats.iterations_per_second(),
            nodes = outcome.tree.node_count,
            depth = outcome.tree.max_depth,
            branching = outcome.tree.branching_factor(),
            nodes_per_trial = outcome.stats.avg_nodes_per_iteration(),
            best = ?outcome.best_card,
            "search finished"
        );
        outcome
    }

    /// Select, expand, roll out and backpropagate through one world.
    fn run_trial(
        &self,
        tree: &mut MCTSTree,
        mut game: FastGame,
        team: Team,
        rng: &mut GameRng,
        stats: &mut SearchStats,
    ) {
        let baseline = score_diff(&game, team);
        let mut path: Vec<NodeId> = Vec::with_capacity(33);
        let mut current = tree.root();
        path.push(current);

        while !game.is_terminal() {
            let legal = game.legal_cards();
            if legal.is_empty() {
                break;
            }
            let untried = tree.get_mut(current).sync_expansion(&legal);

            if !untried.is_empty() && tree.len() < self.config.max_nodes {
                if let Some((card, child)) =
                    self.expand(tree, current, &game, &legal, &untried, team, rng, stats)
                {
                    if game.play_card(card).is_ok() {
                        path.push(child);
                        stats.max_depth = stats.max_depth.max(tree.get(child).depth);
                    }
                }
                break;
            }

            let Some((card, child)) = self.select_child(tree, current, &legal, team) else {
                break;
            };
            if game.play_card(card).is_err() {
                break;
            }
            current = child;
            path.push(child);
        }

        play_out(&mut game, self.rollout.as_ref(), rng);
        stats.simulations += 1;

        let reward = self.reward(&game, team, baseline);
        for id in path {
            let node = tree.get_mut(id);
            node.visits += 1;
            node.total_reward += reward;
        }
    }

    /// Grow `node` and pick the child to continue from.
    ///
    /// Without an oracle one random untried card is added. With one, every
    /// untried card is added with its prior and the best new child chosen.
    #[allow(clippy::too_many_arguments)]
    fn expand(
        &self,
        tree: &mut MCTSTree,
        node: NodeId,
        game: &FastGame,
        legal: &[Card],
        untried: &[Card],
        team: Team,
        rng: &mut GameRng,
        stats: &mut SearchStats,
    ) -> Option<(Card, NodeId)> {
        let Some(oracle) = &self.oracle else {
            let card = *rng.choose(untried)?;
            let child = add_child(tree, node, game, card, 1.0 / legal.len() as f32);
            stats.nodes_expanded += 1;
            tree.get_mut(node).sync_expansion(legal);
            return Some((card, child));
        };

        let priors = self.priors(node == tree.root(), game, oracle.as_ref());
        for &card in untried {
            if tree.len() >= self.config.max_nodes {
                break;
            }
            let prior = priors.get(&card).copied().unwrap_or(0.0);
            add_child(tree, node, game, card, prior);
            stats.nodes_expanded += 1;
        }
        tree.get_mut(node).sync_expansion(legal);
        self.select_child(tree, node, untried, team)
    }

    /// Normalized priors over the legal cards of `game`.
    fn priors(&self, at_root: bool, game: &FastGame, oracle: &dyn PolicyOracle) -> FxHashMap<Card, f32> {
        let hand = game.current_hand();
        let legal = game.legal_moves();
        let raw: FxHashMap<usize, f32> = match (&self.root_priors, at_root) {
            (Some(priors), true) => legal
                .iter()
                .filter_map(|&i| priors.get(&hand[i]).map(|&p| (i, p)))
                .collect(),
            _ => oracle.predict_policy(game),
        };
        normalize_priors(&raw, &legal)
            .into_iter()
            .map(|(i, p)| (hand[i], p))
            .collect()
    }

    /// Highest-scoring child whose card is in `candidates`.
    fn select_child(
        &self,
        tree: &MCTSTree,
        node: NodeId,
        candidates: &[Card],
        team: Team,
    ) -> Option<(Card, NodeId)> {
        let parent = tree.get(node);
        let opposing = parent.to_move.team() != team;
        let policy = self.selection();

        let mut best: Option<(Card, NodeId, f64)> = None;
        for &(card, id) in &parent.children {
            if !candidates.contains(&card) {
                continue;
            }
            let child = tree.get(id);
            let score = policy.score(
                &ChildStats {
                    q: child.q(opposing),
                    visits: child.visits,
                    parent_visits: parent.visits,
                    prior: child.prior,
                },
                &self.config,
            );
            if best.map_or(true, |(_, _, top)| score > top) {
                best = Some((card, id, score));
            }
        }
        best.map(|(card, id, _)| (card, id))
    }

    /// `clamp(0.5 + gained / reward_scale, 0, 1)` for `team`, counting only
    /// points scored since `baseline`.
    fn reward(&self, game: &FastGame, team: Team, baseline: i32) -> f64 {
        let gained = f64::from(score_diff(game, team) - baseline);
        let scale = if self.config.reward_scale > 0.0 {
            self.config.reward_scale
        } else {
            1.0
        };
        (0.5 + gained / scale).clamp(0.0, 1.0)
    }

    fn collect(&self, tree: &MCTSTree, root: &RootInfo, stats: SearchStats) -> SearchOutcome {
        let root_node = tree.root_node();
        let uniform = 1.0 / root.legal.len() as f32;

        let moves: Vec<MoveStats> = root
            .hand
            .iter()
            .enumerate()
            .filter(|&(_, card)| root.legal.contains(card))
            .map(|(hand_index, &card)| match root_node.child(card) {
                Some(id) => {
                    let node = tree.get(id);
                    MoveStats {
                        hand_index,
                        card,
                        visits: node.visits,
                        cumulative_reward: node.total_reward,
                        win_rate: node.mean_reward(),
                        prior: node.prior,
                    }
                }
                None => MoveStats {
                    hand_index,
                    card,
                    visits: 0,
                    cumulative_reward: 0.0,
                    win_rate: 0.0,
                    prior: uniform,
                },
            })
            .collect();

        let visited = moves.iter().filter(|m| m.visits > 0).max_by(|a, b| {
            a.visits
                .cmp(&b.visits)
                .then(a.win_rate.total_cmp(&b.win_rate))
        });
        let best = match visited {
            Some(best) => Some((best.hand_index, best.card)),
            None => {
                warn!("no trial completed, playing the first legal move");
                moves.first().map(|m| (m.hand_index, m.card))
            }
        };

        SearchOutcome {
            best_move: best.map(|(index, _)| index),
            best_card: best.map(|(_, card)| card),
            moves,
            stats,
            tree: tree.stats(),
        }
    }
}

fn add_child(tree: &mut MCTSTree, parent: NodeId, game: &FastGame, card: Card, prior: f32) -> NodeId {
    let mut next = game.clone();
    let to_move = match next.play_card(card) {
        Ok(_) => next.turn(),
        Err(_) => game.turn(),
    };
    tree.add_child(parent, card, to_move, prior)
}

fn score_diff(game: &FastGame, team: Team) -> i32 {
    i32::from(game.score(team)) - i32::from(game.score(team.opponent()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Contract;
    use crate::nn::UniformOracle;

    fn cards(codes: &[&str]) -> Vec<Card> {
        codes.iter().map(|c| c.parse().unwrap()).collect()
    }

    fn endgame() -> FastGame {
        FastGame::endgame(
            [
                cards(&["AH", "7S", "QD"]),
                cards(&["KH", "8C", "JD"]),
                cards(&["10H", "9D", "8S"]),
                cards(&["7H", "JS", "KC"]),
            ],
            Contract::sun(),
            Seat::new(0),
        )
        .unwrap()
    }

    #[test]
    fn test_search_returns_legal_move() {
        let game = endgame();
        let solver = MCTSSolver::new(MCTSConfig::default());
        let best = solver.search(&game, &SearchBudget::iterations(100)).unwrap();
        assert!(game.legal_moves().contains(&best));
    }

    #[test]
    fn test_visits_match_iterations() {
        let solver = MCTSSolver::new(MCTSConfig::default());
        let outcome = solver.search_with_details(&endgame(), &SearchBudget::iterations(150));
        assert_eq!(outcome.stats.iterations, 150);
        assert_eq!(outcome.total_visits(), 150);
        assert_eq!(outcome.stats.simulations, 150);
        assert!(outcome.stats.nodes_expanded > 0);
        assert_eq!(outcome.tree.node_count, outcome.stats.nodes_expanded as usize + 1);
        assert!(outcome.tree.max_depth >= 1);
        assert!(outcome.tree.branching_factor() > 0.0);
        assert_eq!(outcome.moves.len(), 3);
    }

    #[test]
    fn test_zero_budget_falls_back_to_first_legal() {
        let solver = MCTSSolver::new(MCTSConfig::default());
        let outcome = solver.search_with_details(&endgame(), &SearchBudget::iterations(0));
        assert_eq!(outcome.stats.iterations, 0);
        assert_eq!(outcome.best_move, Some(0));
    }

    #[test]
    fn test_terminal_game_has_no_move() {
        let mut game = endgame();
        crate::sim::play_out(&mut game, &RandomRollout, &mut GameRng::new(0));
        let solver = MCTSSolver::new(MCTSConfig::default());
        assert_eq!(solver.search(&game, &SearchBudget::iterations(10)), None);
    }

    #[test]
    fn test_max_nodes_caps_growth() {
        let solver = MCTSSolver::new(MCTSConfig::default().with_max_nodes(5));
        let outcome = solver.search_with_details(&endgame(), &SearchBudget::iterations(200));
        assert_eq!(outcome.stats.iterations, 200);
        assert!(outcome.stats.nodes_expanded <= 4);
    }

    #[test]
    fn test_oracle_priors_reported() {
        let solver = MCTSSolver::new(MCTSConfig::default()).with_oracle(Arc::new(UniformOracle));
        let outcome = solver.search_with_details(&endgame(), &SearchBudget::iterations(60));
        assert_eq!(outcome.total_visits(), 60);
        let prior_sum: f32 = outcome.moves.iter().map(|m| m.prior).sum();
        assert!((prior_sum - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_root_priors_override_oracle() {
        let game = endgame();
        let mut priors = FxHashMap::default();
        priors.insert(game.current_hand()[2], 1.0);
        let solver = MCTSSolver::new(MCTSConfig::default())
            .with_oracle(Arc::new(UniformOracle))
            .with_root_priors(priors);
        let outcome = solver.search_with_details(&game, &SearchBudget::iterations(1));
        assert_eq!(outcome.moves[2].prior, 1.0);
        assert_eq!(outcome.moves[0].prior, 0.0);
        // The first trial descends into the only move with prior mass.
        assert_eq!(outcome.moves[2].visits, 1);
    }

    #[test]
    fn test_world_source_stops_search() {
        let game = endgame();
        let mut remaining = 5;
        let solver = MCTSSolver::new(MCTSConfig::default());
        let outcome = solver.search_worlds(
            || {
                if remaining == 0 {
                    return None;
                }
                remaining -= 1;
                Some(game.clone())
            },
            &SearchBudget::iterations(50),
        );
        assert_eq!(outcome.stats.iterations, 5);
        assert_eq!(outcome.stats.missing_worlds, 1);
        assert!(outcome.best_move.is_some());
    }

    #[test]
    fn test_reward_is_clamped() {
        let solver = MCTSSolver::new(MCTSConfig::default());
        let mut game = endgame();
        crate::sim::play_out(&mut game, &HeuristicRollout::default(), &mut GameRng::new(0));
        let team = Seat::new(0).team();
        let reward = solver.reward(&game, team, 0);
        assert!((0.0..=1.0).contains(&reward));
        let expected = 0.5 + f64::from(score_diff(&game, team)) / 100.0;
        assert!((reward - expected.clamp(0.0, 1.0)).abs() < 1e-12);
    }
}
