//! # baloot-search
//!
//! Card-play decision core for Baloot, the four-player partnership
//! trick-taking game, built on determinized Monte Carlo Tree Search.
//!
//! ## Design Principles
//!
//! 1. **Fast simulation**: [`FastGame`] holds inline hands and a bitset of
//!    played cards, so a clone per trial is cheap.
//!
//! 2. **Determinization**: hidden hands are dealt by [`WorldSampler`] from
//!    what is known (voids, card counts, suit strength) and searched as if
//!    fully visible.
//!
//! 3. **Explicit failure**: every fallible step returns a typed error; the
//!    [`CognitiveOptimizer`] turns them into "no decision" at its boundary.
//!
//! ## Architecture
//!
//! - **Card-keyed search tree**: one arena tree per decision, shared across
//!   sampled worlds. Edges are cards, which mean the same thing in every
//!   world.
//!
//! - **Team perspective**: rewards are scored for the acting team and
//!   inverted at nodes where the opponents choose.
//!
//! - **Seat 0 is always the actor**: the optimizer renumbers the table
//!   before simulating and maps results back to the caller's indices.
//!
//! ## Modules
//!
//! - `core`: cards, card sets, contracts, seats and teams, RNG
//! - `sim`: tricks, the `FastGame` simulator, rollout policies
//! - `belief`: belief sources, the belief tracker, the world sampler
//! - `mcts`: Monte Carlo Tree Search
//! - `nn`: move-probability oracle interface and state encoding
//! - `optimizer`: per-decision orchestration and adaptive budget

pub mod belief;
pub mod core;
pub mod mcts;
pub mod nn;
pub mod optimizer;
pub mod sim;

// Re-export commonly used types
pub use crate::core::{Card, CardSet, Contract, GameRng, Mode, Rank, Seat, SeatMap, Suit, Team};

pub use crate::sim::{FastGame, GameError, HeuristicRollout, RandomRollout, RolloutPolicy, Trick};

pub use crate::belief::{BeliefSource, BeliefState, BeliefTracker, World, WorldSampler};

pub use crate::mcts::{MCTSConfig, MCTSSolver, SearchBudget, SearchOutcome, SearchStats, PUCT, UCB1};

pub use crate::nn::{PolicyOracle, PolicyView, UniformOracle};

pub use crate::optimizer::{
    BotContext, CognitiveOptimizer, Decision, DecisionError, LegalMoveOracle, OptimizerConfig,
};
