//! Monte Carlo Tree Search over determinized deals.
//!
//! ## Overview
//!
//! The solver searches one decision for the seat to move. Hidden cards are
//! handled by determinization: every trial plays out a concrete world, and
//! the tree accumulates statistics across worlds. Key features:
//!
//! - **Card-keyed edges**: the same card means the same edge in every world
//! - **Team-aware selection**: values are flipped for the opposing team
//! - **Configurable policies**: selection (UCB1/PUCT) and playout
//! - **Budgets**: trial count plus an optional wall-clock limit
//!
//! ## Usage
//!
//! ```rust
//! use baloot_search::core::{Card, Contract, Seat};
//! use baloot_search::mcts::{MCTSConfig, MCTSSolver, SearchBudget};
//! use baloot_search::sim::FastGame;
//!
//! let cards = |codes: &[&str]| -> Vec<Card> {
//!     codes.iter().map(|c| c.parse().unwrap()).collect()
//! };
//! let game = FastGame::endgame(
//!     [cards(&["AH", "7S"]), cards(&["KH", "8C"]), cards(&["10H", "9D"]), cards(&["7H", "JS"])],
//!     Contract::sun(),
//!     Seat::new(0),
//! )
//! .unwrap();
//!
//! let solver = MCTSSolver::new(MCTSConfig::default());
//! let outcome = solver.search_with_details(&game, &SearchBudget::iterations(200));
//! assert_eq!(outcome.total_visits(), 200);
//! assert!(outcome.best_move.is_some());
//! ```
//!
//! ## Custom Policies
//!
//! ```rust,ignore
//! use baloot_search::mcts::{MCTSSolver, MCTSConfig, PUCT};
//! use baloot_search::sim::RandomRollout;
//!
//! let solver = MCTSSolver::new(config)
//!     .with_selection(PUCT)
//!     .with_rollout(RandomRollout);
//! ```

pub mod config;
pub mod node;
pub mod policy;
pub mod search;
pub mod stats;
pub mod tree;

// Re-export main types
pub use config::{MCTSConfig, RolloutKind, SearchBudget};
pub use node::{CardList, Expansion, MCTSNode, NodeId};
pub use policy::{ChildStats, SelectionPolicy, PUCT, UCB1};
pub use search::{MCTSSolver, MoveStats, SearchOutcome};
pub use stats::SearchStats;
pub use tree::{MCTSTree, TreeStats};
