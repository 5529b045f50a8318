//! Decision orchestration.
//!
//! [`CognitiveOptimizer`] turns a caller's [`BotContext`] into a
//! [`Decision`]: it cleans the raw card input, renumbers seats so the
//! acting player is seat 0, picks a budget from the match score, samples
//! worlds and runs the search.
//!
//! ```rust
//! use baloot_search::core::{Contract, Seat};
//! use baloot_search::optimizer::{BotContext, CognitiveOptimizer, OptimizerConfig};
//!
//! let ctx = BotContext::new(
//!     Seat::new(1),
//!     ["AH", "KH", "7S", "8S", "QD", "JC", "9C", "10D"],
//!     Contract::sun(),
//! );
//! let optimizer = CognitiveOptimizer::new(OptimizerConfig::default());
//! let decision = optimizer.decide(&ctx).expect("fresh deal is consistent");
//! assert!(decision.chosen_hand_index < 8);
//! ```

mod budget;
mod cognitive;
mod context;
mod decision;

pub use budget::{AdaptiveBudget, BudgetConfig, BudgetMode};
pub use cognitive::{CognitiveOptimizer, OptimizerConfig};
pub use context::{BotContext, ContextView, LegalMoveOracle, MatchScore, SimulatorRules};
pub use decision::{Decision, DecisionError, MoveReport};
