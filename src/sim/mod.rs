//! Fast, cloneable deal simulation.
//!
//! - [`Trick`]: the trick on the table and its resolution
//! - [`FastGame`]: full card-play rules over four known hands
//! - [`rollout`]: playout policies used by the search

pub mod game;
pub mod rollout;
pub mod trick;

pub use game::{legal_indices, FastGame, GameError, Hand, MoveList, TrickResult};
pub use rollout::{play_out, HeuristicRollout, RandomRollout, RolloutPolicy, RolloutTuning};
pub use trick::Trick;
