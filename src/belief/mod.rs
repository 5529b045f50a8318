//! Beliefs about hidden hands and the world sampler built on them.
//!
//! - `state`: the [`BeliefSource`] trait, plain [`BeliefState`] data and a
//!   [`BeliefTracker`] that infers voids and suit strength from plays.
//! - `sampler`: [`WorldSampler`], which deals the unseen cards consistently
//!   with those beliefs.

mod sampler;
mod state;

pub use sampler::{SampleRequest, SamplerConfig, SamplingError, SamplingStats, World, WorldSampler};
pub use state::{
    BeliefConfig, BeliefSource, BeliefState, BeliefTracker, RelativeBeliefs, SuitMask,
    NEUTRAL_PROBABILITY,
};
