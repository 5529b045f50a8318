//! Move-probability oracle integration.
//!
//! ## Overview
//!
//! - **Traits**: [`PolicyView`] (what an oracle can see), [`PolicyOracle`]
//! - **Encoding**: [`TableEncoder`], a fixed 198-feature layout
//! - **Baseline**: [`UniformOracle`] for testing
//!
//! ## Usage
//!
//! ```rust
//! use baloot_search::core::{Card, Contract, Seat};
//! use baloot_search::nn::{PolicyOracle, UniformOracle};
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
//! let priors = UniformOracle.predict_policy(&game);
//! assert_eq!(priors[&0], 0.5);
//! ```

pub mod encoder;
pub mod traits;

pub use encoder::{TableEncoder, FEATURE_COUNT};
pub use traits::{normalize_priors, EncodedState, PolicyOracle, PolicyView, UniformOracle};
