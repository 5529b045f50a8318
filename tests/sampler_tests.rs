//! World sampler integration tests against beliefs inferred from real play.

use proptest::prelude::*;

use baloot_search::belief::{
    BeliefConfig, BeliefSource, BeliefState, BeliefTracker, SampleRequest, SamplerConfig,
    SamplingError, SamplingStats, WorldSampler,
};
use baloot_search::core::{Card, CardSet, Contract, GameRng, Seat, Suit};
use baloot_search::sim::{FastGame, HeuristicRollout, RolloutPolicy};

/// Deal from `seed`, then play `moves` cards with the heuristic policy while
/// a tracker watches.
fn played_out(seed: u64, moves: usize) -> (FastGame, BeliefTracker) {
    let mut rng = GameRng::new(seed);
    let mut deck: Vec<Card> = Card::deck().collect();
    rng.shuffle(&mut deck);
    let contract = if seed % 2 == 0 {
        Contract::hokum(Suit::ALL[(seed / 2 % 4) as usize])
    } else {
        Contract::sun()
    };
    let hands = [
        deck[0..8].to_vec(),
        deck[8..16].to_vec(),
        deck[16..24].to_vec(),
        deck[24..32].to_vec(),
    ];
    let mut game = FastGame::endgame(hands, contract, Seat::new(0)).unwrap();
    let mut tracker = BeliefTracker::new(contract, BeliefConfig::default());
    let policy = HeuristicRollout::default();

    for _ in 0..moves {
        let Some(index) = policy.choose(&game, &mut rng) else {
            break;
        };
        let before = game.trick().clone();
        let seat = game.turn();
        let card = game.current_hand()[index];
        tracker.observe_play(&before, seat, card);
        game.apply_move(index).unwrap();
    }
    (game, tracker)
}

fn seen(game: &FastGame) -> CardSet {
    game.played().union(game.trick().cards().collect())
}

#[test]
fn test_tracker_counts_match_deal() {
    let (game, tracker) = played_out(7, 13);
    for seat in Seat::ALL {
        assert_eq!(tracker.remaining_cards(seat), game.hand(seat).len());
    }
}

#[test]
fn test_tracker_voids_are_true() {
    for seed in 0..30 {
        let (game, tracker) = played_out(seed, 24);
        for seat in Seat::ALL {
            for suit in Suit::ALL {
                if tracker.is_void(seat, suit) {
                    assert!(
                        game.hand(seat).iter().all(|card| card.suit != suit),
                        "seed {seed}: {seat} marked void in {suit} but holds it"
                    );
                }
            }
        }
    }
}

#[test]
fn test_sampled_worlds_build_games() {
    let (game, tracker) = played_out(11, 10);
    let seat = game.turn();
    let sampler = WorldSampler::new(SamplerConfig::default());
    let request = SampleRequest {
        seat,
        hand: game.current_hand(),
        played: seen(&game),
        beliefs: &tracker,
        unknown_played: 0,
    };
    let mut rng = GameRng::new(3);
    for _ in 0..20 {
        let world = sampler.sample(&request, &mut rng).unwrap();
        let rebuilt = FastGame::new(
            world.into_hands(),
            game.contract(),
            seat,
            game.trick().clone(),
            game.played(),
        )
        .unwrap();
        assert_eq!(rebuilt.current_hand(), game.current_hand());
        assert_eq!(rebuilt.legal_moves(), game.legal_moves());
    }
}

#[test]
fn test_stale_beliefs_are_rejected() {
    let (game, _) = played_out(5, 9);
    let stale = BeliefState::default();
    let request = SampleRequest {
        seat: game.turn(),
        hand: game.current_hand(),
        played: seen(&game),
        beliefs: &stale,
        unknown_played: 0,
    };
    let result = WorldSampler::new(SamplerConfig::default()).sample(&request, &mut GameRng::new(0));
    assert!(matches!(result, Err(SamplingError::CountMismatch { .. })));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_worlds_are_valid(seed in any::<u64>(), moves in 0usize..28, sample_seed in any::<u64>()) {
        let (game, tracker) = played_out(seed, moves);
        let seat = game.turn();
        let played = seen(&game);
        let request = SampleRequest {
            seat,
            hand: game.current_hand(),
            played,
            beliefs: &tracker,
            unknown_played: 0,
        };
        let mut stats = SamplingStats::default();
        let world = WorldSampler::new(SamplerConfig::default())
            .sample_with_stats(&request, &mut GameRng::new(sample_seed), &mut stats)
            .unwrap();

        prop_assert_eq!(world.hand(seat), game.current_hand());

        let mut all = played;
        for other in Seat::ALL {
            let hand = world.hand(other);
            prop_assert_eq!(hand.len(), game.hand(other).len());
            for &card in hand {
                prop_assert!(all.insert(card), "{} dealt twice", card);
                if other != seat && stats.relaxed_voids == 0 {
                    prop_assert!(!tracker.is_void(other, card.suit));
                }
            }
        }
        prop_assert_eq!(all, CardSet::full());
    }
}
