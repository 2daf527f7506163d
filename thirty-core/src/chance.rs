//! Deterministic chance stream for reproducible games.
//!
//! Dice outcomes are defined by game seed + structural event, not by evolving RNG state.
//! Event key: (game_seed, round_idx, roll_idx) where roll_idx ∈ {0,1,2}.
//! Each event yields six values; die `i` takes value `i` if it is not held.

use crate::die::NUM_DICE;

/// Structural event key for deterministic dice generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventKey {
    pub game_seed: u64,
    pub round_idx: u8,
    pub roll_idx: u8,
}

/// SplitMix64 step.
fn splitmix64_next(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

fn mix_seed(key: EventKey) -> u64 {
    // Fixed mixing; std Hash/RandomState is not stable across runs.
    let mut x = key.game_seed;
    x ^= (key.round_idx as u64).wrapping_mul(0xA5A35625E4F7C1AD);
    x ^= (key.roll_idx as u64).wrapping_mul(0xD6E8FEB86659FD93);
    let mut s = x;
    splitmix64_next(&mut s)
}

/// Deterministically generate six die values for the given event key.
pub fn roll6(key: EventKey) -> [u8; NUM_DICE] {
    let mut state = mix_seed(key);
    let mut out = [0u8; NUM_DICE];
    for o in &mut out {
        let r = splitmix64_next(&mut state);
        *o = ((r % 6) + 1) as u8;
    }
    out
}
