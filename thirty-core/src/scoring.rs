//! Scoring engine: six die values + a method -> score.
//!
//! Target-sum methods use a greedy partition:
//! 1. size 1: a die equal to the target scores alone, a die above it leaves play;
//! 2. sizes 2..=5: k-subsets of the remaining dice in ascending index order,
//!    each non-overlapping subset summing to the target is committed;
//! 3. if no die left play at any size and all six sum to the target, they score.
//!
//! Commitments are never revisited. Dice are tracked by position, so equal
//! values on different dice stay distinct.

use std::cmp::Ordering;

use crate::die::{validate_dice, NUM_DICE};
use crate::method::{ScoringMethod, NUM_METHODS};
use crate::subsets::{mask_indices, KSubsets};

/// Position mask covering all six dice.
pub const ALL_POSITIONS: u8 = (1u8 << NUM_DICE) - 1;

/// Largest group size searched by the k-subset passes.
const MAX_GROUP: usize = NUM_DICE - 1;

/// Result of scoring a hand, with the groups the engine committed to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreBreakdown {
    pub total: u32,
    /// Position masks (bit `i` = die `i`), in commit order.
    /// For Low this is a single mask of the counted dice, if any.
    pub groups: Vec<u8>,
}

impl ScoreBreakdown {
    fn commit(&mut self, positions: u8, points: u32) {
        self.total += points;
        self.groups.push(positions);
    }
}

/// Score `dice` under `method`.
///
/// # Panics
/// Panics if a die value is outside 1..=6 (see [`validate_dice`]).
pub fn score(dice: [u8; NUM_DICE], method: ScoringMethod) -> u32 {
    score_breakdown(dice, method).total
}

/// Score `dice` under `method` and report which dice formed each group.
///
/// # Panics
/// Panics if a die value is outside 1..=6.
pub fn score_breakdown(dice: [u8; NUM_DICE], method: ScoringMethod) -> ScoreBreakdown {
    if let Err(e) = validate_dice(&dice) {
        panic!("{} in {:?}", e, dice);
    }
    match method.target() {
        None => low(dice),
        Some(target) => greedy_groups(dice, target),
    }
}

/// Scores of every method for one hand, in method index order.
pub fn scores_for_dice(dice: [u8; NUM_DICE]) -> [u32; NUM_METHODS] {
    ScoringMethod::ALL.map(|m| score(dice, m))
}

fn low(dice: [u8; NUM_DICE]) -> ScoreBreakdown {
    let mut mask = 0u8;
    let mut total = 0u32;
    for (pos, &v) in dice.iter().enumerate() {
        if v <= 3 {
            mask |= 1u8 << pos;
            total += v as u32;
        }
    }
    ScoreBreakdown {
        total,
        groups: if mask != 0 { vec![mask] } else { Vec::new() },
    }
}

fn greedy_groups(dice: [u8; NUM_DICE], target: u8) -> ScoreBreakdown {
    let target_sum = target as u32;
    let mut out = ScoreBreakdown::default();

    // (position, value) of every die still in play.
    let mut pool: Vec<(usize, u8)> = Vec::with_capacity(NUM_DICE);
    for (pos, &value) in dice.iter().enumerate() {
        match value.cmp(&target) {
            Ordering::Equal => out.commit(1u8 << pos, target_sum),
            Ordering::Less => pool.push((pos, value)),
            Ordering::Greater => {}
        }
    }

    for k in 2..=MAX_GROUP {
        // Bits index into `pool`, not dice positions.
        let mut consumed = 0u8;
        for subset in KSubsets::new(pool.len(), k) {
            if subset & consumed != 0 {
                continue;
            }
            let sum: u32 = mask_indices(subset).map(|i| pool[i].1 as u32).sum();
            if sum == target_sum {
                consumed |= subset;
                out.commit(pool_positions(&pool, subset), target_sum);
            }
        }
        if consumed != 0 {
            pool = pool
                .into_iter()
                .enumerate()
                .filter(|&(i, _)| consumed & (1u8 << i) == 0)
                .map(|(_, die)| die)
                .collect();
        }
    }

    if pool.len() == NUM_DICE {
        let sum: u32 = pool.iter().map(|&(_, v)| v as u32).sum();
        if sum == target_sum {
            out.commit(ALL_POSITIONS, target_sum);
        }
    }

    out
}

fn pool_positions(pool: &[(usize, u8)], subset: u8) -> u8 {
    mask_indices(subset).fold(0u8, |m, i| m | (1u8 << pool[i].0))
}
