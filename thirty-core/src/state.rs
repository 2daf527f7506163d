//! Game state, score records and the plain snapshot form of a game.

use serde::{Deserialize, Serialize};

use crate::die::{self, Die, NUM_DICE};
use crate::method::{available_methods, ScoringMethod};
use crate::scoring::{score, score_breakdown, ScoreBreakdown};

/// Rounds per game; one scoring method is consumed per round.
pub const NUM_ROUNDS: u8 = 10;

/// Throws per round, the mandatory first roll included.
pub const THROWS_PER_ROUND: u8 = 3;

/// One scored round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub round: u8,
    pub score: u32,
    pub method: ScoringMethod,
}

/// Full state of one game.
///
/// Only the rules engine (`crate::engine`) mutates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub(crate) round: u8,
    pub(crate) throws_left: u8,
    pub(crate) dice: [Die; NUM_DICE],
    pub(crate) scores: Vec<ScoreEntry>,
    /// Bit `method.index()` set once the method is used.
    pub(crate) used_mask: u16,
}

impl GameState {
    /// Current round, 1..=10.
    pub fn round(&self) -> u8 {
        self.round
    }

    pub fn throws_left(&self) -> u8 {
        self.throws_left
    }

    pub fn dice(&self) -> &[Die; NUM_DICE] {
        &self.dice
    }

    pub fn dice_values(&self) -> [u8; NUM_DICE] {
        die::values(&self.dice)
    }

    /// Score entries in round order.
    pub fn scores(&self) -> &[ScoreEntry] {
        &self.scores
    }

    pub fn used_mask(&self) -> u16 {
        self.used_mask
    }

    pub fn is_used(&self, method: ScoringMethod) -> bool {
        self.used_mask & method.bit() != 0
    }

    pub fn available_methods(&self) -> Vec<ScoringMethod> {
        available_methods(self.used_mask)
    }

    /// True once the current round has its score entry.
    pub fn round_scored(&self) -> bool {
        self.scores.len() == self.round as usize
    }

    pub fn is_finished(&self) -> bool {
        self.scores.len() == NUM_ROUNDS as usize
    }

    /// Sum of all recorded scores.
    pub fn total(&self) -> u32 {
        self.scores.iter().map(|e| e.score).sum()
    }

    /// Score the current dice under `method` without committing.
    pub fn preview(&self, method: ScoringMethod) -> u32 {
        score(self.dice_values(), method)
    }

    pub fn preview_breakdown(&self, method: ScoringMethod) -> ScoreBreakdown {
        score_breakdown(self.dice_values(), method)
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            round: self.round,
            throws_left: self.throws_left,
            dice: self.dice_values(),
            held: self.dice.map(|d| d.is_held()),
            scores: self.scores.clone(),
            used_methods: ScoringMethod::ALL
                .into_iter()
                .filter(|&m| self.is_used(m))
                .collect(),
        }
    }
}

/// Plain-data form of a [`GameState`] for saving and restoring a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub round: u8,
    pub throws_left: u8,
    pub dice: [u8; NUM_DICE],
    pub held: [bool; NUM_DICE],
    pub scores: Vec<ScoreEntry>,
    pub used_methods: Vec<ScoringMethod>,
}
