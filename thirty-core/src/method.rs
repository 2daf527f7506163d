//! Scoring methods and their index mapping.
//!
//! Index space: 0 = Low, 1..=10 = target sums 3..=12.
//! Usage masks use bit `index` (bit 0 = Low).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const NUM_METHODS: usize = 11;

/// Mask with every method bit set.
pub const ALL_METHODS_MASK: u16 = (1u16 << NUM_METHODS) - 1;

/// How a finished hand is converted into a score.
///
/// Serialized as its label (`"Low"`, `"3"` .. `"12"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ScoringMethod {
    /// Sum of all dice showing 3 or less.
    Low,
    Sum3,
    Sum4,
    Sum5,
    Sum6,
    Sum7,
    Sum8,
    Sum9,
    Sum10,
    Sum11,
    Sum12,
}

impl ScoringMethod {
    /// All methods in index order.
    pub const ALL: [ScoringMethod; NUM_METHODS] = [
        ScoringMethod::Low,
        ScoringMethod::Sum3,
        ScoringMethod::Sum4,
        ScoringMethod::Sum5,
        ScoringMethod::Sum6,
        ScoringMethod::Sum7,
        ScoringMethod::Sum8,
        ScoringMethod::Sum9,
        ScoringMethod::Sum10,
        ScoringMethod::Sum11,
        ScoringMethod::Sum12,
    ];

    pub fn index(self) -> u8 {
        self as u8
    }

    /// # Panics
    /// Panics if `idx` is not in 0..=10.
    pub fn from_index(idx: u8) -> ScoringMethod {
        assert!(
            (idx as usize) < NUM_METHODS,
            "method index out of range: {}",
            idx
        );
        Self::ALL[idx as usize]
    }

    /// Target sum for the grouping methods, `None` for Low.
    pub fn target(self) -> Option<u8> {
        match self {
            ScoringMethod::Low => None,
            other => Some(other.index() + 2),
        }
    }

    /// Method that groups dice to `target` (3..=12).
    pub fn from_target(target: u8) -> Option<ScoringMethod> {
        if (3..=12).contains(&target) {
            Some(Self::ALL[(target - 2) as usize])
        } else {
            None
        }
    }

    pub fn label(self) -> &'static str {
        const LABELS: [&str; NUM_METHODS] =
            ["Low", "3", "4", "5", "6", "7", "8", "9", "10", "11", "12"];
        LABELS[self.index() as usize]
    }

    /// Bit of this method in a usage mask.
    pub fn bit(self) -> u16 {
        1u16 << self.index()
    }
}

impl fmt::Display for ScoringMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown scoring method: {0:?} (expected \"low\" or 3..=12)")]
pub struct ParseMethodError(pub String);

impl FromStr for ScoringMethod {
    type Err = ParseMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        if t.eq_ignore_ascii_case("low") {
            return Ok(ScoringMethod::Low);
        }
        t.parse::<u8>()
            .ok()
            .and_then(ScoringMethod::from_target)
            .ok_or_else(|| ParseMethodError(s.to_string()))
    }
}

impl From<ScoringMethod> for String {
    fn from(m: ScoringMethod) -> String {
        m.label().to_string()
    }
}

impl TryFrom<String> for ScoringMethod {
    type Error = ParseMethodError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Methods whose bit is clear in `used_mask`, in index order.
pub fn available_methods(used_mask: u16) -> Vec<ScoringMethod> {
    ScoringMethod::ALL
        .into_iter()
        .filter(|m| used_mask & m.bit() == 0)
        .collect()
}
