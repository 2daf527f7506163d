//! thirty-core: dice, scoring methods, the scoring engine, game state and rules.

pub mod chance;
pub mod config;
pub mod die;
pub mod engine;
pub mod method;
pub mod scoring;
pub mod sim;
pub mod state;
pub mod subsets;

pub use config::{Config, ConfigError};
pub use die::{validate_dice, Die, DieError, NUM_DICE};
pub use engine::{
    initial_state, mark, next_round, restore, roll, start_next_round, toggle_hold, ApplyError,
    ChanceMode, TurnContext,
};
pub use method::{available_methods, ParseMethodError, ScoringMethod, ALL_METHODS_MASK, NUM_METHODS};
pub use scoring::{score, score_breakdown, scores_for_dice, ScoreBreakdown, ALL_POSITIONS};
pub use state::{GameSnapshot, GameState, ScoreEntry, NUM_ROUNDS, THROWS_PER_ROUND};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Ruleset id stamped into logs and manifests.
pub const RULESET_ID: &str = "thirty_greedy_v1";

#[cfg(test)]
mod engine_tests;
