//! Rules engine: the only place that mutates `GameState`.
//!
//! Turn structure:
//! - a round starts with the mandatory first roll (throws_left 3 -> 2);
//! - the player may re-roll unheld dice while throws_left > 0;
//! - `mark` consumes one unused method and records the round's score;
//! - `next_round` advances the round counter and resets throws_left to 3.

use rand_chacha::ChaCha8Rng;
use rand_core::SeedableRng;
use thiserror::Error;

use crate::chance::{self, EventKey};
use crate::die::{Die, DieError, NUM_DICE};
use crate::method::ScoringMethod;
use crate::scoring::score;
use crate::state::{GameSnapshot, GameState, ScoreEntry, NUM_ROUNDS, THROWS_PER_ROUND};

/// How dice are generated for rolls.
pub enum ChanceMode {
    /// Deterministic, event-keyed dice stream. Requires a game seed.
    DeterministicEventKeyed { game_seed: u64 },
    /// Pseudorandom dice stream backed by a small PRNG.
    Rng { rng: Box<ChaCha8Rng> },
}

/// Mutable transition context: where the dice come from.
pub struct TurnContext {
    pub chance: ChanceMode,
}

impl TurnContext {
    pub fn new_deterministic(game_seed: u64) -> Self {
        Self {
            chance: ChanceMode::DeterministicEventKeyed { game_seed },
        }
    }

    pub fn new_rng(seed: u64) -> Self {
        Self {
            chance: ChanceMode::Rng {
                rng: Box::new(ChaCha8Rng::seed_from_u64(seed)),
            },
        }
    }

    fn roll_unheld(&mut self, dice: &mut [Die; NUM_DICE], round: u8, throws_left: u8) {
        match &mut self.chance {
            ChanceMode::DeterministicEventKeyed { game_seed } => {
                let draws = chance::roll6(EventKey {
                    game_seed: *game_seed,
                    round_idx: round - 1,
                    roll_idx: THROWS_PER_ROUND - throws_left,
                });
                for (d, &v) in dice.iter_mut().zip(draws.iter()) {
                    d.land(v);
                }
            }
            ChanceMode::Rng { rng } => {
                for d in dice.iter_mut() {
                    d.roll(rng.as_mut());
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplyError {
    #[error("no throws left in round {round}")]
    NoThrowsLeft { round: u8 },
    #[error("scoring method {method} has already been used")]
    MethodAlreadyUsed { method: ScoringMethod },
    #[error("round {round} has already been scored")]
    RoundAlreadyScored { round: u8 },
    #[error("round {round} has not been scored yet")]
    RoundNotScored { round: u8 },
    #[error("round {round} has not been rolled yet")]
    NotRolled { round: u8 },
    #[error("the game is over")]
    GameOver,
    #[error("no die at position {position}")]
    InvalidPosition { position: usize },
    #[error("invalid state: {msg}")]
    InvalidState { msg: &'static str },
    #[error(transparent)]
    Die(#[from] DieError),
}

/// Create a new game: round 1, all dice thrown once, two throws left.
pub fn initial_state(ctx: &mut TurnContext) -> GameState {
    let mut state = GameState {
        round: 1,
        throws_left: THROWS_PER_ROUND,
        dice: [Die::BLANK; NUM_DICE],
        scores: Vec::with_capacity(NUM_ROUNDS as usize),
        used_mask: 0,
    };
    throw(&mut state, ctx);
    state
}

/// Re-roll every unheld die, consuming one throw.
pub fn roll(state: &mut GameState, ctx: &mut TurnContext) -> Result<(), ApplyError> {
    ensure_round_open(state)?;
    if state.throws_left == 0 {
        return Err(ApplyError::NoThrowsLeft { round: state.round });
    }
    throw(state, ctx);
    Ok(())
}

/// Flip the hold flag of the die at `position`.
pub fn toggle_hold(state: &mut GameState, position: usize) -> Result<(), ApplyError> {
    if position >= NUM_DICE {
        return Err(ApplyError::InvalidPosition { position });
    }
    ensure_round_open(state)?;
    state.dice[position].toggle_held();
    Ok(())
}

/// Commit the current dice to `method` and record the round's score.
///
/// Releases every held die. Returns the recorded score.
pub fn mark(state: &mut GameState, method: ScoringMethod) -> Result<u32, ApplyError> {
    ensure_round_open(state)?;
    if state.throws_left == THROWS_PER_ROUND {
        return Err(ApplyError::NotRolled { round: state.round });
    }
    if state.is_used(method) {
        return Err(ApplyError::MethodAlreadyUsed { method });
    }

    let points = score(state.dice_values(), method);
    state.scores.push(ScoreEntry {
        round: state.round,
        score: points,
        method,
    });
    state.used_mask |= method.bit();
    for d in &mut state.dice {
        d.release();
    }
    Ok(points)
}

/// Advance to the next round. The caller performs its first roll.
pub fn next_round(state: &mut GameState) -> Result<(), ApplyError> {
    if state.is_finished() {
        return Err(ApplyError::GameOver);
    }
    if !state.round_scored() {
        return Err(ApplyError::RoundNotScored { round: state.round });
    }
    state.round += 1;
    state.throws_left = THROWS_PER_ROUND;
    Ok(())
}

/// `next_round` followed by the mandatory first roll.
pub fn start_next_round(state: &mut GameState, ctx: &mut TurnContext) -> Result<(), ApplyError> {
    next_round(state)?;
    roll(state, ctx)
}

/// Rebuild a game from a snapshot, checking every state invariant.
pub fn restore(snapshot: &GameSnapshot) -> Result<GameState, ApplyError> {
    let s = snapshot;
    if !(1..=NUM_ROUNDS).contains(&s.round) {
        return Err(ApplyError::InvalidState {
            msg: "round must be in 1..=10",
        });
    }
    if s.throws_left > THROWS_PER_ROUND {
        return Err(ApplyError::InvalidState {
            msg: "throws_left must be in 0..=3",
        });
    }
    let scored = s.scores.len();
    let round = s.round as usize;
    if scored != round && scored + 1 != round {
        return Err(ApplyError::InvalidState {
            msg: "score entries must cover every completed round",
        });
    }

    let mut used_mask = 0u16;
    for (i, entry) in s.scores.iter().enumerate() {
        if entry.round as usize != i + 1 {
            return Err(ApplyError::InvalidState {
                msg: "score entries must be in round order",
            });
        }
        if used_mask & entry.method.bit() != 0 {
            return Err(ApplyError::MethodAlreadyUsed {
                method: entry.method,
            });
        }
        used_mask |= entry.method.bit();
    }

    let listed = s
        .used_methods
        .iter()
        .fold(0u16, |mask, m| mask | m.bit());
    if listed != used_mask || s.used_methods.len() != scored {
        return Err(ApplyError::InvalidState {
            msg: "used methods must match the score entries",
        });
    }

    // `mark` releases every hold.
    if scored == round && s.held.iter().any(|&h| h) {
        return Err(ApplyError::InvalidState {
            msg: "dice of a scored round cannot be held",
        });
    }

    let mut dice = [Die::BLANK; NUM_DICE];
    for (d, (&value, &held)) in dice.iter_mut().zip(s.dice.iter().zip(s.held.iter())) {
        *d = Die::with_value(value)?;
        d.set_held(held);
    }

    Ok(GameState {
        round: s.round,
        throws_left: s.throws_left,
        dice,
        scores: s.scores.clone(),
        used_mask,
    })
}

fn ensure_round_open(state: &GameState) -> Result<(), ApplyError> {
    if state.is_finished() {
        return Err(ApplyError::GameOver);
    }
    if state.round_scored() {
        return Err(ApplyError::RoundAlreadyScored { round: state.round });
    }
    Ok(())
}

fn throw(state: &mut GameState, ctx: &mut TurnContext) {
    ctx.roll_unheld(&mut state.dice, state.round, state.throws_left);
    state.throws_left -= 1;
}
