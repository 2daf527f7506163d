//! Baseline self-play (simulation + summary statistics).
//!
//! Baseline policy, per round:
//! - while throws remain, hold exactly the dice in the scoring groups of the best
//!   available method and re-roll the rest (stop early once every die is held);
//! - mark the available method with the highest immediate score, ties going to
//!   the lowest method index.

use crate::engine::{self, ApplyError, TurnContext};
use crate::method::{ScoringMethod, NUM_METHODS};
use crate::scoring::ScoreBreakdown;
use crate::state::{GameState, ScoreEntry};

/// Best available method for the current dice, with its breakdown.
///
/// Returns `None` once every method is used.
pub fn best_available(state: &GameState) -> Option<(ScoringMethod, ScoreBreakdown)> {
    let mut best: Option<(ScoringMethod, ScoreBreakdown)> = None;
    for method in state.available_methods() {
        let b = state.preview_breakdown(method);
        let better = match &best {
            None => true,
            Some((_, cur)) => b.total > cur.total,
        };
        if better {
            best = Some((method, b));
        }
    }
    best
}

/// Play the current round to its mark with the baseline policy.
pub fn play_round(state: &mut GameState, ctx: &mut TurnContext) -> Result<ScoreEntry, ApplyError> {
    while state.throws_left() > 0 {
        let keep = match best_available(state) {
            Some((_, b)) => b.groups.iter().fold(0u8, |m, g| m | g),
            None => return Err(ApplyError::GameOver),
        };
        let mut all_held = true;
        for pos in 0..state.dice().len() {
            let want = keep & (1u8 << pos) != 0;
            if state.dice()[pos].is_held() != want {
                engine::toggle_hold(state, pos)?;
            }
            all_held &= want;
        }
        if all_held {
            break;
        }
        engine::roll(state, ctx)?;
    }

    let (method, _) = best_available(state).ok_or(ApplyError::GameOver)?;
    engine::mark(state, method)?;
    state
        .scores()
        .last()
        .copied()
        .ok_or(ApplyError::InvalidState {
            msg: "mark did not record a score entry",
        })
}

/// Play a full game from a fresh state.
pub fn play_game(ctx: &mut TurnContext) -> Result<GameState, ApplyError> {
    let mut state = engine::initial_state(ctx);
    loop {
        play_round(&mut state, ctx)?;
        if state.is_finished() {
            return Ok(state);
        }
        engine::start_next_round(&mut state, ctx)?;
    }
}

/// One finished game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRecord {
    pub game_seed: u64,
    pub scores: Vec<ScoreEntry>,
    pub total: u32,
}

pub struct SimulationResult {
    pub games: Vec<GameRecord>,
}

impl SimulationResult {
    pub fn totals(&self) -> Vec<u32> {
        self.games.iter().map(|g| g.total).collect()
    }
}

/// Play `n` games; game `i` is seeded with `seed + i`.
pub fn simulate_games(
    n: u32,
    seed: u64,
    deterministic_chance: bool,
) -> Result<SimulationResult, ApplyError> {
    let mut games = Vec::with_capacity(n as usize);
    for i in 0..n as u64 {
        let game_seed = seed.wrapping_add(i);
        let mut ctx = if deterministic_chance {
            TurnContext::new_deterministic(game_seed)
        } else {
            TurnContext::new_rng(game_seed)
        };
        let state = play_game(&mut ctx)?;
        games.push(GameRecord {
            game_seed,
            total: state.total(),
            scores: state.scores().to_vec(),
        });
    }
    Ok(SimulationResult { games })
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreSummary {
    pub mean: f64,
    pub median: u32,
    pub std_dev: f64,
    pub min: u32,
    pub max: u32,
}

/// Summary statistics of a set of game totals, `None` if empty.
pub fn summarize_scores(scores: &[u32]) -> Option<ScoreSummary> {
    if scores.is_empty() {
        return None;
    }
    let mut min = u32::MAX;
    let mut max = u32::MIN;
    let mut sum = 0f64;
    let mut sum_sq = 0f64;
    for &s in scores {
        min = min.min(s);
        max = max.max(s);
        let sf = s as f64;
        sum += sf;
        sum_sq += sf * sf;
    }

    let n = scores.len() as f64;
    let mean = sum / n;
    let var = (sum_sq / n) - mean * mean;

    let mut sorted = scores.to_vec();
    sorted.sort_unstable();
    let median = sorted[sorted.len() / 2];

    Some(ScoreSummary {
        mean,
        median,
        std_dev: var.max(0.0).sqrt(),
        min,
        max,
    })
}

/// Bucketed counts of `scores`, one `(bucket_start, count)` per bucket from the
/// lowest to the highest occupied bucket, empty buckets included.
pub fn histogram(scores: &[u32], bucket_size: u32) -> Vec<(u32, usize)> {
    let (Some(&lo), Some(&hi)) = (scores.iter().min(), scores.iter().max()) else {
        return Vec::new();
    };
    let bucket_size = bucket_size.max(1);
    let first = lo / bucket_size;
    let mut counts = vec![0usize; (hi / bucket_size - first) as usize + 1];
    for &s in scores {
        counts[(s / bucket_size - first) as usize] += 1;
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(i, c)| ((first + i as u32) * bucket_size, c))
        .collect()
}

/// How often a method was chosen and what it scored on average.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodStats {
    pub method: ScoringMethod,
    pub times_used: u32,
    pub mean_score: f64,
}

pub fn method_stats(result: &SimulationResult) -> Vec<MethodStats> {
    let mut used = [0u32; NUM_METHODS];
    let mut sums = [0u64; NUM_METHODS];
    for entry in result.games.iter().flat_map(|g| g.scores.iter()) {
        let i = entry.method.index() as usize;
        used[i] += 1;
        sums[i] += entry.score as u64;
    }
    ScoringMethod::ALL
        .into_iter()
        .map(|method| {
            let i = method.index() as usize;
            MethodStats {
                method,
                times_used: used[i],
                mean_score: if used[i] == 0 {
                    0.0
                } else {
                    sums[i] as f64 / used[i] as f64
                },
            }
        })
        .collect()
}
