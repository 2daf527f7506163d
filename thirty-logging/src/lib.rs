//! thirty-logging: NDJSON game events + run manifests.
//!
//! Append-only NDJSON logs for simulation post-mortems. Every event carries a
//! `VersionInfoV1` so readers can tell schemas apart.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use thirty_core::sim::GameRecord;
use thirty_core::{ScoreEntry, RULESET_ID};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Event schema version stamped into every event.
pub const EVENT_SCHEMA_VERSION: u32 = 1;

/// Run manifest schema version.
pub const RUN_MANIFEST_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifestV1 {
    pub run_manifest_version: u32,

    pub run_id: String,
    pub created_ts_ms: u64,
    pub ruleset_id: String,

    // Hashes for reproducibility.
    pub git_hash: Option<String>,
    pub config_hash: Option<String>,

    // Run parameters.
    pub base_seed: u64,
    pub deterministic_chance: bool,
    pub events_path: Option<String>,

    // Counters.
    pub games_requested: u64,
    pub games_completed: u64,

    // Results, filled in when the run finishes.
    pub mean_score: Option<f64>,
    pub min_score: Option<u32>,
    pub max_score: Option<u32>,
    pub finished_ts_ms: Option<u64>,
}

pub fn now_ms() -> u64 {
    let d = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    d.as_millis() as u64
}

pub fn hash_config_bytes(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

pub fn try_git_hash() -> Option<String> {
    use std::process::Command;

    let out = Command::new("git").args(["rev-parse", "HEAD"]).output().ok()?;
    if !out.status.success() {
        return None;
    }
    let s = String::from_utf8(out.stdout).ok()?;
    let t = s.trim();
    if t.is_empty() {
        None
    } else {
        Some(t.to_string())
    }
}

pub fn read_manifest(path: impl AsRef<Path>) -> Result<RunManifestV1, EventLogError> {
    let bytes = std::fs::read(path)?;
    Ok(serde_json::from_slice::<RunManifestV1>(&bytes)?)
}

/// Write the manifest next to a tmp file and rename it into place.
pub fn write_manifest_atomic(
    path: impl AsRef<Path>,
    m: &RunManifestV1,
) -> Result<(), EventLogError> {
    let path = path.as_ref();
    let tmp = path.with_extension("json.tmp");
    let bytes = serde_json::to_vec_pretty(m)?;
    std::fs::write(&tmp, bytes)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// Log schema versioning fields.
#[derive(Debug, Clone, Serialize)]
pub struct VersionInfoV1 {
    pub ruleset_id: &'static str,
    pub event_schema_version: u32,
}

impl VersionInfoV1 {
    pub fn current() -> Self {
        Self {
            ruleset_id: RULESET_ID,
            event_schema_version: EVENT_SCHEMA_VERSION,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RoundScoredEventV1 {
    pub event: &'static str,
    pub ts_ms: u64,
    pub v: VersionInfoV1,

    pub run_id: String,
    pub game_id: u64,
    pub game_seed: u64,

    pub round: u8,
    pub method: String,
    pub score: u32,
    pub running_total: u32,
}

impl RoundScoredEventV1 {
    pub fn new(
        run_id: &str,
        game_id: u64,
        game_seed: u64,
        entry: &ScoreEntry,
        running_total: u32,
    ) -> Self {
        Self {
            event: "round_scored",
            ts_ms: now_ms(),
            v: VersionInfoV1::current(),
            run_id: run_id.to_string(),
            game_id,
            game_seed,
            round: entry.round,
            method: entry.method.label().to_string(),
            score: entry.score,
            running_total,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GameFinishedEventV1 {
    pub event: &'static str,
    pub ts_ms: u64,
    pub v: VersionInfoV1,

    pub run_id: String,
    pub game_id: u64,
    pub game_seed: u64,

    pub total: u32,
    /// Methods in the order they were marked.
    pub methods: Vec<String>,
    pub scores: Vec<u32>,
}

impl GameFinishedEventV1 {
    pub fn new(run_id: &str, game_id: u64, record: &GameRecord) -> Self {
        Self {
            event: "game_finished",
            ts_ms: now_ms(),
            v: VersionInfoV1::current(),
            run_id: run_id.to_string(),
            game_id,
            game_seed: record.game_seed,
            total: record.total,
            methods: record
                .scores
                .iter()
                .map(|e| e.method.label().to_string())
                .collect(),
            scores: record.scores.iter().map(|e| e.score).collect(),
        }
    }
}

#[derive(Debug, Error)]
pub enum EventLogError {
    #[error("event log I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("event log JSON failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Append-only NDJSON writer.
///
/// Contract: each call writes exactly one JSON object followed by a newline.
pub struct NdjsonWriter {
    w: BufWriter<File>,
    lines_since_flush: u64,
    flush_every_lines: u64,
}

impl NdjsonWriter {
    /// Open a file for append. Creates it if it doesn't exist.
    pub fn open_append(path: impl AsRef<Path>) -> Result<Self, EventLogError> {
        Self::open_append_with_flush(path, 0)
    }

    /// `flush_every_lines=0` disables periodic flushing.
    pub fn open_append_with_flush(
        path: impl AsRef<Path>,
        flush_every_lines: u64,
    ) -> Result<Self, EventLogError> {
        let f = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            w: BufWriter::new(f),
            lines_since_flush: 0,
            flush_every_lines,
        })
    }

    pub fn write_event<T: Serialize>(&mut self, event: &T) -> Result<(), EventLogError> {
        let mut buf = serde_json::to_vec(event)?;
        buf.push(b'\n');
        self.w.write_all(&buf)?;
        self.lines_since_flush += 1;
        if self.flush_every_lines > 0 && self.lines_since_flush >= self.flush_every_lines {
            self.flush()?;
        }
        Ok(())
    }

    /// One `round_scored` line per round, then one `game_finished` line.
    pub fn write_game(
        &mut self,
        run_id: &str,
        game_id: u64,
        record: &GameRecord,
    ) -> Result<(), EventLogError> {
        let mut running_total = 0u32;
        for entry in &record.scores {
            running_total += entry.score;
            self.write_event(&RoundScoredEventV1::new(
                run_id,
                game_id,
                record.game_seed,
                entry,
                running_total,
            ))?;
        }
        self.write_event(&GameFinishedEventV1::new(run_id, game_id, record))
    }

    pub fn flush(&mut self) -> Result<(), EventLogError> {
        self.w.flush()?;
        self.lines_since_flush = 0;
        Ok(())
    }
}
