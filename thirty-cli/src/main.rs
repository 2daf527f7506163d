//! thirty: CLI binary for the Thirty dice game.
//!
//! Subcommands:
//! - score
//! - sim
//! - snapshot
//! - restore

use std::env;
use std::process;

use thirty_core::sim::{self, SimulationResult};
use thirty_core::subsets::mask_indices;
use thirty_core::{
    engine, score_breakdown, validate_dice, Config, GameSnapshot, ScoringMethod, TurnContext,
    NUM_DICE,
};
use thirty_logging::{
    hash_config_bytes, now_ms, try_git_hash, write_manifest_atomic, NdjsonWriter, RunManifestV1,
    RUN_MANIFEST_VERSION,
};

/// Value following a flag, or exit with a usage error.
fn flag_value<'a>(args: &'a [String], i: usize, flag: &str) -> &'a str {
    if i + 1 >= args.len() {
        eprintln!("Missing value for {flag}");
        process::exit(1);
    }
    &args[i + 1]
}

fn parse_flag<T: std::str::FromStr>(args: &[String], i: usize, flag: &str) -> T {
    let raw = flag_value(args, i, flag);
    raw.parse().unwrap_or_else(|_| {
        eprintln!("Invalid {flag} value: {raw}");
        process::exit(1);
    })
}

fn parse_dice(raw: &str) -> Result<[u8; NUM_DICE], String> {
    let vals: Vec<u8> = raw
        .split(',')
        .map(|t| t.trim().parse::<u8>())
        .collect::<Result<_, _>>()
        .map_err(|_| format!("dice must be comma-separated integers: {raw}"))?;
    let dice: [u8; NUM_DICE] = vals
        .try_into()
        .map_err(|v: Vec<u8>| format!("expected {NUM_DICE} dice, got {}", v.len()))?;
    validate_dice(&dice).map_err(|e| e.to_string())?;
    Ok(dice)
}

/// `[3+3] [6]` style rendering of committed groups.
fn format_groups(dice: &[u8; NUM_DICE], groups: &[u8]) -> String {
    groups
        .iter()
        .map(|&g| {
            let vals: Vec<String> = mask_indices(g).map(|i| dice[i].to_string()).collect();
            format!("[{}]", vals.join("+"))
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn cmd_score(args: &[String]) {
    let mut dice: Option<[u8; NUM_DICE]> = None;
    let mut method: Option<ScoringMethod> = None;

    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                println!(
                    r#"thirty score

USAGE:
    thirty score --dice D1,D2,D3,D4,D5,D6 [--method M]

OPTIONS:
    --dice D     Six die values in 1..=6, comma separated
    --method M   Score one method only (Low, 3..12)
"#
                );
                return;
            }
            "--dice" => {
                dice = Some(parse_dice(flag_value(args, i, "--dice")).unwrap_or_else(|e| {
                    eprintln!("Invalid --dice value: {e}");
                    process::exit(1);
                }));
                i += 2;
            }
            "--method" => {
                let raw = flag_value(args, i, "--method");
                method = Some(raw.parse().unwrap_or_else(|e| {
                    eprintln!("{e}");
                    process::exit(1);
                }));
                i += 2;
            }
            other => {
                eprintln!("Unknown option for `thirty score`: {}", other);
                eprintln!("Run `thirty score --help` for usage.");
                process::exit(1);
            }
        }
    }

    let Some(dice) = dice else {
        eprintln!("Missing --dice");
        process::exit(1);
    };

    if let Some(m) = method {
        println!("{}", score_breakdown(dice, m).total);
        return;
    }

    println!("Dice: {:?}", dice);
    println!("{:>6} {:>5}  groups", "method", "score");
    for m in ScoringMethod::ALL {
        let b = score_breakdown(dice, m);
        println!(
            "{:>6} {:>5}  {}",
            m.label(),
            b.total,
            format_groups(&dice, &b.groups)
        );
    }
}

fn cmd_sim(args: &[String]) {
    let mut config_path: Option<String> = None;
    let mut games: Option<u32> = None;
    let mut seed: Option<u64> = None;
    let mut events: Option<String> = None;
    let mut manifest: Option<String> = None;
    let mut no_hist = false;

    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                println!(
                    r#"thirty sim

USAGE:
    thirty sim [--config cfg.yaml] [--games N] [--seed S] [--events PATH] [--manifest PATH] [--no-hist]

OPTIONS:
    --config PATH    YAML config (default: built-in defaults)
    --games N        Number of games to simulate (overrides sim.games)
    --seed S         Base seed; game i uses S+i (overrides sim.seed)
    --events PATH    Append NDJSON game events (overrides logging.events_path)
    --manifest PATH  Write a run manifest (JSON)
    --no-hist        Skip printing histogram
"#
                );
                return;
            }
            "--config" => {
                config_path = Some(flag_value(args, i, "--config").to_string());
                i += 2;
            }
            "--games" => {
                games = Some(parse_flag(args, i, "--games"));
                i += 2;
            }
            "--seed" => {
                seed = Some(parse_flag(args, i, "--seed"));
                i += 2;
            }
            "--events" => {
                events = Some(flag_value(args, i, "--events").to_string());
                i += 2;
            }
            "--manifest" => {
                manifest = Some(flag_value(args, i, "--manifest").to_string());
                i += 2;
            }
            "--no-hist" => {
                no_hist = true;
                i += 1;
            }
            other => {
                eprintln!("Unknown option for `thirty sim`: {}", other);
                eprintln!("Run `thirty sim --help` for usage.");
                process::exit(1);
            }
        }
    }

    let (mut cfg, config_bytes) = match &config_path {
        Some(p) => {
            let bytes = std::fs::read(p).unwrap_or_else(|e| {
                eprintln!("Failed to read config {p}: {e}");
                process::exit(1);
            });
            // Validated below, once the flag overrides are applied.
            let cfg = Config::parse_yaml(&String::from_utf8_lossy(&bytes)).unwrap_or_else(|e| {
                eprintln!("Failed to load config: {e}");
                process::exit(1);
            });
            (cfg, Some(bytes))
        }
        None => (Config::default(), None),
    };
    if let Some(g) = games {
        cfg.sim.games = g;
    }
    if let Some(s) = seed {
        cfg.sim.seed = s;
    }
    if events.is_some() {
        cfg.logging.events_path = events;
    }
    if let Err(e) = cfg.validate() {
        eprintln!("{e}");
        process::exit(1);
    }

    let run_id = format!("sim-{}-{}", cfg.sim.seed, now_ms());
    let mut m = manifest.as_ref().map(|_| RunManifestV1 {
        run_manifest_version: RUN_MANIFEST_VERSION,
        run_id: run_id.clone(),
        created_ts_ms: now_ms(),
        ruleset_id: thirty_core::RULESET_ID.to_string(),
        git_hash: try_git_hash(),
        config_hash: config_bytes.as_deref().map(hash_config_bytes),
        base_seed: cfg.sim.seed,
        deterministic_chance: cfg.sim.deterministic_chance,
        events_path: cfg.logging.events_path.clone(),
        games_requested: cfg.sim.games as u64,
        games_completed: 0,
        mean_score: None,
        min_score: None,
        max_score: None,
        finished_ts_ms: None,
    });
    if let (Some(path), Some(m)) = (&manifest, &m) {
        if let Err(e) = write_manifest_atomic(path, m) {
            eprintln!("Failed to write manifest {path}: {e}");
            process::exit(1);
        }
    }

    let result = sim::simulate_games(cfg.sim.games, cfg.sim.seed, cfg.sim.deterministic_chance)
        .unwrap_or_else(|e| {
            eprintln!("Simulation failed: {e}");
            process::exit(1);
        });

    if let Some(path) = &cfg.logging.events_path {
        if let Err(e) = write_events(path, cfg.logging.flush_every_lines, &run_id, &result) {
            eprintln!("Failed to write events {path}: {e}");
            process::exit(1);
        }
    }

    let totals = result.totals();
    let Some(s) = sim::summarize_scores(&totals) else {
        eprintln!("No games were played");
        process::exit(1);
    };

    if let (Some(path), Some(m)) = (&manifest, &mut m) {
        m.games_completed = totals.len() as u64;
        m.mean_score = Some(s.mean);
        m.min_score = Some(s.min);
        m.max_score = Some(s.max);
        m.finished_ts_ms = Some(now_ms());
        if let Err(e) = write_manifest_atomic(path, m) {
            eprintln!("Failed to write manifest {path}: {e}");
            process::exit(1);
        }
    }

    println!("Evaluation:");
    println!("  - Games: {}", totals.len());
    println!(
        "  - Score: mean={:.2}, median={}, std={:.2}, min={}, max={}",
        s.mean, s.median, s.std_dev, s.min, s.max
    );
    println!("  - Methods:");
    for st in sim::method_stats(&result) {
        println!(
            "      {:>3}: used {:>6}, mean {:6.2}",
            st.method.label(),
            st.times_used,
            st.mean_score
        );
    }

    if !no_hist {
        print_histogram(&totals);
    }
}

fn write_events(
    path: &str,
    flush_every_lines: u64,
    run_id: &str,
    result: &SimulationResult,
) -> Result<(), thirty_logging::EventLogError> {
    let mut w = NdjsonWriter::open_append_with_flush(path, flush_every_lines)?;
    for (game_id, record) in result.games.iter().enumerate() {
        w.write_game(run_id, game_id as u64, record)?;
    }
    w.flush()
}

fn print_histogram(scores: &[u32]) {
    let bucket_size = 10;
    let buckets = sim::histogram(scores, bucket_size);
    let max_count = buckets.iter().map(|&(_, c)| c).max().unwrap_or(1).max(1);
    let bar_width = 50usize;

    println!("\nScore histogram (N={}, bin={}):", scores.len(), bucket_size);
    println!("{}", "─".repeat(70));
    for (start, count) in buckets {
        let bar = "█".repeat(count * bar_width / max_count);
        println!(
            "{:3}-{:3} │{:<50} {:4} ({:.1}%)",
            start,
            start + bucket_size - 1,
            bar,
            count,
            (count as f64 / scores.len() as f64) * 100.0
        );
    }
    println!("{}", "─".repeat(70));
}

fn cmd_snapshot(args: &[String]) {
    let mut seed: u64 = 0;
    let mut rounds: u8 = 0;

    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                println!(
                    r#"thirty snapshot

USAGE:
    thirty snapshot [--seed S] [--rounds R]

Plays R rounds (0..=10) with the baseline policy on the event-keyed dice
stream and prints the resulting game snapshot as JSON.

OPTIONS:
    --seed S     Game seed (default: 0)
    --rounds R   Rounds to play before the snapshot (default: 0)
"#
                );
                return;
            }
            "--seed" => {
                seed = parse_flag(args, i, "--seed");
                i += 2;
            }
            "--rounds" => {
                rounds = parse_flag(args, i, "--rounds");
                i += 2;
            }
            other => {
                eprintln!("Unknown option for `thirty snapshot`: {}", other);
                eprintln!("Run `thirty snapshot --help` for usage.");
                process::exit(1);
            }
        }
    }
    if rounds > thirty_core::NUM_ROUNDS {
        eprintln!("Invalid --rounds value: {rounds} (max {})", thirty_core::NUM_ROUNDS);
        process::exit(1);
    }

    let mut ctx = TurnContext::new_deterministic(seed);
    let mut state = engine::initial_state(&mut ctx);
    for _ in 0..rounds {
        let step = sim::play_round(&mut state, &mut ctx).and_then(|_| {
            if state.is_finished() {
                Ok(())
            } else {
                engine::start_next_round(&mut state, &mut ctx)
            }
        });
        if let Err(e) = step {
            eprintln!("Failed to play round {}: {e}", state.round());
            process::exit(1);
        }
    }

    match serde_json::to_string_pretty(&state.snapshot()) {
        Ok(s) => println!("{s}"),
        Err(e) => {
            eprintln!("Failed to encode snapshot: {e}");
            process::exit(1);
        }
    }
}

fn cmd_restore(args: &[String]) {
    let path = match args {
        [flag] if flag == "--help" || flag == "-h" => {
            println!(
                r#"thirty restore

USAGE:
    thirty restore PATH

Loads a snapshot JSON file, checks every game invariant and prints a summary.
"#
            );
            return;
        }
        [path] => path,
        _ => {
            eprintln!("Usage: thirty restore PATH");
            process::exit(1);
        }
    };

    let bytes = std::fs::read(path).unwrap_or_else(|e| {
        eprintln!("Failed to read snapshot {path}: {e}");
        process::exit(1);
    });
    let snap: GameSnapshot = serde_json::from_slice(&bytes).unwrap_or_else(|e| {
        eprintln!("Failed to parse snapshot {path}: {e}");
        process::exit(1);
    });
    let state = engine::restore(&snap).unwrap_or_else(|e| {
        eprintln!("Invalid snapshot: {e}");
        process::exit(1);
    });

    println!("Snapshot OK");
    println!("  - Round: {}", state.round());
    println!("  - Throws left: {}", state.throws_left());
    let held: Vec<String> = state
        .dice()
        .iter()
        .map(|d| {
            if d.is_held() {
                format!("({})", d.value())
            } else {
                d.value().to_string()
            }
        })
        .collect();
    println!("  - Dice: {}", held.join(" "));
    for e in state.scores() {
        println!("      round {:>2}: {:>3} -> {}", e.round, e.method.label(), e.score);
    }
    println!("  - Total: {}", state.total());
    if state.is_finished() {
        println!("  - Finished");
    } else if !state.round_scored() {
        println!("  - Available:");
        for m in state.available_methods() {
            println!("      {:>3}: {}", m.label(), state.preview(m));
        }
    }
}

fn print_help() {
    eprintln!(
        r#"thirty - Thirty dice game engine CLI

USAGE:
    thirty <COMMAND> [OPTIONS]

COMMANDS:
    score       Score one hand under one or all methods
    sim         Simulate games with the baseline policy
    snapshot    Play a few rounds and print the game snapshot
    restore     Validate a snapshot file and summarize it

OPTIONS:
    -h, --help          Print this help message
    -V, --version       Print version

Run `thirty <COMMAND> --help` for command options.
"#
    );
}

fn print_version() {
    println!("thirty {}", env!("CARGO_PKG_VERSION"));
}

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_help();
        process::exit(0);
    }

    match args[1].as_str() {
        "-h" | "--help" | "help" => {
            print_help();
        }
        "-V" | "--version" => {
            print_version();
        }
        "score" => {
            cmd_score(&args[2..]);
        }
        "sim" => {
            cmd_sim(&args[2..]);
        }
        "snapshot" => {
            cmd_snapshot(&args[2..]);
        }
        "restore" => {
            cmd_restore(&args[2..]);
        }
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            eprintln!("Run `thirty --help` for usage.");
            process::exit(1);
        }
    }
}
