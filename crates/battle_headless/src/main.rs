//! Headless battle runner.
//!
//! Runs lane battles without graphics, for balance runs, CI determinism
//! checks and benchmarking.
//!
//! # Usage
//!
//! ```bash
//! # Run the default skirmish and print a JSON report
//! cargo run -p battle_headless -- run
//!
//! # Run a custom scenario with a custom roster, rendering every 500 ticks
//! cargo run -p battle_headless -- run --scenario my.ron --units roster.ron --render-every 500
//!
//! # Watch a battle at real-time pace
//! cargo run -p battle_headless -- run --realtime --render-every 200
//!
//! # Verify determinism of a seed
//! cargo run -p battle_headless -- verify --seed 12345 --runs 5
//!
//! # Measure tick throughput
//! cargo run -p battle_headless -- benchmark --ticks 1000000
//! ```
//!
//! Reports go to stdout as JSON; logs and renderings go to stderr.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use battle_headless::{
    ascii::{render, AsciiConfig},
    runner::{run_scenario, verify_determinism},
    scenario::{load_registry, Scenario},
};

#[derive(Parser)]
#[command(name = "battle_headless")]
#[command(about = "Headless lane-battle runner for balance runs and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single battle and print a JSON report
    Run {
        /// Scenario file to load (defaults to the embedded skirmish)
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Unit roster file to load (defaults to the embedded roster)
        #[arg(short, long)]
        units: Option<PathBuf>,

        /// Random seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Render the board to stderr every N ticks (0 = never)
        #[arg(long, default_value = "0")]
        render_every: u64,

        /// Pace the simulation against the wall clock instead of running
        /// flat out
        #[arg(long)]
        realtime: bool,
    },

    /// Verify determinism by running the same seed multiple times
    Verify {
        /// Scenario file to test (defaults to the embedded skirmish)
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Unit roster file to load (defaults to the embedded roster)
        #[arg(short, long)]
        units: Option<PathBuf>,

        /// Seed to verify
        #[arg(long, default_value = "12345")]
        seed: u64,

        /// Number of verification runs
        #[arg(short, long, default_value = "5")]
        runs: u32,
    },

    /// Run N ticks for benchmarking
    Benchmark {
        /// Number of ticks to run
        #[arg(short, long, default_value = "1000000")]
        ticks: u64,

        /// Scenario to benchmark (defaults to the embedded skirmish)
        #[arg(short, long)]
        scenario: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the JSON report.
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    match cli.command {
        Some(Commands::Run {
            scenario,
            units,
            seed,
            render_every,
            realtime,
        }) => cmd_run(scenario, units, seed, render_every, realtime),
        Some(Commands::Verify {
            scenario,
            units,
            seed,
            runs,
        }) => cmd_verify(scenario, units, seed, runs),
        Some(Commands::Benchmark { ticks, scenario }) => cmd_benchmark(ticks, scenario),
        None => cmd_run(None, None, 0, 0, false),
    }
}

fn load_inputs(scenario: Option<PathBuf>, units: Option<PathBuf>) -> (Scenario, battle_core::defs::UnitRegistry) {
    let scenario = match scenario {
        Some(path) => match Scenario::load(&path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Failed to load scenario: {e}");
                std::process::exit(1);
            }
        },
        None => Scenario::default_skirmish(),
    };
    let registry = match load_registry(units.as_deref()) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Failed to load unit roster: {e}");
            std::process::exit(1);
        }
    };
    (scenario, registry)
}

/// Run a single battle and print the report.
fn cmd_run(
    scenario: Option<PathBuf>,
    units: Option<PathBuf>,
    seed: u64,
    render_every: u64,
    realtime: bool,
) {
    let (scenario, registry) = load_inputs(scenario, units);

    let report = if realtime {
        run_realtime(&scenario, registry, seed, render_every)
    } else if render_every > 0 {
        run_with_rendering(&scenario, registry, seed, render_every)
    } else {
        match run_scenario(&scenario, registry, seed) {
            Ok(r) => r,
            Err(e) => {
                eprintln!("Run failed: {e}");
                std::process::exit(1);
            }
        }
    };

    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Failed to encode report: {e}");
            std::process::exit(1);
        }
    }
}

/// Run tick by tick, rendering the board to stderr at a fixed cadence.
fn run_with_rendering(
    scenario: &Scenario,
    registry: battle_core::defs::UnitRegistry,
    seed: u64,
    render_every: u64,
) -> battle_headless::RunReport {
    use battle_core::prelude::*;

    let mut battle = match scenario.build(registry, seed) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Run failed: {e}");
            std::process::exit(1);
        }
    };
    let config = AsciiConfig::default();
    while battle.phase() == Phase::Fighting && battle.current_tick() < scenario.max_ticks {
        battle.advance(render_every.min(scenario.max_ticks - battle.current_tick()));
        eprintln!("{}", render(&battle.snapshot(), battle.config(), &config));
    }

    report_for(scenario, &battle, seed)
}

/// Run paced against the wall clock, one simulated tick per
/// [`TICK_DURATION_MS`] of real time, rendering at the usual cadence.
fn run_realtime(
    scenario: &Scenario,
    registry: battle_core::defs::UnitRegistry,
    seed: u64,
    render_every: u64,
) -> battle_headless::RunReport {
    use std::time::{Duration, Instant};

    use battle_core::prelude::*;

    let mut battle = match scenario.build(registry, seed) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Run failed: {e}");
            std::process::exit(1);
        }
    };
    let config = AsciiConfig::default();
    let mut clock = TickClock::new();
    let mut last = Instant::now();
    let mut next_render = render_every;
    while battle.phase() == Phase::Fighting && battle.current_tick() < scenario.max_ticks {
        let now = Instant::now();
        let due = clock.advance(now - last);
        last = now;
        battle.advance(due.min(scenario.max_ticks - battle.current_tick()));
        if render_every > 0 && battle.current_tick() >= next_render {
            eprintln!("{}", render(&battle.snapshot(), battle.config(), &config));
            next_render = battle.current_tick() + render_every;
        }
        std::thread::sleep(Duration::from_millis(TICK_DURATION_MS));
    }

    report_for(scenario, &battle, seed)
}

fn report_for(
    scenario: &Scenario,
    battle: &battle_core::sim::Battle,
    seed: u64,
) -> battle_headless::RunReport {
    use battle_core::prelude::*;

    let result = battle
        .outcome()
        .map_or(battle_headless::RunResult::Draw, Into::into);
    battle_headless::RunReport {
        scenario: scenario.name.clone(),
        seed,
        result,
        ticks: battle.current_tick(),
        player_survivors: battle.living(Team::Player),
        opponent_survivors: battle.living(Team::Opponent),
        state_hash: battle.state_hash(),
    }
}

/// Verify determinism.
fn cmd_verify(scenario: Option<PathBuf>, units: Option<PathBuf>, seed: u64, runs: u32) {
    let (scenario, registry) = load_inputs(scenario, units);

    tracing::info!(scenario = %scenario.name, seed, runs, "verifying determinism");
    match verify_determinism(&scenario, &registry, seed, runs) {
        Ok(true) => {
            eprintln!("PASS: All {runs} runs produced identical results");
        }
        Ok(false) => {
            eprintln!("FAIL: Non-determinism detected!");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Verification failed to run: {e}");
            std::process::exit(1);
        }
    }
}

/// Run benchmark.
fn cmd_benchmark(ticks: u64, scenario: Option<PathBuf>) {
    use std::time::Instant;

    let (scenario, registry) = load_inputs(scenario, None);

    let mut battle = match scenario.build(registry, 0) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Benchmark setup failed: {e}");
            std::process::exit(1);
        }
    };

    eprintln!("Running {ticks} ticks of '{}'...", scenario.name);

    let start = Instant::now();
    let ran = battle.advance(ticks);
    let elapsed = start.elapsed();

    #[allow(clippy::cast_precision_loss)]
    let tps = ran as f64 / elapsed.as_secs_f64();

    eprintln!("\n{}", "=".repeat(50));
    eprintln!("BENCHMARK RESULTS");
    eprintln!("{}", "=".repeat(50));
    eprintln!("Ticks: {ran}");
    eprintln!("Duration: {:.3}s", elapsed.as_secs_f64());
    eprintln!("Ticks/second: {tps:.1}");
    eprintln!("State hash: {:016x}", battle.state_hash());
}
