//! Command-line entry point: runs the protocol loop on stdin/stdout or a quick
//! benchmark.

use std::io;
use std::num::NonZeroUsize;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use uctoe::search::Config;
use uctoe::Engine;

/// Monte Carlo Tree Search engine for two-player board games.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Total simulation budget per search, split between the legal moves.
    #[arg(long, default_value_t = Config::DEFAULT_SIMULATIONS)]
    simulations: u32,
    /// Exploration constant of the UCT formula.
    #[arg(long, default_value_t = std::f64::consts::SQRT_2)]
    exploration: f64,
    /// Maximum number of workers for parallel search. One per legal move if
    /// not set.
    #[arg(long)]
    threads: Option<NonZeroUsize>,
    /// Seed for reproducible searches.
    #[arg(long)]
    seed: Option<u64>,
    /// Log filter used when `RUST_LOG` is not set. Logs go to stderr.
    #[arg(long, default_value = "warn")]
    log_level: String,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Runs a fixed set of searches and reports the simulation speed.
    Bench,
}

fn init_tracing(level: &str) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    if matches!(cli.command, Some(Command::Bench)) {
        return uctoe::engine::bench(&mut io::stdout().lock());
    }

    let config = Config {
        simulations: cli.simulations,
        exploration: cli.exploration,
        threads: cli.threads,
        seed: cli.seed,
    };
    info!(?config, "starting engine");

    uctoe::print_engine_info();
    uctoe::print_binary_info();

    let mut engine = Engine::new(config);
    engine.run(&mut io::stdin().lock(), &mut io::stdout().lock())
}
