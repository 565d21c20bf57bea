//! The `bench` command: a fixed, seeded workload that gives a quick estimate
//! of the engine's speed and a deterministic simulation count.

use std::io::Write;
use std::time::Instant;

use crate::search::{self, Config};
use crate::tictactoe::Position;

const BOARDS: [&str; 4] = ["---/---/---", "X--/-O-/---", "XO-/-X-/--O", "X-O/-O-/X--"];

/// Runs search on a small set of positions to provide an estimate of engine's
/// performance. Every position is searched both sequentially and in parallel.
///
/// # Errors
///
/// Returns an error if writing to `output` fails.
pub fn bench(output: &mut impl Write) -> anyhow::Result<()> {
    let config = Config {
        simulations: 20_000,
        seed: Some(0),
        ..Config::default()
    };
    let mut simulations = 0;
    let timer = Instant::now();

    for board in BOARDS {
        let mut position = Position::try_from(board)?;
        let mut rng = config.rng();
        simulations += search::rank_moves(&mut position, &config, &mut rng)?.simulations;
        simulations += search::rank_moves_parallel(&position, &config)?.simulations;
    }

    let elapsed = timer.elapsed();
    writeln!(
        output,
        "{} simulations {} sps",
        simulations,
        (simulations as f64 / elapsed.as_secs_f64()) as u64,
    )?;
    Ok(())
}
