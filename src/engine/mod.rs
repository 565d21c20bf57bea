//! The engine keeps the game state between commands and runs the search on
//! request. It speaks a small line-oriented text protocol modelled after
//! [UCI]: commands come from the input stream, responses go to the output
//! stream and diagnostics are prefixed with `info string`.
//!
//! [`Engine::run`] is the "main loop" of the engine.
//!
//! [UCI]: https://www.chessprogramming.org/UCI

use std::io::{BufRead, Write};
use std::time::Instant;

use itertools::Itertools;
use tracing::{debug, warn};

use crate::engine::protocol::Command;
use crate::game::Game;
use crate::search::{self, Config};
use crate::tictactoe::{Position, Square};

mod bench;
mod protocol;

pub use bench::bench;

/// Owns the current position and the search configuration.
pub struct Engine {
    position: Position,
    config: Config,
}

impl Engine {
    /// Creates an engine with an empty board.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            position: Position::empty(),
            config,
        }
    }

    /// Reads commands from `input` and writes the responses to `output` until
    /// `quit` is sent or the input is exhausted.
    ///
    /// Malformed or illegal commands are reported with `info string` and
    /// skipped, the engine state is left as it was.
    ///
    /// # Errors
    ///
    /// Returns an error if reading the input or writing the output fails.
    pub fn run(&mut self, input: &mut impl BufRead, output: &mut impl Write) -> anyhow::Result<()> {
        let mut line = String::new();
        loop {
            line.clear();
            if input.read_line(&mut line)? == 0 {
                break;
            }
            if line.trim().is_empty() {
                continue;
            }
            debug!(command = line.trim(), "received");
            match Command::parse(&line) {
                Command::Id => Self::handle_id(output)?,
                Command::IsReady => writeln!(output, "readyok")?,
                Command::NewGame => self.position = Position::empty(),
                Command::SetPosition { board, moves } => {
                    self.handle_position(board.as_deref(), &moves, output)?;
                },
                Command::Play(square) => self.handle_play(&square, output)?,
                Command::Undo => self.handle_undo(output)?,
                Command::Moves => writeln!(
                    output,
                    "moves {}",
                    self.position.legal_moves().iter().join(" ")
                )?,
                Command::Display => writeln!(output, "{}", self.position)?,
                Command::Go {
                    simulations,
                    parallel,
                    seed,
                } => self.handle_go(simulations, parallel, seed, output)?,
                Command::Quit => break,
                Command::Unknown(command) => {
                    writeln!(output, "info string Unsupported command: {command}")?;
                },
            }
            output.flush()?;
        }
        Ok(())
    }

    fn handle_id(output: &mut impl Write) -> anyhow::Result<()> {
        writeln!(
            output,
            "id name {} {}",
            env!("CARGO_PKG_NAME"),
            crate::engine_version()
        )?;
        writeln!(output, "id author {}", env!("CARGO_PKG_AUTHORS"))?;
        writeln!(output, "idok")?;
        Ok(())
    }

    /// Replaces the position only if the board and all moves are valid.
    fn handle_position(
        &mut self,
        board: Option<&str>,
        moves: &[String],
        output: &mut impl Write,
    ) -> anyhow::Result<()> {
        match Self::setup(board, moves) {
            Ok(position) => self.position = position,
            Err(e) => writeln!(output, "info string Invalid position: {e:#}")?,
        }
        Ok(())
    }

    fn setup(board: Option<&str>, moves: &[String]) -> anyhow::Result<Position> {
        let mut position = match board {
            Some(board) => Position::from_board(board)?,
            None => Position::empty(),
        };
        for next_move in moves {
            position.try_move(Square::try_from(next_move.as_str())?)?;
        }
        Ok(position)
    }

    fn handle_play(&mut self, square: &str, output: &mut impl Write) -> anyhow::Result<()> {
        let played = Square::try_from(square).and_then(|square| self.position.try_move(square));
        if let Err(e) = played {
            writeln!(output, "info string Illegal move: {e:#}")?;
        }
        Ok(())
    }

    fn handle_undo(&mut self, output: &mut impl Write) -> anyhow::Result<()> {
        if self.position.history().is_empty() {
            writeln!(output, "info string There is no move to take back")?;
        } else {
            self.position.unmake_move();
        }
        Ok(())
    }

    fn handle_go(
        &mut self,
        simulations: Option<u32>,
        parallel: bool,
        seed: Option<u64>,
        output: &mut impl Write,
    ) -> anyhow::Result<()> {
        let config = Config {
            simulations: simulations.unwrap_or(self.config.simulations),
            seed: seed.or(self.config.seed),
            ..self.config
        };
        let timer = Instant::now();
        let report = if parallel {
            search::rank_moves_parallel(&self.position, &config)
        } else {
            let mut rng = config.rng();
            search::rank_moves(&mut self.position, &config, &mut rng)
        };
        let report = match report {
            Ok(report) => report,
            Err(e) => {
                warn!(position = %self.position.board_string(), "search failed: {e}");
                writeln!(output, "info string {e}")?;
                return Ok(());
            },
        };
        for score in report.scores() {
            write!(
                output,
                "info move {} score {:.4} visits {}",
                score.next_move,
                score.ratio(),
                score.visits
            )?;
            if let Some(reply) = score.best_reply {
                write!(output, " reply {reply}")?;
            }
            writeln!(output)?;
        }
        writeln!(
            output,
            "info simulations {} nodes {} time {}",
            report.simulations,
            report.searched_nodes,
            timer.elapsed().as_millis()
        )?;
        writeln!(output, "bestmove {}", report.best().next_move)?;
        Ok(())
    }
}
