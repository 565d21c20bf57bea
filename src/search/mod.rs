//! [Search] looks ahead into possible continuations of the game to decide
//! which move to make. Every legal move is evaluated by an independent
//! [Monte Carlo Tree Search] run from the position it leads to,
//! and the engine picks the move that leaves the opponent with the worst
//! prospects.
//!
//! [Search]: https://www.chessprogramming.org/Search
//! [Monte Carlo Tree Search]: https://en.wikipedia.org/wiki/Monte_Carlo_tree_search

use std::num::NonZeroUsize;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::{debug, info, trace};

use crate::game::Game;

mod parallel;
mod state;
mod tree;
mod uct;

pub use parallel::{find_best_move_parallel, rank_moves_parallel};
use state::State;

/// Parameters of the search.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Total number of simulations, split evenly between the legal moves.
    pub simulations: u32,
    /// Exploration constant $c$ of the UCT formula.
    pub exploration: f64,
    /// Upper bound on the number of parallel workers. By default every legal
    /// move gets its own worker.
    pub threads: Option<NonZeroUsize>,
    /// Seed for the random playouts. Searches with the same seed are
    /// reproducible.
    pub seed: Option<u64>,
}

impl Config {
    /// Default simulation budget.
    pub const DEFAULT_SIMULATIONS: u32 = 10_000;

    /// Simulations each move gets when the budget is split between `moves`
    /// moves.
    ///
    /// Very small budgets are not rejected: a move left with no simulations
    /// still gets one, which degrades the quality of the decision.
    #[must_use]
    pub fn simulations_per_move(&self, moves: usize) -> u32 {
        let moves = u32::try_from(moves).unwrap_or(u32::MAX).max(1);
        self.simulations / moves
    }

    /// Random number generator for the search: seeded if [`Config::seed`] is
    /// set.
    #[must_use]
    pub fn rng(&self) -> StdRng {
        self.seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            simulations: Self::DEFAULT_SIMULATIONS,
            exploration: std::f64::consts::SQRT_2,
            threads: None,
            seed: None,
        }
    }
}

/// The search can not make a decision.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SearchError {
    /// The game is already decided: there is no move to recommend.
    #[error("the game is over: there are no legal moves")]
    NoLegalMoves,
}

/// Evaluation of a single root move: statistics of the opponent's best reply
/// after the move is made.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveScore<M> {
    #[allow(missing_docs)]
    pub next_move: M,
    /// Accumulated result from the opponent's perspective.
    pub wins: f64,
    /// Number of simulations the result was accumulated over. A move that
    /// ends the game is scored with a single visit.
    pub visits: u32,
    /// The opponent's most visited reply, `None` if the move ends the game.
    pub best_reply: Option<M>,
}

impl<M> MoveScore<M> {
    /// Expected result for the opponent, in `[0, 1]`.
    #[must_use]
    pub fn ratio(&self) -> f64 {
        self.wins / f64::from(self.visits)
    }
}

/// Per-move evaluation together with the amount of work it took.
#[derive(Debug, Clone, Copy)]
struct Evaluation<M> {
    score: MoveScore<M>,
    simulations: u32,
    searched_nodes: u64,
}

/// Scores of all legal moves and the decision based on them.
#[derive(Debug, Clone)]
pub struct Report<M> {
    scores: Vec<MoveScore<M>>,
    best: usize,
    /// Number of simulations run over all moves.
    pub simulations: u64,
    /// Number of moves applied over all simulations.
    pub searched_nodes: u64,
}

impl<M: Copy + std::fmt::Display> Report<M> {
    /// Collects the evaluations of the legal moves, listed in move generation
    /// order, and picks the move with the lowest score: each score is the
    /// opponent's expected result after their best reply.
    fn new(evaluations: Vec<Evaluation<M>>) -> Result<Self, SearchError> {
        let mut best = None;
        let mut scores = Vec::with_capacity(evaluations.len());
        let (mut simulations, mut searched_nodes) = (0, 0);
        for (index, evaluation) in evaluations.into_iter().enumerate() {
            let score = evaluation.score;
            debug!(
                next_move = %score.next_move,
                score = score.ratio(),
                visits = score.visits,
                "evaluated move"
            );
            if best.map_or(true, |(_, ratio)| score.ratio() < ratio) {
                best = Some((index, score.ratio()));
            }
            simulations += u64::from(evaluation.simulations);
            searched_nodes += evaluation.searched_nodes;
            scores.push(score);
        }
        let Some((best, _)) = best else {
            return Err(SearchError::NoLegalMoves);
        };
        info!(
            best_move = %scores[best].next_move,
            score = scores[best].ratio(),
            simulations,
            "selected move"
        );
        Ok(Self {
            scores,
            best,
            simulations,
            searched_nodes,
        })
    }

    /// Scores of all legal moves in move generation order.
    #[must_use]
    pub fn scores(&self) -> &[MoveScore<M>] {
        &self.scores
    }

    /// The chosen move: the one with the lowest [`MoveScore::ratio`], the
    /// earliest one among equals.
    #[must_use]
    pub fn best(&self) -> &MoveScore<M> {
        &self.scores[self.best]
    }
}

/// Scores a single root move. If the move decides the game, the result is
/// known without any simulations. Otherwise, it is estimated by a UCT search
/// from the position after the move.
fn evaluate_move<G: Game, R: Rng + ?Sized>(
    game: &mut G,
    next_move: G::Move,
    simulations: u32,
    exploration: f64,
    rng: &mut R,
) -> Evaluation<G::Move> {
    let mut state = State::new(game);
    state.push(next_move);

    // The opponent replies next, the score is from their perspective.
    let position = state.game();
    let opponent = position.opponent(position.last_mover());
    if let Some(result) = position.result(opponent) {
        return Evaluation {
            score: MoveScore {
                next_move,
                wins: result.value(),
                visits: 1,
                best_reply: None,
            },
            simulations: 0,
            searched_nodes: state.searched_nodes(),
        };
    }

    let summary = uct::uct(state.game_mut(), simulations, exploration, rng);
    trace!(
        %next_move,
        tree_size = summary.tree_size,
        root_visits = summary.root_visits,
        "searched move"
    );
    Evaluation {
        score: MoveScore {
            next_move,
            wins: summary.wins,
            visits: summary.visits,
            best_reply: Some(summary.best_move),
        },
        simulations: summary.root_visits,
        searched_nodes: state.searched_nodes() + summary.searched_nodes,
    }
}

/// Evaluates every legal move one after another. The position is restored
/// before returning.
///
/// # Errors
///
/// Returns [`SearchError::NoLegalMoves`] if the game is over.
pub fn rank_moves<G: Game, R: Rng + ?Sized>(
    game: &mut G,
    config: &Config,
    rng: &mut R,
) -> Result<Report<G::Move>, SearchError> {
    let moves = game.legal_moves();
    if moves.is_empty() {
        return Err(SearchError::NoLegalMoves);
    }
    let simulations = config.simulations_per_move(moves.len());
    let evaluations = moves
        .into_iter()
        .map(|next_move| evaluate_move(game, next_move, simulations, config.exploration, rng))
        .collect();
    Report::new(evaluations)
}

/// Finds the best move by searching every legal move sequentially.
///
/// # Errors
///
/// Returns [`SearchError::NoLegalMoves`] if the game is over.
pub fn find_best_move<G: Game, R: Rng + ?Sized>(
    game: &mut G,
    config: &Config,
    rng: &mut R,
) -> Result<G::Move, SearchError> {
    rank_moves(game, config, rng).map(|report| report.best().next_move)
}
