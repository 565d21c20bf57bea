//! Evaluates the root moves concurrently. Each legal move becomes a job with
//! its own copy of the position, the jobs are drained from a bounded queue by
//! a fixed pool of workers and the evaluations are sent back through a result
//! queue. Workers share nothing but the queues.

use std::thread;

use crossbeam_channel::bounded;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use crate::game::Game;
use crate::search::{evaluate_move, Config, Evaluation, Report, SearchError};

/// Everything a worker needs to evaluate one root move.
struct Job<G: Game> {
    /// Position in the order of legal moves, used to restore that order.
    index: usize,
    game: G,
    next_move: G::Move,
    simulations: u32,
    seed: u64,
}

impl<G: Game> Job<G> {
    fn run(mut self, exploration: f64) -> (usize, Evaluation<G::Move>) {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let evaluation = evaluate_move(
            &mut self.game,
            self.next_move,
            self.simulations,
            exploration,
            &mut rng,
        );
        (self.index, evaluation)
    }
}

/// Evaluates every legal move in parallel: one worker per move unless
/// [`Config::threads`] sets a lower limit.
///
/// Each job gets a seed derived from [`Config::seed`] and its position in the
/// move list, so seeded searches are reproducible regardless of scheduling.
///
/// # Errors
///
/// Returns [`SearchError::NoLegalMoves`] if the game is over.
pub fn rank_moves_parallel<G>(game: &G, config: &Config) -> Result<Report<G::Move>, SearchError>
where
    G: Game + Clone + Send,
    G::Move: Send,
{
    let moves = game.legal_moves();
    if moves.is_empty() {
        return Err(SearchError::NoLegalMoves);
    }
    let jobs = moves.len();
    let workers = config
        .threads
        .map_or(jobs, |threads| threads.get().min(jobs));
    let simulations = config.simulations_per_move(jobs);
    let seed = config.seed.unwrap_or_else(rand::random);
    debug!(jobs, workers, simulations, "dispatching root moves");

    let (job_sender, job_receiver) = bounded(jobs);
    for (index, next_move) in moves.into_iter().enumerate() {
        let job = Job {
            index,
            game: game.clone(),
            next_move,
            simulations,
            seed: seed.wrapping_add(index as u64),
        };
        // The queue has room for every job and the receiver is alive.
        if job_sender.send(job).is_err() {
            unreachable!("job queue is closed");
        }
    }
    // Workers stop once the queue is drained.
    drop(job_sender);

    let (result_sender, result_receiver) = bounded(jobs);
    let mut results: Vec<(usize, Evaluation<G::Move>)> = thread::scope(|scope| {
        for _ in 0..workers {
            let job_receiver = job_receiver.clone();
            let result_sender = result_sender.clone();
            // Joined when the scope ends.
            drop(scope.spawn(move || {
                for job in job_receiver {
                    if result_sender.send(job.run(config.exploration)).is_err() {
                        break;
                    }
                }
            }));
        }
        // Only the workers hold senders now: if one of them dies, the loop
        // below stops instead of waiting forever.
        drop(result_sender);
        result_receiver.iter().take(jobs).collect()
    });
    assert_eq!(results.len(), jobs, "every job has to produce exactly one result");

    // Results arrive in completion order.
    results.sort_unstable_by_key(|&(index, _)| index);
    Report::new(results.into_iter().map(|(_, evaluation)| evaluation).collect())
}

/// Finds the best move by searching every legal move in parallel.
///
/// # Errors
///
/// Returns [`SearchError::NoLegalMoves`] if the game is over.
pub fn find_best_move_parallel<G>(game: &G, config: &Config) -> Result<G::Move, SearchError>
where
    G: Game + Clone + Send,
    G::Move: Send,
{
    rank_moves_parallel(game, config).map(|report| report.best().next_move)
}
