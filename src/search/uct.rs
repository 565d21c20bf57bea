//! Implements the [UCT] flavour of Monte Carlo Tree Search: tree policy based
//! on the Upper Confidence Bound (UCB1) and uniformly random playouts.
//!
//! [UCT]: https://www.chessprogramming.org/UCT

use rand::Rng;

use crate::game::Game;
use crate::search::state::State;
use crate::search::tree::{Tree, ROOT};

/// Statistics collected by a single [`uct`] run.
#[derive(Debug, Clone, Copy)]
pub(super) struct Summary<M> {
    /// The most visited move at the root.
    pub(super) best_move: M,
    /// Accumulated result of the most visited root child, from the
    /// perspective of the player who made the child's move.
    pub(super) wins: f64,
    /// Visit count of the most visited root child.
    pub(super) visits: u32,
    /// Visit count of the root: the number of completed simulations.
    pub(super) root_visits: u32,
    pub(super) tree_size: usize,
    pub(super) searched_nodes: u64,
}

/// Runs `iterations` simulations from the given position and reports the
/// statistics of the most visited move. At least one simulation is always
/// run. The position is restored before returning.
///
/// # Panics
///
/// Panics if the game is already decided or reports an undecided position
/// without legal moves.
pub(super) fn uct<G: Game, R: Rng + ?Sized>(
    game: &mut G,
    iterations: u32,
    exploration: f64,
    rng: &mut R,
) -> Summary<G::Move> {
    let (tree, searched_nodes) = search_tree(game, iterations, exploration, rng);

    let Some(best) = tree.most_visited_child(ROOT) else {
        unreachable!("at least one simulation expanded the root");
    };
    let Some(best_move) = tree.node(best).last_move else {
        unreachable!("only the root has no move");
    };
    Summary {
        best_move,
        wins: tree.node(best).wins,
        visits: tree.node(best).visits,
        root_visits: tree.node(ROOT).visits,
        tree_size: tree.len(),
        searched_nodes,
    }
}

/// Grows the search tree by `iterations` simulations (at least one) and
/// returns it together with the number of moves applied.
///
/// Each simulation has four phases:
///
/// 1. Selection: starting from the root, descend through fully expanded nodes
///    picking the child with the best UCT score.
/// 2. Expansion: add a child for one random untried move of the reached node.
/// 3. Rollout: play uniformly random moves until the game is decided.
/// 4. Backpropagation: update every node on the path with the result seen
///    by the player who made the node's move.
fn search_tree<G: Game, R: Rng + ?Sized>(
    game: &mut G,
    iterations: u32,
    exploration: f64,
    rng: &mut R,
) -> (Tree<G>, u64) {
    assert!(
        game.result(game.last_mover()).is_none(),
        "can not search a finished game:\n{game}"
    );

    let mut tree = Tree::new(game);
    let mut state = State::new(game);

    for _ in 0..iterations.max(1) {
        let mut node = ROOT;

        // Selection.
        while tree.node(node).is_fully_expanded() && !tree.node(node).children().is_empty() {
            node = tree.select_child(node, exploration);
            let Some(next_move) = tree.node(node).last_move else {
                unreachable!("only the root has no move");
            };
            state.push(next_move);
        }

        // Expansion.
        let untried = tree.node(node).untried_moves();
        if !untried.is_empty() {
            let next_move = untried[rng.gen_range(0..untried.len())];
            state.push(next_move);
            node = tree.add_child(node, next_move, state.game());
        }

        // Rollout.
        loop {
            let game = state.game();
            if game.result(game.last_mover()).is_some() {
                break;
            }
            let Some(next_move) = game.random_move(rng) else {
                panic!("undecided position has no legal moves:\n{game}");
            };
            state.push(next_move);
        }

        // Backpropagation.
        let mut current = Some(node);
        while let Some(index) = current {
            let player = tree.node(index).player_just_moved;
            let Some(result) = state.game().result(player) else {
                panic!("playout ended in an undecided position:\n{}", state.game());
            };
            tree.update(index, result.value());
            current = tree.node(index).parent();
        }

        state.rewind();
    }

    let searched_nodes = state.searched_nodes();
    (tree, searched_nodes)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::game::GameResult;
    use crate::search::evaluate_move;
    use crate::tictactoe::{Position, Square};

    fn square(index: u8) -> Square {
        Square::new(index).unwrap()
    }

    const C: f64 = std::f64::consts::SQRT_2;

    #[test]
    fn restores_position() {
        let mut position = Position::from_moves(&[square(4), square(0)]).unwrap();
        let original = position.clone();
        let mut rng = StdRng::seed_from_u64(7);
        let summary = uct(&mut position, 200, C, &mut rng);
        assert_eq!(position, original);
        assert_eq!(summary.root_visits, 200);
        assert!(summary.visits >= 1);
        assert!(summary.visits <= summary.root_visits);
        assert!(summary.searched_nodes >= 200);
    }

    #[test]
    fn statistics_are_bounded() {
        let mut rng = StdRng::seed_from_u64(1);
        for iterations in [1, 2, 10, 100, 1000] {
            let summary = uct(&mut Position::empty(), iterations, C, &mut rng);
            assert_eq!(summary.root_visits, iterations);
            let mean = summary.wins / f64::from(summary.visits);
            assert!((0.0..=1.0).contains(&mean), "{summary:?}");
        }
    }

    #[test]
    fn zero_budget_runs_one_simulation() {
        let mut rng = StdRng::seed_from_u64(3);
        let summary = uct(&mut Position::empty(), 0, C, &mut rng);
        assert_eq!(summary.root_visits, 1);
        assert_eq!(summary.visits, 1);
        assert_eq!(summary.tree_size, 2);
    }

    #[test]
    fn reproducible_with_seed() {
        let run = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            let summary = uct(&mut Position::empty(), 300, C, &mut rng);
            (summary.wins.to_bits(), summary.visits, summary.tree_size)
        };
        assert_eq!(run(11), run(11));
    }

    #[test]
    fn finds_forced_reply() {
        // X threatens to complete the first row: O has to block at 2, any
        // other reply loses immediately.
        let mut position = Position::try_from("XX-/O--/---").unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let summary = uct(&mut position, 2000, C, &mut rng);
        assert_eq!(summary.best_move, square(2));
        assert!(summary.wins / f64::from(summary.visits) > 0.0);
    }

    #[test]
    fn tree_grows_with_simulations() {
        let mut rng = StdRng::seed_from_u64(9);
        let summary = uct(&mut Position::empty(), 20, C, &mut rng);
        // Selection can only stop at an existing terminal node after a whole
        // path to it is fully expanded (at least 35 simulations), until then
        // every simulation adds exactly one node.
        assert_eq!(summary.tree_size, 21);
    }

    #[test]
    #[should_panic(expected = "can not search a finished game")]
    fn finished_game() {
        let mut position = Position::try_from("XXX/OO-/---").unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let _ = uct(&mut position, 10, C, &mut rng);
    }

    /// Every node is visited once by the simulation that created it and once
    /// more for every simulation that passed through it to a child. Terminal
    /// nodes are only revisited directly.
    fn check_tree(board: &str, iterations: u32, seed: u64) {
        let mut position = Position::try_from(board).unwrap();
        let original = position.clone();
        let mut rng = StdRng::seed_from_u64(seed);
        let (tree, _) = search_tree(&mut position, iterations, C, &mut rng);
        assert_eq!(position, original);
        assert_eq!(tree.node(ROOT).visits, iterations.max(1));

        for index in 0..tree.len() {
            let node = tree.node(index);
            assert!(node.visits > 0, "node {index} was never visited");
            let mean = node.mean();
            assert!((0.0..=1.0).contains(&mean), "node {index}: {mean}");

            let through_children: u32 = node
                .children()
                .iter()
                .map(|&child| tree.node(child).visits)
                .sum();
            let is_terminal = node.children().is_empty() && node.untried_moves().is_empty();
            if index == ROOT {
                assert_eq!(node.visits, through_children);
            } else if !is_terminal {
                assert_eq!(node.visits - through_children, 1, "node {index}");
            }
            if let Some(parent) = node.parent() {
                assert!(tree.node(parent).children().contains(&index));
            }
        }
    }

    #[test]
    fn visits_match_simulations_through_node() {
        check_tree("---/---/---", 3000, 0);
        check_tree("XX-/O--/---", 500, 1);
        check_tree("XO-/-X-/---", 777, 2);
        check_tree("XOX/XOO/OX-", 50, 3);
    }

    #[test]
    fn simulation_agrees_with_immediate_result() {
        // X wins at once by completing the top row at 2.
        let mut position = Position::try_from("XX-/OO-/---").unwrap();
        let mut rng = StdRng::seed_from_u64(13);
        let summary = uct(&mut position, 3000, C, &mut rng);
        assert_eq!(summary.best_move, square(2));
        // Simulations see the win from X's perspective.
        let simulated = summary.wins / f64::from(summary.visits);
        assert!((simulated - GameResult::Win.value()).abs() < f64::EPSILON);

        // The shortcut scores the same move from O's perspective, without
        // simulations.
        let evaluation = evaluate_move(&mut position, square(2), 3000, C, &mut rng);
        assert_eq!(evaluation.score.visits, 1);
        assert_eq!(evaluation.simulations, 0);
        assert_eq!(evaluation.score.best_reply, None);
        let immediate = evaluation.score.ratio();
        assert!((immediate - GameResult::Loss.value()).abs() < f64::EPSILON);
        assert!((GameResult::Loss.flipped().value() - simulated).abs() < f64::EPSILON);
    }
}
