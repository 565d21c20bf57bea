//! Interface between the search and the rules of a concrete game. The search
//! never inspects the position directly: everything it knows about the game
//! comes through [`Game`].

use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;

/// Outcome of a finished game from the perspective of a specific player.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    Loss,
    Draw,
    Win,
}

impl GameResult {
    /// Canonical scalar accumulated by the search statistics: 0 for a loss,
    /// 0.5 for a draw and 1 for a win.
    #[must_use]
    pub const fn value(self) -> f64 {
        match self {
            Self::Loss => 0.0,
            Self::Draw => 0.5,
            Self::Win => 1.0,
        }
    }

    /// The same outcome seen by the other player.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Loss => Self::Win,
            Self::Draw => Self::Draw,
            Self::Win => Self::Loss,
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Loss => "loss",
            Self::Draw => "draw",
            Self::Win => "win",
        })
    }
}

/// Two-player, zero-sum, perfect-information game position that can be
/// searched.
///
/// The position is mutated in place: [`Game::apply_move`] records the move in
/// the history and [`Game::undo_move`] takes it back. The search relies on
/// applying `N` moves and undoing `N` moves restoring the exact original
/// position.
///
/// [`fmt::Display`] is only used for diagnostics.
pub trait Game: fmt::Display {
    /// Identifier of a move in the position's move space.
    type Move: Copy + Eq + fmt::Debug + fmt::Display;
    /// Participant of the game.
    type Player: Copy + Eq + fmt::Debug;

    /// Makes a move and passes the turn to the opponent. The move has to be
    /// legal in the current position.
    fn apply_move(&mut self, next_move: Self::Move);

    /// Takes back the most recent move.
    ///
    /// # Panics
    ///
    /// Panics if no move has been applied.
    fn undo_move(&mut self);

    /// Returns all legal moves. The list is empty if the game is over.
    #[must_use]
    fn legal_moves(&self) -> Vec<Self::Move>;

    /// Evaluates the position from `player`'s perspective. Returns `None` if
    /// the game is not decided yet.
    #[must_use]
    fn result(&self, player: Self::Player) -> Option<GameResult>;

    /// The player who made the most recent move.
    #[must_use]
    fn last_mover(&self) -> Self::Player;

    /// The other participant of the game.
    #[must_use]
    fn opponent(&self, player: Self::Player) -> Self::Player;

    /// Picks a uniformly random legal move, `None` if there are no legal moves.
    ///
    /// Random playouts call this on every ply: implementations that can
    /// sample a move without materializing the whole move list should
    /// override it.
    fn random_move<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Self::Move> {
        self.legal_moves().choose(rng).copied()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn canonical_values() {
        assert!(GameResult::Loss.value() < GameResult::Draw.value());
        assert!(GameResult::Draw.value() < GameResult::Win.value());
        assert!((GameResult::Draw.value() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn flipping() {
        assert_eq!(GameResult::Win.flipped(), GameResult::Loss);
        assert_eq!(GameResult::Loss.flipped(), GameResult::Win);
        assert_eq!(GameResult::Draw.flipped(), GameResult::Draw);
        for result in [GameResult::Loss, GameResult::Draw, GameResult::Win] {
            let total = result.value() + result.flipped().value();
            assert!((total - 1.0).abs() < f64::EPSILON, "{result}");
        }
    }
}
