use crate::game::Game;

/// Keeps track of the moves the search applies to the game so that the
/// position can be restored. Instead of copying the position on every step,
/// the search mutates it in place: every [`State::push`] has to be matched
/// with an undo, which [`State::rewind`] does explicitly and [`Drop`] does
/// for whatever is left on every other exit path.
pub(super) struct State<'a, G: Game> {
    game: &'a mut G,
    /// Number of moves applied on top of the original position.
    depth: usize,
    searched_nodes: u64,
}

impl<'a, G: Game> State<'a, G> {
    pub(super) fn new(game: &'a mut G) -> Self {
        Self {
            game,
            depth: 0,
            searched_nodes: 0,
        }
    }

    pub(super) fn push(&mut self, next_move: G::Move) {
        self.game.apply_move(next_move);
        self.depth += 1;
        self.searched_nodes += 1;
    }

    pub(super) fn pop(&mut self) {
        assert!(self.depth > 0, "no moves were applied by the search");
        self.game.undo_move();
        self.depth -= 1;
    }

    /// Takes back all moves applied since the state was created.
    pub(super) fn rewind(&mut self) {
        while self.depth > 0 {
            self.pop();
        }
    }

    #[must_use]
    pub(super) fn game(&self) -> &G {
        &*self.game
    }

    /// Mutable access for nested searches. The position has to be left exactly
    /// as it was found.
    pub(super) fn game_mut(&mut self) -> &mut G {
        &mut *self.game
    }

    #[must_use]
    pub(super) const fn depth(&self) -> usize {
        self.depth
    }

    /// Total number of moves applied, including the ones already taken back.
    #[must_use]
    pub(super) const fn searched_nodes(&self) -> u64 {
        self.searched_nodes
    }
}

impl<G: Game> Drop for State<'_, G> {
    fn drop(&mut self) {
        self.rewind();
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::tictactoe::{Position, Square};

    fn square(index: u8) -> Square {
        Square::new(index).unwrap()
    }

    #[test]
    fn push_and_rewind() {
        let mut position = Position::from_moves(&[square(4)]).unwrap();
        let original = position.clone();
        {
            let mut state = State::new(&mut position);
            state.push(square(0));
            state.push(square(8));
            assert_eq!(state.depth(), 2);
            assert_eq!(state.game().history().len(), 3);
            state.pop();
            assert_eq!(state.depth(), 1);
            state.rewind();
            assert_eq!(state.depth(), 0);
            assert_eq!(state.game(), &original);

            state.push(square(1));
            assert_eq!(state.searched_nodes(), 3);
        }
        // Dropping the state takes back the remaining move.
        assert_eq!(position, original);
    }

    #[test]
    fn restores_on_panic() {
        let mut position = Position::empty();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let mut state = State::new(&mut position);
            state.push(square(0));
            state.push(square(1));
            panic!("search interrupted");
        }));
        assert!(result.is_err());
        assert_eq!(position, Position::empty());
    }

    #[test]
    #[should_panic(expected = "no moves were applied")]
    fn pop_without_moves() {
        let mut position = Position::empty();
        let mut state = State::new(&mut position);
        state.pop();
    }
}
