//! Provides the Tic-Tac-Toe [`Position`]: marks of both players, the player
//! who moved last and the history of moves needed to take them back.

use std::fmt;

use anyhow::{bail, Context};
use arrayvec::ArrayVec;
use rand::Rng;

use crate::game::{Game, GameResult};
use crate::tictactoe::bitboard::{Bitboard, LINES};
use crate::tictactoe::core::{Player, Square, BOARD_SIZE, BOARD_WIDTH};

/// Each move occupies a square, so the history never exceeds the board size.
type History = ArrayVec<Square, { BOARD_SIZE as usize }>;

/// State of the game. X always makes the first move: in the empty position O
/// is the player who "just moved".
///
/// [`Position::try_from()`] parses a board written row by row, one character
/// per square: `X`, `O` and `-` (or `.`) for empty squares. Whitespace and `/`
/// separators are ignored, so both `"X-O/-X-/--O"` and `"X-O-X---O"` describe
/// the same board. Parsed positions have no history: the marks on the board
/// can not be taken back.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Position {
    x: Bitboard,
    o: Bitboard,
    last_mover: Player,
    history: History,
}

impl Position {
    /// Creates the empty board with X to move.
    ///
    /// ```
    /// use uctoe::tictactoe::{Player, Position};
    ///
    /// let position = Position::empty();
    /// assert_eq!(position.side_to_move(), Player::X);
    /// assert_eq!(position.board_string(), "---/---/---");
    /// ```
    #[must_use]
    pub fn empty() -> Self {
        Self {
            x: Bitboard::empty(),
            o: Bitboard::empty(),
            last_mover: Player::O,
            history: History::new(),
        }
    }

    /// Plays the given moves from the empty board, checking that each of them
    /// is legal.
    pub fn from_moves(moves: &[Square]) -> anyhow::Result<Self> {
        let mut position = Self::empty();
        for &next_move in moves {
            position
                .try_move(next_move)
                .with_context(|| format!("playing {moves:?}"))?;
        }
        Ok(position)
    }

    /// Parses the board representation described in [`Position`] docs.
    pub fn from_board(input: &str) -> anyhow::Result<Self> {
        let cells: Vec<char> = input
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '/')
            .collect();
        if cells.len() != usize::from(BOARD_SIZE) {
            bail!(
                "board should have {BOARD_SIZE} squares, got {}: '{input}'",
                cells.len()
            );
        }
        let mut x = Bitboard::empty();
        let mut o = Bitboard::empty();
        for (square, &cell) in Square::iter().zip(cells.iter()) {
            match cell {
                '-' | '.' => {},
                _ => match Player::try_from(cell)? {
                    Player::X => x |= Bitboard::from(square),
                    Player::O => o |= Bitboard::from(square),
                },
            }
        }
        let last_mover = match (x.count(), o.count()) {
            (x_count, o_count) if x_count == o_count => Player::O,
            (x_count, o_count) if x_count == o_count + 1 => Player::X,
            (x_count, o_count) => {
                bail!("X moves first: expected as many X as O or one more, got {x_count} X and {o_count} O")
            },
        };
        let position = Self {
            x,
            o,
            last_mover,
            history: History::new(),
        };
        match (position.has_line(Player::X), position.has_line(Player::O)) {
            (true, true) => bail!("both players can not have a complete line"),
            (true, false) | (false, true) if !position.has_line(last_mover) => {
                bail!("only the player who moved last can have a complete line")
            },
            _ => {},
        }
        Ok(position)
    }

    /// Squares occupied by the player.
    #[must_use]
    pub const fn pieces(&self, player: Player) -> Bitboard {
        match player {
            Player::X => self.x,
            Player::O => self.o,
        }
    }

    /// Squares occupied by either player.
    #[must_use]
    pub fn occupied(&self) -> Bitboard {
        self.x | self.o
    }

    /// The player occupying the square, if any.
    #[must_use]
    pub const fn at(&self, square: Square) -> Option<Player> {
        if self.x.is_set(square) {
            Some(Player::X)
        } else if self.o.is_set(square) {
            Some(Player::O)
        } else {
            None
        }
    }

    /// The player who makes the next move.
    #[must_use]
    pub const fn side_to_move(&self) -> Player {
        self.last_mover.opponent()
    }

    /// Moves made since the position was created, oldest first.
    #[must_use]
    pub fn history(&self) -> &[Square] {
        &self.history
    }

    fn has_line(&self, player: Player) -> bool {
        let pieces = self.pieces(player);
        LINES.iter().any(|&line| pieces.contains(line))
    }

    /// The player who completed a line, if any. Only the player who moved
    /// last can have one.
    #[must_use]
    pub fn winner(&self) -> Option<Player> {
        if self.has_line(self.last_mover) {
            Some(self.last_mover)
        } else {
            None
        }
    }

    /// Whether the game is over: a line is complete or the board is full.
    #[must_use]
    pub fn is_over(&self) -> bool {
        self.winner().is_some() || self.occupied() == Bitboard::full()
    }

    /// Squares available to the side to move.
    #[must_use]
    fn empty_squares(&self) -> Bitboard {
        if self.winner().is_some() {
            return Bitboard::empty();
        }
        !self.occupied()
    }

    /// Places the mark of the side to move on the given square.
    pub fn make_move(&mut self, square: Square) {
        debug_assert!(
            self.empty_squares().is_set(square),
            "illegal move {square} in\n{self}"
        );
        self.last_mover = self.side_to_move();
        match self.last_mover {
            Player::X => self.x |= Bitboard::from(square),
            Player::O => self.o |= Bitboard::from(square),
        }
        self.history.push(square);
    }

    /// Applies the move if it is legal in this position.
    pub fn try_move(&mut self, square: Square) -> anyhow::Result<()> {
        if self.is_over() {
            bail!("the game is over, can not play {square}");
        }
        if let Some(player) = self.at(square) {
            bail!("square {square} is already taken by {player}");
        }
        self.make_move(square);
        Ok(())
    }

    /// Takes back the most recent move.
    ///
    /// # Panics
    ///
    /// Panics if there are no moves to take back.
    pub fn unmake_move(&mut self) {
        let Some(square) = self.history.pop() else {
            panic!("history is empty: there is no move to take back");
        };
        match self.last_mover {
            Player::X => self.x ^= Bitboard::from(square),
            Player::O => self.o ^= Bitboard::from(square),
        }
        self.last_mover = self.last_mover.opponent();
    }

    /// Compact board representation accepted by [`Position::from_board`].
    #[must_use]
    pub fn board_string(&self) -> String {
        let mut result = String::with_capacity(usize::from(BOARD_SIZE + BOARD_WIDTH));
        for square in Square::iter() {
            if square.index() > 0 && square.column() == 0 {
                result.push('/');
            }
            result.push(self.at(square).map_or('-', Player::symbol));
        }
        result
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::empty()
    }
}

impl TryFrom<&str> for Position {
    type Error = anyhow::Error;

    fn try_from(input: &str) -> anyhow::Result<Self> {
        Self::from_board(input.trim())
    }
}

impl fmt::Display for Position {
    /// Renders the board as a grid together with the game status.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.winner(), self.is_over()) {
            (Some(winner), _) => writeln!(f, "{winner} wins")?,
            (None, true) => writeln!(f, "Draw")?,
            (None, false) => writeln!(f, "Player to move: {}", self.side_to_move())?,
        }
        writeln!(f)?;
        for row in 0..BOARD_WIDTH {
            for column in 0..BOARD_WIDTH {
                let square = Square::from_coordinates(row, column).ok_or(fmt::Error)?;
                write!(f, "| {} ", self.at(square).map_or('-', Player::symbol))?;
            }
            writeln!(f, "|")?;
        }
        Ok(())
    }
}

impl Game for Position {
    type Move = Square;
    type Player = Player;

    fn apply_move(&mut self, next_move: Square) {
        self.make_move(next_move);
    }

    fn undo_move(&mut self) {
        self.unmake_move();
    }

    fn legal_moves(&self) -> Vec<Square> {
        self.empty_squares().iter().collect()
    }

    fn result(&self, player: Player) -> Option<GameResult> {
        match self.winner() {
            Some(winner) if winner == player => Some(GameResult::Win),
            Some(_) => Some(GameResult::Loss),
            None if self.occupied() == Bitboard::full() => Some(GameResult::Draw),
            None => None,
        }
    }

    fn last_mover(&self) -> Player {
        self.last_mover
    }

    fn opponent(&self, player: Player) -> Player {
        player.opponent()
    }

    fn random_move<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Square> {
        let candidates = self.empty_squares();
        match candidates.count() {
            0 => None,
            count => candidates.nth(rng.gen_range(0..count)),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn square(index: u8) -> Square {
        Square::new(index).unwrap()
    }

    fn setup(board: &str) -> Position {
        let position = Position::try_from(board);
        assert!(position.is_ok(), "input: {board}");
        let position = position.unwrap();
        assert_eq!(
            Position::from_board(&position.board_string()).unwrap(),
            position
        );
        position
    }

    #[test]
    fn parse_boards() {
        assert_eq!(setup("---/---/---"), Position::empty());
        assert_eq!(setup(" ... ... ... ").side_to_move(), Player::X);
        assert_eq!(setup("X--/---/---").side_to_move(), Player::O);
        assert_eq!(setup("XO-/-X-/--O").board_string(), "XO-/-X-/--O");
        assert_eq!(setup("XXX/OO-/---").winner(), Some(Player::X));
    }

    #[test]
    fn reject_boards() {
        // Wrong size.
        assert!(Position::try_from("---/---/--").is_err());
        assert!(Position::try_from("---/---/----").is_err());
        // Unknown symbol.
        assert!(Position::try_from("--Z/---/---").is_err());
        // O moved first.
        assert!(Position::try_from("O--/---/---").is_err());
        // X moved twice in a row.
        assert!(Position::try_from("XX-/---/---").is_err());
        // Both players completed a line.
        assert!(Position::try_from("XXX/OOO/X--").is_err());
        // X has a line but O moved last.
        assert!(Position::try_from("XXX/OO-/--O").is_err());
    }

    #[test]
    fn moves_and_history() {
        let mut position = Position::empty();
        position.make_move(square(4));
        assert_eq!(position.at(square(4)), Some(Player::X));
        assert_eq!(position.last_mover(), Player::X);
        position.make_move(square(0));
        assert_eq!(position.at(square(0)), Some(Player::O));
        assert_eq!(position.history(), &[square(4), square(0)]);
        assert_eq!(position.legal_moves().len(), 7);

        position.unmake_move();
        position.unmake_move();
        assert_eq!(position, Position::empty());
    }

    #[test]
    #[should_panic(expected = "history is empty")]
    fn undo_without_history() {
        Position::empty().undo_move();
    }

    #[test]
    fn illegal_moves() {
        let mut position = Position::from_moves(&[square(0)]).unwrap();
        assert!(position.try_move(square(0)).is_err());
        // X completes the first column, the game is over.
        let moves = [0, 1, 3, 4, 6, 7].map(square);
        assert!(Position::from_moves(&moves).is_err());
        assert!(Position::from_moves(&moves[..5]).unwrap().is_over());
    }

    #[test]
    fn results() {
        let win = setup("XXX/OO-/---");
        assert_eq!(win.result(Player::X), Some(GameResult::Win));
        assert_eq!(win.result(Player::O), Some(GameResult::Loss));
        assert!(win.legal_moves().is_empty());

        let draw = setup("XOX/XOO/OXX");
        assert_eq!(draw.winner(), None);
        assert_eq!(draw.result(Player::X), Some(GameResult::Draw));
        assert_eq!(draw.result(Player::O), Some(GameResult::Draw));
        assert!(draw.legal_moves().is_empty());

        let ongoing = setup("XO-/---/---");
        assert_eq!(ongoing.result(Player::X), None);
        assert_eq!(ongoing.result(Player::O), None);
    }

    #[test]
    fn every_line_wins() {
        for line in LINES {
            let mut position = Position::empty();
            let mut others = (!line).iter();
            for square in line.iter() {
                assert_eq!(position.winner(), None);
                position.make_move(square);
                if position.winner().is_none() {
                    position.make_move(others.next().unwrap());
                }
            }
            assert_eq!(position.winner(), Some(Player::X), "{position}");
        }
    }

    #[test]
    fn random_moves_are_legal() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut position = Position::empty();
        while let Some(next_move) = position.random_move(&mut rng) {
            assert!(position.legal_moves().contains(&next_move));
            position.make_move(next_move);
        }
        assert!(position.is_over());
        assert!(position.legal_moves().is_empty());
    }

    #[test]
    fn display() {
        let position = setup("XO-/-X-/--O");
        assert_eq!(
            position.to_string(),
            "Player to move: X\n\n| X | O | - |\n| - | X | - |\n| - | - | O |\n"
        );
        assert!(setup("XXX/OO-/---").to_string().starts_with("X wins"));
        assert!(setup("XOX/XOO/OXX").to_string().starts_with("Draw"));
    }
}
