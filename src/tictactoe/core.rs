//! Tic-Tac-Toe primitives commonly used within [`crate::tictactoe`].

use std::fmt;
use std::ops::Not;

use anyhow::{bail, Context};

#[allow(missing_docs)]
pub const BOARD_WIDTH: u8 = 3;
#[allow(missing_docs)]
pub const BOARD_SIZE: u8 = BOARD_WIDTH * BOARD_WIDTH;

/// Tic-Tac-Toe is played between two players: X (having the advantage of the
/// first turn) and O.
#[allow(missing_docs)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Player {
    X,
    O,
}

impl Player {
    /// Returns the other player.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::X => Self::O,
            Self::O => Self::X,
        }
    }

    /// Symbol used for the player's marks on the board.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::X => 'X',
            Self::O => 'O',
        }
    }
}

impl Not for Player {
    type Output = Self;

    fn not(self) -> Self::Output {
        self.opponent()
    }
}

impl TryFrom<char> for Player {
    type Error = anyhow::Error;

    fn try_from(symbol: char) -> anyhow::Result<Self> {
        match symbol {
            'X' | 'x' => Ok(Self::X),
            'O' | 'o' => Ok(Self::O),
            _ => bail!("player should be 'X' or 'O', got '{symbol}'"),
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// One of the nine cells of the board, numbered row by row:
///
/// ```text
/// 0 | 1 | 2
/// 3 | 4 | 5
/// 6 | 7 | 8
/// ```
///
/// A move is fully described by the square the mark is placed on, so
/// [`Square`] doubles as the move type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Square(u8);

impl Square {
    /// Creates a square from its index, `None` if the index is off the board.
    #[must_use]
    pub const fn new(index: u8) -> Option<Self> {
        if index < BOARD_SIZE {
            Some(Self(index))
        } else {
            None
        }
    }

    /// Creates a square from row and column (both zero-based).
    #[must_use]
    pub const fn from_coordinates(row: u8, column: u8) -> Option<Self> {
        if row < BOARD_WIDTH && column < BOARD_WIDTH {
            Some(Self(row * BOARD_WIDTH + column))
        } else {
            None
        }
    }

    /// Index of the square in `0..BOARD_SIZE`.
    #[must_use]
    pub const fn index(self) -> u8 {
        self.0
    }

    /// Row of the square, counting from the top.
    #[must_use]
    pub const fn row(self) -> u8 {
        self.0 / BOARD_WIDTH
    }

    /// Column of the square, counting from the left.
    #[must_use]
    pub const fn column(self) -> u8 {
        self.0 % BOARD_WIDTH
    }

    /// Iterates over all squares in index order.
    pub fn iter() -> impl Iterator<Item = Self> {
        (0..BOARD_SIZE).map(Self)
    }
}

impl TryFrom<&str> for Square {
    type Error = anyhow::Error;

    fn try_from(input: &str) -> anyhow::Result<Self> {
        let index: u8 = input
            .trim()
            .parse()
            .with_context(|| format!("square should be a number, got '{input}'"))?;
        match Self::new(index) {
            Some(square) => Ok(square),
            None => bail!("square index should be below {BOARD_SIZE}, got {index}"),
        }
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn opponents() {
        assert_eq!(Player::X.opponent(), Player::O);
        assert_eq!(!Player::O, Player::X);
        assert_eq!(!!Player::X, Player::X);
    }

    #[test]
    fn parse_player() {
        assert_eq!(Player::try_from('x').unwrap(), Player::X);
        assert_eq!(Player::try_from('O').unwrap(), Player::O);
        assert!(Player::try_from('-').is_err());
    }

    #[test]
    fn squares() {
        assert_eq!(Square::iter().count(), usize::from(BOARD_SIZE));
        assert_eq!(Square::new(9), None);
        let center = Square::from_coordinates(1, 1).unwrap();
        assert_eq!(center.index(), 4);
        assert_eq!((center.row(), center.column()), (1, 1));
        assert_eq!(Square::from_coordinates(2, 0), Square::new(6));
        assert_eq!(Square::from_coordinates(3, 0), None);
    }

    #[test]
    fn parse_square() {
        assert_eq!(Square::try_from("8").unwrap(), Square::new(8).unwrap());
        assert_eq!(Square::try_from(" 0 ").unwrap().to_string(), "0");
        assert!(Square::try_from("9").is_err());
        assert!(Square::try_from("a1").is_err());
        assert!(Square::try_from("-1").is_err());
    }
}
