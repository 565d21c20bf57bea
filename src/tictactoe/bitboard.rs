//! [`Bitboard`]-based representation of the marks placed on the board. Each
//! bit corresponds to one of the nine squares: checking whether a player
//! completed a line is a single mask comparison.
//!
//! [Bitboard]: https://www.chessprogramming.org/Bitboards

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign, BitXor, BitXorAssign, Not};

use crate::tictactoe::core::{Square, BOARD_SIZE, BOARD_WIDTH};

/// Set of squares. The least significant bit corresponds to the top-left
/// square (index 0).
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct Bitboard {
    bits: u16,
}

impl Bitboard {
    /// Constructs Bitboard from pre-calculated bits.
    #[must_use]
    pub const fn from_bits(bits: u16) -> Self {
        Self {
            bits: bits & Self::full().bits,
        }
    }

    /// Constructs a bitboard representing empty set of squares.
    #[must_use]
    pub const fn empty() -> Self {
        Self { bits: 0 }
    }

    /// All nine squares of the board.
    #[must_use]
    pub const fn full() -> Self {
        Self {
            bits: (1 << BOARD_SIZE) - 1,
        }
    }

    /// Returns raw bits.
    #[must_use]
    pub const fn bits(self) -> u16 {
        self.bits
    }

    /// Whether the square is in the set.
    #[must_use]
    pub const fn is_set(self, square: Square) -> bool {
        self.bits & (1 << square.index()) != 0
    }

    /// Whether no square is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.bits == 0
    }

    /// Number of set squares.
    #[must_use]
    pub const fn count(self) -> u32 {
        self.bits.count_ones()
    }

    /// Whether every square of `other` is also in `self`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.bits & other.bits == other.bits
    }

    /// Returns the `n`-th set square in index order.
    #[must_use]
    pub fn nth(self, n: u32) -> Option<Square> {
        self.iter().nth(n as usize)
    }

    /// Iterates over the set squares in index order.
    pub fn iter(self) -> impl Iterator<Item = Square> {
        let mut bits = self.bits;
        std::iter::from_fn(move || {
            if bits == 0 {
                return None;
            }
            // Bits above BOARD_SIZE are never set, the index always fits.
            let index = bits.trailing_zeros() as u8;
            bits &= bits - 1;
            Square::new(index)
        })
    }
}

impl From<Square> for Bitboard {
    fn from(square: Square) -> Self {
        Self::from_bits(1 << square.index())
    }
}

impl FromIterator<Square> for Bitboard {
    fn from_iter<I: IntoIterator<Item = Square>>(squares: I) -> Self {
        squares
            .into_iter()
            .fold(Self::empty(), |acc, square| acc | Self::from(square))
    }
}

impl BitOr for Bitboard {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self::from_bits(self.bits | rhs.bits)
    }
}

impl BitOrAssign for Bitboard {
    fn bitor_assign(&mut self, rhs: Self) {
        self.bits |= rhs.bits;
    }
}

impl BitAnd for Bitboard {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self::from_bits(self.bits & rhs.bits)
    }
}

impl BitXor for Bitboard {
    type Output = Self;

    fn bitxor(self, rhs: Self) -> Self::Output {
        Self::from_bits(self.bits ^ rhs.bits)
    }
}

impl BitXorAssign for Bitboard {
    fn bitxor_assign(&mut self, rhs: Self) {
        self.bits ^= rhs.bits;
    }
}

impl Not for Bitboard {
    type Output = Self;

    fn not(self) -> Self::Output {
        Self::from_bits(!self.bits)
    }
}

impl fmt::Debug for Bitboard {
    /// Prints the set as a grid, `1` for set squares and `.` otherwise.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..BOARD_WIDTH {
            for column in 0..BOARD_WIDTH {
                let square = Square::from_coordinates(row, column).ok_or(fmt::Error)?;
                write!(f, "{}", if self.is_set(square) { '1' } else { '.' })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Rows, columns and the two diagonals: completing any of them wins the game.
pub const LINES: [Bitboard; 8] = [
    // Rows.
    Bitboard::from_bits(0b000_000_111),
    Bitboard::from_bits(0b000_111_000),
    Bitboard::from_bits(0b111_000_000),
    // Columns.
    Bitboard::from_bits(0b001_001_001),
    Bitboard::from_bits(0b010_010_010),
    Bitboard::from_bits(0b100_100_100),
    // Diagonals.
    Bitboard::from_bits(0b100_010_001),
    Bitboard::from_bits(0b001_010_100),
];
