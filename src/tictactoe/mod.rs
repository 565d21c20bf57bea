//! Implementation of [Tic-Tac-Toe] on a 3×3 board: the reference game the
//! engine is developed and tested against.
//!
//! [Tic-Tac-Toe]: https://en.wikipedia.org/wiki/Tic-tac-toe

pub mod bitboard;
pub mod core;
pub mod position;

pub use self::core::{Player, Square, BOARD_SIZE, BOARD_WIDTH};
pub use self::position::Position;
