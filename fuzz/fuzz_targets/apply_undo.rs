#![no_main]
use libfuzzer_sys::fuzz_target;
use pretty_assertions::assert_eq;
use uctoe::game::Game;
use uctoe::tictactoe::Position;

// Every byte picks one of the legal moves; taking all of them back has to
// restore the empty board exactly.
fuzz_target!(|data: &[u8]| {
    let mut position = Position::empty();
    let mut snapshots = vec![position.clone()];
    for &byte in data {
        let moves = position.legal_moves();
        if moves.is_empty() {
            assert!(position.result(position.last_mover()).is_some());
            break;
        }
        position.apply_move(moves[usize::from(byte) % moves.len()]);
        snapshots.push(position.clone());
    }
    while snapshots.len() > 1 {
        let _ = snapshots.pop();
        position.undo_move();
        assert_eq!(Some(&position), snapshots.last());
    }
    assert_eq!(position, Position::empty());
});
