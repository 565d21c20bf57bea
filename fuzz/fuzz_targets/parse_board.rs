#![no_main]
use libfuzzer_sys::fuzz_target;
use pretty_assertions::assert_eq;
use uctoe::tictactoe::Position;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(position) = Position::try_from(s) {
            // Accepted boards survive printing and parsing again.
            let reparsed = Position::try_from(position.board_string().as_str())
                .expect("printed board should be accepted");
            assert_eq!(reparsed.board_string(), position.board_string());
            assert_eq!(reparsed.side_to_move(), position.side_to_move());
        }
    }
});
