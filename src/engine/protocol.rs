//! Commands of the line-oriented text protocol understood by the
//! [`crate::engine::Engine`].

#[derive(Debug, PartialEq, Eq)]
pub(super) enum Command {
    /// Identify the engine.
    Id,
    IsReady,
    NewGame,
    SetPosition {
        /// Board in [`crate::tictactoe::Position::from_board`] format, `None`
        /// for the empty board.
        board: Option<String>,
        moves: Vec<String>,
    },
    Play(String),
    Undo,
    Moves,
    Display,
    Go {
        simulations: Option<u32>,
        parallel: bool,
        seed: Option<u64>,
    },
    Quit,
    Unknown(String),
}

fn parse_go(parts: &[&str]) -> Command {
    let mut simulations = None;
    let mut parallel = false;
    let mut seed = None;

    let mut i = 1;

    while i < parts.len() {
        match parts[i] {
            "simulations" if i + 1 < parts.len() => simulations = parts[i + 1].parse().ok(),
            "seed" if i + 1 < parts.len() => seed = parts[i + 1].parse().ok(),
            "parallel" => parallel = true,
            "sequential" => parallel = false,
            _ => {},
        }
        if matches!(parts[i], "parallel" | "sequential") {
            i += 1;
        } else {
            i += 2;
        }
    }

    Command::Go {
        simulations,
        parallel,
        seed,
    }
}

fn parse_setposition(parts: &[&str]) -> Command {
    let moves_index = parts.iter().position(|&x| x == "moves");
    let setup = &parts[1..moves_index.unwrap_or(parts.len())];
    let board = match setup {
        ["startpos"] => None,
        ["board", cells @ ..] if !cells.is_empty() => Some(cells.join(" ")),
        _ => return Command::Unknown(parts.join(" ")),
    };
    let moves = moves_index.map_or_else(Vec::new, |index| {
        parts[index + 1..].iter().map(|s| (*s).to_string()).collect()
    });
    Command::SetPosition { board, moves }
}

impl Command {
    pub(super) fn parse(input: &str) -> Self {
        let parts: Vec<&str> = input.split_whitespace().collect();

        if parts.is_empty() {
            return Self::Unknown(input.to_string());
        }

        match parts[0] {
            "id" => Self::Id,
            "isready" => Self::IsReady,
            "new" => Self::NewGame,
            "position" => parse_setposition(&parts),
            "play" if parts.len() == 2 => Self::Play(parts[1].to_string()),
            "undo" => Self::Undo,
            "moves" => Self::Moves,
            "d" => Self::Display,
            "go" => parse_go(&parts),
            "quit" => Self::Quit,
            _ => Self::Unknown(input.trim().to_string()),
        }
    }
}
