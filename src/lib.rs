//! Decision engine for two-player, zero-sum, perfect-information board games
//! based on [Monte Carlo Tree Search] with the UCT selection policy.
//!
//! Any game implementing [`game::Game`] can be searched. [`tictactoe`] provides
//! a reference implementation and [`Engine`] drives it through a small text
//! protocol.
//!
//! [Monte Carlo Tree Search]: https://en.wikipedia.org/wiki/Monte_Carlo_tree_search

// Rustdoc lints.
#![warn(
    rustdoc::missing_crate_level_docs,
    rustdoc::invalid_codeblock_attributes,
    rustdoc::invalid_html_tags,
    rustdoc::bare_urls
)]

pub mod engine;
pub mod game;
pub mod search;
pub mod tictactoe;

pub use engine::Engine;
use shadow_rs::shadow;

shadow!(build);

/// Target features the bitboards benefit from. Produced by `build.rs`.
const FEATURES: &str = include_str!(concat!(env!("OUT_DIR"), "/features"));

/// Returns the full engine version that can be used to identify how it was
/// built in the first place.
fn engine_version() -> String {
    format!(
        "{} (commit {}, branch {})",
        build::PKG_VERSION,
        build::SHORT_COMMIT,
        build::BRANCH
    )
}

/// Prints the engine name and version on startup.
pub fn print_engine_info() {
    println!("{} {}", env!("CARGO_PKG_NAME"), engine_version());
    println!("{}", env!("CARGO_PKG_DESCRIPTION"));
}

/// Prints information the build type, features and whether the build is clean
/// on engine startup.
pub fn print_binary_info() {
    println!("Release build: {}", !shadow_rs::is_debug());
    println!("Features: {FEATURES}");
    if !shadow_rs::git_clean() {
        println!("Warning: built with uncommitted changes");
    }
    println!();
}
