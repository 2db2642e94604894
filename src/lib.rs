#[cfg(feature = "cli")]
pub mod cli;
pub mod controller;
pub mod error;
pub mod rules;
pub mod sgf;

pub use controller::{
    BoardState, Controller, ControllerOptions, StoneOutcome, board_editor, game_viewer,
    static_problem,
};
pub use error::{Error, Result};
pub use rules::{Conditions, Goban, ProblemResult, Treepath};
pub use sgf::{Color, MoveTree, Point, parse, write_sgf};
