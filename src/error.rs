//! Error types for the kifu crate

use thiserror::Error;

/// Main error type for the kifu crate.
///
/// Illegal moves are not errors: the goban reports them through
/// [`CaptureResult`](crate::rules::CaptureResult) and controllers through
/// [`StoneOutcome::Rejected`](crate::controller::StoneOutcome).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    #[error("SGF parsing error at line {line}, column {column}, char {character:?}: {message}")]
    Parse {
        line: usize,
        column: usize,
        character: char,
        message: String,
    },

    #[error("invalid SGF property {0:?}")]
    InvalidProperty(String),

    #[error("invalid point {0:?}")]
    InvalidPoint(String),

    #[error("invalid color {0:?}: expected B, W or E")]
    InvalidColor(String),

    #[error("invalid board size {0}: intersections must be between 1 and 26")]
    InvalidBoardSize(usize),

    #[error("invalid treepath {input:?}: {message}")]
    Treepath { input: String, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
