//! Go rules on top of the move tree: treepaths, board state with captures,
//! and problem correctness.

pub mod goban;
pub mod problems;
pub mod treepath;

pub use goban::{CaptureResult, Goban, NodeStones};
pub use problems::{Conditions, ProblemResult, correct_next_moves, is_correct_position};
pub use treepath::{TO_END_DEPTH, Treepath, flatten_move_tree};
