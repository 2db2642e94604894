pub mod cursor;
pub mod point;
pub mod properties;
pub mod tree;
mod parser;
mod serializer;

pub use cursor::{DEFAULT_INTERSECTIONS, MoveTree};
pub use parser::parse;
pub use point::{Color, Point};
pub use properties::{Label, Mark, Move, PropKey, Properties, Stones};
pub use serializer::write_sgf;
pub use tree::{GameTree, MoveNode, NodeId, NodeIndex};
