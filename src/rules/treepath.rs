//! Treepaths: compact descriptions of how to reach a position from the root.
//!
//! A treepath is the list of variation numbers taken at each depth, so its
//! length is the move number. The string form, used for initial positions,
//! looks like this (moves and variations are 0-indexed):
//!
//! ```text
//! 0        []                  the root
//! 53       [0; 53]             move 53 along the main line
//! 2.3      [0, 0, 3]           variation 3 after move 2
//! 0.0.0.0  [0, 0, 0]
//! 2.3-4.1  [0, 0, 3, 0, 1]     variation 1 at move 4, reached through 2.3
//! 1+       [0] + [0; 500]      "+" follows the main line to the end
//! 0.2.6+   [2, 6] + [0; 500]
//! ```

use std::{
    fmt::{Display, Formatter},
    iter,
    str::FromStr,
};

use pest_consume::{Parser, match_nodes};
use serde::Serialize;
use tracing::trace;

use crate::{
    error::{Error, Result},
    sgf::MoveTree,
};

type Node<'i> = pest_consume::Node<'i, Rule, ()>;
type ParseResult<T> = std::result::Result<T, pest_consume::Error<Rule>>;

/// How far a `+` reaches. Following the first variation stops earlier when
/// the tree runs out of moves.
pub const TO_END_DEPTH: usize = 500;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Treepath(Vec<usize>);

/// One `N.v1.v2` section of the string form.
struct Segment {
    depth: usize,
    variations: Vec<usize>,
}

/// Intermediate representation that mirrors the grammar.
struct ParsedPath {
    segments: Vec<Segment>,
    to_end: bool,
}

#[derive(Parser)]
#[grammar = "treepath.pest"]
struct TreepathParser;

#[pest_consume::parser]
impl TreepathParser {
    fn number(input: Node) -> ParseResult<usize> {
        input.as_str().parse().map_err(|e| input.error(e))
    }

    fn segment(input: Node) -> ParseResult<Segment> {
        let span = input.clone();
        let segment: Segment = match_nodes!(input.into_children();
            [number(depth), number(variations)..] => Ok(Segment {
                depth,
                variations: variations.collect(),
            })
        )?;
        if segment.depth > TO_END_DEPTH {
            return Err(span.error(format!("move {} is past {}", segment.depth, TO_END_DEPTH)));
        }
        Ok(segment)
    }

    fn treepath(input: Node) -> ParseResult<ParsedPath> {
        let mut segments = Vec::new();
        let mut to_end = false;
        for child in input.into_children() {
            match child.as_rule() {
                Rule::segment => segments.push(Self::segment(child)?),
                Rule::to_end => to_end = true,
                _ => {}
            }
        }
        Ok(ParsedPath { segments, to_end })
    }
}

impl ParsedPath {
    fn expand(self) -> Treepath {
        let mut out = Vec::new();
        let mut reached = 0;
        for segment in self.segments {
            out.extend(iter::repeat_n(0, segment.depth.saturating_sub(reached)));
            reached = segment.depth;
            for variation in segment.variations {
                out.push(variation);
                reached += 1;
            }
        }
        if self.to_end {
            out.extend(iter::repeat_n(0, TO_END_DEPTH));
        }
        Treepath(out)
    }
}

impl Treepath {
    pub fn new() -> Self {
        Self::default()
    }

    /// The bare `+` path: always take the first variation.
    pub fn to_end() -> Self {
        Self(vec![0; TO_END_DEPTH])
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, usize> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, depth: usize) -> Option<usize> {
        self.0.get(depth).copied()
    }

    pub fn push(&mut self, variation: usize) {
        self.0.push(variation);
    }

    pub fn truncate(&mut self, len: usize) {
        self.0.truncate(len);
    }
}

impl FromStr for Treepath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let err = |e: pest_consume::Error<Rule>| Error::Treepath {
            input: s.to_string(),
            message: e.variant.message().into_owned(),
        };
        let inputs = TreepathParser::parse(Rule::treepath, s).map_err(err)?;
        let input = inputs.single().map_err(err)?;
        let path = TreepathParser::treepath(input).map_err(err)?.expand();
        trace!(input = s, depth = path.len(), "parsed treepath");
        Ok(path)
    }
}

/// A bare move number: that many first variations, at most [`TO_END_DEPTH`].
impl From<usize> for Treepath {
    fn from(moves: usize) -> Self {
        Self(vec![0; moves.min(TO_END_DEPTH)])
    }
}

impl From<Vec<usize>> for Treepath {
    fn from(path: Vec<usize>) -> Self {
        Self(path)
    }
}

/// Writes the `0.v1.v2…` form, which parses back to the same path.
impl Display for Treepath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "0")?;
        for v in &self.0 {
            write!(f, ".{}", v)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Treepath {
    type Item = &'a usize;
    type IntoIter = std::slice::Iter<'a, usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Every root-to-leaf path below the cursor's current node. Each path starts
/// with the variation number of the first child taken.
pub fn flatten_move_tree(tree: &MoveTree) -> Vec<Treepath> {
    let mut mt = tree.new_tree_ref();
    let mut out = Vec::new();
    for i in 0..mt.num_children() {
        mt.move_down(i);
        flatten_from(&mut mt, Vec::new(), &mut out);
        mt.move_up();
    }
    out
}

fn flatten_from(mt: &mut MoveTree, mut path: Vec<usize>, out: &mut Vec<Treepath>) {
    path.push(mt.node_id().variation);
    let children = mt.num_children();
    if children == 0 {
        out.push(Treepath(path));
        return;
    }
    for i in 0..children {
        mt.move_down(i);
        flatten_from(mt, path.clone(), out);
        mt.move_up();
    }
}
