use std::collections::BTreeMap;

use serde::Serialize;

use crate::{
    rules::{Conditions, Goban, NodeStones, correct_next_moves},
    sgf::{Color, Label, Mark, Move, MoveTree, Point, Stones},
};

/// Whether a [`BoardState`] describes the whole board or only what changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DisplayDataType {
    /// Only the stones added and the points cleared since the last snapshot.
    Partial,
    /// Every stone on the board; the display should be cleared first.
    Full,
}

/// Points to draw, by color. `empty` lists points to clear.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BoardStones {
    #[serde(rename = "BLACK")]
    pub black: Vec<Point>,
    #[serde(rename = "WHITE")]
    pub white: Vec<Point>,
    #[serde(rename = "EMPTY")]
    pub empty: Vec<Point>,
}

impl BoardStones {
    pub fn get(&self, color: Color) -> &[Point] {
        match color {
            Color::Black => &self.black,
            Color::White => &self.white,
            Color::Empty => &self.empty,
        }
    }

    fn get_mut(&mut self, color: Color) -> &mut Vec<Point> {
        match color {
            Color::Black => &mut self.black,
            Color::White => &mut self.white,
            Color::Empty => &mut self.empty,
        }
    }

    /// The color this snapshot assigns to `pt`, if any.
    pub fn color_of(&self, pt: Point) -> Option<Color> {
        [Color::Black, Color::White, Color::Empty]
            .into_iter()
            .find(|&c| self.get(c).contains(&pt))
    }

    /// Fold an earlier delta into this one. Points this delta already
    /// mentions keep their newer color.
    pub fn merge_earlier(&mut self, earlier: &BoardStones) {
        for color in [Color::Black, Color::White, Color::Empty] {
            for &pt in earlier.get(color) {
                if self.color_of(pt).is_none() {
                    self.get_mut(color).push(pt);
                }
            }
        }
    }

    fn from_stones(stones: &Stones) -> Self {
        Self {
            black: stones.black.clone(),
            white: stones.white.clone(),
            empty: Vec::new(),
        }
    }
}

/// A snapshot of what a display needs to draw the current position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardState {
    pub stones: BoardStones,
    pub marks: BTreeMap<Mark, Vec<Point>>,
    pub labels: Vec<Label>,
    pub comment: Option<String>,
    pub last_move: Option<Move>,
    pub next_moves: Vec<Move>,
    pub correct_next_moves: Vec<Move>,
    pub display_data_type: DisplayDataType,
}

impl BoardState {
    fn base(mt: &MoveTree, conditions: Option<&Conditions>) -> Self {
        let props = mt.properties();
        let marks = Mark::ALL
            .into_iter()
            .map(|mark| (mark, props.marks(mark)))
            .filter(|(_, points)| !points.is_empty())
            .collect();
        Self {
            stones: BoardStones::default(),
            marks,
            labels: props.labels(),
            comment: props.comment().map(str::to_string),
            last_move: props.get_move(),
            next_moves: mt.next_moves(),
            correct_next_moves: conditions
                .map(|c| correct_next_moves(mt, c))
                .unwrap_or_default(),
            display_data_type: DisplayDataType::Partial,
        }
    }

    /// Every stone on `goban`.
    pub fn full(mt: &MoveTree, goban: &Goban, conditions: Option<&Conditions>) -> Self {
        let mut out = Self::base(mt, conditions);
        out.stones = BoardStones::from_stones(&goban.all_placed_stones());
        out.display_data_type = DisplayDataType::Full;
        out
    }

    /// The delta after moving onto the cursor's node: the stones it placed
    /// appear and its captures are cleared.
    pub fn next(mt: &MoveTree, node: &NodeStones, conditions: Option<&Conditions>) -> Self {
        let mut out = Self::base(mt, conditions);
        out.stones = BoardStones::from_stones(&node.placed);
        out.stones.empty = node.captures.iter().map(|(_, pt)| pt).collect();
        out
    }

    /// The delta after stepping back to the cursor's node: the stones of the
    /// node just left are cleared and what it removed comes back.
    pub fn previous(mt: &MoveTree, node: &NodeStones, conditions: Option<&Conditions>) -> Self {
        let mut out = Self::base(mt, conditions);
        out.stones = BoardStones::from_stones(&node.captures);
        for (color, pt) in node.replaced.iter() {
            out.stones.get_mut(color).push(pt);
        }
        out.stones.empty = node
            .placed
            .iter()
            .map(|(_, pt)| pt)
            .filter(|&pt| node.replaced.iter().all(|(_, r)| r != pt))
            .collect();
        out
    }
}
