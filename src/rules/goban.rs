use std::{
    collections::HashSet,
    fmt::{Display, Formatter},
};

use tracing::{trace, warn};

use crate::{
    error::{Error, Result},
    rules::Treepath,
    sgf::{Color, Move, MoveTree, Point, Stones, point::MAX_SGF_COORD},
};

/// Outcome of placing a stone. `captures` is empty when the placement failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureResult {
    pub successful: bool,
    pub captures: Vec<Point>,
}

impl CaptureResult {
    fn failed() -> Self {
        Self::default()
    }
}

/// What one node did to the board.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeStones {
    /// Stones set by the node: its move, if legal, and any setup stones that
    /// changed a point.
    pub placed: Stones,
    /// Stones the move captured, keyed by their color.
    pub captures: Stones,
    /// Stones that setup properties painted over, keyed by their old color.
    pub replaced: Stones,
}

impl NodeStones {
    /// A single stone that captured `captures`.
    pub fn played(point: Point, color: Color, captures: Vec<Point>) -> Self {
        let mut node = Self::default();
        node.placed.push(color, point);
        node.captures.extend(color.opposite(), captures);
        node
    }
}

/// The stones on the board.
///
/// `Goban` is derived state: it is rebuilt from a [`MoveTree`] with
/// [`Goban::from_move_tree`] and then kept in step with the cursor through
/// [`load_stones_from_movetree`](Goban::load_stones_from_movetree) and
/// [`unload_stones`](Goban::unload_stones).
///
/// Cells are stored row-major, `cells[y * ints + x]`, with `(0, 0)` at the
/// top-left corner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Goban {
    ints: usize,
    cells: Vec<Color>,
}

/// A connected group found by flood fill.
struct Group {
    stones: Vec<Point>,
    liberties: usize,
}

impl Goban {
    pub fn new(intersections: usize) -> Result<Self> {
        if intersections == 0 || intersections > MAX_SGF_COORD + 1 {
            return Err(Error::InvalidBoardSize(intersections));
        }
        Ok(Self {
            ints: intersections,
            cells: vec![Color::Empty; intersections * intersections],
        })
    }

    pub fn intersections(&self) -> usize {
        self.ints
    }

    pub fn in_bounds(&self, pt: Point) -> bool {
        pt.x() < self.ints && pt.y() < self.ints
    }

    /// The color at `pt`, or `None` off the board.
    pub fn stone(&self, pt: Point) -> Option<Color> {
        self.in_bounds(pt).then(|| self.cells[self.index(pt)])
    }

    /// Whether `pt` is on the board and empty. Suicide is only detected by
    /// actually playing the stone.
    pub fn placeable(&self, pt: Point) -> bool {
        self.stone(pt) == Some(Color::Empty)
    }

    pub fn clear_stone(&mut self, pt: Point) {
        self.set(pt, Color::Empty);
    }

    pub fn clear_some(&mut self, points: &[Point]) {
        for &pt in points {
            self.clear_stone(pt);
        }
    }

    /// Every black and white stone, scanned row by row.
    pub fn all_placed_stones(&self) -> Stones {
        let mut out = Stones::new();
        for (i, &color) in self.cells.iter().enumerate() {
            out.push(color, Point::new(i % self.ints, i / self.ints));
        }
        out
    }

    /// Place a stone following the capture rules.
    ///
    /// The placement fails, leaving the board untouched, when `pt` is off the
    /// board or occupied, when `color` is not a stone color, or when the stone
    /// would have no liberties without capturing anything. Captured points
    /// are listed in the order their groups were found.
    pub fn add_stone(&mut self, pt: Point, color: Color) -> CaptureResult {
        if !color.is_stone() || !self.placeable(pt) {
            return CaptureResult::failed();
        }
        self.set(pt, color);

        let opponent = color.opposite();
        let mut seen = HashSet::new();
        let mut captures = Vec::new();
        for neighbor in pt.neighbors() {
            if self.stone(neighbor) != Some(opponent) || seen.contains(&neighbor) {
                continue;
            }
            let group = self.find_connected(neighbor, opponent);
            seen.extend(group.stones.iter().copied());
            if group.liberties == 0 {
                captures.extend(group.stones);
            }
        }

        if captures.is_empty() && self.find_connected(pt, color).liberties == 0 {
            trace!(%pt, ?color, "suicide, reverting");
            self.clear_stone(pt);
            return CaptureResult::failed();
        }

        self.clear_some(&captures);
        if !captures.is_empty() {
            trace!(%pt, ?color, captured = captures.len(), "captured stones");
        }
        CaptureResult { successful: true, captures }
    }

    /// Apply the stones of the cursor's current node: `AB`/`AW` placements
    /// are set directly, the move is played with [`Goban::add_stone`].
    /// Only what actually changed is recorded, so an illegal move in the
    /// tree leaves no trace to undo.
    pub fn load_stones_from_movetree(&mut self, mt: &MoveTree) -> NodeStones {
        let props = mt.properties();
        let mut node = NodeStones::default();
        for color in [Color::Black, Color::White] {
            for pt in props.placements(color) {
                match self.stone(pt) {
                    None => warn!(%pt, ?color, "placement outside the board"),
                    Some(old) if old == color => {}
                    Some(old) => {
                        node.replaced.push(old, pt);
                        node.placed.push(color, pt);
                        self.set(pt, color);
                    }
                }
            }
        }

        if let Some(Move { color, point: Some(pt) }) = props.get_move() {
            let result = self.add_stone(pt, color);
            if result.successful {
                node.placed.push(color, pt);
                node.captures.extend(color.opposite(), result.captures);
            } else {
                warn!(%pt, ?color, "illegal move in tree, skipped");
            }
        }
        node
    }

    /// Undo [`Goban::load_stones_from_movetree`] or a recorded
    /// [`Goban::add_stone`], without running capture logic.
    pub fn unload_stones(&mut self, node: &NodeStones) {
        for (_, pt) in node.placed.iter() {
            self.clear_stone(pt);
        }
        for (color, pt) in node.captures.iter().chain(node.replaced.iter()) {
            self.set(pt, color);
        }
    }

    /// Replay `mt` from its root along `treepath`, stopping at the first
    /// variation that does not exist. Returns the board together with the
    /// changes of each node played; the number of entries is the depth
    /// reached.
    pub fn from_move_tree(mt: &MoveTree, treepath: &Treepath) -> Result<(Goban, Vec<NodeStones>)> {
        let mut goban = Goban::new(mt.intersections())?;
        let mut cursor = mt.tree_from_root();
        goban.load_stones_from_movetree(&cursor);

        let mut history = Vec::new();
        for &variation in treepath {
            if !cursor.move_down(variation) {
                break;
            }
            history.push(goban.load_stones_from_movetree(&cursor));
        }
        Ok((goban, history))
    }

    fn index(&self, pt: Point) -> usize {
        pt.y() * self.ints + pt.x()
    }

    /// Set a cell without capture logic. Returns `false` off the board.
    fn set(&mut self, pt: Point, color: Color) -> bool {
        if !self.in_bounds(pt) {
            return false;
        }
        let idx = self.index(pt);
        self.cells[idx] = color;
        true
    }

    /// Flood fill the `color` group containing `start`. Each point is
    /// visited once; liberties are the distinct empty points touching the
    /// group.
    fn find_connected(&self, start: Point, color: Color) -> Group {
        let mut seen = HashSet::from([start]);
        let mut liberties = HashSet::new();
        let mut stones = Vec::new();
        let mut stack = vec![start];

        while let Some(pt) = stack.pop() {
            stones.push(pt);
            for neighbor in pt.neighbors() {
                match self.stone(neighbor) {
                    Some(Color::Empty) => {
                        liberties.insert(neighbor);
                    }
                    Some(c) if c == color => {
                        if seen.insert(neighbor) {
                            stack.push(neighbor);
                        }
                    }
                    // Opponent stones and the edge.
                    _ => {}
                }
            }
        }

        Group { stones, liberties: liberties.len() }
    }
}

/// One row per line: `X` black, `O` white, `.` empty.
impl Display for Goban {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for row in self.cells.chunks(self.ints) {
            let line: Vec<&str> = row
                .iter()
                .map(|c| match c {
                    Color::Black => "X",
                    Color::White => "O",
                    Color::Empty => ".",
                })
                .collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}
