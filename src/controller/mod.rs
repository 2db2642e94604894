//! Controllers tie a [`MoveTree`] to a [`Goban`] and expose navigation for a
//! display.
//!
//! All controllers share [`Controller`]; what happens when the user places a
//! stone is decided by the [`Strategy`]:
//!
//! - [`GameViewer`]: stones must match an existing variation.
//! - [`StaticProblem`]: stones are judged against the problem conditions.
//! - [`BoardEditor`]: stones are added to the tree.

mod board_editor;
mod board_state;
mod game_viewer;
mod options;
mod static_problem;

pub use board_editor::BoardEditor;
pub use board_state::{BoardState, BoardStones, DisplayDataType};
pub use game_viewer::GameViewer;
pub use options::ControllerOptions;
pub use static_problem::StaticProblem;

use tracing::{debug, instrument, warn};

use crate::{
    error::Result,
    rules::{Conditions, Goban, NodeStones, ProblemResult, Treepath},
    sgf::{Color, MoveTree, Point, PropKey, Stones},
};

/// Result of [`Controller::add_stone`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoneOutcome {
    /// The stone was illegal or not allowed here. Nothing changed.
    Rejected,
    Played {
        board: BoardState,
        /// Set by problem controllers.
        result: Option<ProblemResult>,
    },
}

/// The behavior that differs between controllers.
pub trait Strategy: Sized {
    fn from_options(options: &ControllerOptions) -> Self;

    fn add_stone(controller: &mut Controller<Self>, point: Point, color: Color) -> StoneOutcome;
}

pub struct Controller<S> {
    options: ControllerOptions,
    movetree: MoveTree,
    goban: Goban,
    /// Board changes of each move played, indexed by move number - 1.
    history: Vec<NodeStones>,
    current_move_number: usize,
    /// Variation chosen at each depth, remembered across `prev_move`.
    treepath: Treepath,
    strategy: S,
}

struct Loaded {
    movetree: MoveTree,
    goban: Goban,
    history: Vec<NodeStones>,
    treepath: Treepath,
}

fn load(options: &ControllerOptions) -> Result<Loaded> {
    let mut treepath: Treepath = options.initial_position.parse()?;
    let movetree = MoveTree::from_sgf(&options.sgf, &treepath)?;
    let (goban, history) = Goban::from_move_tree(&movetree, &treepath)?;
    treepath.truncate(history.len());
    Ok(Loaded { movetree, goban, history, treepath })
}

pub fn game_viewer(options: ControllerOptions) -> Result<Controller<GameViewer>> {
    Controller::new(options)
}

/// A problem controller. Unset problem conditions default to
/// [`Conditions::default`].
pub fn static_problem(mut options: ControllerOptions) -> Result<Controller<StaticProblem>> {
    options.problem_conditions.get_or_insert_with(Conditions::default);
    Controller::new(options)
}

pub fn board_editor(options: ControllerOptions) -> Result<Controller<BoardEditor>> {
    Controller::new(options)
}

impl<S: Strategy> Controller<S> {
    pub fn new(options: ControllerOptions) -> Result<Self> {
        let strategy = S::from_options(&options);
        let Loaded { movetree, goban, history, treepath } = load(&options)?;
        debug!(depth = history.len(), "controller loaded");
        Ok(Self {
            options,
            current_move_number: history.len(),
            movetree,
            goban,
            history,
            treepath,
            strategy,
        })
    }

    /// Rebuild everything from the options. On error the controller is left
    /// as it was.
    #[instrument(skip(self))]
    pub fn initialize(&mut self) -> Result<()> {
        let Loaded { movetree, goban, history, treepath } = load(&self.options)?;
        self.current_move_number = history.len();
        self.movetree = movetree;
        self.goban = goban;
        self.history = history;
        self.treepath = treepath;
        Ok(())
    }

    /// Place a stone the way this controller allows.
    #[instrument(skip(self))]
    pub fn add_stone(&mut self, point: Point, color: Color) -> StoneOutcome {
        S::add_stone(self, point, color)
    }

    // -----------------------------------------------------------------------
    // Navigation
    // -----------------------------------------------------------------------

    /// Advance one move. Without a variation the remembered choice at this
    /// depth is replayed, or the first variation taken. `None` when the
    /// variation does not exist.
    #[instrument(skip(self))]
    pub fn next_move(&mut self, variation: Option<usize>) -> Option<BoardState> {
        self.step_forward(variation).then(|| self.next_board_state())
    }

    /// Go back one move. `None` at the start.
    #[instrument(skip(self))]
    pub fn prev_move(&mut self) -> Option<BoardState> {
        let node = self.step_back()?;
        Some(BoardState::previous(&self.movetree, &node, self.conditions()))
    }

    #[instrument(skip(self))]
    pub fn to_beginning(&mut self) -> BoardState {
        while self.step_back().is_some() {}
        self.movetree.move_to_root();
        self.entire_board_state()
    }

    /// Follow remembered choices, then first variations, to a leaf.
    #[instrument(skip(self))]
    pub fn to_end(&mut self) -> BoardState {
        while self.step_forward(None) {}
        self.entire_board_state()
    }

    /// Choose the variation the next `next_move(None)` takes, modulo the
    /// number of variations. Remembered choices below this depth are
    /// forgotten.
    pub fn set_next_variation(&mut self, variation: usize) -> &mut Self {
        self.treepath.truncate(self.current_move_number);
        let children = self.movetree.num_children();
        if children > 0 {
            self.treepath.push(variation % children);
        }
        self
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Captures made by the move that reached the current position.
    pub fn get_captures(&self) -> Stones {
        self.current_node_stones().captures
    }

    fn current_node_stones(&self) -> NodeStones {
        self.current_move_number
            .checked_sub(1)
            .and_then(|i| self.history.get(i))
            .cloned()
            .unwrap_or_default()
    }

    /// A quick check for hover feedback. Suicide is not detected.
    pub fn can_add_stone(&self, point: Point, color: Color) -> bool {
        color.is_stone() && self.goban.placeable(point)
    }

    pub fn current_player(&self) -> Color {
        self.movetree.current_player()
    }

    pub fn intersections(&self) -> usize {
        self.movetree.intersections()
    }

    pub fn entire_board_state(&self) -> BoardState {
        BoardState::full(&self.movetree, &self.goban, self.conditions())
    }

    pub fn next_board_state(&self) -> BoardState {
        BoardState::next(&self.movetree, &self.current_node_stones(), self.conditions())
    }

    pub fn current_move_number(&self) -> usize {
        self.current_move_number
    }

    pub fn treepath(&self) -> &Treepath {
        &self.treepath
    }

    pub fn movetree(&self) -> &MoveTree {
        &self.movetree
    }

    pub fn goban(&self) -> &Goban {
        &self.goban
    }

    pub fn options(&self) -> &ControllerOptions {
        &self.options
    }

    fn conditions(&self) -> Option<&Conditions> {
        self.options.problem_conditions.as_ref()
    }

    // -----------------------------------------------------------------------
    // State transitions
    // -----------------------------------------------------------------------

    fn step_forward(&mut self, variation: Option<usize>) -> bool {
        let remembered = self.treepath.get(self.current_move_number);
        let choice = match (remembered, variation) {
            (Some(r), None) => r,
            (Some(r), Some(v)) if r == v => r,
            (_, v) => {
                let v = v.unwrap_or(0);
                if v >= self.movetree.num_children() {
                    return false;
                }
                self.set_next_variation(v);
                v
            }
        };
        if !self.movetree.move_down(choice) {
            debug!(choice, "no such variation");
            return false;
        }
        let node = self.goban.load_stones_from_movetree(&self.movetree);
        self.record(node);
        true
    }

    /// Undo the current node and return what it had changed.
    fn step_back(&mut self) -> Option<NodeStones> {
        if self.current_move_number == 0 {
            return None;
        }
        let node = self.current_node_stones();
        self.history.truncate(self.current_move_number - 1);
        self.goban.unload_stones(&node);
        self.current_move_number -= 1;
        self.movetree.move_up();
        Some(node)
    }

    /// Store the board changes of the node just entered and advance the
    /// move number.
    fn record(&mut self, node: NodeStones) {
        self.history.truncate(self.current_move_number);
        self.history.push(node);
        self.current_move_number += 1;
    }

    /// Descend into an existing variation, remembering the choice.
    fn descend(&mut self, variation: usize) -> bool {
        self.set_next_variation(variation);
        self.movetree.move_down(variation)
    }

    /// Add a child carrying `color` at `point` and move to it.
    fn graft_move(&mut self, point: Point, color: Color) {
        let variation = self.movetree.num_children();
        self.movetree.add_child();
        self.descend(variation);
        let key = match color {
            Color::Black => PropKey::B,
            _ => PropKey::W,
        };
        match point.to_sgf_coord() {
            Ok(coord) => {
                self.movetree.properties_mut().add_prop(key, [coord]);
            }
            Err(e) => warn!(%point, "cannot record move in SGF: {}", e),
        }
        debug!(%point, ?color, variation, "grafted new variation");
    }
}
