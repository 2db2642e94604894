use fastrand::Rng;
use tracing::debug;

use crate::{
    controller::{Controller, ControllerOptions, StoneOutcome, Strategy},
    error::Result,
    rules::{NodeStones, ProblemResult, is_correct_position},
    sgf::{Color, Point},
};

/// Solving a problem. Each stone is checked against the rules first and
/// then judged against the tree:
///
/// - no variation plays it: the move is added to the tree and is `Incorrect`;
/// - otherwise the position below decides, and when it is `Indeterminate`
///   a random reply from the tree is played for the opponent.
#[derive(Debug)]
pub struct StaticProblem {
    rng: Rng,
}

impl Strategy for StaticProblem {
    fn from_options(options: &ControllerOptions) -> Self {
        let rng = options.seed.map_or_else(Rng::new, Rng::with_seed);
        Self { rng }
    }

    fn add_stone(controller: &mut Controller<Self>, point: Point, color: Color) -> StoneOutcome {
        let placed = controller.goban.add_stone(point, color);
        if !placed.successful {
            return StoneOutcome::Rejected;
        }
        let node = NodeStones::played(point, color, placed.captures);

        let Some(variation) = controller.movetree.find_next_move(point, color) else {
            controller.graft_move(point, color);
            controller.record(node);
            return StoneOutcome::Played {
                board: controller.next_board_state(),
                result: Some(ProblemResult::Incorrect),
            };
        };

        controller.descend(variation);
        controller.record(node);
        let conditions = controller.options.problem_conditions.clone().unwrap_or_default();
        let result = is_correct_position(&controller.movetree, &conditions);
        debug!(?result, variation, "judged problem move");

        if result != ProblemResult::Indeterminate {
            return StoneOutcome::Played { board: controller.next_board_state(), result: Some(result) };
        }

        // Some answers below are right and some wrong, so the opponent picks
        // one of the replies.
        let played = controller.next_board_state();
        let replies = controller.movetree.num_children();
        let reply = controller.strategy.rng.usize(..replies);
        controller.descend(reply);
        let reply_node = controller.goban.load_stones_from_movetree(&controller.movetree);
        controller.record(reply_node);

        let mut board = controller.next_board_state();
        board.stones.merge_earlier(&played.stones);
        StoneOutcome::Played { board, result: Some(ProblemResult::Indeterminate) }
    }
}

impl Controller<StaticProblem> {
    /// Start the problem over.
    pub fn reload(&mut self) -> Result<()> {
        self.initialize()
    }
}
