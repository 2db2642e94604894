use crate::{
    controller::{Controller, ControllerOptions, StoneOutcome, Strategy},
    rules::NodeStones,
    sgf::{Color, Point},
};

/// Free play that records into the tree. A legal stone follows the
/// variation that already plays it, or becomes a new variation.
#[derive(Debug, Default)]
pub struct BoardEditor;

impl Strategy for BoardEditor {
    fn from_options(_options: &ControllerOptions) -> Self {
        BoardEditor
    }

    fn add_stone(controller: &mut Controller<Self>, point: Point, color: Color) -> StoneOutcome {
        let placed = controller.goban.add_stone(point, color);
        if !placed.successful {
            return StoneOutcome::Rejected;
        }
        match controller.movetree.find_next_move(point, color) {
            Some(variation) => {
                controller.descend(variation);
            }
            None => controller.graft_move(point, color),
        }
        controller.record(NodeStones::played(point, color, placed.captures));
        StoneOutcome::Played { board: controller.next_board_state(), result: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        controller::board_editor,
        sgf::{PropKey, write_sgf},
    };

    fn editor(sgf: &str) -> Controller<BoardEditor> {
        board_editor(ControllerOptions::new(sgf)).unwrap()
    }

    #[test]
    fn new_stones_become_variations() {
        let mut c = editor("(;SZ[9];B[ee])");
        assert!(matches!(
            c.add_stone(Point::new(0, 0), Color::Black),
            StoneOutcome::Played { result: None, .. }
        ));
        c.add_stone(Point::new(1, 0), Color::White);
        assert_eq!(c.current_move_number(), 2);
        assert_eq!(write_sgf(c.movetree()), "(;SZ[9](;B[ee])(;B[aa];W[ba]))");
    }

    #[test]
    fn existing_variation_is_reused() {
        let mut c = editor("(;SZ[9];B[ee])");
        c.add_stone(Point::new(4, 4), Color::Black);
        assert_eq!(c.movetree().num_children(), 0);
        c.to_beginning();
        assert_eq!(c.movetree().num_children(), 1);
    }

    #[test]
    fn captures_are_recorded() {
        let mut c = editor("(;SZ[5]AB[aa])");
        c.add_stone(Point::new(1, 0), Color::White);
        let StoneOutcome::Played { board, .. } = c.add_stone(Point::new(0, 1), Color::White)
        else {
            panic!("legal move rejected")
        };
        assert_eq!(board.stones.empty, vec![Point::new(0, 0)]);

        c.prev_move();
        assert_eq!(c.goban().stone(Point::new(0, 0)), Some(Color::Black));
    }

    #[test]
    fn blank_sgf_is_an_empty_board() {
        let mut c = editor("");
        assert_eq!(c.intersections(), 19);
        c.add_stone(Point::new(18, 18), Color::Black);
        assert_eq!(c.movetree().properties().one_value(PropKey::B, 0), Some("ss"));
        assert_eq!(c.add_stone(Point::new(19, 0), Color::White), StoneOutcome::Rejected);
    }
}
