use crate::{
    controller::{Controller, ControllerOptions, StoneOutcome, Strategy},
    sgf::{Color, Move, MoveTree, Point},
};

/// Read-only traversal of a game record. A stone is accepted only when a
/// variation plays exactly that move.
#[derive(Debug, Default)]
pub struct GameViewer;

impl Strategy for GameViewer {
    fn from_options(_options: &ControllerOptions) -> Self {
        GameViewer
    }

    fn add_stone(controller: &mut Controller<Self>, point: Point, color: Color) -> StoneOutcome {
        controller.play_variation(Move { color, point: Some(point) })
    }
}

/// The child of the cursor's node whose move is `mv`.
fn find_variation(mt: &MoveTree, mv: Move) -> Option<usize> {
    let mut child = mt.new_tree_ref();
    (0..mt.num_children()).find(|&i| {
        child.move_down(i);
        let found = child.last_move() == Some(mv);
        child.move_up();
        found
    })
}

impl Controller<GameViewer> {
    /// Follow the variation where `color` passes.
    pub fn pass(&mut self, color: Color) -> StoneOutcome {
        self.play_variation(Move { color, point: None })
    }

    /// The variation `next_move(None)` will take.
    pub fn next_variation_number(&self) -> usize {
        self.treepath.get(self.current_move_number).unwrap_or(0)
    }

    /// Cycle the next variation forward.
    pub fn move_up_variations(&mut self) -> &mut Self {
        let next = self.next_variation_number() + 1;
        self.set_next_variation(next)
    }

    /// Cycle the next variation backward.
    pub fn move_down_variations(&mut self) -> &mut Self {
        let children = self.movetree.num_children().max(1);
        let next = self.next_variation_number() + children - 1;
        self.set_next_variation(next)
    }

    fn play_variation(&mut self, mv: Move) -> StoneOutcome {
        let Some(variation) = find_variation(&self.movetree, mv) else {
            return StoneOutcome::Rejected;
        };
        match self.next_move(Some(variation)) {
            Some(board) => StoneOutcome::Played { board, result: None },
            None => StoneOutcome::Rejected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::game_viewer;

    const GAME: &str = "(;GM[1]SZ[9];B[ee](;W[gc])(;W[])(;W[cg]))";

    fn viewer() -> Controller<GameViewer> {
        game_viewer(ControllerOptions::new(GAME).with_initial_position("1")).unwrap()
    }

    #[test]
    fn matching_stone_follows_the_variation() {
        let mut c = viewer();
        match c.add_stone(Point::new(2, 6), Color::White) {
            StoneOutcome::Played { board, result } => {
                assert_eq!(board.stones.white, vec![Point::new(2, 6)]);
                assert_eq!(result, None);
            }
            StoneOutcome::Rejected => panic!("variation not found"),
        }
        assert_eq!(c.treepath().as_slice(), [0, 2]);
    }

    #[test]
    fn unknown_moves_are_rejected() {
        let mut c = viewer();
        assert_eq!(c.add_stone(Point::new(0, 0), Color::White), StoneOutcome::Rejected);
        assert_eq!(c.add_stone(Point::new(6, 2), Color::Black), StoneOutcome::Rejected);
        assert_eq!(c.current_move_number(), 1);
    }

    #[test]
    fn pass_variation() {
        let mut c = viewer();
        assert!(matches!(c.pass(Color::White), StoneOutcome::Played { .. }));
        assert_eq!(c.movetree().node_id().variation, 1);
        assert_eq!(c.pass(Color::Black), StoneOutcome::Rejected);
    }

    #[test]
    fn variations_cycle_both_ways() {
        let mut c = viewer();
        assert_eq!(c.next_variation_number(), 0);
        c.move_up_variations();
        assert_eq!(c.next_variation_number(), 1);
        c.move_up_variations().move_up_variations();
        assert_eq!(c.next_variation_number(), 0);
        c.move_down_variations();
        assert_eq!(c.next_variation_number(), 2);

        c.next_move(None);
        assert_eq!(c.goban().stone(Point::new(2, 6)), Some(Color::White));

        // No variations at a leaf.
        c.move_up_variations();
        assert_eq!(c.next_variation_number(), 0);
        assert!(c.next_move(None).is_none());
    }
}
