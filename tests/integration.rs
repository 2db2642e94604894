use kifu::{
    Color, ControllerOptions, Error, Goban, Point, ProblemResult, StoneOutcome, Treepath,
    controller::DisplayDataType,
    game_viewer, parse, static_problem, write_sgf,
};

const GAME: &str = "(;GM[1]FF[4]SZ[9]PB[Black]PW[White]C[Opening]
;B[ee]C[Tengen]
(;W[gc];B[cc];W[cg]LB[ee:A]TR[gc])
(;W[cg];B[gg]))";

#[test]
fn parse_and_replay_simple_game() {
    let mut mt = parse("(;GM[1]SZ[9];B[ee];W[gc])").unwrap();
    assert_eq!(mt.intersections(), 9);

    let mut depth = 0;
    while mt.move_down(0) {
        depth += 1;
    }
    assert_eq!(depth, 2);

    let (goban, captures) = Goban::from_move_tree(&mt, &"+".parse().unwrap()).unwrap();
    assert!(captures.iter().all(|node| node.captures.is_empty()));
    let stones = goban.all_placed_stones();
    assert_eq!(stones.black, vec![Point::new(4, 4)]);
    assert_eq!(stones.white, vec![Point::new(6, 2)]);
}

#[test]
fn written_sgf_parses_to_the_same_tree() {
    let first = parse(GAME).unwrap();
    let written = write_sgf(&first);
    let second = parse(&written).unwrap();
    assert_eq!(*first.properties(), *second.properties());
    assert_eq!(write_sgf(&second), written);
}

#[test]
fn viewer_walks_the_main_line_and_back() {
    let mut viewer = game_viewer(ControllerOptions::new(GAME)).unwrap();
    let start = viewer.entire_board_state();
    assert_eq!(start.comment.as_deref(), Some("Opening"));
    assert_eq!(start.display_data_type, DisplayDataType::Full);

    let mut moves = 0;
    while viewer.next_move(None).is_some() {
        moves += 1;
    }
    assert_eq!(moves, 4);

    let end = viewer.entire_board_state();
    assert_eq!(end.labels[0].text, "A");
    assert_eq!(end.marks.values().flatten().count(), 1);

    assert_eq!(viewer.to_beginning(), start);
}

#[test]
fn viewer_starts_at_a_treepath() {
    let viewer =
        game_viewer(ControllerOptions::new(GAME).with_initial_position("1.1-2.0")).unwrap();
    assert_eq!(viewer.current_move_number(), 3);
    assert_eq!(viewer.goban().stone(Point::new(6, 6)), Some(Color::Black));
    assert_eq!(viewer.treepath(), &Treepath::from(vec![0, 1, 0]));
}

#[test]
fn malformed_input_is_reported() {
    let err = game_viewer(ControllerOptions::new("(;GM[1]QQ[x])")).err().unwrap();
    assert!(matches!(err, Error::Parse { line: 1, column: 10, .. }));

    let err = game_viewer(ControllerOptions::new(GAME).with_initial_position("x")).err().unwrap();
    assert!(matches!(err, Error::Treepath { .. }));

    assert_eq!(Goban::new(0).unwrap_err(), Error::InvalidBoardSize(0));

    let err = game_viewer(ControllerOptions::new("(;SZ[4294967296])")).err().unwrap();
    assert_eq!(err, Error::InvalidBoardSize(4_294_967_296));

    let huge = ControllerOptions::new(GAME).with_initial_position("18446744073709551615");
    assert!(matches!(game_viewer(huge).err(), Some(Error::Treepath { .. })));
}

#[test]
fn to_end_positions() {
    let viewer = game_viewer(ControllerOptions::new(GAME).with_initial_position("+")).unwrap();
    assert_eq!(viewer.current_move_number(), 4);
    assert_eq!(viewer.treepath(), &Treepath::from(vec![0, 0, 0, 0]));

    let viewer =
        game_viewer(ControllerOptions::new(GAME).with_initial_position("0.0.1+")).unwrap();
    assert_eq!(viewer.current_move_number(), 3);
    assert_eq!(viewer.goban().stone(Point::new(6, 6)), Some(Color::Black));
}

#[test]
fn problem_from_json_options() {
    let options: ControllerOptions = serde_json::from_str(
        r#"{
            "sgf": "(;GM[1]SZ[5]AB[ab]AW[bb](;B[ba]C[Right])(;B[cb];W[ba]))",
            "problem_conditions": {"C": ["Right"]},
            "seed": 11
        }"#,
    )
    .unwrap();

    let mut problem = static_problem(options.clone()).unwrap();
    match problem.add_stone(Point::new(1, 0), Color::Black) {
        StoneOutcome::Played { result, .. } => assert_eq!(result, Some(ProblemResult::Correct)),
        StoneOutcome::Rejected => panic!("legal answer rejected"),
    }

    let mut problem = static_problem(options).unwrap();
    match problem.add_stone(Point::new(2, 1), Color::Black) {
        StoneOutcome::Played { result, .. } => {
            assert_eq!(result, Some(ProblemResult::Incorrect))
        }
        StoneOutcome::Rejected => panic!("legal move rejected"),
    }
}

#[test]
fn board_state_serializes_for_displays() {
    let viewer = game_viewer(ControllerOptions::new(GAME).with_initial_position("1")).unwrap();
    let json = serde_json::to_value(viewer.next_board_state()).unwrap();
    assert_eq!(json["stones"]["BLACK"][0], serde_json::json!({"x": 4, "y": 4}));
    assert_eq!(json["comment"], "Tengen");
    assert_eq!(json["next_moves"].as_array().unwrap().len(), 2);
    assert_eq!(json["last_move"]["color"], "BLACK");
}
