use std::{
    fs,
    io::{self, BufRead, Write as _},
    path::PathBuf,
};

use anyhow::{Context, Result, bail};
use clap::{CommandFactory, Parser, ValueEnum};
use clap_complete::Shell;
use tracing::debug;

use crate::{
    controller::{
        BoardEditor, BoardState, Controller, ControllerOptions, GameViewer, StaticProblem,
        StoneOutcome, Strategy, board_editor, game_viewer, static_problem,
    },
    sgf::{Color, MoveTree, Point, PropKey, write_sgf},
};

/// Browse, solve and edit SGF game records in the terminal.
#[derive(Debug, Parser)]
#[command(name = "kifu", version)]
pub struct Args {
    /// SGF file to open. Without one the board starts empty.
    pub file: Option<PathBuf>,

    /// Starting position as a treepath, e.g. `53`, `2.3-4.1` or `+`.
    #[arg(short, long)]
    pub position: Option<String>,

    #[arg(short, long, value_enum, default_value_t = Mode::Viewer)]
    pub mode: Mode,

    /// JSON file with controller options. Flags take precedence.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Seed for problem replies.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Print shell completions and exit.
    #[arg(long, value_name = "SHELL")]
    pub completions: Option<Shell>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    Viewer,
    Problem,
    Editor,
}

const HELP: &str = "\
commands:
  next [n]          next move, optionally into variation n
  prev              previous move
  start | end       jump to the first or last move
  play <pt> [b|w]   place a stone (pt as `dd` or `3,3`)
  up | down         cycle the next variation (viewer)
  reload            start the problem over (problem)
  board             redraw the board
  json              print the full board state as JSON
  info              game information
  tree              show the move tree
  save [path]       write the SGF
  quit";

/// Commands that only some controllers understand.
trait ModeCommands: Strategy {
    fn extra(_controller: &mut Controller<Self>, _cmd: &str) -> Result<bool> {
        Ok(false)
    }
}

impl ModeCommands for GameViewer {
    fn extra(controller: &mut Controller<Self>, cmd: &str) -> Result<bool> {
        match cmd {
            "up" => controller.move_up_variations(),
            "down" => controller.move_down_variations(),
            _ => return Ok(false),
        };
        println!("next variation: {}", controller.next_variation_number());
        Ok(true)
    }
}

impl ModeCommands for StaticProblem {
    fn extra(controller: &mut Controller<Self>, cmd: &str) -> Result<bool> {
        if cmd != "reload" {
            return Ok(false);
        }
        controller.reload()?;
        render(controller);
        Ok(true)
    }
}

impl ModeCommands for BoardEditor {}

pub fn run(args: Args) -> Result<()> {
    if let Some(shell) = args.completions {
        clap_complete::generate(shell, &mut Args::command(), "kifu", &mut io::stdout());
        return Ok(());
    }

    let options = options_from_args(&args)?;
    let file = args.file.clone();
    match args.mode {
        Mode::Viewer => session(game_viewer(options)?, file),
        Mode::Problem => session(static_problem(options)?, file),
        Mode::Editor => session(board_editor(options)?, file),
    }
}

fn options_from_args(args: &Args) -> Result<ControllerOptions> {
    let mut options = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => ControllerOptions::default(),
    };
    if let Some(path) = &args.file {
        options.sgf = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
    }
    if let Some(position) = &args.position {
        options.initial_position = position.clone();
    }
    if let Some(seed) = args.seed {
        options.seed = Some(seed);
    }
    Ok(options)
}

fn session<S: ModeCommands>(mut controller: Controller<S>, mut file: Option<PathBuf>) -> Result<()> {
    render(&controller);
    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            return Ok(()); // EOF
        }

        let line = line.trim();
        let (cmd, rest) = match line.split_once(' ') {
            Some((c, r)) => (c, r.trim()),
            None => (line, ""),
        };
        debug!(cmd, rest, "command");

        match cmd {
            "quit" | "q" => return Ok(()),
            "" => continue,
            "help" => println!("{}", HELP),
            "next" | "n" => {
                let variation = match rest {
                    "" => None,
                    n => match n.parse() {
                        Ok(n) => Some(n),
                        Err(_) => {
                            eprintln!("usage: next [variation]");
                            continue;
                        }
                    },
                };
                match controller.next_move(variation) {
                    Some(state) => show_delta(&controller, &state),
                    None => println!("no such move"),
                }
            }
            "prev" | "p" => match controller.prev_move() {
                Some(state) => show_delta(&controller, &state),
                None => println!("at the beginning"),
            },
            "start" => {
                controller.to_beginning();
                render(&controller);
            }
            "end" => {
                controller.to_end();
                render(&controller);
            }
            "play" => match parse_play(rest, controller.current_player()) {
                Ok((point, color)) => match controller.add_stone(point, color) {
                    StoneOutcome::Played { board, result } => {
                        show_delta(&controller, &board);
                        if let Some(result) = result {
                            println!("{:?}", result);
                        }
                    }
                    StoneOutcome::Rejected => println!("cannot play {} {} here", color, point),
                },
                Err(e) => eprintln!("{}", e),
            },
            "board" => render(&controller),
            "json" => println!("{}", serde_json::to_string_pretty(&controller.entire_board_state())?),
            "info" => print!("{}", game_info(controller.movetree())),
            "tree" => print!("{}", render_tree(controller.movetree())),
            "save" => {
                let path = if rest.is_empty() {
                    match &file {
                        Some(p) => p.clone(),
                        None => {
                            eprintln!("usage: save <path>");
                            continue;
                        }
                    }
                } else {
                    PathBuf::from(rest)
                };
                fs::write(&path, write_sgf(controller.movetree()))
                    .with_context(|| format!("writing {}", path.display()))?;
                println!("saved to {}", path.display());
                file = Some(path);
            }
            other => {
                if !S::extra(&mut controller, other)? {
                    eprintln!("unknown command: {} (try `help`)", line);
                }
            }
        }
    }
}

/// `dd` or `3,3`, then an optional color; defaults to the player to move.
fn parse_play(rest: &str, to_move: Color) -> Result<(Point, Color)> {
    let mut parts = rest.split_whitespace();
    let Some(coord) = parts.next() else {
        bail!("usage: play <point> [b|w]");
    };
    let point = Point::from_sgf_coord(coord).or_else(|_| coord.parse::<Point>())?;
    let color = match parts.next() {
        None => to_move,
        Some(c) => match c.parse::<Color>()? {
            Color::Empty => bail!("cannot play an empty stone"),
            color => color,
        },
    };
    Ok((point, color))
}

fn render<S: Strategy>(controller: &Controller<S>) {
    println!("--- move {} ---", controller.current_move_number());
    print!("{}", controller.goban());
    let state = controller.entire_board_state();
    show_annotations(&state);
}

fn show_delta<S: Strategy>(controller: &Controller<S>, state: &BoardState) {
    println!("--- move {} ---", controller.current_move_number());
    print!("{}", controller.goban());
    if !state.stones.empty.is_empty() {
        println!("captured: {}", state.stones.empty.len());
    }
    show_annotations(state);
}

fn show_annotations(state: &BoardState) {
    if let Some(comment) = &state.comment {
        println!("{}", comment);
    }
    if state.next_moves.len() > 1 {
        println!("{} variations", state.next_moves.len());
    }
}

fn game_info(mt: &MoveTree) -> String {
    let root = mt.tree_from_root();
    let props = root.properties();
    let mut out = String::new();
    for (label, key) in [
        ("Game", PropKey::GN),
        ("Black", PropKey::PB),
        ("White", PropKey::PW),
        ("Result", PropKey::RE),
        ("Komi", PropKey::KM),
        ("Event", PropKey::EV),
    ] {
        if let Some(value) = props.one_value(key, 0) {
            out.push_str(&format!("{}: {}\n", label, value));
        }
    }
    for date in props.dates() {
        out.push_str(&format!("Played: {}\n", date.format("%B %-d, %Y")));
    }
    out.push_str(&format!("Size: {}\n", mt.intersections()));
    out
}

fn render_tree(mt: &MoveTree) -> String {
    let current = mt.node_index();
    let mut out = String::new();
    mt.tree_from_root().recurse(|node| {
        let indent = "  ".repeat(node.depth());
        let marker = if node.node_index() == current { "* " } else { "  " };
        let label: Vec<String> = node
            .properties()
            .iter()
            .map(|(key, values)| format!("{}[{}]", key, values.join("][")))
            .collect();
        out.push_str(&format!("{}{}{}\n", indent, marker, label.join(" ")));
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sgf::parse;

    #[test]
    fn play_accepts_both_point_forms() {
        assert_eq!(
            parse_play("dd", Color::White).unwrap(),
            (Point::new(3, 3), Color::White)
        );
        assert_eq!(
            parse_play("3,4 b", Color::White).unwrap(),
            (Point::new(3, 4), Color::Black)
        );
        assert!(parse_play("", Color::Black).is_err());
        assert!(parse_play("dd e", Color::Black).is_err());
        assert!(parse_play("zz9", Color::Black).is_err());
    }

    #[test]
    fn tree_marks_the_cursor() {
        let mut mt = parse("(;SZ[9];B[ee](;W[gc])(;W[cg]))").unwrap();
        mt.move_down(0);
        mt.move_down(1);
        assert_eq!(
            render_tree(&mt),
            "  SZ[9]\n    B[ee]\n      W[gc]\n    * W[cg]\n"
        );
    }

    #[test]
    fn info_lists_players_and_dates() {
        let mt = parse("(;SZ[19]PB[Honinbo Shusaku]PW[Gennan Inseki]RE[B+2]DT[1846-09-11])").unwrap();
        let info = game_info(&mt);
        assert!(info.contains("Black: Honinbo Shusaku\n"));
        assert!(info.contains("Result: B+2\n"));
        assert!(info.contains("Played: September 11, 1846\n"));
        assert!(info.ends_with("Size: 19\n"));
    }

    #[test]
    fn args_parse() {
        let args = Args::try_parse_from(["kifu", "game.sgf", "-p", "2.3", "--mode", "problem"]).unwrap();
        assert_eq!(args.mode, Mode::Problem);
        assert_eq!(args.position.as_deref(), Some("2.3"));
        Args::command().debug_assert();
    }
}
