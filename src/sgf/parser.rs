use tracing::{debug, trace};

use crate::{
    error::{Error, Result},
    sgf::{cursor::MoveTree, properties::PropKey},
};

/// Where the scanner is relative to the SGF structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Before the first `;`.
    Beginning,
    /// Inside a property identifier: `A_B[oe]`.
    Property,
    /// Inside a bracketed value: `AB[o_e]`.
    PropData,
    /// Between tokens: `AB[oe]_`, `_AB[oe]`.
    Between,
}

/// Scanner state. The tree is built while scanning: `;` creates and enters
/// a node, `(` remembers the depth to return to, `)` climbs back to it.
struct Parser {
    state: State,
    tree: MoveTree,
    /// Characters of the identifier or value being read.
    buffer: String,
    /// Values read so far for `key`.
    values: Vec<String>,
    key: Option<PropKey>,
    /// Depth of the node at each open `(`.
    branch_depths: Vec<usize>,
    escaped: bool,
    line: usize,
    column: usize,
    current: char,
}

impl Parser {
    fn new() -> Self {
        Self {
            state: State::Beginning,
            tree: MoveTree::new(None),
            buffer: String::new(),
            values: Vec::new(),
            key: None,
            branch_depths: Vec::new(),
            escaped: false,
            line: 1,
            column: 0,
            current: '\0',
        }
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::Parse {
            line: self.line,
            column: self.column,
            character: self.current,
            message: message.into(),
        }
    }

    /// Store the pending property on the current node, if there is one.
    fn flush_property(&mut self) {
        if let Some(key) = self.key.take() {
            let values = std::mem::take(&mut self.values);
            self.tree.properties_mut().add_prop(key, values);
        }
    }

    /// Feed one character. `Ok(true)` means the outermost game tree closed
    /// and the rest of the input is ignored.
    fn step(&mut self, c: char) -> Result<bool> {
        self.column += 1;
        self.current = c;

        if c == '\n' {
            self.line += 1;
            self.column = 0;
            if self.state != State::PropData {
                return Ok(false);
            }
        }

        match self.state {
            State::Beginning => match c {
                '(' => self.branch_depths.push(self.tree.depth()),
                ';' => self.state = State::Between,
                c if c.is_whitespace() => {}
                _ => return Err(self.error("unexpected character")),
            },

            State::Property => match c {
                'A'..='Z' => {
                    self.buffer.push(c);
                    if self.buffer.len() > 2 {
                        return Err(self.error(format!(
                            "expected a property of at most two letters, found {}",
                            self.buffer
                        )));
                    }
                }
                '[' => {
                    let ident = std::mem::take(&mut self.buffer);
                    let key = ident
                        .parse::<PropKey>()
                        .map_err(|_| self.error(format!("unknown property: {}", ident)))?;
                    self.key = Some(key);
                    self.state = State::PropData;
                }
                c if c.is_whitespace() => {
                    return Err(self.error("unexpected whitespace in property"));
                }
                _ => return Err(self.error("unexpected character")),
            },

            State::PropData => {
                if self.escaped {
                    self.escaped = false;
                    // A backslash before a newline is a soft line break.
                    if c != '\n' {
                        self.buffer.push(c);
                    }
                } else {
                    match c {
                        '\\' => self.escaped = true,
                        ']' => {
                            self.values.push(std::mem::take(&mut self.buffer));
                            self.state = State::Between;
                        }
                        _ => self.buffer.push(c),
                    }
                }
            }

            State::Between => match c {
                'A'..='Z' => {
                    self.flush_property();
                    self.buffer.push(c);
                    self.state = State::Property;
                }
                '[' => {
                    if self.key.is_none() {
                        return Err(self.error("orphan property data"));
                    }
                    self.state = State::PropData;
                }
                '(' => {
                    self.flush_property();
                    self.branch_depths.push(self.tree.depth());
                }
                ')' => {
                    self.flush_property();
                    let Some(depth) = self.branch_depths.pop() else {
                        return Err(self.error("unmatched closing parenthesis"));
                    };
                    if self.branch_depths.is_empty() {
                        self.tree.move_to_root();
                        return Ok(true);
                    }
                    while self.tree.depth() > depth {
                        self.tree.move_up();
                    }
                    trace!(depth, "closed variation");
                }
                ';' => {
                    self.flush_property();
                    self.tree.add_node();
                }
                c if c.is_whitespace() => {}
                _ => return Err(self.error("unknown token")),
            },
        }
        Ok(false)
    }

    fn finish(mut self) -> Result<MoveTree> {
        if self.state == State::PropData {
            return Err(self.error("unterminated property value"));
        }
        if !self.branch_depths.is_empty() {
            return Err(self.error("unexpected end of input: unclosed variation"));
        }
        self.flush_property();
        if self.tree.depth() != 0 {
            return Err(self.error("expected to end up at the root"));
        }
        Ok(self.tree)
    }
}

/// Parse SGF text into a [`MoveTree`] positioned at the root.
///
/// Only the first game tree of a collection is read; everything after its
/// closing parenthesis is ignored.
pub fn parse(sgf: &str) -> Result<MoveTree> {
    let mut parser = Parser::new();
    for c in sgf.chars() {
        match parser.step(c) {
            Ok(true) => {
                debug!("parsed SGF game tree");
                return Ok(parser.tree);
            }
            Ok(false) => {}
            Err(e) => {
                debug!("{}", e);
                return Err(e);
            }
        }
    }
    parser.finish().inspect_err(|e| debug!("{}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sgf::{Color, Point};

    fn parse_err(sgf: &str) -> (usize, usize, char) {
        match parse(sgf) {
            Err(Error::Parse { line, column, character, .. }) => (line, column, character),
            other => panic!("expected a parse error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn simple_game() {
        let mut mt = parse("(;GM[1]SZ[9];B[ee];W[gc])").unwrap();
        assert_eq!(mt.depth(), 0);
        assert_eq!(mt.intersections(), 9);
        assert!(mt.move_down(0));
        let mv = mt.last_move().unwrap();
        assert_eq!((mv.color, mv.point), (Color::Black, Some(Point::new(4, 4))));
        assert!(mt.move_down(0));
        let mv = mt.last_move().unwrap();
        assert_eq!((mv.color, mv.point), (Color::White, Some(Point::new(6, 2))));
        assert_eq!(mt.num_children(), 0);
    }

    #[test]
    fn variations_branch_from_the_right_node() {
        let mut mt = parse("(;GM[1](;B[aa];W[bb](;B[cc])(;B[dd]))(;B[ee]))").unwrap();
        assert_eq!(mt.num_children(), 2);
        mt.move_down(0);
        mt.move_down(0);
        assert_eq!(mt.num_children(), 2);
        mt.move_down(1);
        assert_eq!(mt.last_move().unwrap().point, Some(Point::new(3, 3)));
        mt.move_to_root();
        mt.move_down(1);
        assert_eq!(mt.last_move().unwrap().point, Some(Point::new(4, 4)));
    }

    #[test]
    fn multiple_values_and_whitespace() {
        let mt = parse("(\n ;AB[aa]\n  [bb] AW[cc]\r\n C[two\nlines])").unwrap();
        let props = mt.properties();
        assert_eq!(props.placements(Color::Black).len(), 2);
        assert_eq!(props.placements(Color::White), vec![Point::new(2, 2)]);
        assert_eq!(props.comment(), Some("two\nlines"));
    }

    #[test]
    fn escaped_brackets() {
        let mt = parse(r"(;C[a \] b \\])").unwrap();
        assert_eq!(mt.properties().comment(), Some(r"a ] b \"));
    }

    #[test]
    fn pass_is_an_empty_value() {
        let mut mt = parse("(;SZ[19];W[])").unwrap();
        mt.move_down(0);
        let mv = mt.last_move().unwrap();
        assert_eq!((mv.color, mv.point), (Color::White, None));
    }

    #[test]
    fn trailing_input_after_game_is_ignored() {
        assert!(parse("(;GM[1]) garbage").is_ok());
    }

    #[test]
    fn empty_input_is_an_empty_tree() {
        let mt = parse("").unwrap();
        assert!(mt.properties().is_empty());
    }

    #[test]
    fn unknown_property_reports_position() {
        assert_eq!(parse_err("(;GM[1]\nZZ[1])"), (2, 3, '['));
    }

    #[test]
    fn malformed_inputs() {
        assert_eq!(parse_err("x(;GM[1])"), (1, 1, 'x'));
        assert_eq!(parse_err("(;GAM[1])").2, 'M');
        assert_eq!(parse_err("(;G M[1])").2, ' ');
        assert_eq!(parse_err("(;GM[1]][2])").2, ']');
        assert_eq!(parse_err("(;[1])").2, '[');
        assert_eq!(parse_err("(;C[never closed").2, 'd');
        assert_eq!(parse_err("(;GM[1];B[aa]").2, ']');
        assert_eq!(parse_err("(;GM[1](;B[aa])").2, ')');
    }

    #[test]
    fn lowercase_property_letters_are_rejected() {
        assert!(parse("(;Gm[1])").is_err());
    }
}
