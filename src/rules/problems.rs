use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    error::Error,
    rules::flatten_move_tree,
    sgf::{Move, MoveTree, PropKey},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProblemResult {
    Correct,
    Incorrect,
    /// Some lines below are correct and some are not.
    Indeterminate,
}

/// What marks a node as a correct answer: property key to substrings, any of
/// which may appear in any value of that key. A key with no substrings only
/// needs to be present.
///
/// Deserializes from a JSON object such as `{"GB": [], "C": ["Correct"]}`;
/// keys are checked against the SGF property whitelist.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "BTreeMap<String, Vec<String>>")]
pub struct Conditions(BTreeMap<PropKey, Vec<String>>);

impl Conditions {
    /// Conditions nothing satisfies.
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    pub fn insert<I, S>(&mut self, key: PropKey, substrings: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0.insert(key, substrings.into_iter().map(Into::into).collect());
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (PropKey, &[String])> {
        self.0.iter().map(|(k, v)| (*k, v.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A `GB` (good for black) property, or "Correct" / "is correct" in the
/// comment.
impl Default for Conditions {
    fn default() -> Self {
        let mut conditions = Self::empty();
        conditions
            .insert(PropKey::GB, Vec::<String>::new())
            .insert(PropKey::C, ["Correct", "is correct"]);
        conditions
    }
}

impl TryFrom<BTreeMap<String, Vec<String>>> for Conditions {
    type Error = Error;

    fn try_from(map: BTreeMap<String, Vec<String>>) -> Result<Self, Self::Error> {
        map.into_iter()
            .map(|(key, substrings)| Ok((key.parse::<PropKey>()?, substrings)))
            .collect::<Result<BTreeMap<_, _>, Error>>()
            .map(Self)
    }
}

/// Judge the position at the cursor.
///
/// The position is correct when the current node satisfies `conditions`.
/// Otherwise each line from here to a leaf counts as correct if any node on
/// it satisfies them: all lines correct gives `Correct`, a mix gives
/// `Indeterminate`, and anything else, including having no lines at all,
/// gives `Incorrect`.
pub fn is_correct_position(mt: &MoveTree, conditions: &Conditions) -> ProblemResult {
    if mt.properties().matches(conditions) {
        return ProblemResult::Correct;
    }

    let mut any_correct = false;
    let mut any_incorrect = false;
    for path in flatten_move_tree(mt) {
        let mut line = mt.from_node();
        let correct = path.iter().any(|&variation| {
            line.move_down(variation);
            line.properties().matches(conditions)
        });
        if correct {
            any_correct = true;
        } else {
            any_incorrect = true;
        }
    }

    match (any_correct, any_incorrect) {
        (true, false) => ProblemResult::Correct,
        (true, true) => ProblemResult::Indeterminate,
        _ => ProblemResult::Incorrect,
    }
}

/// Moves of the children whose positions are not `Incorrect`, in variation
/// order.
pub fn correct_next_moves(mt: &MoveTree, conditions: &Conditions) -> Vec<Move> {
    let mut cursor = mt.new_tree_ref();
    let mut out = Vec::new();
    for i in 0..mt.num_children() {
        cursor.move_down(i);
        if is_correct_position(&cursor, conditions) != ProblemResult::Incorrect {
            out.extend(cursor.last_move());
        }
        cursor.move_up();
    }
    out
}
