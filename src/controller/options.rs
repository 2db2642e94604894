//! Controller configuration.

use serde::Deserialize;

use crate::rules::Conditions;

/// What a controller loads and how it judges problems.
///
/// Builder-style, or deserialized from JSON:
///
/// ```
/// use kifu::controller::ControllerOptions;
///
/// let options = ControllerOptions::new("(;SZ[9];B[ee])")
///     .with_initial_position("1")
///     .with_seed(7);
///
/// let from_json: ControllerOptions = serde_json::from_str(
///     r#"{"sgf": "(;SZ[9];B[ee])", "initial_position": "1", "seed": 7}"#,
/// ).unwrap();
/// assert_eq!(options, from_json);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControllerOptions {
    /// SGF text. Blank means an empty 19x19 board.
    pub sgf: String,
    /// Treepath string for the starting position, e.g. `"2.3"` or `"+"`.
    pub initial_position: String,
    /// Problem conditions. Problem controllers fall back to
    /// [`Conditions::default`] when unset.
    pub problem_conditions: Option<Conditions>,
    /// Seed for the problem controller's reply choice.
    pub seed: Option<u64>,
}

impl ControllerOptions {
    pub fn new(sgf: impl Into<String>) -> Self {
        Self { sgf: sgf.into(), ..Self::default() }
    }

    pub fn with_initial_position(mut self, position: impl Into<String>) -> Self {
        self.initial_position = position.into();
        self
    }

    pub fn with_problem_conditions(mut self, conditions: Conditions) -> Self {
        self.problem_conditions = Some(conditions);
        self
    }

    /// Set the random seed for deterministic problem replies.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sgf::PropKey;

    #[test]
    fn missing_fields_use_defaults() {
        let options: ControllerOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, ControllerOptions::default());
    }

    #[test]
    fn conditions_from_json() {
        let options: ControllerOptions =
            serde_json::from_str(r#"{"problem_conditions": {"C": ["Right"]}}"#).unwrap();
        let mut expected = Conditions::empty();
        expected.insert(PropKey::C, ["Right"]);
        assert_eq!(options.problem_conditions, Some(expected));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(serde_json::from_str::<ControllerOptions>(r#"{"sgf_string": ""}"#).is_err());
    }
}
