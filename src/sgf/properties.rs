use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use tracing::warn;

use crate::{
    error::{Error, Result},
    rules::Conditions,
    sgf::point::{Color, Point},
};

macro_rules! sgf_properties {
    ($($key:ident),+ $(,)?) => {
        /// The SGF property identifiers this crate accepts.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum PropKey {
            $($key),+
        }

        impl PropKey {
            pub const ALL: &'static [PropKey] = &[$(PropKey::$key),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $(PropKey::$key => stringify!($key)),+
                }
            }
        }

        impl FromStr for PropKey {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                match s {
                    $(stringify!($key) => Ok(PropKey::$key),)+
                    other => Err(Error::InvalidProperty(other.to_string())),
                }
            }
        }
    };
}

sgf_properties!(
    AB, AE, AN, AP, AR, AS, AW, B, BL, BM, BR, BS, BT, C, CA, CH, CP, CR, DD, DM, DO, DT, EL, EV,
    EX, FF, FG, GB, GC, GM, GN, GW, HA, HO, ID, IP, IT, IY, KM, KO, L, LB, LN, LT, M, MA, MN, N, OB,
    OH, OM, ON, OP, OT, OV, OW, PB, PC, PL, PM, PW, RE, RG, RO, RU, SC, SE, SI, SL, SO, SQ, ST, SU,
    SZ, TB, TC, TE, TM, TR, TW, UC, US, V, VW, W, WL, WR, WS, WT,
);

impl Display for PropKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for PropKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A move on a node. `point` is `None` for a pass (`B[]` / `W[]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Move {
    pub color: Color,
    pub point: Option<Point>,
}

/// An `LB` label: text drawn on an intersection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Label {
    pub point: Point,
    pub text: String,
}

/// Point markup properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Mark {
    Circle,
    Square,
    Triangle,
    XMark,
}

impl Mark {
    pub const ALL: [Mark; 4] = [Mark::Circle, Mark::Square, Mark::Triangle, Mark::XMark];

    pub fn prop_key(self) -> PropKey {
        match self {
            Self::Circle => PropKey::CR,
            Self::Square => PropKey::SQ,
            Self::Triangle => PropKey::TR,
            Self::XMark => PropKey::MA,
        }
    }
}

/// Points grouped by stone color. Used both for the stones a node adds and
/// for captures, where the color is that of the captured stones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Stones {
    #[serde(rename = "BLACK")]
    pub black: Vec<Point>,
    #[serde(rename = "WHITE")]
    pub white: Vec<Point>,
}

impl Stones {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, color: Color) -> &[Point] {
        match color {
            Color::Black => &self.black,
            Color::White => &self.white,
            Color::Empty => &[],
        }
    }

    pub fn push(&mut self, color: Color, point: Point) {
        match color {
            Color::Black => self.black.push(point),
            Color::White => self.white.push(point),
            Color::Empty => {}
        }
    }

    pub fn extend(&mut self, color: Color, points: impl IntoIterator<Item = Point>) {
        for pt in points {
            self.push(color, pt);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.black.is_empty() && self.white.is_empty()
    }

    pub fn len(&self) -> usize {
        self.black.len() + self.white.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Color, Point)> + '_ {
        let black = self.black.iter().map(|&pt| (Color::Black, pt));
        let white = self.white.iter().map(|&pt| (Color::White, pt));
        black.chain(white)
    }
}

/// The property bag of one node: whitelisted keys mapped to ordered values,
/// kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    entries: Vec<(PropKey, Vec<String>)>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `values` to `key`, validating the key against the whitelist.
    pub fn add<I, S>(&mut self, key: &str, values: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let key: PropKey = key.parse()?;
        Ok(self.add_prop(key, values))
    }

    /// Append `values` to an already validated key.
    pub fn add_prop<I, S>(&mut self, key: PropKey, values: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = values.into_iter().map(Into::into);
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => existing.extend(values),
            None => self.entries.push((key, values.collect())),
        }
        self
    }

    /// Replace the values of `key`.
    pub fn set<I, S>(&mut self, key: PropKey, values: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = values,
            None => self.entries.push((key, values)),
        }
        self
    }

    /// Delete `key`, returning its values.
    pub fn remove(&mut self, key: PropKey) -> Option<Vec<String>> {
        let idx = self.entries.iter().position(|(k, _)| *k == key)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn contains(&self, key: PropKey) -> bool {
        self.entries.iter().any(|(k, _)| *k == key)
    }

    pub fn all_values(&self, key: PropKey) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_slice())
    }

    pub fn one_value(&self, key: PropKey, index: usize) -> Option<&str> {
        self.all_values(key)?.get(index).map(String::as_str)
    }

    /// Interpret one value of `key` as an SGF coordinate.
    pub fn as_point(&self, key: PropKey, index: usize) -> Option<Result<Point>> {
        self.one_value(key, index).map(Point::from_sgf_coord)
    }

    pub fn iter(&self) -> impl Iterator<Item = (PropKey, &[String])> {
        self.entries.iter().map(|(k, v)| (*k, v.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // -----------------------------------------------------------------------
    // Domain accessors
    // -----------------------------------------------------------------------

    /// Setup stones (`AB` / `AW`) for `color`. Malformed coordinates are
    /// skipped.
    pub fn placements(&self, color: Color) -> Vec<Point> {
        let key = match color {
            Color::Black => PropKey::AB,
            Color::White => PropKey::AW,
            Color::Empty => return Vec::new(),
        };
        self.points(key)
    }

    pub fn comment(&self) -> Option<&str> {
        self.one_value(PropKey::C, 0)
    }

    /// The `B` or `W` move on this node, if any. `B` wins when both are
    /// present. An empty value is a pass.
    pub fn get_move(&self) -> Option<Move> {
        [(PropKey::B, Color::Black), (PropKey::W, Color::White)]
            .into_iter()
            .find_map(|(key, color)| {
                let value = self.one_value(key, 0)?;
                if value.is_empty() {
                    return Some(Move { color, point: None });
                }
                match Point::from_sgf_coord(value) {
                    Ok(pt) => Some(Move { color, point: Some(pt) }),
                    Err(e) => {
                        warn!(%key, value, "ignoring move with bad coordinate: {}", e);
                        None
                    }
                }
            })
    }

    /// `LB` values of the form `pt:text`.
    pub fn labels(&self) -> Vec<Label> {
        let Some(values) = self.all_values(PropKey::LB) else {
            return Vec::new();
        };
        values
            .iter()
            .filter_map(|v| {
                let (coord, text) = v.split_once(':').unwrap_or((v.as_str(), ""));
                match Point::from_sgf_coord(coord) {
                    Ok(point) => Some(Label { point, text: text.to_string() }),
                    Err(e) => {
                        warn!(value = %v, "ignoring malformed label: {}", e);
                        None
                    }
                }
            })
            .collect()
    }

    pub fn marks(&self, mark: Mark) -> Vec<Point> {
        self.points(mark.prop_key())
    }

    /// Placements plus the move. Passes are ignored.
    pub fn all_stones(&self) -> Stones {
        let mut out = Stones {
            black: self.placements(Color::Black),
            white: self.placements(Color::White),
        };
        if let Some(Move { color, point: Some(pt) }) = self.get_move() {
            out.push(color, pt);
        }
        out
    }

    /// Whether any condition key present here has a value containing one of
    /// its substrings. A key with no substrings matches on presence alone.
    pub fn matches(&self, conditions: &Conditions) -> bool {
        conditions.iter().any(|(key, substrings)| {
            let Some(values) = self.all_values(key) else {
                return false;
            };
            substrings.is_empty()
                || values
                    .iter()
                    .any(|v| substrings.iter().any(|s| v.contains(s.as_str())))
        })
    }

    /// Full `YYYY-MM-DD` dates listed in `DT`. Partial dates are skipped.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.all_values(PropKey::DT)
            .unwrap_or_default()
            .iter()
            .flat_map(|v| v.split(','))
            .filter_map(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok())
            .collect()
    }

    fn points(&self, key: PropKey) -> Vec<Point> {
        self.all_values(key)
            .unwrap_or_default()
            .iter()
            .filter_map(|v| match Point::from_sgf_coord(v) {
                Ok(pt) => Some(pt),
                Err(e) => {
                    warn!(%key, value = %v, "skipping bad coordinate: {}", e);
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unknown_keys() {
        let mut props = Properties::new();
        assert_eq!(
            props.add("ZZ", ["x"]).unwrap_err(),
            Error::InvalidProperty("ZZ".to_string())
        );
        assert!(props.is_empty());
    }

    #[test]
    fn add_appends_and_set_overwrites() {
        let mut props = Properties::new();
        props.add("AB", ["aa"]).unwrap();
        props.add("AB", ["bb", "cc"]).unwrap();
        assert_eq!(props.all_values(PropKey::AB).unwrap(), ["aa", "bb", "cc"]);

        props.set(PropKey::AB, ["dd"]);
        assert_eq!(props.all_values(PropKey::AB).unwrap(), ["dd"]);

        assert_eq!(props.remove(PropKey::AB), Some(vec!["dd".to_string()]));
        assert!(!props.contains(PropKey::AB));
        assert_eq!(props.remove(PropKey::AB), None);
    }

    #[test]
    fn moves_and_passes() {
        let mut props = Properties::new();
        props.add_prop(PropKey::W, ["gc"]);
        assert_eq!(
            props.get_move(),
            Some(Move { color: Color::White, point: Some(Point::new(6, 2)) })
        );

        let mut pass = Properties::new();
        pass.add_prop(PropKey::B, [""]);
        assert_eq!(pass.get_move(), Some(Move { color: Color::Black, point: None }));
        assert!(pass.all_stones().is_empty());

        assert_eq!(Properties::new().get_move(), None);
    }

    #[test]
    fn all_stones_merges_placements_and_move() {
        let mut props = Properties::new();
        props.add_prop(PropKey::AB, ["aa", "bb"]);
        props.add_prop(PropKey::AW, ["cc"]);
        props.add_prop(PropKey::W, ["dd"]);
        let stones = props.all_stones();
        assert_eq!(stones.black, vec![Point::new(0, 0), Point::new(1, 1)]);
        assert_eq!(stones.white, vec![Point::new(2, 2), Point::new(3, 3)]);
    }

    #[test]
    fn bad_placement_coordinates_are_skipped() {
        let mut props = Properties::new();
        props.add_prop(PropKey::AB, ["aa", "Z9", "bb"]);
        assert_eq!(props.placements(Color::Black).len(), 2);
    }

    #[test]
    fn labels_split_point_and_text() {
        let mut props = Properties::new();
        props.add_prop(PropKey::LB, ["ab:A", "cc:hello"]);
        let labels = props.labels();
        assert_eq!(labels[0], Label { point: Point::new(0, 1), text: "A".to_string() });
        assert_eq!(labels[1].text, "hello");
    }

    #[test]
    fn matches_substrings_or_presence() {
        let mut props = Properties::new();
        props.add_prop(PropKey::C, ["That is correct!"]);

        let mut conditions = Conditions::empty();
        conditions.insert(PropKey::C, ["is correct"]);
        assert!(props.matches(&conditions));

        let mut miss = Conditions::empty();
        miss.insert(PropKey::C, ["Wrong"]);
        assert!(!props.matches(&miss));

        let mut presence = Conditions::empty();
        presence.insert(PropKey::C, Vec::<String>::new());
        assert!(props.matches(&presence));

        assert!(!props.matches(&Conditions::empty()));
    }

    #[test]
    fn parses_full_dates() {
        let mut props = Properties::new();
        props.add_prop(PropKey::DT, ["2013-05-01,2013-05-02"]);
        assert_eq!(props.dates().len(), 2);

        let mut partial = Properties::new();
        partial.add_prop(PropKey::DT, ["1996-12"]);
        assert!(partial.dates().is_empty());
    }
}
