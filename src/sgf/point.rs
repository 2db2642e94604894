use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use serde::Serialize;

use crate::error::{Error, Result};

/// An intersection on the board. `x` is the column and `y` the row, both
/// 0-indexed from the top-left corner.
///
/// The canonical string form is `"x,y"`; the SGF form is two lowercase
/// letters where `'a'` maps to 0, so `"ab"` is `(0, 1)`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Point {
    x: usize,
    y: usize,
}

/// Stone colors, plus `Empty` for a vacant intersection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Color {
    Black,
    White,
    Empty,
}

/// Largest coordinate expressible with a single lowercase SGF letter.
pub const MAX_SGF_COORD: usize = 25;

impl Point {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    pub const fn x(self) -> usize {
        self.x
    }

    pub const fn y(self) -> usize {
        self.y
    }

    /// Parse an SGF coordinate such as `"mc"`.
    pub fn from_sgf_coord(s: &str) -> Result<Self> {
        let decode = |c: char| -> Option<usize> {
            c.is_ascii_lowercase().then(|| c as usize - 'a' as usize)
        };

        let mut chars = s.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(a), Some(b), None) => match (decode(a), decode(b)) {
                (Some(x), Some(y)) => Ok(Self::new(x, y)),
                _ => Err(Error::InvalidPoint(s.to_string())),
            },
            _ => Err(Error::InvalidPoint(s.to_string())),
        }
    }

    /// The SGF coordinate for this point. Fails for coordinates above 25,
    /// which have no lowercase letter.
    pub fn to_sgf_coord(self) -> Result<String> {
        if self.x > MAX_SGF_COORD || self.y > MAX_SGF_COORD {
            return Err(Error::InvalidPoint(self.to_string()));
        }
        let encode = |n: usize| (b'a' + n as u8) as char;
        Ok(format!("{}{}", encode(self.x), encode(self.y)))
    }

    /// The orthogonal neighbours that do not fall below zero. The caller is
    /// responsible for the upper board bound.
    pub fn neighbors(self) -> impl Iterator<Item = Point> {
        let Point { x, y } = self;
        [
            Some(Point::new(x + 1, y)),
            x.checked_sub(1).map(|x| Point::new(x, y)),
            y.checked_sub(1).map(|y| Point::new(x, y)),
            Some(Point::new(x, y + 1)),
        ]
        .into_iter()
        .flatten()
    }
}

impl Display for Point {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

impl FromStr for Point {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidPoint(s.to_string());
        let (x, y) = s.split_once(',').ok_or_else(invalid)?;
        let x = x.trim().parse().map_err(|_| invalid())?;
        let y = y.trim().parse().map_err(|_| invalid())?;
        Ok(Self::new(x, y))
    }
}

impl Color {
    pub fn opposite(self) -> Self {
        match self {
            Self::Black => Self::White,
            Self::White => Self::Black,
            Self::Empty => Self::Empty,
        }
    }

    /// The move property for this color: `B` or `W`. `Empty` has none.
    pub fn to_token(self) -> Option<&'static str> {
        match self {
            Self::Black => Some("B"),
            Self::White => Some("W"),
            Self::Empty => None,
        }
    }

    pub fn is_stone(self) -> bool {
        self != Self::Empty
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Black => "BLACK",
            Self::White => "WHITE",
            Self::Empty => "EMPTY",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "B" | "BLACK" => Ok(Self::Black),
            "W" | "WHITE" => Ok(Self::White),
            "E" | "EMPTY" => Ok(Self::Empty),
            _ => Err(Error::InvalidColor(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sgf_coord_round_trip() {
        for x in 0..=MAX_SGF_COORD {
            for y in 0..=MAX_SGF_COORD {
                let pt = Point::new(x, y);
                let coord = pt.to_sgf_coord().unwrap();
                assert_eq!(Point::from_sgf_coord(&coord).unwrap(), pt);
            }
        }
    }

    #[test]
    fn sgf_coord_is_column_then_row() {
        assert_eq!(Point::from_sgf_coord("ab").unwrap(), Point::new(0, 1));
        assert_eq!(Point::from_sgf_coord("mc").unwrap(), Point::new(12, 2));
    }

    #[test]
    fn rejects_bad_sgf_coords() {
        assert!(Point::from_sgf_coord("").is_err());
        assert!(Point::from_sgf_coord("a").is_err());
        assert!(Point::from_sgf_coord("abc").is_err());
        assert!(Point::from_sgf_coord("A1").is_err());
        assert!(Point::new(26, 0).to_sgf_coord().is_err());
    }

    #[test]
    fn string_key_round_trip() {
        let pt = Point::new(3, 17);
        assert_eq!(pt.to_string(), "3,17");
        assert_eq!("3,17".parse::<Point>().unwrap(), pt);
        assert!("3;17".parse::<Point>().is_err());
    }

    #[test]
    fn neighbors_stop_at_zero() {
        let corner: Vec<Point> = Point::new(0, 0).neighbors().collect();
        assert_eq!(corner, vec![Point::new(1, 0), Point::new(0, 1)]);
        assert_eq!(Point::new(4, 4).neighbors().count(), 4);
    }

    #[test]
    fn color_tokens() {
        assert_eq!("b".parse::<Color>().unwrap(), Color::Black);
        assert_eq!("WHITE".parse::<Color>().unwrap(), Color::White);
        assert_eq!("x".parse::<Color>().unwrap_err(), Error::InvalidColor("x".into()));
    }

    #[test]
    fn opposite_colors() {
        assert_eq!(Color::Black.opposite(), Color::White);
        assert_eq!(Color::White.opposite(), Color::Black);
        assert_eq!(Color::Empty.opposite(), Color::Empty);
    }
}
