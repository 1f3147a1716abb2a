//! Exact half-point arithmetic for game and match scores.

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// A non-negative score counted in half points.
///
/// Chess scores only ever move in steps of ½, so sums are kept as an integer
/// number of halves and never drift. On the wire a score is a plain JSON
/// number (`3.5`), which keeps stored documents readable by other tools.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Score(u32);

impl Score {
    pub const ZERO: Score = Score(0);
    pub const HALF: Score = Score(1);
    pub const ONE: Score = Score(2);

    /// Create a score from a number of half points
    pub const fn from_halves(halves: u32) -> Self {
        Self(halves)
    }

    /// Number of half points in this score
    pub const fn halves(self) -> u32 {
        self.0
    }

    /// Score for `wins` wins and `draws` draws
    pub const fn from_record(wins: u32, draws: u32) -> Self {
        Self(wins * 2 + draws)
    }

    /// Value as a float, exact for every representable score
    pub fn as_f64(self) -> f64 {
        f64::from(self.0) / 2.0
    }

    /// Parse a float that must lie on the half-point grid
    pub fn try_from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() || value < 0.0 {
            return None;
        }
        let doubled = value * 2.0;
        let rounded = doubled.round();
        if (doubled - rounded).abs() > 1e-6 || rounded > f64::from(u32::MAX) {
            return None;
        }
        Some(Self(rounded as u32))
    }
}

impl Add for Score {
    type Output = Score;

    fn add(self, rhs: Score) -> Score {
        Score(self.0 + rhs.0)
    }
}

impl AddAssign for Score {
    fn add_assign(&mut self, rhs: Score) {
        self.0 += rhs.0;
    }
}

impl Sum for Score {
    fn sum<I: Iterator<Item = Score>>(iter: I) -> Score {
        iter.fold(Score::ZERO, Add::add)
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.0 / 2, if self.0 % 2 == 1 { 5 } else { 0 })
    }
}

impl Serialize for Score {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0 % 2 == 0 {
            serializer.serialize_u32(self.0 / 2)
        } else {
            serializer.serialize_f64(self.as_f64())
        }
    }
}

impl<'de> Deserialize<'de> for Score {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Score::try_from_f64(value).ok_or_else(|| {
            de::Error::custom(format!("{value} is not a non-negative multiple of 0.5"))
        })
    }
}
