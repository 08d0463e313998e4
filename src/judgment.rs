//! The fundamental judgment scale for pairwise comparisons
//!
//! This module defines the fixed 1..9 scale used to answer one elicitation
//! question ("how much more important is this item than that one?"), together
//! with its reciprocal semantics: preferring the opposite side of a pair maps
//! the same verbal grade to the inverse numeric value.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Verbal intensity grades of the comparison scale, mapped to 1..9
///
/// Odd grades carry the canonical verbal labels; even grades are the
/// intermediate values between them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Intensity {
    /// Both items contribute equally (1)
    Equal = 1,
    /// Between equal and moderate (2)
    Weak = 2,
    /// Experience slightly favors one item (3)
    Moderate = 3,
    /// Between moderate and strong (4)
    ModeratePlus = 4,
    /// Experience strongly favors one item (5)
    Strong = 5,
    /// Between strong and very strong (6)
    StrongPlus = 6,
    /// One item is favored very strongly; its dominance is demonstrated (7)
    VeryStrong = 7,
    /// Between very strong and extreme (8)
    VeryStrongPlus = 8,
    /// The evidence favoring one item is of the highest possible order (9)
    Extreme = 9,
}

impl Intensity {
    /// All grades in ascending order
    pub const ALL: [Intensity; 9] = [
        Intensity::Equal,
        Intensity::Weak,
        Intensity::Moderate,
        Intensity::ModeratePlus,
        Intensity::Strong,
        Intensity::StrongPlus,
        Intensity::VeryStrong,
        Intensity::VeryStrongPlus,
        Intensity::Extreme,
    ];

    /// Numeric value of this grade on the 1..9 scale
    pub fn value(self) -> f64 {
        self as u8 as f64
    }

    /// Look up the grade for a numeric scale value
    pub fn from_value(value: u8) -> Option<Intensity> {
        match value {
            1 => Some(Intensity::Equal),
            2 => Some(Intensity::Weak),
            3 => Some(Intensity::Moderate),
            4 => Some(Intensity::ModeratePlus),
            5 => Some(Intensity::Strong),
            6 => Some(Intensity::StrongPlus),
            7 => Some(Intensity::VeryStrong),
            8 => Some(Intensity::VeryStrongPlus),
            9 => Some(Intensity::Extreme),
            _ => None,
        }
    }

    /// Human-readable label for presentation layers
    pub fn label(self) -> &'static str {
        match self {
            Intensity::Equal => "equally important",
            Intensity::Weak => "slightly more important",
            Intensity::Moderate => "moderately more important",
            Intensity::ModeratePlus => "moderately to strongly more important",
            Intensity::Strong => "strongly more important",
            Intensity::StrongPlus => "strongly to very strongly more important",
            Intensity::VeryStrong => "very strongly more important",
            Intensity::VeryStrongPlus => "very strongly to extremely more important",
            Intensity::Extreme => "extremely more important",
        }
    }
}

impl fmt::Display for Intensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Which side of a presented pair the judgment favors
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// The first item of the pair (row index of the comparison)
    First,
    /// The second item of the pair (column index of the comparison)
    Second,
}

/// A single elicited judgment: an intensity grade plus the favored side
///
/// The numeric value entered into the comparison matrix at `(i, j)` is the
/// grade itself when the first item is favored, and its reciprocal when the
/// second is — the matrix fills the mirror cell automatically either way.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Judgment {
    /// Favored side of the pair
    pub side: Side,
    /// Intensity of the preference
    pub intensity: Intensity,
}

impl Judgment {
    /// Both items matter equally
    pub fn equal() -> Self {
        Self {
            side: Side::First,
            intensity: Intensity::Equal,
        }
    }

    /// The first item of the pair is favored at the given intensity
    pub fn favoring_first(intensity: Intensity) -> Self {
        Self {
            side: Side::First,
            intensity,
        }
    }

    /// The second item of the pair is favored at the given intensity
    pub fn favoring_second(intensity: Intensity) -> Self {
        Self {
            side: Side::Second,
            intensity,
        }
    }

    /// Numeric value for the `(first, second)` cell of the matrix
    pub fn value(&self) -> f64 {
        match self.side {
            Side::First => self.intensity.value(),
            Side::Second => 1.0 / self.intensity.value(),
        }
    }
}
