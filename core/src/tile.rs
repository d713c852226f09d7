use core::fmt;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::*;

/// A single addressable cell of the board, identified by its position.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Tile {
    row: Coord,
    col: Coord,
}

impl Tile {
    pub const fn new(row: Coord, col: Coord) -> Self {
        Self { row, col }
    }

    pub const fn row(self) -> Coord {
        self.row
    }

    pub const fn col(self) -> Coord {
        self.col
    }
}

impl ToNdIndex for Tile {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        (self.row, self.col).to_nd_index()
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Colors a tile can flash with.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlashColor {
    LightGoldenrodYellow,
    Purple,
    BlanchedAlmond,
    LightCyan,
    BlueViolet,
    Magenta,
    LightPink,
    Aqua,
    Beige,
    Lavender,
    LightBlue,
    LightCoral,
    LightGreen,
    LightSkyBlue,
}

impl FlashColor {
    pub const ALL: [FlashColor; 14] = [
        Self::LightGoldenrodYellow,
        Self::Purple,
        Self::BlanchedAlmond,
        Self::LightCyan,
        Self::BlueViolet,
        Self::Magenta,
        Self::LightPink,
        Self::Aqua,
        Self::Beige,
        Self::Lavender,
        Self::LightBlue,
        Self::LightCoral,
        Self::LightGreen,
        Self::LightSkyBlue,
    ];

    pub fn random(rng: &mut SmallRng) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    /// CSS named color matching this flash.
    pub const fn css_name(self) -> &'static str {
        use FlashColor::*;
        match self {
            LightGoldenrodYellow => "lightgoldenrodyellow",
            Purple => "purple",
            BlanchedAlmond => "blanchedalmond",
            LightCyan => "lightcyan",
            BlueViolet => "blueviolet",
            Magenta => "magenta",
            LightPink => "lightpink",
            Aqua => "aqua",
            Beige => "beige",
            Lavender => "lavender",
            LightBlue => "lightblue",
            LightCoral => "lightcoral",
            LightGreen => "lightgreen",
            LightSkyBlue => "lightskyblue",
        }
    }
}

/// What a tile currently displays.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VisualState {
    Default,
    Flashed(FlashColor),
    Error,
}

impl VisualState {
    pub const fn is_default(self) -> bool {
        matches!(self, Self::Default)
    }
}

impl Default for VisualState {
    fn default() -> Self {
        Self::Default
    }
}
