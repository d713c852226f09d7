use alloc::string::String;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::normalize_name;
use crate::*;

/// Raw text entered on the setup screen.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SetupForm {
    pub name: String,
    pub rows: String,
    pub columns: String,
    pub lives: String,
}

impl Default for SetupForm {
    fn default() -> Self {
        use alloc::string::ToString;
        Self {
            name: String::new(),
            rows: DEFAULT_SIZE.0.to_string(),
            columns: DEFAULT_SIZE.1.to_string(),
            lives: DEFAULT_LIVES.to_string(),
        }
    }
}

/// Something in the setup form was replaced by a default, shown to the player as is.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SetupNotice {
    #[error("Invalid input. Using default 3x3.")]
    GridNotNumeric,
    #[error("Minimum size is 2x2. Using default 3x3.")]
    GridTooSmall,
    #[error("Maximum size is 7x7. Using default 3x3.")]
    GridTooLarge,
    #[error("Invalid input. Using default of 3 lives.")]
    LivesNotNumeric,
    #[error("Lives must be 0 or more. Using default of 3 lives.")]
    LivesNegative,
    #[error("Too many lives. Using default of 3 lives.")]
    LivesTooMany,
}

/// Outcome of reading a [`SetupForm`], always usable.
#[derive(Clone, Debug, PartialEq)]
pub struct Setup {
    pub config: SessionConfig,
    pub notices: Vec<SetupNotice>,
}

impl SetupForm {
    /// Reads the form, replacing any unusable value with its default.
    ///
    /// Rows and columns are accepted or rejected together, so a bad value in either yields the
    /// default 3x3 grid.
    pub fn parse(&self) -> Setup {
        let mut notices = Vec::new();

        let size = match (parse_int(&self.rows), parse_int(&self.columns)) {
            (Some(rows), Some(cols)) => {
                if rows < MIN_GRID.into() || cols < MIN_GRID.into() {
                    notices.push(SetupNotice::GridTooSmall);
                    DEFAULT_SIZE
                } else if rows > MAX_GRID.into() || cols > MAX_GRID.into() {
                    notices.push(SetupNotice::GridTooLarge);
                    DEFAULT_SIZE
                } else {
                    (rows as Coord, cols as Coord)
                }
            }
            _ => {
                notices.push(SetupNotice::GridNotNumeric);
                DEFAULT_SIZE
            }
        };

        let lives = match parse_int(&self.lives) {
            Some(lives) if lives < 0 => {
                notices.push(SetupNotice::LivesNegative);
                DEFAULT_LIVES
            }
            Some(lives) => u16::try_from(lives).unwrap_or_else(|_| {
                notices.push(SetupNotice::LivesTooMany);
                DEFAULT_LIVES
            }),
            None => {
                notices.push(SetupNotice::LivesNotNumeric);
                DEFAULT_LIVES
            }
        };

        for notice in &notices {
            log::debug!("setup: {}", notice);
        }

        Setup {
            config: SessionConfig {
                size,
                lives,
                player_name: normalize_name(&self.name),
                ..Default::default()
            },
            notices,
        }
    }
}

fn parse_int(text: &str) -> Option<i64> {
    text.trim().parse().ok()
}
