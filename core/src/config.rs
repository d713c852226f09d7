use alloc::string::{String, ToString};
use core::time::Duration;
use serde::{Deserialize, Serialize};

use crate::*;

pub const DEFAULT_PLAYER_NAME: &str = "Player";
pub const DEFAULT_SIZE: Coord2 = (3, 3);
pub const DEFAULT_LIVES: u16 = 3;

/// Every delay the game schedules.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    /// Distance between the start of two consecutive steps during playback.
    pub unit_delay: Duration,
    /// How long a step stays lit during playback, must be shorter than `unit_delay`.
    pub flash_duration: Duration,
    /// Confirmation flash after a correct click.
    pub pulse_duration: Duration,
    pub level_pause: Duration,
    pub retry_pause: Duration,
    pub game_over_pause: Duration,
    pub intro_pause: Duration,
}

impl Timing {
    pub fn validate(&self) -> Result<()> {
        if self.flash_duration < self.unit_delay {
            Ok(())
        } else {
            Err(GameError::InvalidTiming)
        }
    }

    /// Length of a full playback of `steps` steps.
    pub fn playback_length(&self, steps: usize) -> Duration {
        self.unit_delay * u32::try_from(steps).unwrap_or(u32::MAX)
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            unit_delay: Duration::from_secs(1),
            flash_duration: Duration::from_millis(500),
            pulse_duration: Duration::from_millis(300),
            level_pause: Duration::from_secs(1),
            retry_pause: Duration::from_millis(1500),
            game_over_pause: Duration::from_millis(1500),
            intro_pause: Duration::from_millis(750),
        }
    }
}

/// Where replay resumes after a wrong click that still leaves lives.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RetryPolicy {
    /// Keep the progress made so far, the next click is checked against the step that was missed.
    FromFailure,
    /// Start over from the first step of the current sequence.
    FromStart,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::FromFailure
    }
}

/// Settings fixed for one session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub size: Coord2,
    pub lives: u16,
    pub player_name: String,
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub timing: Timing,
    #[serde(default)]
    pub retry: RetryPolicy,
}

impl SessionConfig {
    pub fn new(size: Coord2, lives: u16, player_name: &str) -> Result<Self> {
        let (rows, cols) = size;
        if !is_valid_extent(rows) || !is_valid_extent(cols) {
            return Err(GameError::InvalidGridSize);
        }
        Ok(Self {
            size,
            lives,
            player_name: normalize_name(player_name),
            ..Default::default()
        })
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub const fn rows(&self) -> Coord {
        self.size.0
    }

    pub const fn columns(&self) -> Coord {
        self.size.1
    }

    pub const fn total_tiles(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }

    pub fn validate(&self) -> Result<()> {
        let (rows, cols) = self.size;
        if !is_valid_extent(rows) || !is_valid_extent(cols) {
            return Err(GameError::InvalidGridSize);
        }
        self.timing.validate()
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            lives: DEFAULT_LIVES,
            player_name: DEFAULT_PLAYER_NAME.to_string(),
            seed: 0,
            timing: Default::default(),
            retry: Default::default(),
        }
    }
}

pub(crate) fn normalize_name(name: &str) -> String {
    let name = name.trim();
    if name.is_empty() {
        DEFAULT_PLAYER_NAME.to_string()
    } else {
        name.to_string()
    }
}
