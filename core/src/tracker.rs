use alloc::string::String;
use core::num::Saturating;
use serde::{Deserialize, Serialize};

/// Lives left in the session, never below zero.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lives {
    remaining: u16,
    initial: u16,
}

impl Lives {
    pub const fn new(initial: u16) -> Self {
        Self {
            remaining: initial,
            initial,
        }
    }

    pub const fn remaining(self) -> u16 {
        self.remaining
    }

    pub const fn initial(self) -> u16 {
        self.initial
    }

    pub const fn is_exhausted(self) -> bool {
        self.remaining == 0
    }

    /// Takes one life if any is left and returns how many remain.
    pub fn lose_life(&mut self) -> u16 {
        self.remaining = self.remaining.saturating_sub(1);
        self.remaining
    }

    pub fn restore(&mut self) {
        self.remaining = self.initial;
    }
}

/// Score and lives of the player for the running session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tracker {
    player_name: String,
    score: Saturating<u32>,
    lives: Lives,
}

impl Tracker {
    pub fn new(player_name: String, lives: u16) -> Self {
        Self {
            player_name,
            score: Saturating(0),
            lives: Lives::new(lives),
        }
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    pub fn score(&self) -> u32 {
        self.score.0
    }

    pub fn increment(&mut self) {
        self.score += 1;
    }

    pub fn reset(&mut self) {
        self.score = Saturating(0);
    }

    pub fn lives(&self) -> Lives {
        self.lives
    }

    pub fn lose_life(&mut self) -> u16 {
        self.lives.lose_life()
    }

    pub fn restore(&mut self) {
        self.lives.restore();
    }
}
