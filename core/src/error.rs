use thiserror::Error;

use crate::{Cue, Phase, SequenceState};

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Tile is not part of this board")]
    InvalidTile,
    #[error("Grid size must be between {min}x{min} and {max}x{max}", min = crate::MIN_GRID, max = crate::MAX_GRID)]
    InvalidGridSize,
    #[error("Board needs at least two tiles to build a sequence")]
    BoardTooSmall,
    #[error("Flash duration must be shorter than the delay between steps")]
    InvalidTiming,
    #[error("Cannot {op} while the sequence is {state:?}")]
    InvalidState {
        op: &'static str,
        state: SequenceState,
    },
    #[error("Cannot {op} while the game is {phase:?}")]
    InvalidPhase { op: &'static str, phase: Phase },
}

pub type Result<T> = core::result::Result<T, GameError>;

/// Failure to prepare a single audio cue, recovered by playing it silently.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AudioError {
    #[error("Could not load cue {cue}: {reason}")]
    Load { cue: Cue, reason: alloc::string::String },
    #[error("No audio output available")]
    Unavailable,
}
