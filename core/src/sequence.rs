use alloc::vec::Vec;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::*;

/// One element of the sequence: where to flash, with which color, and which note to play.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub tile: Tile,
    pub color: FlashColor,
    pub note: Note,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SequenceState {
    Idle,
    Building,
    Playing,
    AwaitingInput,
    LevelComplete,
    LevelFailed,
}

impl SequenceState {
    pub const fn can_extend(self) -> bool {
        matches!(self, Self::Idle | Self::LevelComplete)
    }
}

impl Default for SequenceState {
    fn default() -> Self {
        Self::Idle
    }
}

/// Result of checking one click against the sequence.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// Matched the expected step, more steps to go.
    Correct,
    /// Matched the last step of the sequence.
    Complete,
    Wrong,
}

impl Verdict {
    pub const fn is_correct(self) -> bool {
        matches!(self, Self::Correct | Self::Complete)
    }
}

/// Signal raised by the engine while handling its own timers.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EngineSignal {
    SequenceFinished,
}

/// Growing sequence of steps with timed playback and replay verification.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SequenceEngine {
    steps: Vec<Step>,
    cursor: usize,
    state: SequenceState,
    generation: Generation,
    timing: Timing,
}

impl SequenceEngine {
    pub fn new(timing: Timing) -> Result<Self> {
        timing.validate()?;
        Ok(Self {
            steps: Vec::new(),
            cursor: 0,
            state: Default::default(),
            generation: 0,
            timing,
        })
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn state(&self) -> SequenceState {
        self.state
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    /// Step the player has to click next, if any.
    pub fn expected(&self) -> Option<&Step> {
        self.steps.get(self.cursor)
    }

    pub fn is_sequence_complete(&self) -> bool {
        self.cursor == self.steps.len()
    }

    /// Appends one random step whose tile differs from the previous step's tile.
    pub fn extend<D, A>(
        &mut self,
        board: &Board<D>,
        cues: &CuePlayer<A>,
        rng: &mut SmallRng,
    ) -> Result<&Step>
    where
        D: TileDisplay,
        A: AudioOutput,
    {
        self.check_state("extend", self.state.can_extend())?;
        if board.tile_count() < 2 {
            return Err(GameError::BoardTooSmall);
        }
        self.state = SequenceState::Building;

        let previous = self.steps.last().map(|step| step.tile);
        let tile = loop {
            let tile = board.random_tile(rng)?;
            if Some(tile) != previous {
                break tile;
            }
        };
        let step = Step {
            tile,
            color: FlashColor::random(rng),
            note: cues.random_note(rng),
        };
        self.steps.push(step);
        self.cursor = 0;
        log::debug!(
            "sequence extended to {} steps, new step {} {:?} {}",
            self.steps.len(),
            step.tile,
            step.color,
            step.note.letter()
        );

        Ok(&self.steps[self.steps.len() - 1])
    }

    /// Schedules the flash of every step, one `unit_delay` apart, followed by the end of playback.
    pub fn play<S: Scheduler + ?Sized>(&mut self, scheduler: &mut S) -> Result<()> {
        self.check_state(
            "play",
            self.state == SequenceState::Building && !self.steps.is_empty(),
        )?;

        self.generation = self.generation.wrapping_add(1);
        self.state = SequenceState::Playing;
        let generation = self.generation;
        for index in 0..self.steps.len() {
            scheduler.schedule(
                self.timing.playback_length(index),
                Timer::ShowStep { generation, index },
            );
        }
        scheduler.schedule(
            self.timing.playback_length(self.steps.len()),
            Timer::PlaybackDone { generation },
        );
        log::debug!("playing {} steps, generation {}", self.steps.len(), generation);
        Ok(())
    }

    /// Checks `tile` against the expected step.
    ///
    /// A match lights the tile for `pulse_duration` and advances the cursor, a mismatch leaves the
    /// cursor where it was and moves to [`SequenceState::LevelFailed`].
    pub fn verify<D, S>(
        &mut self,
        tile: Tile,
        board: &mut Board<D>,
        scheduler: &mut S,
    ) -> Result<Verdict>
    where
        D: TileDisplay,
        S: Scheduler + ?Sized,
    {
        self.check_state("verify", matches!(self.state, SequenceState::AwaitingInput))?;
        let tile = board.validate(tile)?;
        let Some(&expected) = self.steps.get(self.cursor) else {
            return Err(GameError::InvalidState {
                op: "verify",
                state: self.state,
            });
        };

        if tile != expected.tile {
            log::debug!("wrong tile {}, expected {}", tile, expected.tile);
            self.state = SequenceState::LevelFailed;
            return Ok(Verdict::Wrong);
        }

        board.set_visual(tile, VisualState::Flashed(expected.color))?;
        scheduler.schedule(
            self.timing.pulse_duration,
            Timer::EndPulse {
                generation: self.generation,
                tile,
            },
        );
        self.cursor += 1;

        if self.is_sequence_complete() {
            self.state = SequenceState::LevelComplete;
            Ok(Verdict::Complete)
        } else {
            Ok(Verdict::Correct)
        }
    }

    /// Lets the player continue after a failed click.
    pub fn resume(&mut self, policy: RetryPolicy) -> Result<()> {
        self.check_state("resume", matches!(self.state, SequenceState::LevelFailed))?;
        if policy == RetryPolicy::FromStart {
            self.cursor = 0;
        }
        self.state = SequenceState::AwaitingInput;
        Ok(())
    }

    /// Drops every step, timers scheduled before this call become stale.
    pub fn reset(&mut self) {
        self.steps.clear();
        self.cursor = 0;
        self.state = SequenceState::Idle;
        self.generation = self.generation.wrapping_add(1);
        log::debug!("sequence reset, generation {}", self.generation);
    }

    /// Note of the first step on a tile equal to `tile`.
    pub fn note_for_tile(&self, tile: Tile) -> Option<Note> {
        self.steps
            .iter()
            .find(|step| step.tile == tile)
            .map(|step| step.note)
    }

    pub fn is_current(&self, timer: Timer) -> bool {
        timer.generation() == self.generation
    }

    /// Handles one of the playback timers, ignoring it when it belongs to an older generation.
    pub fn handle_timer<D, A, S>(
        &mut self,
        timer: Timer,
        board: &mut Board<D>,
        cues: &mut CuePlayer<A>,
        scheduler: &mut S,
    ) -> Result<Option<EngineSignal>>
    where
        D: TileDisplay,
        A: AudioOutput,
        S: Scheduler + ?Sized,
    {
        if !self.is_current(timer) {
            log::trace!("stale timer {:?}, current generation {}", timer, self.generation);
            return Ok(None);
        }

        match timer {
            Timer::ShowStep { generation, index } => {
                let Some(&step) = self.playing_step(index) else {
                    return Ok(None);
                };
                board.set_visual(step.tile, VisualState::Flashed(step.color))?;
                cues.play_note(step.note);
                scheduler.schedule(
                    self.timing.flash_duration,
                    Timer::HideStep { generation, index },
                );
                Ok(None)
            }
            Timer::HideStep { index, .. } => {
                if let Some(&step) = self.steps.get(index) {
                    board.set_visual(step.tile, VisualState::Default)?;
                }
                Ok(None)
            }
            Timer::PlaybackDone { .. } => {
                if self.state != SequenceState::Playing {
                    return Ok(None);
                }
                self.state = SequenceState::AwaitingInput;
                log::debug!("playback finished, awaiting input");
                Ok(Some(EngineSignal::SequenceFinished))
            }
            Timer::EndPulse { tile, .. } => {
                // an error mark set since the pulse started wins
                if matches!(board.visual_at(tile)?, VisualState::Flashed(_)) {
                    board.set_visual(tile, VisualState::Default)?;
                }
                Ok(None)
            }
            Timer::NextLevel { .. } | Timer::Retry { .. } | Timer::GameOver { .. } => {
                log::warn!("timer {:?} is not a playback timer", timer);
                Ok(None)
            }
        }
    }

    fn playing_step(&self, index: usize) -> Option<&Step> {
        if self.state == SequenceState::Playing {
            self.steps.get(index)
        } else {
            None
        }
    }

    fn check_state(&self, op: &'static str, allowed: bool) -> Result<()> {
        if allowed {
            Ok(())
        } else {
            Err(GameError::InvalidState {
                op,
                state: self.state,
            })
        }
    }
}
