use core::fmt;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::*;

/// One of the seven note cues, `a` through `g`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Note {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
}

impl Note {
    pub const ALL: [Note; 7] = [
        Self::A,
        Self::B,
        Self::C,
        Self::D,
        Self::E,
        Self::F,
        Self::G,
    ];

    pub const fn letter(self) -> char {
        use Note::*;
        match self {
            A => 'a',
            B => 'b',
            C => 'c',
            D => 'd',
            E => 'e',
            F => 'f',
            G => 'g',
        }
    }

    pub fn from_letter(letter: char) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|note| note.letter() == letter.to_ascii_lowercase())
    }

    const fn index(self) -> usize {
        self as usize
    }
}

/// Symbolic sound cue.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cue {
    Note(Note),
    Wrong,
    Intro,
    Outro,
}

impl Cue {
    pub const ALL: [Cue; 10] = [
        Self::Note(Note::A),
        Self::Note(Note::B),
        Self::Note(Note::C),
        Self::Note(Note::D),
        Self::Note(Note::E),
        Self::Note(Note::F),
        Self::Note(Note::G),
        Self::Wrong,
        Self::Intro,
        Self::Outro,
    ];

    /// Asset stem the shell loads this cue from, e.g. `"c"` for `c.wav`.
    pub const fn file_stem(self) -> &'static str {
        match self {
            Self::Note(note) => match note {
                Note::A => "a",
                Note::B => "b",
                Note::C => "c",
                Note::D => "d",
                Note::E => "e",
                Note::F => "f",
                Note::G => "g",
            },
            Self::Wrong => "wrong",
            Self::Intro => "letsgo",
            Self::Outro => "goodbye",
        }
    }

    const fn slot(self) -> usize {
        match self {
            Self::Note(note) => note.index(),
            Self::Wrong => 7,
            Self::Intro => 8,
            Self::Outro => 9,
        }
    }
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Note(note) => write!(f, "{}", note.letter()),
            Self::Wrong => f.write_str("wrong"),
            Self::Intro => f.write_str("start"),
            Self::Outro => f.write_str("end"),
        }
    }
}

/// Audio collaborator: prepares clips once, then plays them on demand.
pub trait AudioOutput {
    type Clip;

    fn load(&mut self, cue: Cue) -> core::result::Result<Self::Clip, AudioError>;

    fn play(&mut self, clip: &Self::Clip);
}

/// Output that accepts every cue and never makes a sound.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Silence;

impl AudioOutput for Silence {
    type Clip = ();

    fn load(&mut self, _cue: Cue) -> core::result::Result<(), AudioError> {
        Ok(())
    }

    fn play(&mut self, _clip: &()) {}
}

/// Plays named cues, skipping any whose clip failed to load.
pub struct CuePlayer<A: AudioOutput> {
    output: A,
    clips: [Option<A::Clip>; 10],
}

impl<A: AudioOutput> CuePlayer<A> {
    pub fn new(mut output: A) -> Self {
        let clips = Cue::ALL.map(|cue| match output.load(cue) {
            Ok(clip) => Some(clip),
            Err(err) => {
                log::warn!("{}, it will play silently", err);
                None
            }
        });
        Self { output, clips }
    }

    pub fn is_loaded(&self, cue: Cue) -> bool {
        self.clips[cue.slot()].is_some()
    }

    pub fn play(&mut self, cue: Cue) {
        match &self.clips[cue.slot()] {
            Some(clip) => {
                log::trace!("play cue {}", cue);
                self.output.play(clip);
            }
            None => log::trace!("cue {} unavailable, skipped", cue),
        }
    }

    pub fn play_note(&mut self, note: Note) {
        self.play(Cue::Note(note));
    }

    pub fn play_wrong(&mut self) {
        self.play(Cue::Wrong);
    }

    pub fn play_intro(&mut self) {
        self.play(Cue::Intro);
    }

    pub fn play_outro(&mut self) {
        self.play(Cue::Outro);
    }

    pub fn random_note(&self, rng: &mut SmallRng) -> Note {
        Note::ALL[rng.random_range(0..Note::ALL.len())]
    }

    pub fn output(&self) -> &A {
        &self.output
    }
}

impl<A> fmt::Debug for CuePlayer<A>
where
    A: AudioOutput + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let loaded = Cue::ALL.iter().filter(|&&cue| self.is_loaded(cue)).count();
        f.debug_struct("CuePlayer")
            .field("output", &self.output)
            .field("loaded", &loaded)
            .finish()
    }
}
