//! Sequence-and-verification engine of a memory tiles game.
//!
//! The shell supplies three capabilities: a [`TileDisplay`] mirroring tile visuals, an
//! [`AudioOutput`] for cues, and a [`Scheduler`] that hands [`Timer`]s back through
//! [`Game::fire`] once their delay has passed. Everything else happens here, on whatever single
//! thread the shell drives the game from.
#![no_std]

extern crate alloc;

pub use board::*;
pub use config::*;
pub use cue::*;
pub use error::*;
pub use game::*;
pub use scheduler::*;
pub use sequence::*;
pub use setup::*;
pub use tile::*;
pub use tracker::*;
pub use types::*;

mod board;
mod config;
mod cue;
mod error;
mod game;
mod scheduler;
mod sequence;
mod setup;
mod tile;
mod tracker;
mod types;
