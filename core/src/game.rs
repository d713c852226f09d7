use alloc::string::String;
use alloc::vec::Vec;
use core::mem;
use core::time::Duration;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Created, first level not started yet.
    Ready,
    /// Sequence is being shown, input disabled.
    Watching,
    /// Player is repeating the sequence.
    Repeating,
    /// Pause after a completed level.
    Advancing,
    /// Pause after a wrong click with lives left.
    Penalty,
    /// Pause after the last life was lost.
    Ending,
    /// Waiting for the player to replay or quit.
    GameOver,
    Quit,
}

impl Phase {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::GameOver | Self::Quit)
    }
}

impl Default for Phase {
    fn default() -> Self {
        Self::Ready
    }
}

/// Lifecycle signals for the shell, collected with [`Game::take_events`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    LevelStarted {
        level: usize,
    },
    SequenceFinished,
    ClickResult {
        tile: Tile,
        correct: bool,
        lives_remaining: u16,
        score: u32,
    },
    LevelCompleted {
        level: usize,
    },
    GameOver {
        score: u32,
        player_name: String,
    },
    Quit,
}

/// Drives the show, repeat, advance-or-fail cycle of one session.
pub struct Game<D: TileDisplay, A: AudioOutput, S: Scheduler> {
    config: SessionConfig,
    board: Board<D>,
    cues: CuePlayer<A>,
    scheduler: S,
    engine: SequenceEngine,
    tracker: Tracker,
    rng: SmallRng,
    phase: Phase,
    events: Vec<GameEvent>,
}

impl<D: TileDisplay, A: AudioOutput, S: Scheduler> Game<D, A, S> {
    pub fn new(config: SessionConfig, display: D, audio: A, scheduler: S) -> Result<Self> {
        config.validate()?;
        let board = Board::new(config.size, display)?;
        let engine = SequenceEngine::new(config.timing)?;
        let tracker = Tracker::new(config.player_name.clone(), config.lives);
        let rng = SmallRng::seed_from_u64(config.seed);
        log::info!(
            "new game for {}: {}x{} grid ({} tiles), {} lives, seed {}",
            config.player_name,
            config.rows(),
            config.columns(),
            config.total_tiles(),
            config.lives,
            config.seed
        );
        Ok(Self {
            config,
            board,
            cues: CuePlayer::new(audio),
            scheduler,
            engine,
            tracker,
            rng,
            phase: Default::default(),
            events: Vec::new(),
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn board(&self) -> &Board<D> {
        &self.board
    }

    pub fn cues(&self) -> &CuePlayer<A> {
        &self.cues
    }

    pub fn engine(&self) -> &SequenceEngine {
        &self.engine
    }

    pub fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Current level, equal to the sequence length.
    pub fn level(&self) -> usize {
        self.engine.len()
    }

    pub fn score(&self) -> u32 {
        self.tracker.score()
    }

    pub fn lives_remaining(&self) -> u16 {
        self.tracker.lives().remaining()
    }

    pub fn accepts_input(&self) -> bool {
        self.phase == Phase::Repeating && self.board.is_clickable()
    }

    pub fn take_events(&mut self) -> Vec<GameEvent> {
        mem::take(&mut self.events)
    }

    /// Starts the first level.
    pub fn start(&mut self) -> Result<()> {
        self.check_phase("start", self.phase == Phase::Ready)?;
        self.start_level()
    }

    fn start_level(&mut self) -> Result<()> {
        self.board.reset_all();
        self.engine.extend(&self.board, &self.cues, &mut self.rng)?;
        self.board.set_all_clickable(false);
        self.engine.play(&mut self.scheduler)?;
        self.phase = Phase::Watching;

        let level = self.level();
        log::info!("level {} started", level);
        self.events.push(GameEvent::LevelStarted { level });
        Ok(())
    }

    /// Routes a player click to the sequence engine.
    ///
    /// Clicks while input is disabled are dropped and yield `None`.
    pub fn click(&mut self, tile: Tile) -> Result<Option<Verdict>> {
        if !self.accepts_input() {
            log::debug!("click on {} ignored, input disabled", tile);
            return Ok(None);
        }

        let verdict = self
            .engine
            .verify(tile, &mut self.board, &mut self.scheduler)?;
        let generation = self.engine.generation();
        let timing = *self.engine.timing();

        if verdict.is_correct() {
            if let Some(note) = self.engine.note_for_tile(tile) {
                self.cues.play_note(note);
            }
            self.tracker.increment();
            self.push_click_result(tile, true);

            if verdict == Verdict::Complete {
                self.board.set_all_clickable(false);
                self.phase = Phase::Advancing;
                let level = self.level();
                log::info!("level {} complete, score {}", level, self.score());
                self.events.push(GameEvent::LevelCompleted { level });
                self.scheduler
                    .schedule(timing.level_pause, Timer::NextLevel { generation });
            }
        } else {
            self.cues.play_wrong();
            self.board.set_visual(tile, VisualState::Error)?;
            self.board.set_all_clickable(false);
            let lives = self.tracker.lose_life();
            self.push_click_result(tile, false);

            if lives == 0 {
                log::info!("out of lives");
                self.phase = Phase::Ending;
                self.scheduler
                    .schedule(timing.game_over_pause, Timer::GameOver { generation });
            } else {
                log::debug!("{} lives left", lives);
                self.phase = Phase::Penalty;
                self.scheduler
                    .schedule(timing.retry_pause, Timer::Retry { generation });
            }
        }

        Ok(Some(verdict))
    }

    /// Delivers a timer previously handed to the scheduler.
    pub fn fire(&mut self, timer: Timer) -> Result<()> {
        log::trace!("fire {:?}", timer);
        if timer.is_playback() {
            let signal = self.engine.handle_timer(
                timer,
                &mut self.board,
                &mut self.cues,
                &mut self.scheduler,
            )?;
            if signal == Some(EngineSignal::SequenceFinished) {
                self.board.set_all_clickable(true);
                self.phase = Phase::Repeating;
                self.events.push(GameEvent::SequenceFinished);
            }
            return Ok(());
        }

        if !self.engine.is_current(timer) {
            log::trace!("stale timer {:?}", timer);
            return Ok(());
        }

        match timer {
            Timer::NextLevel { .. } if matches!(self.phase, Phase::Advancing | Phase::Ready) => {
                self.start_level()
            }
            Timer::Retry { .. } if self.phase == Phase::Penalty => {
                self.engine.resume(self.config.retry)?;
                self.board.reset_all();
                self.board.set_all_clickable(true);
                self.phase = Phase::Repeating;
                Ok(())
            }
            Timer::GameOver { .. } if self.phase == Phase::Ending => {
                self.phase = Phase::GameOver;
                log::info!(
                    "game over for {}, score {}",
                    self.tracker.player_name(),
                    self.score()
                );
                self.events.push(GameEvent::GameOver {
                    score: self.score(),
                    player_name: String::from(self.tracker.player_name()),
                });
                Ok(())
            }
            _ => {
                log::debug!("timer {:?} does not apply in phase {:?}", timer, self.phase);
                Ok(())
            }
        }
    }

    /// Starts a new round with the same settings after the game ended.
    pub fn replay(&mut self) -> Result<()> {
        self.check_phase("replay", self.phase == Phase::GameOver)?;
        log::info!("replay for {}", self.tracker.player_name());

        self.cues.play_intro();
        self.tracker.reset();
        self.tracker.restore();
        self.engine.reset();
        self.board.reset_all();
        self.board.set_all_clickable(false);
        self.phase = Phase::Ready;
        self.scheduler.schedule(
            self.config.timing.intro_pause,
            Timer::NextLevel {
                generation: self.engine.generation(),
            },
        );
        Ok(())
    }

    /// Ends the session for good.
    pub fn quit(&mut self) -> Result<()> {
        self.check_phase("quit", self.phase != Phase::Quit)?;
        log::info!("{} quit with score {}", self.tracker.player_name(), self.score());

        self.cues.play_outro();
        self.engine.reset();
        self.board.set_all_clickable(false);
        self.phase = Phase::Quit;
        self.events.push(GameEvent::Quit);
        Ok(())
    }

    fn push_click_result(&mut self, tile: Tile, correct: bool) {
        self.events.push(GameEvent::ClickResult {
            tile,
            correct,
            lives_remaining: self.lives_remaining(),
            score: self.score(),
        });
    }

    fn check_phase(&self, op: &'static str, allowed: bool) -> Result<()> {
        if allowed {
            Ok(())
        } else {
            Err(GameError::InvalidPhase {
                op,
                phase: self.phase,
            })
        }
    }
}

impl<D: TileDisplay, A: AudioOutput> Game<D, A, TimerQueue> {
    /// Lets `by` pass on the virtual clock, firing every timer that comes due on the way.
    ///
    /// Each timer fires at its own due time, so timers it schedules are measured from there.
    pub fn advance(&mut self, by: Duration) -> Result<()> {
        let until = self.scheduler.now() + by;
        while let Some(timer) = self.scheduler.pop_due(until) {
            self.fire(timer)?;
        }
        self.scheduler.settle(until);
        Ok(())
    }
}

impl<D, A, S> core::fmt::Debug for Game<D, A, S>
where
    D: TileDisplay + core::fmt::Debug,
    A: AudioOutput + core::fmt::Debug,
    S: Scheduler + core::fmt::Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Game")
            .field("config", &self.config)
            .field("phase", &self.phase)
            .field("engine", &self.engine)
            .field("tracker", &self.tracker)
            .field("board", &self.board)
            .field("cues", &self.cues)
            .field("scheduler", &self.scheduler)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use core::time::Duration;

    type TestGame = Game<(), Silence, TimerQueue>;

    fn game(lives: u16, seed: u64) -> TestGame {
        let config = SessionConfig::new((3, 3), lives, "Ada")
            .unwrap()
            .with_seed(seed);
        Game::new(config, (), Silence, TimerQueue::new()).unwrap()
    }

    fn run_timers(game: &mut TestGame) {
        while let Some(timer) = game.scheduler_mut().pop_next() {
            game.fire(timer).unwrap();
        }
    }

    /// Runs timers until the player may click again.
    fn run_until_input(game: &mut TestGame) {
        while !game.accepts_input() {
            let timer = game.scheduler_mut().pop_next().unwrap();
            game.fire(timer).unwrap();
        }
    }

    fn wrong_tile(game: &TestGame) -> Tile {
        let expected = game.engine().expected().unwrap().tile;
        *game
            .board()
            .tiles()
            .iter()
            .find(|&&tile| tile != expected)
            .unwrap()
    }

    #[test]
    fn start_shows_first_step_with_input_disabled() {
        let mut game = game(3, 1);

        game.start().unwrap();

        assert_eq!(game.phase(), Phase::Watching);
        assert_eq!(game.level(), 1);
        assert!(!game.board().is_clickable());
        assert_eq!(game.take_events(), vec![GameEvent::LevelStarted { level: 1 }]);

        run_until_input(&mut game);
        assert_eq!(game.phase(), Phase::Repeating);
        assert_eq!(game.take_events(), vec![GameEvent::SequenceFinished]);
    }

    #[test]
    fn completing_a_level_extends_after_pause() {
        let mut game = game(3, 2);
        game.start().unwrap();
        run_until_input(&mut game);
        let first = game.engine().steps()[0];

        let verdict = game.click(first.tile).unwrap();

        assert_eq!(verdict, Some(Verdict::Complete));
        assert_eq!(game.phase(), Phase::Advancing);
        assert!(!game.board().is_clickable());
        assert_eq!(game.score(), 1);

        let before = game.scheduler().now();
        run_until_input(&mut game);
        assert!(game.scheduler().now() >= before + Duration::from_secs(1));
        assert_eq!(game.level(), 2);
        assert_eq!(game.engine().steps()[0], first);
    }

    #[test]
    fn wrong_click_costs_a_life_and_keeps_progress() {
        let mut game = game(3, 3);
        game.start().unwrap();
        run_until_input(&mut game);
        game.take_events();
        let tile = wrong_tile(&game);

        assert_eq!(game.click(tile).unwrap(), Some(Verdict::Wrong));

        assert_eq!(game.lives_remaining(), 2);
        assert_eq!(game.score(), 0);
        assert_eq!(game.engine().cursor(), 0);
        assert_eq!(game.phase(), Phase::Penalty);
        assert_eq!(game.board().visual_at(tile).unwrap(), VisualState::Error);
        assert_eq!(
            game.take_events(),
            vec![GameEvent::ClickResult {
                tile,
                correct: false,
                lives_remaining: 2,
                score: 0
            }]
        );

        // clicks during the penalty pause are dropped
        assert_eq!(game.click(tile).unwrap(), None);

        run_until_input(&mut game);
        assert_eq!(game.phase(), Phase::Repeating);
        assert!(game.board().visual_at(tile).unwrap().is_default());
        assert_eq!(game.level(), 1);
    }

    #[test]
    fn last_life_ends_the_game() {
        let mut game = game(1, 4);
        game.start().unwrap();
        run_until_input(&mut game);
        let first = game.engine().steps()[0].tile;
        game.click(first).unwrap();
        run_until_input(&mut game);
        game.take_events();

        let tile = wrong_tile(&game);
        game.click(tile).unwrap();
        assert_eq!(game.lives_remaining(), 0);
        assert_eq!(game.phase(), Phase::Ending);

        run_timers(&mut game);
        assert_eq!(game.phase(), Phase::GameOver);
        let events = game.take_events();
        assert_eq!(
            events.last(),
            Some(&GameEvent::GameOver {
                score: 1,
                player_name: "Ada".into()
            })
        );
    }

    #[test]
    fn replay_resets_everything_but_config() {
        let mut game = game(1, 5);
        game.start().unwrap();
        run_until_input(&mut game);
        let first = game.engine().steps()[0].tile;
        game.click(first).unwrap();
        run_until_input(&mut game);
        let tile = wrong_tile(&game);
        game.click(tile).unwrap();
        run_timers(&mut game);
        assert!(game.phase().is_finished());

        game.replay().unwrap();
        assert_eq!(game.score(), 0);
        assert_eq!(game.lives_remaining(), 1);
        assert_eq!(game.level(), 0);

        run_until_input(&mut game);
        assert_eq!(game.level(), 1);
        assert_eq!(game.phase(), Phase::Repeating);
    }

    #[test]
    fn replay_only_after_game_over() {
        let mut game = game(3, 6);
        game.start().unwrap();

        assert_eq!(
            game.replay(),
            Err(GameError::InvalidPhase {
                op: "replay",
                phase: Phase::Watching
            })
        );
        assert_eq!(
            game.start(),
            Err(GameError::InvalidPhase {
                op: "start",
                phase: Phase::Watching
            })
        );
    }

    #[test]
    fn quit_stops_pending_work() {
        let mut game = game(3, 7);
        game.start().unwrap();

        game.quit().unwrap();
        run_timers(&mut game);

        assert_eq!(game.phase(), Phase::Quit);
        assert!(!game.board().is_clickable());
        assert_eq!(game.take_events().last(), Some(&GameEvent::Quit));
        assert!(game.quit().is_err());
    }

    #[test]
    fn zero_lives_end_on_first_mistake() {
        let mut game = game(0, 8);
        game.start().unwrap();
        run_until_input(&mut game);

        let tile = wrong_tile(&game);
        game.click(tile).unwrap();

        assert_eq!(game.lives_remaining(), 0);
        assert_eq!(game.phase(), Phase::Ending);
    }
}
