use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use memtiles_core::*;

#[derive(Clone, Debug, Default)]
struct Log {
    frames: Rc<RefCell<Vec<(Tile, VisualState)>>>,
    sounds: Rc<RefCell<Vec<Cue>>>,
}

#[derive(Debug)]
struct Screen(Log);

impl TileDisplay for Screen {
    fn render_tile(&mut self, tile: Tile, state: VisualState) {
        self.0.frames.borrow_mut().push((tile, state));
    }

    fn set_input_enabled(&mut self, _enabled: bool) {}
}

#[derive(Debug)]
struct Speaker {
    log: Log,
    broken: Vec<Cue>,
}

impl AudioOutput for Speaker {
    type Clip = Cue;

    fn load(&mut self, cue: Cue) -> std::result::Result<Cue, AudioError> {
        if self.broken.contains(&cue) {
            Err(AudioError::Unavailable)
        } else {
            Ok(cue)
        }
    }

    fn play(&mut self, clip: &Cue) {
        self.log.sounds.borrow_mut().push(*clip);
    }
}

type Session = Game<Screen, Speaker, TimerQueue>;

fn session(lives: u16, seed: u64, broken: Vec<Cue>) -> (Session, Log) {
    let config = SessionConfig::new((3, 3), lives, "Grace")
        .unwrap()
        .with_seed(seed);
    session_with(config, broken)
}

fn session_with(config: SessionConfig, broken: Vec<Cue>) -> (Session, Log) {
    let log = Log::default();
    let speaker = Speaker {
        log: log.clone(),
        broken,
    };
    let game = Game::new(config, Screen(log.clone()), speaker, TimerQueue::new()).unwrap();
    (game, log)
}

fn until_input(game: &mut Session) {
    while !game.accepts_input() {
        let timer = game
            .scheduler_mut()
            .pop_next()
            .expect("game stalled before input was enabled");
        game.fire(timer).unwrap();
    }
}

fn drain(game: &mut Session) {
    while let Some(timer) = game.scheduler_mut().pop_next() {
        game.fire(timer).unwrap();
    }
}

fn play_level_perfectly(game: &mut Session) {
    until_input(game);
    let tiles: Vec<Tile> = game.engine().steps().iter().map(|step| step.tile).collect();
    for tile in tiles {
        assert!(game.click(tile).unwrap().unwrap().is_correct());
    }
}

fn wrong_tile(game: &Session) -> Tile {
    let expected = game.engine().expected().unwrap().tile;
    game.board()
        .tiles()
        .iter()
        .copied()
        .find(|&tile| tile != expected)
        .unwrap()
}

#[test]
fn single_step_level_completes_on_matching_click() {
    let (mut game, _) = session(3, 21, vec![]);
    game.start().unwrap();
    until_input(&mut game);

    let step = game.engine().steps()[0];
    let verdict = game.click(step.tile).unwrap();

    assert_eq!(verdict, Some(Verdict::Complete));
    assert_eq!(game.engine().cursor(), 1);
    assert_eq!(game.engine().state(), SequenceState::LevelComplete);
}

#[test]
fn mismatch_keeps_cursor_and_costs_one_life() {
    let (mut game, _) = session(3, 22, vec![]);
    game.start().unwrap();
    until_input(&mut game);

    let tile = wrong_tile(&game);
    let verdict = game.click(tile).unwrap();

    assert_eq!(verdict, Some(Verdict::Wrong));
    assert_eq!(game.engine().cursor(), 0);
    assert_eq!(game.lives_remaining(), 2);
}

#[test]
fn last_life_reports_game_over_with_accumulated_score() {
    let (mut game, _) = session(1, 23, vec![]);
    game.start().unwrap();
    play_level_perfectly(&mut game);
    play_level_perfectly(&mut game);
    until_input(&mut game);
    game.take_events();

    let tile = wrong_tile(&game);
    game.click(tile).unwrap();
    drain(&mut game);

    assert_eq!(
        game.take_events(),
        vec![
            GameEvent::ClickResult {
                tile,
                correct: false,
                lives_remaining: 0,
                score: 3
            },
            GameEvent::GameOver {
                score: 3,
                player_name: "Grace".to_string()
            },
        ]
    );
}

#[test]
fn sequence_grows_one_step_per_level_without_repeats() {
    let (mut game, _) = session(3, 24, vec![]);
    game.start().unwrap();

    for level in 1..=12 {
        until_input(&mut game);
        assert_eq!(game.level(), level);
        play_level_perfectly(&mut game);
    }

    let steps = game.engine().steps();
    assert!(steps.windows(2).all(|pair| pair[0].tile != pair[1].tile));
    // one point per correct click: 1 + 2 + ... + 12
    assert_eq!(game.score(), 78);
}

#[test]
fn retry_resumes_from_the_missed_step() {
    let (mut game, _) = session(3, 25, vec![]);
    game.start().unwrap();
    play_level_perfectly(&mut game);
    until_input(&mut game);

    let steps = game.engine().steps().to_vec();
    game.click(steps[0].tile).unwrap();
    let tile = wrong_tile(&game);
    game.click(tile).unwrap();
    until_input(&mut game);

    assert_eq!(game.engine().cursor(), 1);
    assert_eq!(game.click(steps[1].tile).unwrap(), Some(Verdict::Complete));
}

#[test]
fn retry_from_start_when_configured() {
    let config = SessionConfig::new((2, 2), 3, "Grace")
        .unwrap()
        .with_seed(26)
        .with_retry(RetryPolicy::FromStart);
    let (mut game, _) = session_with(config, vec![]);
    game.start().unwrap();
    play_level_perfectly(&mut game);
    until_input(&mut game);

    let first = game.engine().steps()[0].tile;
    game.click(first).unwrap();
    let tile = wrong_tile(&game);
    game.click(tile).unwrap();
    until_input(&mut game);

    assert_eq!(game.engine().cursor(), 0);
    assert_eq!(game.click(first).unwrap(), Some(Verdict::Correct));
}

#[test]
fn playback_sounds_each_note_and_clicks_echo_it() {
    let (mut game, log) = session(3, 27, vec![]);
    game.start().unwrap();
    play_level_perfectly(&mut game);
    until_input(&mut game);

    let notes: Vec<Cue> = game
        .engine()
        .steps()
        .iter()
        .map(|step| Cue::Note(step.note))
        .collect();
    // level 1 playback, the echo of the correct click, then level 2 playback
    assert_eq!(log.sounds.borrow()[0], notes[0]);
    assert_eq!(log.sounds.borrow()[1], notes[0]);
    assert_eq!(&log.sounds.borrow()[2..], &notes[..]);
}

#[test]
fn broken_audio_still_plays_the_game() {
    let (mut game, log) = session(2, 28, Cue::ALL.to_vec());
    game.start().unwrap();
    play_level_perfectly(&mut game);
    until_input(&mut game);
    let tile = wrong_tile(&game);
    game.click(tile).unwrap();

    assert!(log.sounds.borrow().is_empty());
    assert_eq!(game.level(), 2);
    assert_eq!(game.lives_remaining(), 1);
}

#[test]
fn wrong_click_plays_wrong_cue_and_marks_tile() {
    let (mut game, log) = session(3, 29, vec![]);
    game.start().unwrap();
    until_input(&mut game);
    log.frames.borrow_mut().clear();

    let tile = wrong_tile(&game);
    game.click(tile).unwrap();

    assert_eq!(log.sounds.borrow().last(), Some(&Cue::Wrong));
    assert_eq!(*log.frames.borrow(), vec![(tile, VisualState::Error)]);
}

#[test]
fn quick_replay_ignores_timers_from_the_old_round() {
    let (mut game, _) = session(1, 30, vec![]);
    game.start().unwrap();
    until_input(&mut game);
    let tile = wrong_tile(&game);
    game.click(tile).unwrap();
    drain(&mut game);
    assert_eq!(game.phase(), Phase::GameOver);

    // a flash revert from an older generation arriving late must not touch the new round
    let stale = Timer::HideStep {
        generation: game.engine().generation(),
        index: 0,
    };
    game.replay().unwrap();
    until_input(&mut game);
    let cursor = game.engine().cursor();
    game.fire(stale).unwrap();
    game.fire(Timer::NextLevel { generation: 0 }).unwrap();

    assert_eq!(game.engine().cursor(), cursor);
    assert_eq!(game.level(), 1);
    assert_eq!(game.phase(), Phase::Repeating);
    assert!(game.scheduler().now() > Duration::ZERO);
}

#[test]
fn intro_cue_precedes_replayed_level() {
    let (mut game, log) = session(0, 31, vec![]);
    game.start().unwrap();
    until_input(&mut game);
    let tile = wrong_tile(&game);
    game.click(tile).unwrap();
    drain(&mut game);
    log.sounds.borrow_mut().clear();

    game.replay().unwrap();

    assert_eq!(*log.sounds.borrow(), vec![Cue::Intro]);
    assert_eq!(game.scheduler().len(), 1);
}

fn lit_tiles(game: &Session) -> usize {
    game.board()
        .tiles()
        .iter()
        .filter(|&&tile| matches!(game.board().visual_at(tile), Ok(VisualState::Flashed(_))))
        .count()
}

#[test]
fn tick_loop_never_lights_two_steps_at_once() {
    let (mut game, _) = session(3, 32, vec![]);
    game.start().unwrap();
    play_level_perfectly(&mut game);

    while !game.accepts_input() {
        game.advance(Duration::from_millis(1000)).unwrap();
        assert!(lit_tiles(&game) <= 1);
    }

    assert_eq!(game.level(), 2);
    assert_eq!(game.phase(), Phase::Repeating);
}

#[test]
fn tick_loop_times_follow_ups_from_their_cause() {
    let (mut game, _) = session(3, 33, vec![]);
    game.start().unwrap();

    // the first flash lights at once and goes dark after half a unit
    game.advance(Duration::from_millis(400)).unwrap();
    assert_eq!(lit_tiles(&game), 1);
    game.advance(Duration::from_millis(200)).unwrap();
    assert_eq!(lit_tiles(&game), 0);
    assert_eq!(game.scheduler().now(), Duration::from_millis(600));
}
