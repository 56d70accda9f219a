//! Application context: owns the game, input state and clock, and routes
//! terminal events into the game.
//!
//! The binary drives it with two calls: [`App::handle_event`] for every
//! crossterm event and [`App::tick`] once per frame. Rendering reads the game
//! through a reused [`GameSnapshot`].

use std::time::Instant;

use crossterm::event::{Event, KeyEvent, KeyEventKind};
use tracing::{debug, info};

use crate::config::Config;
use crate::core::{Game, GameEvent, GameSnapshot, GameStatus, PieceRandomizer, SimpleRng};
use crate::input::{
    handle_key_event, is_flow_action, should_quit, RepeatKey, RepeatScheduler, SwipeDetector,
};
use crate::term::{FrameBuffer, GameOverView, GameView, Viewport};
use crate::types::GameAction;

/// Millisecond timestamp source for gravity and key repeat.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Milliseconds since construction.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Latest score readout published by the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Readout {
    pub score: u32,
    pub lines: u32,
    pub level: u32,
}

pub struct App<C: Clock = MonotonicClock, R: PieceRandomizer = SimpleRng> {
    game: Game<R>,
    repeat: RepeatScheduler,
    swipe: SwipeDetector,
    clock: C,
    last_tick_ms: u64,
    readout: Readout,
    last_result: Option<GameOverView>,
    snapshot: GameSnapshot,
    needs_redraw: bool,
}

impl<C: Clock> App<C, SimpleRng> {
    pub fn new(config: &Config, clock: C) -> Self {
        let seed = config.resolve_seed();
        info!(seed, "new session");
        Self::with_game(Game::new(seed), config, clock)
    }
}

impl<C: Clock, R: PieceRandomizer> App<C, R> {
    pub fn with_game(game: Game<R>, config: &Config, clock: C) -> Self {
        let repeat = RepeatScheduler::with_config(config.das_ms, config.arr_ms)
            .with_key_release_timeout_ms(config.key_release_timeout());
        let last_tick_ms = clock.now_ms();
        let mut app = Self {
            game,
            repeat,
            swipe: SwipeDetector::new(i32::from(config.swipe_threshold_cells)),
            clock,
            last_tick_ms,
            readout: Readout::default(),
            last_result: None,
            snapshot: GameSnapshot::default(),
            needs_redraw: true,
        };
        app.process_game_events();
        app
    }

    /// Call when the terminal reports key release events. Held keys then
    /// repeat until released instead of timing out.
    pub fn set_key_release_events(&mut self, reported: bool) {
        if reported {
            self.repeat.disable_auto_release();
        }
        debug!(reported, "key release events");
    }

    pub fn game(&self) -> &Game<R> {
        &self.game
    }

    pub fn readout(&self) -> Readout {
        self.readout
    }

    /// Final totals of the last finished game, until the next one starts.
    pub fn last_result(&self) -> Option<GameOverView> {
        self.last_result
    }

    pub fn is_held(&self, key: RepeatKey) -> bool {
        self.repeat.is_held(key)
    }

    /// Returns true once per batch of visible changes.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.needs_redraw)
    }

    pub fn handle_event(&mut self, event: Event) -> Flow {
        match event {
            Event::Key(key) => return self.handle_key(key),
            Event::Mouse(mouse) => {
                if let Some(action) = self.swipe.handle_mouse_event(mouse) {
                    if self.game.status() == GameStatus::Playing {
                        self.apply(action);
                    }
                }
            }
            Event::Resize(..) => self.needs_redraw = true,
            _ => {}
        }
        Flow::Continue
    }

    fn handle_key(&mut self, key: KeyEvent) -> Flow {
        if key.kind == KeyEventKind::Press && should_quit(key) {
            info!("quit requested");
            return Flow::Quit;
        }
        let Some(action) = handle_key_event(key) else {
            return Flow::Continue;
        };
        let repeat_key = RepeatKey::from_action(action);

        match key.kind {
            KeyEventKind::Press => {
                if is_flow_action(action) {
                    self.apply(action);
                } else if self.game.status() != GameStatus::Playing {
                    // Piece input is dropped while idle or paused.
                } else if let Some(rk) = repeat_key {
                    // Terminals without release events report a held key as
                    // repeated presses; those only refresh the task.
                    if let Some(first) = self.repeat.press(rk) {
                        self.apply(first);
                    }
                } else {
                    self.apply(action);
                }
            }
            KeyEventKind::Repeat => {
                if let Some(rk) = repeat_key {
                    self.repeat.refresh(rk);
                }
            }
            KeyEventKind::Release => {
                if let Some(rk) = repeat_key {
                    self.repeat.release(rk);
                }
            }
        }
        Flow::Continue
    }

    /// Advance key repeat and gravity to the clock's current time.
    pub fn tick(&mut self) {
        let now = self.clock.now_ms();
        let elapsed = u32::try_from(now.saturating_sub(self.last_tick_ms)).unwrap_or(u32::MAX);
        self.last_tick_ms = now;

        if self.game.status() == GameStatus::Playing {
            for action in self.repeat.update(elapsed) {
                self.game.apply_action(action, now);
            }
        } else {
            self.repeat.reset();
        }

        self.game.update(now);
        self.process_game_events();
    }

    fn apply(&mut self, action: GameAction) {
        let now = self.clock.now_ms();
        if action == GameAction::Restart {
            self.repeat.reset();
            self.swipe.cancel();
            self.last_result = None;
            info!("restart");
        }
        let applied = self.game.apply_action(action, now);
        debug!(action = action.as_str(), applied, "input");
        self.process_game_events();
    }

    fn process_game_events(&mut self) {
        for event in self.game.drain_events() {
            match event {
                GameEvent::Redraw => self.needs_redraw = true,
                GameEvent::Readout {
                    score,
                    lines,
                    level,
                } => {
                    self.readout = Readout {
                        score,
                        lines,
                        level,
                    };
                    debug!(score, lines, level, "readout");
                }
                GameEvent::GameOver { score, lines } => {
                    info!(score, lines, "final score");
                    self.last_result = Some(GameOverView { score, lines });
                    self.repeat.reset();
                    self.needs_redraw = true;
                }
            }
        }
    }

    /// Render the current frame into `fb`.
    pub fn render_into(&mut self, view: &GameView, viewport: Viewport, fb: &mut FrameBuffer) {
        self.game.snapshot_into(&mut self.snapshot);
        view.render_into_with_result(&self.snapshot, self.last_result.as_ref(), viewport, fb);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SequenceRandomizer;
    use crate::types::PieceKind;
    use crossterm::event::{KeyCode, KeyEventState, KeyModifiers};
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct ManualClock(Rc<Cell<u64>>);

    impl ManualClock {
        fn advance(&self, ms: u64) {
            self.0.set(self.0.get() + ms);
        }
    }

    impl Clock for ManualClock {
        fn now_ms(&self) -> u64 {
            self.0.get()
        }
    }

    fn key(code: KeyCode, kind: KeyEventKind) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        })
    }

    fn press(code: KeyCode) -> Event {
        key(code, KeyEventKind::Press)
    }

    fn app(kinds: &[PieceKind], config: Config) -> (App<ManualClock, SequenceRandomizer>, ManualClock) {
        let clock = ManualClock::default();
        let game = Game::with_randomizer(SequenceRandomizer::new(kinds.to_vec()));
        (App::with_game(game, &config, clock.clone()), clock)
    }

    #[test]
    fn test_space_starts_and_q_quits() {
        let (mut app, _clock) = app(&[PieceKind::T], Config::default());
        assert_eq!(app.game().status(), GameStatus::Idle);
        assert_eq!(app.handle_event(press(KeyCode::Char(' '))), Flow::Continue);
        assert_eq!(app.game().status(), GameStatus::Playing);
        assert_eq!(app.handle_event(press(KeyCode::Char('q'))), Flow::Quit);
    }

    #[test]
    fn test_piece_keys_ignored_until_started() {
        let (mut app, _clock) = app(&[PieceKind::T], Config::default());
        app.handle_event(press(KeyCode::Char('d')));
        assert_eq!(app.game().current().x, 4);
        assert!(!app.is_held(RepeatKey::Right));
    }

    #[test]
    fn test_paused_game_ignores_moves() {
        let (mut app, _clock) = app(&[PieceKind::T], Config::default());
        app.handle_event(press(KeyCode::Char(' ')));
        app.handle_event(press(KeyCode::Char('p')));
        app.handle_event(press(KeyCode::Char('a')));
        assert_eq!(app.game().current().x, 4);
        app.handle_event(press(KeyCode::Char('p')));
        app.handle_event(press(KeyCode::Char('a')));
        assert_eq!(app.game().current().x, 3);
    }

    #[test]
    fn test_held_key_repeats_until_release() {
        let config = Config {
            das_ms: 100,
            arr_ms: 50,
            key_release_timeout_ms: Some(10_000),
            ..Config::default()
        };
        let (mut app, clock) = app(&[PieceKind::O], config);
        app.handle_event(press(KeyCode::Char(' ')));

        app.handle_event(press(KeyCode::Left));
        assert_eq!(app.game().current().x, 3);

        clock.advance(150);
        app.tick();
        assert_eq!(app.game().current().x, 2);

        app.handle_event(key(KeyCode::Left, KeyEventKind::Release));
        clock.advance(200);
        app.tick();
        assert_eq!(app.game().current().x, 2);
    }

    #[test]
    fn test_zero_arr_slides_to_wall() {
        let (mut app, clock) = app(&[PieceKind::O], Config::default());
        app.set_key_release_events(true);
        app.handle_event(press(KeyCode::Char(' ')));
        app.handle_event(press(KeyCode::Char('d')));
        clock.advance(110);
        app.tick();
        assert_eq!(app.game().current().x, 8);

        app.handle_event(key(KeyCode::Char('d'), KeyEventKind::Release));
        assert!(!app.is_held(RepeatKey::Right));
    }

    #[test]
    fn test_default_config_tap_moves_one_column() {
        let (mut app, clock) = app(&[PieceKind::O], Config::default());
        app.handle_event(press(KeyCode::Char(' ')));
        assert_eq!(app.game().current().x, 4);

        app.handle_event(press(KeyCode::Char('a')));
        assert_eq!(app.game().current().x, 3);
        for _ in 0..10 {
            clock.advance(16);
            app.tick();
        }
        assert_eq!(app.game().current().x, 3);
        assert!(!app.is_held(RepeatKey::Left));
    }

    #[test]
    fn test_default_config_soft_drop_tap_scores_once() {
        let (mut app, clock) = app(&[PieceKind::O], Config::default());
        app.handle_event(press(KeyCode::Char(' ')));
        app.handle_event(press(KeyCode::Char('k')));
        for _ in 0..10 {
            clock.advance(16);
            app.tick();
        }
        assert_eq!(app.readout().score, 1);
        assert_eq!(app.game().current().y, 1);
    }

    #[test]
    fn test_hard_drop_key_scores() {
        let (mut app, _clock) = app(&[PieceKind::O], Config::default());
        app.handle_event(press(KeyCode::Char(' ')));
        app.handle_event(press(KeyCode::Char('i')));
        // O falls 18 rows.
        assert_eq!(app.readout().score, 36);
    }

    #[test]
    fn test_gravity_follows_clock() {
        let (mut app, clock) = app(&[PieceKind::T], Config::default());
        app.handle_event(press(KeyCode::Char(' ')));
        app.take_redraw();
        clock.advance(1001);
        app.tick();
        assert_eq!(app.game().current().y, 1);
        assert!(app.take_redraw());
        assert!(!app.take_redraw());
    }

    #[test]
    fn test_game_over_is_remembered_until_restart() {
        let (mut app, _clock) = app(&[PieceKind::O], Config::default());
        app.handle_event(press(KeyCode::Char(' ')));
        // Ten O pieces stacked in the same column fill it to the top.
        for _ in 0..10 {
            app.handle_event(press(KeyCode::Char('i')));
        }
        assert_eq!(app.game().status(), GameStatus::Idle);
        let result = app.last_result().unwrap();
        assert!(result.score > 0);

        app.handle_event(press(KeyCode::Char(' ')));
        assert_eq!(app.last_result(), None);
        assert_eq!(app.game().status(), GameStatus::Playing);
    }

    #[test]
    fn test_swipe_moves_piece_only_while_playing() {
        use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
        let mouse = |kind, column| {
            Event::Mouse(MouseEvent {
                kind,
                column,
                row: 5,
                modifiers: KeyModifiers::NONE,
            })
        };
        let (mut app, _clock) = app(&[PieceKind::T], Config::default());

        app.handle_event(mouse(MouseEventKind::Down(MouseButton::Left), 10));
        app.handle_event(mouse(MouseEventKind::Up(MouseButton::Left), 14));
        assert_eq!(app.game().current().x, 4);

        app.handle_event(press(KeyCode::Char(' ')));
        app.handle_event(mouse(MouseEventKind::Down(MouseButton::Left), 10));
        app.handle_event(mouse(MouseEventKind::Up(MouseButton::Left), 14));
        assert_eq!(app.game().current().x, 5);
    }

    #[test]
    fn test_render_shows_readout() {
        let (mut app, _clock) = app(&[PieceKind::O], Config::default());
        app.handle_event(press(KeyCode::Char(' ')));
        app.handle_event(press(KeyCode::Char('i')));
        let mut fb = FrameBuffer::new(0, 0);
        app.render_into(&GameView::default(), Viewport::new(60, 24), &mut fb);
        let text: String = (0..fb.height()).map(|y| fb.row_text(y)).collect();
        assert!(text.contains("36"));
    }
}
