//! Game state module - the simulation state machine
//!
//! This module ties together the board, the falling piece, the random source
//! and scoring. It owns gravity timing and the play/pause/game-over lifecycle.
//!
//! ```text
//! Idle --start--> Playing <--pause--> Paused
//!   ^                |
//!   +---- reset <----+ (game over resets implicitly)
//! ```
//!
//! The game never draws anything itself. Whenever something visible changes it
//! queues a [`GameEvent`]; the frontend drains them with
//! [`Game::drain_events`] and redraws, refreshes the score readout or
//! announces the end of a game.

use std::mem;

use tracing::{debug, info, trace};

use crate::board::Board;
use crate::piece::{try_rotate, Piece, RotationDirection};
use crate::rng::{PieceRandomizer, SimpleRng};
use crate::scoring::{
    calculate_drop_score, calculate_line_score, get_drop_interval_ms, level_for_lines,
};
use crate::snapshot::{GameSnapshot, PieceSnapshot};
use crate::types::{GameAction, BASE_DROP_MS};

/// Coarse lifecycle state derived from the play/pause flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Idle,
    Playing,
    Paused,
}

/// Notification for the frontend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// Board or piece changed; draw a new frame.
    Redraw,
    /// Score, lines or level changed.
    Readout { score: u32, lines: u32, level: u32 },
    /// The stack reached the top. Carries the final totals; the game has
    /// already been reset when this is observed.
    GameOver { score: u32, lines: u32 },
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct Game<R = SimpleRng> {
    board: Board,
    current: Piece,
    next: Piece,
    rng: R,
    score: u32,
    lines: u32,
    level: u32,
    drop_interval_ms: u32,
    playing: bool,
    paused: bool,
    /// Timestamp of the last gravity step (ms, caller's clock).
    last_drop_ms: u64,
    /// Monotonic id of the current piece (increments on every spawn, survives reset).
    piece_id: u32,
    events: Vec<GameEvent>,
}

impl Game<SimpleRng> {
    /// Create a new game with the given RNG seed
    pub fn new(seed: u32) -> Self {
        Self::with_randomizer(SimpleRng::new(seed))
    }
}

impl Default for Game<SimpleRng> {
    fn default() -> Self {
        Self::new(1)
    }
}

impl<R: PieceRandomizer> Game<R> {
    /// Create an idle game whose first two pieces are already drawn.
    pub fn with_randomizer(mut rng: R) -> Self {
        let current = Piece::new(rng.next_kind());
        let next = Piece::new(rng.next_kind());

        let mut game = Self {
            board: Board::new(),
            current,
            next,
            rng,
            score: 0,
            lines: 0,
            level: 1,
            drop_interval_ms: BASE_DROP_MS,
            playing: false,
            paused: false,
            last_drop_ms: 0,
            piece_id: 1,
            events: Vec::new(),
        };
        game.publish_readout();
        game.request_redraw();
        game
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current(&self) -> &Piece {
        &self.current
    }

    pub fn next(&self) -> &Piece {
        &self.next
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn drop_interval_ms(&self) -> u32 {
        self.drop_interval_ms
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn piece_id(&self) -> u32 {
        self.piece_id
    }

    pub fn status(&self) -> GameStatus {
        match (self.playing, self.paused) {
            (false, _) => GameStatus::Idle,
            (true, false) => GameStatus::Playing,
            (true, true) => GameStatus::Paused,
        }
    }

    /// Take all queued events, oldest first.
    pub fn drain_events(&mut self) -> std::vec::Drain<'_, GameEvent> {
        self.events.drain(..)
    }

    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        for (dst, src) in out.board.iter_mut().zip(self.board.rows()) {
            dst.copy_from_slice(src);
        }
        out.current = Some(PieceSnapshot::from(&self.current));
        out.next = Some(PieceSnapshot::from(&self.next));
        out.piece_id = self.piece_id;
        out.score = self.score;
        out.lines = self.lines;
        out.level = self.level;
        out.drop_interval_ms = self.drop_interval_ms;
        out.playing = self.playing;
        out.paused = self.paused;
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut s = GameSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }

    /// Back to a fresh idle game. Callable from any state.
    pub fn reset(&mut self) {
        info!(score = self.score, lines = self.lines, "game reset");
        self.board.clear();
        self.score = 0;
        self.lines = 0;
        self.level = 1;
        self.drop_interval_ms = BASE_DROP_MS;
        self.playing = false;
        self.paused = false;

        self.next = Piece::new(self.rng.next_kind());
        // The board is empty, so this spawn cannot overflow.
        self.advance_queue();

        self.publish_readout();
        self.request_redraw();
    }

    /// Start playing; `now_ms` becomes the gravity timer origin.
    pub fn start(&mut self, now_ms: u64) {
        self.playing = true;
        self.paused = false;
        self.last_drop_ms = now_ms;
        info!(piece = self.current.kind().as_str(), "game started");
        self.request_redraw();
    }

    /// Toggle pause. Has no effect unless a game is in progress.
    pub fn pause(&mut self) -> bool {
        if !self.playing {
            return false;
        }
        self.paused = !self.paused;
        info!(paused = self.paused, "pause toggled");
        self.request_redraw();
        true
    }

    /// Per-frame tick. Applies at most one gravity step when more than the
    /// drop interval has passed since the last one.
    pub fn update(&mut self, now_ms: u64) {
        if !self.is_active() {
            return;
        }

        let elapsed = now_ms.saturating_sub(self.last_drop_ms);
        if elapsed > u64::from(self.drop_interval_ms) {
            self.step_down();
            self.last_drop_ms = now_ms;
        }

        self.request_redraw();
    }

    pub fn move_left(&mut self) -> bool {
        self.try_shift(-1)
    }

    pub fn move_right(&mut self) -> bool {
        self.try_shift(1)
    }

    /// Player-initiated move down. Scores per row; does nothing when blocked.
    pub fn soft_drop(&mut self) -> bool {
        if !self.is_active() || self.board.is_collision(&self.current, 0, 1) {
            return false;
        }
        self.current.y += 1;
        self.score = self.score.saturating_add(calculate_drop_score(1, false));
        self.publish_readout();
        self.request_redraw();
        true
    }

    /// Drop straight down, score the distance and lock immediately.
    pub fn hard_drop(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }

        let mut distance: u32 = 0;
        while !self.board.is_collision(&self.current, 0, 1) {
            self.current.y += 1;
            distance += 1;
        }

        self.score = self
            .score
            .saturating_add(calculate_drop_score(distance, true));
        self.publish_readout();
        trace!(distance, "hard drop");

        self.lock_piece();
        self.request_redraw();
        true
    }

    pub fn rotate_clockwise(&mut self) -> bool {
        self.rotate(RotationDirection::Clockwise)
    }

    pub fn rotate_counter_clockwise(&mut self) -> bool {
        self.rotate(RotationDirection::CounterClockwise)
    }

    pub fn rotate_180(&mut self) -> bool {
        self.rotate(RotationDirection::Half)
    }

    /// Apply a game action. `now_ms` is only used by `Restart`.
    pub fn apply_action(&mut self, action: GameAction, now_ms: u64) -> bool {
        match action {
            GameAction::MoveLeft => self.move_left(),
            GameAction::MoveRight => self.move_right(),
            GameAction::SoftDrop => self.soft_drop(),
            GameAction::HardDrop => self.hard_drop(),
            GameAction::RotateCw => self.rotate_clockwise(),
            GameAction::RotateCcw => self.rotate_counter_clockwise(),
            GameAction::Rotate180 => self.rotate_180(),
            GameAction::Pause => self.pause(),
            GameAction::Restart => {
                self.reset();
                self.start(now_ms);
                true
            }
        }
    }

    /// Playing and not paused: the only state in which pieces move.
    fn is_active(&self) -> bool {
        self.playing && !self.paused
    }

    fn try_shift(&mut self, dx: i8) -> bool {
        if !self.is_active() || self.board.is_collision(&self.current, dx, 0) {
            return false;
        }
        self.current.x += dx;
        self.request_redraw();
        true
    }

    fn rotate(&mut self, direction: RotationDirection) -> bool {
        if !self.is_active() {
            return false;
        }
        match try_rotate(&mut self.current, direction, &self.board) {
            Some(kick) => {
                trace!(direction = direction.as_str(), kick, "rotated");
                self.request_redraw();
                true
            }
            None => false,
        }
    }

    /// One gravity step: fall a row, or lock if something is underneath.
    fn step_down(&mut self) {
        if self.board.is_collision(&self.current, 0, 1) {
            self.lock_piece();
        } else {
            self.current.y += 1;
        }
    }

    /// Merge the current piece, clear rows, score them and spawn the next piece.
    fn lock_piece(&mut self) {
        self.board.merge(&self.current);
        let cleared = self.board.clear_lines();
        debug!(
            piece = self.current.kind().as_str(),
            x = self.current.x,
            y = self.current.y,
            cleared,
            "piece locked"
        );

        if cleared > 0 {
            self.apply_line_clear(cleared);
        }

        self.spawn_piece();
    }

    fn apply_line_clear(&mut self, cleared: u32) {
        self.score = self
            .score
            .saturating_add(calculate_line_score(cleared, self.level));
        self.lines = self.lines.saturating_add(cleared);

        let level = level_for_lines(self.lines);
        if level != self.level {
            info!(level, lines = self.lines, "level up");
        }
        self.level = level;
        self.drop_interval_ms = get_drop_interval_ms(level);

        self.publish_readout();
    }

    /// Promote the next piece and draw a new one. Returns false on game over.
    fn spawn_piece(&mut self) -> bool {
        self.advance_queue();

        if self.board.is_game_over() || self.board.is_collision(&self.current, 0, 0) {
            self.game_over();
            return false;
        }
        true
    }

    fn advance_queue(&mut self) {
        let next = Piece::new(self.rng.next_kind());
        self.current = mem::replace(&mut self.next, next);
        self.piece_id = self.piece_id.wrapping_add(1);
    }

    fn game_over(&mut self) {
        self.playing = false;
        info!(score = self.score, lines = self.lines, "game over");
        self.events.push(GameEvent::GameOver {
            score: self.score,
            lines: self.lines,
        });
        self.reset();
    }

    fn publish_readout(&mut self) {
        self.events.push(GameEvent::Readout {
            score: self.score,
            lines: self.lines,
            level: self.level,
        });
    }

    fn request_redraw(&mut self) {
        if self.events.last() != Some(&GameEvent::Redraw) {
            self.events.push(GameEvent::Redraw);
        }
    }

    #[cfg(test)]
    pub(crate) fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    #[cfg(test)]
    pub(crate) fn current_mut(&mut self) -> &mut Piece {
        &mut self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SequenceRandomizer;
    use crate::types::{Color, PieceKind, BOARD_HEIGHT, BOARD_WIDTH};

    const GRAY: Option<Color> = Some(Color::from_hex(0x808080));

    fn playing_game(kinds: &[PieceKind]) -> Game<SequenceRandomizer> {
        let mut game = Game::with_randomizer(SequenceRandomizer::new(kinds.to_vec()));
        game.start(0);
        game.drain_events().for_each(drop);
        game
    }

    /// Fill rows `ys` except for the columns in `holes`.
    fn fill_rows(game: &mut Game<SequenceRandomizer>, ys: std::ops::Range<i8>, holes: &[i8]) {
        for y in ys {
            for x in 0..BOARD_WIDTH as i8 {
                if !holes.contains(&x) {
                    game.board_mut().set(x, y, GRAY);
                }
            }
        }
    }

    #[test]
    fn test_new_game_is_idle_with_two_pieces() {
        let game = Game::with_randomizer(SequenceRandomizer::new([PieceKind::T, PieceKind::O]));
        assert_eq!(game.status(), GameStatus::Idle);
        assert_eq!(game.current().kind(), PieceKind::T);
        assert_eq!(game.next().kind(), PieceKind::O);
        assert_eq!(game.score(), 0);
        assert_eq!(game.level(), 1);
        assert_eq!(game.drop_interval_ms(), 1000);
    }

    #[test]
    fn test_idle_game_ignores_piece_actions() {
        let mut game = Game::new(12345);
        let before = *game.current();
        assert!(!game.move_left());
        assert!(!game.soft_drop());
        assert!(!game.hard_drop());
        assert!(!game.rotate_clockwise());
        assert_eq!(*game.current(), before);
    }

    #[test]
    fn test_pause_only_while_playing() {
        let mut game = Game::new(12345);
        assert!(!game.pause());
        assert!(!game.is_paused());

        game.start(0);
        assert!(game.pause());
        assert_eq!(game.status(), GameStatus::Paused);
        assert!(!game.move_right());
        assert!(game.pause());
        assert_eq!(game.status(), GameStatus::Playing);
        assert!(game.move_right());
    }

    #[test]
    fn test_gravity_waits_for_interval() {
        let mut game = playing_game(&[PieceKind::T]);
        game.update(1000);
        assert_eq!(game.current().y, 0, "exactly one interval is not enough");
        game.update(1001);
        assert_eq!(game.current().y, 1);
        game.update(1500);
        assert_eq!(game.current().y, 1);
        game.update(2002);
        assert_eq!(game.current().y, 2);
        // Gravity never scores.
        assert_eq!(game.score(), 0);
    }

    #[test]
    fn test_update_always_requests_redraw() {
        let mut game = playing_game(&[PieceKind::T]);
        game.update(10);
        assert_eq!(game.drain_events().collect::<Vec<_>>(), vec![GameEvent::Redraw]);
    }

    #[test]
    fn test_update_is_noop_when_paused() {
        let mut game = playing_game(&[PieceKind::T]);
        game.pause();
        game.drain_events().for_each(drop);
        game.update(5000);
        assert_eq!(game.current().y, 0);
        assert_eq!(game.drain_events().count(), 0);
    }

    #[test]
    fn test_gravity_locks_when_blocked() {
        let mut game = playing_game(&[PieceKind::O, PieceKind::I]);
        let first_id = game.piece_id();
        game.current_mut().y = BOARD_HEIGHT as i8 - 2;

        game.update(1001);
        assert_eq!(game.piece_id(), first_id + 1);
        assert_eq!(game.current().kind(), PieceKind::I);
        assert_eq!(game.board().get(4, 19), Some(Some(PieceKind::O.color())));
    }

    #[test]
    fn test_soft_drop_scores_one_per_row() {
        let mut game = playing_game(&[PieceKind::T]);
        assert!(game.soft_drop());
        assert!(game.soft_drop());
        assert_eq!(game.current().y, 2);
        assert_eq!(game.score(), 2);
    }

    #[test]
    fn test_soft_drop_blocked_does_not_lock() {
        let mut game = playing_game(&[PieceKind::O]);
        game.current_mut().y = BOARD_HEIGHT as i8 - 2;
        let id = game.piece_id();
        assert!(!game.soft_drop());
        assert_eq!(game.piece_id(), id);
        assert_eq!(game.score(), 0);
    }

    #[test]
    fn test_hard_drop_five_rows_scores_ten_and_locks() {
        let mut game = playing_game(&[PieceKind::O, PieceKind::T]);
        // O is two rows tall: bottom row at 14 means five free rows below.
        game.current_mut().y = 13;
        let dropped_id = game.piece_id();

        assert!(game.hard_drop());
        assert_eq!(game.score(), 10);
        assert_ne!(game.piece_id(), dropped_id);
        assert_eq!(game.current().kind(), PieceKind::T);
        assert_eq!(game.current().y, 0);
        assert_eq!(game.board().get(4, 18), Some(Some(PieceKind::O.color())));
        assert_eq!(game.board().get(5, 19), Some(Some(PieceKind::O.color())));
    }

    #[test]
    fn test_move_blocked_by_wall_is_noop() {
        let mut game = playing_game(&[PieceKind::O]);
        let mut moves = 0;
        while game.move_left() {
            moves += 1;
        }
        assert_eq!(moves, 4);
        assert_eq!(game.current().x, 0);
        game.drain_events().for_each(drop);
        assert!(!game.move_left());
        assert_eq!(game.drain_events().count(), 0);
    }

    #[test]
    fn test_rotations_keep_shape_when_blocked() {
        let mut game = playing_game(&[PieceKind::I]);
        // Horizontal bar on row 11 with a solid row 13 below: standing up needs
        // rows 10..=13 at every kick offset.
        game.current_mut().y = 10;
        fill_rows(&mut game, 13..14, &[]);
        let before = *game.current();
        assert!(!game.rotate_clockwise());
        assert!(!game.rotate_counter_clockwise());
        assert_eq!(*game.current(), before);
        // A half turn keeps the bar horizontal, one row lower in its matrix.
        assert!(game.rotate_180());
        assert_eq!(game.current().cells().next(), Some((3, 12)));
    }

    #[test]
    fn test_wall_kick_tie_break_on_constructed_board() {
        let mut game = playing_game(&[PieceKind::I]);
        game.current_mut().y = 10;
        // Vertical I lands in column x + 2 = 5. Block columns 5 and 6.
        game.board_mut().set(5, 13, GRAY);
        game.board_mut().set(6, 13, GRAY);

        assert!(game.rotate_clockwise());
        assert_eq!(game.current().x, 2, "kick -1 wins before +2");
    }

    #[test]
    fn test_tetris_scores_800_at_level_one() {
        let mut game = playing_game(&[PieceKind::I, PieceKind::O]);
        // Rows 16..20 full except column 9; vertical I fills the gap.
        fill_rows(&mut game, 16..20, &[9]);
        assert!(game.rotate_clockwise());
        while game.move_right() {}
        assert_eq!(game.current().cells().next(), Some((9, 0)));

        assert!(game.hard_drop());
        // 16 rows of drop distance, then the tetris.
        assert_eq!(game.lines(), 4);
        assert_eq!(game.score(), 16 * 2 + 800);
        assert!(game.board().cells().iter().all(|c| c.is_none()));
    }

    #[test]
    fn test_tetris_at_level_three_scores_2400() {
        let mut game = playing_game(&[PieceKind::I, PieceKind::O]);
        game.lines = 20;
        game.level = 3;
        fill_rows(&mut game, 16..20, &[9]);
        game.rotate_clockwise();
        while game.move_right() {}
        game.current_mut().y = 16;
        let before = game.score();

        game.update(1001);
        assert_eq!(game.score() - before, 2400);
        assert_eq!(game.lines(), 24);
        assert_eq!(game.level(), 3);
    }

    #[test]
    fn test_level_up_speeds_gravity() {
        let mut game = playing_game(&[PieceKind::I, PieceKind::O]);
        game.lines = 9;
        fill_rows(&mut game, 19..20, &[3, 4, 5, 6]);
        game.current_mut().y = 18;

        assert!(game.hard_drop());
        assert_eq!(game.lines(), 10);
        assert_eq!(game.level(), 2);
        assert_eq!(game.drop_interval_ms(), 900);
        // Scored at the level that was active when the row was cleared.
        assert_eq!(game.score(), 100);
    }

    #[test]
    fn test_line_clear_publishes_readout() {
        let mut game = playing_game(&[PieceKind::I, PieceKind::O]);
        fill_rows(&mut game, 19..20, &[3, 4, 5, 6]);
        game.current_mut().y = 18;
        game.update(1001);

        let events: Vec<_> = game.drain_events().collect();
        assert!(events.contains(&GameEvent::Readout {
            score: 100,
            lines: 1,
            level: 1
        }));
    }

    #[test]
    fn test_spawn_into_row_zero_ends_game() {
        let mut game = playing_game(&[PieceKind::O, PieceKind::T]);
        game.score = 450;
        game.lines = 3;
        // Something already locked where the next piece appears.
        game.board_mut().set(4, 0, GRAY);
        game.current_mut().y = 10;

        assert!(game.hard_drop());
        assert!(!game.is_playing());
        assert_eq!(game.status(), GameStatus::Idle);

        let events: Vec<_> = game.drain_events().collect();
        // 450 + 8 rows * 2 from the hard drop.
        assert!(events.contains(&GameEvent::GameOver {
            score: 466,
            lines: 3
        }));

        // Implicit reset: clean slate, waiting for start.
        assert_eq!(game.score(), 0);
        assert_eq!(game.lines(), 0);
        assert!(game.board().cells().iter().all(|c| c.is_none()));
        assert_eq!(game.current().y, 0);
    }

    #[test]
    fn test_game_over_when_top_row_filled_by_lock() {
        let mut game = playing_game(&[PieceKind::O, PieceKind::O]);
        // Column stack up to row 2; an O dropped on top ends with its top row at 0.
        for y in 2..BOARD_HEIGHT as i8 {
            game.board_mut().set(0, y, GRAY);
        }
        while game.move_left() {}
        assert!(game.hard_drop());
        assert!(!game.is_playing());
    }

    #[test]
    fn test_reset_restores_defaults_from_any_state() {
        let mut game = playing_game(&[PieceKind::L]);
        game.soft_drop();
        game.pause();
        game.level = 4;
        game.drop_interval_ms = 700;

        let id = game.piece_id();
        game.reset();
        assert_eq!(game.status(), GameStatus::Idle);
        assert_eq!(game.score(), 0);
        assert_eq!(game.level(), 1);
        assert_eq!(game.drop_interval_ms(), 1000);
        assert!(game.piece_id() > id);
    }

    #[test]
    fn test_restart_action_resets_and_starts() {
        let mut game = playing_game(&[PieceKind::S]);
        game.soft_drop();
        assert!(game.apply_action(GameAction::Restart, 500));
        assert_eq!(game.status(), GameStatus::Playing);
        assert_eq!(game.score(), 0);
        // Gravity origin moved to the restart time.
        game.update(1500);
        assert_eq!(game.current().y, 0);
        game.update(1501);
        assert_eq!(game.current().y, 1);
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let mut game = playing_game(&[PieceKind::J, PieceKind::Z]);
        game.board_mut().set(2, 19, GRAY);
        game.move_right();

        let snap = game.snapshot();
        assert_eq!(snap.board[19][2], GRAY);
        let current = snap.current.unwrap();
        assert_eq!(current.kind, PieceKind::J);
        assert_eq!(current.x, 5);
        assert_eq!(snap.next.unwrap().kind, PieceKind::Z);
        assert!(snap.playable());
    }
}
