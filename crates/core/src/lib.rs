//! Core game logic module - pure, deterministic, and testable
//!
//! This module contains the game rules, state management and simulation logic.
//! It has no dependencies on terminals or I/O; the only side channel is
//! `tracing` diagnostics, which are silent unless a subscriber is installed.
//!
//! # Module Structure
//!
//! - [`board`]: 10x20 grid with collision detection and line clearing
//! - [`piece`]: falling piece and rotation with horizontal wall kicks
//! - [`game`]: play/pause/game-over state machine, gravity, scoring
//! - [`rng`]: uniform piece selection from a seeded LCG
//! - [`scoring`]: line clear points, drop points and gravity by level
//! - [`snapshot`]: copyable frame state for renderers
//!
//! # Game Rules
//!
//! - **Uniform randomizer**: every spawn is one of seven kinds with equal odds
//! - **Simple kicks**: after a rotation try offsets `0, +1, -1, +2, -2`
//! - **Instant lock**: a piece locks the moment gravity or a hard drop finds
//!   it resting on something
//! - **Scoring**: `100/300/500/800 * level` for 1-4 rows, +1 per soft drop row,
//!   +2 per hard drop row
//!
//! # Example
//!
//! ```
//! use blockfall_core::{Game, GameEvent};
//! use blockfall_core::types::GameAction;
//!
//! let mut game = Game::new(12345);
//! game.start(0);
//!
//! game.apply_action(GameAction::MoveRight, 0);
//! game.apply_action(GameAction::RotateCw, 0);
//! game.apply_action(GameAction::HardDrop, 0);
//!
//! assert!(game.score() > 0); // Hard drop awards points
//! assert!(game.drain_events().any(|e| e == GameEvent::Redraw));
//! ```
//!
//! # Timing
//!
//! Gravity is driven by the caller's clock: call [`Game::update`] every frame
//! with a monotonic timestamp in milliseconds. A piece falls one row once
//! more than the current drop interval has passed since the previous step.

pub mod board;
pub mod game;
pub mod piece;
pub mod rng;
pub mod scoring;
pub mod snapshot;

pub use blockfall_types as types;

// Re-export commonly used types for convenience
pub use board::Board;
pub use game::{Game, GameEvent, GameStatus};
pub use piece::{try_rotate, Piece, RotationDirection, WALL_KICK_OFFSETS};
pub use rng::{PieceRandomizer, SequenceRandomizer, SimpleRng};
pub use scoring::{calculate_drop_score, calculate_line_score, get_drop_interval_ms};
pub use snapshot::{GameSnapshot, PieceSnapshot};
