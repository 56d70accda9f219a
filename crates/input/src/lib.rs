//! Terminal input module (game-facing).
//!
//! This module is independent of any UI framework beyond `crossterm` events.
//! It maps key events into [`crate::types::GameAction`], turns held keys into
//! DAS/ARR repeats (including terminals without key-release events) and
//! classifies pointer swipes.

pub mod handler;
pub mod map;
pub mod touch;

pub use blockfall_types as types;

pub use handler::{RepeatActions, RepeatKey, RepeatScheduler, RepeatTask};
pub use map::{handle_key_event, is_flow_action, should_quit};
pub use touch::{classify_swipe, SwipeDetector};
