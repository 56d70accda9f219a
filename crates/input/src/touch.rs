//! Swipe gestures from pointer press/release pairs.
//!
//! Coordinates are in whatever unit the caller measures (pixels, terminal
//! cells); the threshold must use the same unit.

use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};

use crate::types::{GameAction, BLOCK_SIZE};

/// Default swipe threshold for pixel coordinates: one block.
pub const DEFAULT_SWIPE_THRESHOLD_PX: i32 = BLOCK_SIZE as i32;

/// Classify the movement between press and release.
///
/// The dominant axis wins; a tie counts as vertical. Movement must exceed the
/// threshold strictly.
pub fn classify_swipe(dx: i32, dy: i32, threshold: i32) -> Option<GameAction> {
    if dx.abs() > dy.abs() {
        if dx > threshold {
            Some(GameAction::MoveRight)
        } else if dx < -threshold {
            Some(GameAction::MoveLeft)
        } else {
            None
        }
    } else if dy > threshold {
        Some(GameAction::HardDrop)
    } else if dy < -threshold {
        Some(GameAction::RotateCw)
    } else {
        None
    }
}

/// Remembers where a swipe started and classifies it when it ends.
#[derive(Debug, Clone)]
pub struct SwipeDetector {
    threshold: i32,
    origin: Option<(i32, i32)>,
}

impl SwipeDetector {
    pub fn new(threshold: i32) -> Self {
        Self {
            threshold,
            origin: None,
        }
    }

    pub fn threshold(&self) -> i32 {
        self.threshold
    }

    pub fn begin(&mut self, x: i32, y: i32) {
        self.origin = Some((x, y));
    }

    /// Finish the gesture. Returns `None` without a matching `begin`.
    pub fn end(&mut self, x: i32, y: i32) -> Option<GameAction> {
        let (ox, oy) = self.origin.take()?;
        classify_swipe(x - ox, y - oy, self.threshold)
    }

    /// Feed a terminal mouse event. Only the left button counts.
    pub fn handle_mouse_event(&mut self, event: MouseEvent) -> Option<GameAction> {
        let x = i32::from(event.column);
        let y = i32::from(event.row);
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.begin(x, y);
                None
            }
            MouseEventKind::Up(MouseButton::Left) => self.end(x, y),
            _ => None,
        }
    }

    pub fn cancel(&mut self) {
        self.origin = None;
    }
}

impl Default for SwipeDetector {
    fn default() -> Self {
        Self::new(DEFAULT_SWIPE_THRESHOLD_PX)
    }
}
