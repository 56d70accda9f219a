//! DAS/ARR repeat scheduler for terminal environments.
//!
//! Each repeatable input owns at most one [`RepeatTask`]. Pressing arms the
//! task and fires once; [`RepeatScheduler::update`] emits repeats after the
//! DAS delay; releasing removes the task, so nothing it scheduled can fire
//! afterwards.
//!
//! Supports terminals that do not emit key release events by using a timeout:
//! a task whose key has not been seen for `key_release_timeout_ms` is dropped.

use arrayvec::ArrayVec;

use crate::types::{GameAction, BOARD_HEIGHT, BOARD_WIDTH, DEFAULT_ARR_MS, DEFAULT_DAS_MS};

// In terminals without key-release events, a short timeout prevents a single tap
// from turning into a sustained "held" state that triggers DAS/ARR repeats.
pub const DEFAULT_KEY_RELEASE_TIMEOUT_MS: u32 = 150;

/// Auto-release timeout for a given DAS delay.
///
/// Stays below `das_delay` so an unrefreshed tap is dropped before it can
/// charge. Never longer than [`DEFAULT_KEY_RELEASE_TIMEOUT_MS`].
pub fn key_release_timeout_for(das_delay: u32) -> u32 {
    DEFAULT_KEY_RELEASE_TIMEOUT_MS.min(das_delay.saturating_sub(1))
}

/// Actions emitted by one scheduler update.
pub type RepeatActions = ArrayVec<GameAction, 32>;

/// Inputs that auto-repeat while held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepeatKey {
    Left,
    Right,
    SoftDrop,
}

impl RepeatKey {
    pub fn action(self) -> GameAction {
        match self {
            RepeatKey::Left => GameAction::MoveLeft,
            RepeatKey::Right => GameAction::MoveRight,
            RepeatKey::SoftDrop => GameAction::SoftDrop,
        }
    }

    /// The repeat key for an action, if that action auto-repeats.
    pub fn from_action(action: GameAction) -> Option<Self> {
        match action {
            GameAction::MoveLeft => Some(RepeatKey::Left),
            GameAction::MoveRight => Some(RepeatKey::Right),
            GameAction::SoftDrop => Some(RepeatKey::SoftDrop),
            _ => None,
        }
    }

    fn opposite(self) -> Option<Self> {
        match self {
            RepeatKey::Left => Some(RepeatKey::Right),
            RepeatKey::Right => Some(RepeatKey::Left),
            RepeatKey::SoftDrop => None,
        }
    }

    /// Repeats emitted per update when ARR is zero. Enough to cross the board.
    fn burst_len(self) -> u8 {
        match self {
            RepeatKey::Left | RepeatKey::Right => BOARD_WIDTH,
            RepeatKey::SoftDrop => BOARD_HEIGHT,
        }
    }
}

/// Pending auto-repeat for one held input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepeatTask {
    key: RepeatKey,
    das_timer: u32,
    arr_accumulator: u32,
    /// Time since the key was last pressed or refreshed.
    idle_ms: u32,
}

impl RepeatTask {
    fn new(key: RepeatKey) -> Self {
        Self {
            key,
            das_timer: 0,
            arr_accumulator: 0,
            idle_ms: 0,
        }
    }

    pub fn key(&self) -> RepeatKey {
        self.key
    }

    /// Whether the DAS delay has passed and the task is repeating.
    pub fn is_charged(&self, das_delay: u32) -> bool {
        self.das_timer >= das_delay
    }
}

/// Tracks held inputs and turns them into repeated actions.
#[derive(Debug, Clone)]
pub struct RepeatScheduler {
    tasks: ArrayVec<RepeatTask, 3>,
    das_delay: u32,
    arr_rate: u32,
    key_release_timeout_ms: u32,
}

impl RepeatScheduler {
    pub fn new() -> Self {
        Self::with_config(DEFAULT_DAS_MS, DEFAULT_ARR_MS)
    }

    pub fn with_config(das_delay: u32, arr_rate: u32) -> Self {
        Self {
            tasks: ArrayVec::new(),
            das_delay,
            arr_rate,
            key_release_timeout_ms: key_release_timeout_for(das_delay),
        }
    }

    pub fn with_key_release_timeout_ms(mut self, timeout_ms: u32) -> Self {
        self.set_key_release_timeout_ms(timeout_ms);
        self
    }

    pub fn set_key_release_timeout_ms(&mut self, timeout_ms: u32) {
        self.key_release_timeout_ms = timeout_ms;
    }

    /// Keep tasks until [`release`](Self::release). For terminals that report
    /// key release events.
    pub fn disable_auto_release(&mut self) {
        self.key_release_timeout_ms = u32::MAX;
    }

    pub fn das_delay(&self) -> u32 {
        self.das_delay
    }

    pub fn arr_rate(&self) -> u32 {
        self.arr_rate
    }

    pub fn key_release_timeout_ms(&self) -> u32 {
        self.key_release_timeout_ms
    }

    pub fn is_held(&self, key: RepeatKey) -> bool {
        self.task(key).is_some()
    }

    pub fn task(&self, key: RepeatKey) -> Option<&RepeatTask> {
        self.tasks.iter().find(|t| t.key == key)
    }

    /// First press of `key`. Returns the action to apply immediately.
    ///
    /// Pressing a key that is already held only refreshes it, matching a
    /// terminal's own key-repeat. Left and right are exclusive: the newer one
    /// replaces the other.
    pub fn press(&mut self, key: RepeatKey) -> Option<GameAction> {
        if self.refresh(key) {
            return None;
        }
        if let Some(opposite) = key.opposite() {
            self.release(opposite);
        }
        self.tasks.push(RepeatTask::new(key));
        Some(key.action())
    }

    /// Mark `key` as still held without firing. Returns false if it is not held.
    pub fn refresh(&mut self, key: RepeatKey) -> bool {
        match self.tasks.iter_mut().find(|t| t.key == key) {
            Some(task) => {
                task.idle_ms = 0;
                true
            }
            None => false,
        }
    }

    /// Cancel the task for `key`. Takes effect before the next update.
    pub fn release(&mut self, key: RepeatKey) {
        self.tasks.retain(|t| t.key != key);
    }

    /// Cancel every task.
    pub fn reset(&mut self) {
        self.tasks.clear();
    }

    /// Advance all tasks by `elapsed_ms` and collect due repeats.
    pub fn update(&mut self, elapsed_ms: u32) -> RepeatActions {
        let mut actions = RepeatActions::new();

        // Auto-release when terminal does not emit release events.
        let timeout = self.key_release_timeout_ms;
        self.tasks.retain(|t| {
            t.idle_ms = t.idle_ms.saturating_add(elapsed_ms);
            t.idle_ms <= timeout
        });

        for task in self.tasks.iter_mut() {
            let prev_das = task.das_timer;
            task.das_timer = task.das_timer.saturating_add(elapsed_ms);
            if task.das_timer < self.das_delay {
                continue;
            }

            if self.arr_rate == 0 {
                for _ in 0..task.key.burst_len() {
                    let _ = actions.try_push(task.key.action());
                }
                continue;
            }

            let excess = if prev_das < self.das_delay {
                task.das_timer - self.das_delay
            } else {
                elapsed_ms
            };
            task.arr_accumulator = task.arr_accumulator.saturating_add(excess);

            while task.arr_accumulator >= self.arr_rate {
                let _ = actions.try_push(task.key.action());
                task.arr_accumulator -= self.arr_rate;
            }
        }

        actions
    }
}

impl Default for RepeatScheduler {
    fn default() -> Self {
        Self::new()
    }
}
