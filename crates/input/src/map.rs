//! Key mapping from terminal events to game actions.
//!
//! | Key | Action |
//! |-----|--------|
//! | `A` / Left | move left (repeats) |
//! | `D` / Right | move right (repeats) |
//! | `K` / Down | soft drop (repeats) |
//! | `I` | hard drop |
//! | `J` | rotate counter-clockwise |
//! | `L` / Up | rotate clockwise |
//! | `W` | rotate 180 |
//! | Space | start / restart |
//! | `P` | pause |
//! | `Q` / Ctrl-C | quit |

use crate::types::GameAction;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Map keyboard input to game actions.
pub fn handle_key_event(key: KeyEvent) -> Option<GameAction> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return None;
    }

    match key.code {
        // Movement
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(GameAction::MoveLeft),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(GameAction::MoveRight),
        KeyCode::Down | KeyCode::Char('k') | KeyCode::Char('K') => Some(GameAction::SoftDrop),
        KeyCode::Char('i') | KeyCode::Char('I') => Some(GameAction::HardDrop),

        // Rotation
        KeyCode::Up | KeyCode::Char('l') | KeyCode::Char('L') => Some(GameAction::RotateCw),
        KeyCode::Char('j') | KeyCode::Char('J') => Some(GameAction::RotateCcw),
        KeyCode::Char('w') | KeyCode::Char('W') => Some(GameAction::Rotate180),

        // Game flow
        KeyCode::Char(' ') => Some(GameAction::Restart),
        KeyCode::Char('p') | KeyCode::Char('P') => Some(GameAction::Pause),

        _ => None,
    }
}

/// Check if key should quit the game.
pub fn should_quit(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q'))
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

/// Actions that stay available while no game is running or the game is paused.
pub fn is_flow_action(action: GameAction) -> bool {
    matches!(action, GameAction::Restart | GameAction::Pause)
}
