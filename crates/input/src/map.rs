//! Key mapping from terminal events to game commands.

use crate::types::GameCommand;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Map keyboard input to game commands.
///
/// Digits and the four operator keys strike the matching ball symbol at the
/// flipper. Everything else maps to a session control or is ignored.
pub fn handle_key_event(key: KeyEvent) -> Option<GameCommand> {
    match key.code {
        // Ball strikes
        KeyCode::Char(c @ '0'..='9') => Some(GameCommand::Strike(c)),
        KeyCode::Char(c @ ('+' | '-' | '*' | '/')) => Some(GameCommand::Strike(c)),
        KeyCode::Char('x') | KeyCode::Char('X') => Some(GameCommand::Strike('*')),

        // Session controls
        KeyCode::Backspace | KeyCode::Delete | KeyCode::Char('c') | KeyCode::Char('C') => {
            Some(GameCommand::Clear)
        }
        KeyCode::Char('p') | KeyCode::Char('P') => Some(GameCommand::Pause),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(GameCommand::Restart),

        _ => None,
    }
}

/// Check if key should quit the game.
pub fn should_quit(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc)
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}
