use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::session::TARGET_COUNT;

/// One key per target, row by row
pub const TARGET_KEYS: [char; TARGET_COUNT] =
    ['1', '2', '3', '4', 'q', 'w', 'e', 'r', 'a', 's', 'd', 'f'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Start,
    Select(usize),
    Quit,
}

pub fn key_for_target(id: usize) -> Option<char> {
    TARGET_KEYS.get(id).copied()
}

pub fn action_for(key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Esc => Some(Action::Quit),
        // ctrl+c to quit
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Action::Quit),
        KeyCode::Char(' ') | KeyCode::Enter => Some(Action::Start),
        KeyCode::Char(c) => {
            let c = c.to_ascii_lowercase();
            TARGET_KEYS
                .iter()
                .position(|k| *k == c)
                .map(Action::Select)
        }
        _ => None,
    }
}
