use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::game::Direction;

/// What a terminal event means to the game, independent of the screen.
///
/// The play mode interprets these per screen: on the start screen `Move(Up)`
/// and `Move(Down)` step through the color options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Move(Direction),
    /// Space: start the game or restart after game over
    Confirm,
    /// Number keys pick a color option (0-based)
    SelectColor(usize),
    /// Left click at a terminal cell
    Click { column: u16, row: u16 },
    Quit,
    None,
}

pub struct InputHandler;

impl InputHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn handle_key_event(&self, key: KeyEvent) -> KeyAction {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return KeyAction::Quit;
        }

        match key.code {
            KeyCode::Up => KeyAction::Move(Direction::Up),
            KeyCode::Down => KeyAction::Move(Direction::Down),
            KeyCode::Left => KeyAction::Move(Direction::Left),
            KeyCode::Right => KeyAction::Move(Direction::Right),

            KeyCode::Char('w') | KeyCode::Char('W') => KeyAction::Move(Direction::Up),
            KeyCode::Char('s') | KeyCode::Char('S') => KeyAction::Move(Direction::Down),
            KeyCode::Char('a') | KeyCode::Char('A') => KeyAction::Move(Direction::Left),
            KeyCode::Char('d') | KeyCode::Char('D') => KeyAction::Move(Direction::Right),

            KeyCode::Char(' ') | KeyCode::Enter => KeyAction::Confirm,
            KeyCode::Char(c @ '1'..='9') => KeyAction::SelectColor(c as usize - '1' as usize),

            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => KeyAction::Quit,

            _ => KeyAction::None,
        }
    }

    pub fn handle_mouse_event(&self, mouse: MouseEvent) -> KeyAction {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => KeyAction::Click {
                column: mouse.column,
                row: mouse.row,
            },
            _ => KeyAction::None,
        }
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}
