//! Key and mouse mapping from terminal events to player actions.

use crate::types::{PlayerAction, PALETTE_SIZE};
use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

/// Map keyboard input to player actions.
///
/// Key releases are ignored, so terminals that report them do not fire
/// every action twice.
pub fn handle_key_event(key: KeyEvent) -> Option<PlayerAction> {
    if key.kind == KeyEventKind::Release {
        return None;
    }

    match key.code {
        // Cursor
        KeyCode::Left
        | KeyCode::Char('h')
        | KeyCode::Char('H')
        | KeyCode::Char('a')
        | KeyCode::Char('A') => Some(PlayerAction::MoveLeft),
        KeyCode::Right
        | KeyCode::Char('l')
        | KeyCode::Char('L')
        | KeyCode::Char('d')
        | KeyCode::Char('D') => Some(PlayerAction::MoveRight),

        KeyCode::Enter | KeyCode::Char(' ') => Some(PlayerAction::Confirm),

        // Direct pick, 1-based on the keyboard
        KeyCode::Char(c @ '1'..='9') => {
            let n = c as u8 - b'1';
            ((n as usize) < PALETTE_SIZE).then_some(PlayerAction::Pick(n))
        }

        // Session controls
        KeyCode::Char('r') | KeyCode::Char('R') => Some(PlayerAction::Restart),
        KeyCode::Char('m') | KeyCode::Char('M') => Some(PlayerAction::CycleMode),
        KeyCode::Char('z') | KeyCode::Char('Z') => Some(PlayerAction::ToggleZen),
        KeyCode::Char('x') | KeyCode::Char('X') => Some(PlayerAction::CycleDifficulty),
        KeyCode::Char('t') | KeyCode::Char('T') => Some(PlayerAction::ToggleTheme),

        _ => None,
    }
}

/// Check if key should quit the game.
pub fn should_quit(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q'))
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

/// Cell `(x, y)` of a left-button press, if `mouse` is one.
pub fn click_position(mouse: MouseEvent) -> Option<(u16, u16)> {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => Some((mouse.column, mouse.row)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyEventState, KeyModifiers};

    #[test]
    fn test_cursor_keys() {
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Left)),
            Some(PlayerAction::MoveLeft)
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Right)),
            Some(PlayerAction::MoveRight)
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('H'))),
            Some(PlayerAction::MoveLeft)
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('d'))),
            Some(PlayerAction::MoveRight)
        );
    }

    #[test]
    fn test_confirm_keys() {
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Enter)),
            Some(PlayerAction::Confirm)
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char(' '))),
            Some(PlayerAction::Confirm)
        );
    }

    #[test]
    fn test_digit_picks() {
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('1'))),
            Some(PlayerAction::Pick(0))
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('7'))),
            Some(PlayerAction::Pick(6))
        );
        assert_eq!(handle_key_event(KeyEvent::from(KeyCode::Char('8'))), None);
        assert_eq!(handle_key_event(KeyEvent::from(KeyCode::Char('0'))), None);
    }

    #[test]
    fn test_session_keys() {
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('r'))),
            Some(PlayerAction::Restart)
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('M'))),
            Some(PlayerAction::CycleMode)
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('z'))),
            Some(PlayerAction::ToggleZen)
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('x'))),
            Some(PlayerAction::CycleDifficulty)
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('t'))),
            Some(PlayerAction::ToggleTheme)
        );
    }

    #[test]
    fn test_release_is_ignored() {
        let release = KeyEvent {
            code: KeyCode::Enter,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(handle_key_event(release), None);
    }

    #[test]
    fn test_quit_keys() {
        assert!(should_quit(KeyEvent::from(KeyCode::Char('q'))));
        assert!(should_quit(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL
        )));
        assert!(!should_quit(KeyEvent::from(KeyCode::Char('c'))));
    }

    #[test]
    fn test_left_click_only() {
        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 12,
            row: 30,
            modifiers: KeyModifiers::NONE,
        };
        assert_eq!(click_position(click), Some((12, 30)));

        let right = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Right),
            ..click
        };
        assert_eq!(click_position(right), None);

        let moved = MouseEvent {
            kind: MouseEventKind::Moved,
            ..click
        };
        assert_eq!(click_position(moved), None);
    }
}
