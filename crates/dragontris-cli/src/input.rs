use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use dragontris_engine::Command;

/// What a key press asks the play screen to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Command(Command),
    /// Start a new game after game over.
    Restart,
    Quit,
}

/// Maps a key press to an action.
///
/// `Ctrl+1` .. `Ctrl+9` jump to levels 1-9 and `Ctrl+0` to level 10, but only
/// when `debug` is set. `Ctrl+C` quits. Key releases and repeats of non-movement keys are ignored.
pub fn key_action(event: KeyEvent, debug: bool) -> Option<KeyAction> {
    if event.kind == KeyEventKind::Release {
        return None;
    }
    let repeat = event.kind == KeyEventKind::Repeat;
    let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);

    let action = match event.code {
        KeyCode::Left => KeyAction::Command(Command::MoveLeft),
        KeyCode::Right => KeyAction::Command(Command::MoveRight),
        KeyCode::Down => KeyAction::Command(Command::SoftDrop),
        KeyCode::Up if !repeat => KeyAction::Command(Command::Rotate),
        KeyCode::Char('c' | 'C') if ctrl => KeyAction::Quit,
        KeyCode::Char(c) if ctrl => {
            if !debug || repeat {
                return None;
            }
            let level = c.to_digit(10)?;
            KeyAction::Command(Command::JumpToLevel(if level == 0 { 10 } else { level }))
        }
        _ if repeat => return None,
        KeyCode::Char('p' | 'P') => KeyAction::Command(Command::TogglePause),
        KeyCode::Char('g' | 'G') => KeyAction::Command(Command::ToggleGhost),
        KeyCode::Enter => KeyAction::Command(Command::AcknowledgeLevelUp),
        KeyCode::Char('r' | 'R') => KeyAction::Restart,
        KeyCode::Char('q' | 'Q') | KeyCode::Esc => KeyAction::Quit,
        _ => return None,
    };
    Some(action)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn test_arrow_keys() {
        assert_eq!(
            key_action(press(KeyCode::Left), false),
            Some(KeyAction::Command(Command::MoveLeft))
        );
        assert_eq!(
            key_action(press(KeyCode::Right), false),
            Some(KeyAction::Command(Command::MoveRight))
        );
        assert_eq!(
            key_action(press(KeyCode::Down), false),
            Some(KeyAction::Command(Command::SoftDrop))
        );
        assert_eq!(
            key_action(press(KeyCode::Up), false),
            Some(KeyAction::Command(Command::Rotate))
        );
    }

    #[test]
    fn test_letter_keys() {
        assert_eq!(
            key_action(press(KeyCode::Char('p')), false),
            Some(KeyAction::Command(Command::TogglePause))
        );
        assert_eq!(
            key_action(press(KeyCode::Char('g')), false),
            Some(KeyAction::Command(Command::ToggleGhost))
        );
        assert_eq!(
            key_action(press(KeyCode::Enter), false),
            Some(KeyAction::Command(Command::AcknowledgeLevelUp))
        );
        assert_eq!(key_action(press(KeyCode::Char('q')), false), Some(KeyAction::Quit));
        assert_eq!(key_action(press(KeyCode::Char('x')), false), None);
    }

    #[test]
    fn test_level_jump_only_in_debug() {
        assert_eq!(key_action(ctrl('3'), false), None);
        assert_eq!(
            key_action(ctrl('3'), true),
            Some(KeyAction::Command(Command::JumpToLevel(3)))
        );
        assert_eq!(
            key_action(ctrl('0'), true),
            Some(KeyAction::Command(Command::JumpToLevel(10)))
        );
        assert_eq!(key_action(ctrl('x'), true), None);
    }

    #[test]
    fn test_ctrl_c_quits() {
        assert_eq!(key_action(ctrl('c'), false), Some(KeyAction::Quit));
        assert_eq!(key_action(ctrl('c'), true), Some(KeyAction::Quit));
    }

    #[test]
    fn test_repeat_and_release() {
        let mut held = press(KeyCode::Left);
        held.kind = KeyEventKind::Repeat;
        assert_eq!(
            key_action(held, false),
            Some(KeyAction::Command(Command::MoveLeft))
        );

        let mut held = press(KeyCode::Char('p'));
        held.kind = KeyEventKind::Repeat;
        assert_eq!(key_action(held, false), None);

        let mut released = press(KeyCode::Down);
        released.kind = KeyEventKind::Release;
        assert_eq!(key_action(released, false), None);
    }
}
