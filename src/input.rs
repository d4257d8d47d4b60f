//! Input events as screens see them.
//!
//! Two classes of event reach a screen: `KeyDown` carries a key code and
//! `KeyPress` carries a typed character. A printable key produces both,
//! key-down first, so screens can pick whichever they care about.

use crossterm::event::{
    Event as CEvent, KeyCode as CrosstermKeyCode, KeyEvent as CrosstermKeyEvent, KeyEventKind,
    KeyModifiers,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    KeyDown(KeyCode),
    KeyPress(char),
}

/// Key codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    Char(char),
    Enter,
    Esc,
    Backspace,
    Tab,
    Up,
    Down,
    Left,
    Right,
    Other,
}

impl From<CrosstermKeyCode> for KeyCode {
    fn from(code: CrosstermKeyCode) -> Self {
        match code {
            CrosstermKeyCode::Char(c) => KeyCode::Char(c),
            CrosstermKeyCode::Enter => KeyCode::Enter,
            CrosstermKeyCode::Esc => KeyCode::Esc,
            CrosstermKeyCode::Backspace => KeyCode::Backspace,
            CrosstermKeyCode::Tab => KeyCode::Tab,
            CrosstermKeyCode::Up => KeyCode::Up,
            CrosstermKeyCode::Down => KeyCode::Down,
            CrosstermKeyCode::Left => KeyCode::Left,
            CrosstermKeyCode::Right => KeyCode::Right,
            _ => KeyCode::Other,
        }
    }
}

impl InputEvent {
    /// Shorthand for the key-down of a letter or symbol.
    pub fn char_down(c: char) -> Self {
        InputEvent::KeyDown(KeyCode::Char(c))
    }

    pub fn is_key_down(&self, code: KeyCode) -> bool {
        *self == InputEvent::KeyDown(code)
    }
}

/// Translate a crossterm key event into screen events. Releases are
/// dropped, and so are repeats of non-character keys.
pub fn translate_key(key: CrosstermKeyEvent) -> Vec<InputEvent> {
    let code = KeyCode::from(key.code);
    let repeated = key.kind == KeyEventKind::Repeat && !matches!(code, KeyCode::Char(_));
    if key.kind == KeyEventKind::Release || repeated {
        return Vec::new();
    }
    match code {
        KeyCode::Char(c) => {
            // 字母键按下时统一为小写键码，字符事件保留原样
            let down = KeyCode::Char(c.to_ascii_lowercase());
            vec![InputEvent::KeyDown(down), InputEvent::KeyPress(c)]
        }
        KeyCode::Other => Vec::new(),
        code => vec![InputEvent::KeyDown(code)],
    }
}

/// Whether the event asks the host to quit (Ctrl+C).
pub fn is_quit(event: &CEvent) -> bool {
    matches!(
        event,
        CEvent::Key(CrosstermKeyEvent {
            code: CrosstermKeyCode::Char('c'),
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) if modifiers.contains(KeyModifiers::CONTROL)
    )
}

/// All screen events carried by a terminal event.
pub fn translate_event(event: &CEvent) -> Vec<InputEvent> {
    match event {
        CEvent::Key(key) => translate_key(*key),
        _ => Vec::new(),
    }
}
