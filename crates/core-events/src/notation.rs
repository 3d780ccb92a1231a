//! Key notation parser (`"d2w<Esc><C-d>"` -> key events).
//!
//! Used by tests and the harness binary to script key input. Accepted forms:
//! plain characters, `<Name>` for named keys, and `<C-x>` / `<A-x>` / `<S-x>`
//! modifier prefixes (combinable, e.g. `<C-S-x>`). A literal `<` is written `<lt>`.

use crate::{KeyCode, KeyEvent, KeyModifiers};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NotationError {
    #[error("unterminated key notation starting at byte {0}")]
    Unterminated(usize),
    #[error("unknown key name `{0}`")]
    UnknownKey(String),
    #[error("empty key notation `<>` at byte {0}")]
    Empty(usize),
}

pub fn parse_keys(input: &str) -> Result<Vec<KeyEvent>, NotationError> {
    let mut out = Vec::new();
    let mut rest = input;
    let mut offset = 0usize;
    while let Some(c) = rest.chars().next() {
        if c == '<' {
            let Some(close) = rest.find('>') else {
                return Err(NotationError::Unterminated(offset));
            };
            let body = &rest[1..close];
            if body.is_empty() {
                return Err(NotationError::Empty(offset));
            }
            out.push(parse_bracketed(body)?);
            rest = &rest[close + 1..];
            offset += close + 1;
        } else {
            out.push(KeyEvent::char(c));
            rest = &rest[c.len_utf8()..];
            offset += c.len_utf8();
        }
    }
    Ok(out)
}

fn parse_bracketed(body: &str) -> Result<KeyEvent, NotationError> {
    let mut mods = KeyModifiers::empty();
    let mut name = body;
    // Modifier prefixes: a single letter followed by '-', as long as something remains after it.
    loop {
        let mut chars = name.chars();
        let (Some(m), Some('-')) = (chars.next(), chars.next()) else {
            break;
        };
        if name.len() <= 2 {
            break;
        }
        let flag = match m.to_ascii_uppercase() {
            'C' => KeyModifiers::CTRL,
            'A' | 'M' => KeyModifiers::ALT,
            'S' => KeyModifiers::SHIFT,
            _ => break,
        };
        mods |= flag;
        name = &name[2..];
    }
    let code = match name.to_ascii_lowercase().as_str() {
        "esc" => KeyCode::Esc,
        "cr" | "enter" | "return" => KeyCode::Enter,
        "bs" | "backspace" => KeyCode::Backspace,
        "tab" => KeyCode::Tab,
        "space" => KeyCode::Char(' '),
        "lt" => KeyCode::Char('<'),
        "gt" => KeyCode::Char('>'),
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" => KeyCode::PageUp,
        "pagedown" => KeyCode::PageDown,
        "del" | "delete" => KeyCode::Delete,
        _ => {
            let mut chars = name.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => KeyCode::Char(c),
                _ => return Err(NotationError::UnknownKey(body.to_string())),
            }
        }
    };
    Ok(KeyEvent::new(code, mods).normalized())
}
