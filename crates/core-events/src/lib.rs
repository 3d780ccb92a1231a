//! Core key and notification types for oxmodal.
//!
//! Two halves live here:
//! * The key model: `KeyEvent` (code + modifier set) with the classification
//!   helpers the grammar engine relies on (`is_digit`, `is_alphabet`, ...).
//! * The outbound notification channel: `VimEvent` values pushed through an
//!   `EventSink` so hosts observe mode changes, status messages and status
//!   snapshots without being called back from inside the interpreter.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

pub mod notation;
pub use notation::{NotationError, parse_keys};

// -------------------------------------------------------------------------------------------------
// Telemetry
// -------------------------------------------------------------------------------------------------
// Relaxed atomic counter; the first failure is logged, tests read the rest.
// -------------------------------------------------------------------------------------------------
pub static NOTIFY_SEND_FAILURES: AtomicU64 = AtomicU64::new(0); // receiver dropped

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct KeyModifiers: u8 {
        const CTRL = 0b0000_0001;
        const ALT  = 0b0000_0010;
        const SHIFT= 0b0000_0100;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// KeyCode enumerates normalized logical key representations consumed by higher layers.
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
    Home,
    End,
    PageUp,
    PageDown,
    Delete,
    /// A bare modifier press (Shift, Ctrl, ...) reported by some hosts. Never valid input.
    Modifier,
}

/// A single key press: code plus modifier set. Equality is by code and modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub mods: KeyModifiers,
}

impl KeyEvent {
    pub const fn new(code: KeyCode, mods: KeyModifiers) -> Self {
        Self { code, mods }
    }

    /// Unmodified key.
    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::empty())
    }

    /// Printable character key without modifiers.
    pub const fn char(c: char) -> Self {
        Self::plain(KeyCode::Char(c))
    }

    /// Ctrl chord on a character key (`<C-d>`).
    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CTRL)
    }

    /// Fold SHIFT into the character for `Char` codes so `Shift+a` and `A` compare equal.
    /// Hosts may report either form; the character carries the case afterwards.
    pub fn normalized(self) -> Self {
        match self.code {
            KeyCode::Char(c) if self.mods.contains(KeyModifiers::SHIFT) => {
                let upper = if c.is_ascii_lowercase() {
                    c.to_ascii_uppercase()
                } else {
                    c
                };
                Self::new(KeyCode::Char(upper), self.mods - KeyModifiers::SHIFT)
            }
            _ => self,
        }
    }

    fn is_unchorded(&self) -> bool {
        !self.mods.intersects(KeyModifiers::CTRL | KeyModifiers::ALT)
    }

    /// Printable character carried by this key (no Ctrl/Alt chord).
    pub fn as_char(&self) -> Option<char> {
        match self.code {
            KeyCode::Char(c) if self.is_unchorded() && !c.is_control() => Some(c),
            _ => None,
        }
    }

    pub fn is_digit(&self) -> bool {
        matches!(self.as_char(), Some(c) if c.is_ascii_digit())
    }

    /// Numeric value of a digit key.
    ///
    /// # Panics
    /// Panics when `is_digit()` does not hold; callers must check first.
    pub fn to_digit(&self) -> u32 {
        assert!(self.is_digit(), "to_digit called on non-digit key {self}");
        match self.as_char().and_then(|c| c.to_digit(10)) {
            Some(d) => d,
            None => unreachable!("digit key without digit value"),
        }
    }

    /// ASCII letter key; case comes from the character (or SHIFT on a lowercase code).
    pub fn is_alphabet(&self) -> bool {
        matches!(self.normalized().as_char(), Some(c) if c.is_ascii_alphabetic())
    }

    /// Letter carried by this key, upper-cased when SHIFT is held.
    ///
    /// # Panics
    /// Panics when `is_alphabet()` does not hold.
    pub fn to_alphabet(&self) -> char {
        assert!(
            self.is_alphabet(),
            "to_alphabet called on non-letter key {self}"
        );
        match self.normalized().as_char() {
            Some(c) => c,
            None => unreachable!("letter key without character"),
        }
    }

    /// False for bare modifier presses and NUL characters.
    pub fn is_valid(&self) -> bool {
        !matches!(self.code, KeyCode::Modifier | KeyCode::Char('\0'))
    }
}

impl fmt::Display for KeyEvent {
    /// Vim-style notation: `d`, `<Esc>`, `<C-d>`, `<lt>`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.code {
            KeyCode::Char('<') => Some("lt".to_string()),
            KeyCode::Char(' ') => Some("Space".to_string()),
            KeyCode::Char(c) => {
                if self.mods.is_empty() {
                    return write!(f, "{c}");
                }
                Some(c.to_string())
            }
            KeyCode::Enter => Some("CR".to_string()),
            KeyCode::Esc => Some("Esc".to_string()),
            KeyCode::Backspace => Some("BS".to_string()),
            KeyCode::Tab => Some("Tab".to_string()),
            KeyCode::Up => Some("Up".to_string()),
            KeyCode::Down => Some("Down".to_string()),
            KeyCode::Left => Some("Left".to_string()),
            KeyCode::Right => Some("Right".to_string()),
            KeyCode::Home => Some("Home".to_string()),
            KeyCode::End => Some("End".to_string()),
            KeyCode::PageUp => Some("PageUp".to_string()),
            KeyCode::PageDown => Some("PageDown".to_string()),
            KeyCode::Delete => Some("Del".to_string()),
            KeyCode::Modifier => None,
        };
        let Some(name) = name else {
            return Ok(());
        };
        f.write_str("<")?;
        if self.mods.contains(KeyModifiers::CTRL) {
            f.write_str("C-")?;
        }
        if self.mods.contains(KeyModifiers::ALT) {
            f.write_str("A-")?;
        }
        if self.mods.contains(KeyModifiers::SHIFT) {
            f.write_str("S-")?;
        }
        write!(f, "{name}>")
    }
}

/// Render a key sequence in notation form (used for the pending-keys status field).
pub fn render_keys(keys: &[KeyEvent]) -> String {
    keys.iter().map(|k| k.to_string()).collect()
}

// -------------------------------------------------------------------------------------------------
// Modes + outbound notifications
// -------------------------------------------------------------------------------------------------

/// Interpreter mode. Exactly one is active at a time; Normal is initial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    #[default]
    Normal,
    Insert,
    Visual,
    VisualLine,
    Replace,
}

impl Mode {
    pub fn is_visual(self) -> bool {
        matches!(self, Mode::Visual | Mode::VisualLine)
    }

    /// Status-line label.
    pub fn label(self) -> &'static str {
        match self {
            Mode::Normal => "NORMAL",
            Mode::Insert => "INSERT",
            Mode::Visual => "VISUAL",
            Mode::VisualLine => "VISUAL LINE",
            Mode::Replace => "REPLACE",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Persistent status-line snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VimStatus {
    pub mode: Mode,
    /// Keys typed for the command being built, in notation form.
    pub pending_keys: String,
    /// Register targeted by the next write.
    pub register: char,
}

/// Notifications delivered to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VimEvent {
    ModeChanged(Mode),
    /// Transient human-readable feedback (invalid command, ...).
    Message(String),
    StatusUpdated(VimStatus),
}

/// Sending half of the notification channel.
///
/// Emission never blocks and never fails the caller: a dropped receiver only bumps
/// `NOTIFY_SEND_FAILURES`. A disconnected sink (no receiver at all) is valid for hosts
/// that do not care about notifications.
#[derive(Debug, Clone, Default)]
pub struct EventSink {
    tx: Option<UnboundedSender<VimEvent>>,
}

impl EventSink {
    /// Create a connected sink plus the receiver the host drains (sync `try_recv` or async `recv`).
    pub fn channel() -> (Self, UnboundedReceiver<VimEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    pub fn disconnected() -> Self {
        Self { tx: None }
    }

    pub fn emit(&self, event: VimEvent) {
        let Some(tx) = &self.tx else {
            return;
        };
        if tx.send(event).is_err() {
            let failures = NOTIFY_SEND_FAILURES.fetch_add(1, Ordering::Relaxed) + 1;
            if failures == 1 {
                tracing::warn!(target: "vim.events", "notification receiver dropped");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn digit_classification() {
        assert!(KeyEvent::char('7').is_digit());
        assert_eq!(KeyEvent::char('7').to_digit(), 7);
        assert!(!KeyEvent::char('x').is_digit());
        assert!(!KeyEvent::ctrl('1').is_digit());
    }

    #[test]
    #[should_panic(expected = "to_digit")]
    fn to_digit_on_letter_is_contract_violation() {
        let _ = KeyEvent::char('a').to_digit();
    }

    #[test]
    fn alphabet_case_from_shift() {
        let shifted = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::SHIFT);
        assert!(shifted.is_alphabet());
        assert_eq!(shifted.to_alphabet(), 'A');
        assert_eq!(KeyEvent::char('q').to_alphabet(), 'q');
        assert!(!KeyEvent::char('"').is_alphabet());
    }

    #[test]
    #[should_panic(expected = "to_alphabet")]
    fn to_alphabet_on_digit_is_contract_violation() {
        let _ = KeyEvent::char('3').to_alphabet();
    }

    #[test]
    fn shift_folds_into_char() {
        let shifted = KeyEvent::new(KeyCode::Char('p'), KeyModifiers::SHIFT);
        assert_eq!(shifted.normalized(), KeyEvent::char('P'));
        let ctrl_shift = KeyEvent::new(KeyCode::Char('d'), KeyModifiers::CTRL | KeyModifiers::SHIFT);
        assert_eq!(ctrl_shift.normalized(), KeyEvent::new(KeyCode::Char('D'), KeyModifiers::CTRL));
    }

    #[test]
    fn validity() {
        assert!(KeyEvent::char('a').is_valid());
        assert!(KeyEvent::plain(KeyCode::Esc).is_valid());
        assert!(!KeyEvent::plain(KeyCode::Modifier).is_valid());
        assert!(!KeyEvent::char('\0').is_valid());
    }

    #[test]
    fn display_notation() {
        assert_eq!(KeyEvent::char('d').to_string(), "d");
        assert_eq!(KeyEvent::plain(KeyCode::Esc).to_string(), "<Esc>");
        assert_eq!(KeyEvent::ctrl('d').to_string(), "<C-d>");
        assert_eq!(KeyEvent::char('<').to_string(), "<lt>");
        assert_eq!(
            render_keys(&[KeyEvent::char('2'), KeyEvent::char('d')]),
            "2d"
        );
    }

    #[test]
    fn sink_delivers_in_order() {
        let (sink, mut rx) = EventSink::channel();
        sink.emit(VimEvent::ModeChanged(Mode::Insert));
        sink.emit(VimEvent::Message("hi".into()));
        assert_eq!(rx.try_recv().unwrap(), VimEvent::ModeChanged(Mode::Insert));
        assert_eq!(rx.try_recv().unwrap(), VimEvent::Message("hi".into()));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn dropped_receiver_counts_failure() {
        let (sink, rx) = EventSink::channel();
        drop(rx);
        let before = NOTIFY_SEND_FAILURES.load(Ordering::Relaxed);
        sink.emit(VimEvent::ModeChanged(Mode::Normal));
        assert!(NOTIFY_SEND_FAILURES.load(Ordering::Relaxed) > before);
    }

    #[test]
    fn disconnected_sink_is_silent() {
        let sink = EventSink::disconnected();
        sink.emit(VimEvent::Message("ignored".into()));
    }

    #[tokio::test]
    async fn host_can_await_notifications() {
        let (sink, mut rx) = EventSink::channel();
        sink.emit(VimEvent::ModeChanged(Mode::Visual));
        drop(sink);
        assert_eq!(rx.recv().await, Some(VimEvent::ModeChanged(Mode::Visual)));
        assert_eq!(rx.recv().await, None);
    }
}
