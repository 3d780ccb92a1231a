//! Interpreter state: the mode controller, register store and the span type the
//! resolver hands to the executor.
//!
//! Everything here is plain data owned by one interpreter instance. The grammar
//! engine in `core-actions` consults these types but never shares them across
//! threads; notifications about changes are emitted by the engine, not here.

use core_text::Position;
use tracing::debug;

pub mod registers;

pub use core_events::Mode;
pub use registers::{Register, RegisterError, RegisterStore, key_to_register_name};

// ---------------------------- Mode Controller ----------------------------

/// Tracks the active mode. `set` reports whether a transition actually happened so
/// callers notify the host at most once per real change.
#[derive(Debug, Default, Clone)]
pub struct ModeController {
    current: Mode,
}

impl ModeController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Mode {
        self.current
    }

    /// Switch to `mode`. Returns `false` when already there.
    pub fn set(&mut self, mode: Mode) -> bool {
        if self.current == mode {
            return false;
        }
        debug!(target: "vim.mode", from = %self.current, to = %mode, "mode_transition");
        self.current = mode;
        true
    }

    pub fn is_visual(&self) -> bool {
        self.current.is_visual()
    }
}

// ---------------------------- Spans ----------------------------

/// Whether a span covers characters or whole lines. Linewise spans capture text that
/// always ends in `'\n'` (block-wise register content).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanKind {
    Charwise,
    Linewise,
}

/// A resolved region of the document. `start <= end`; for `Charwise` the range is
/// half-open `[start, end)`, for `Linewise` only the line numbers matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSpan {
    pub start: Position,
    pub end: Position,
    pub kind: SpanKind,
}

impl TextSpan {
    /// Construct a span normalizing ordering so that start <= end.
    pub fn new(a: Position, b: Position, kind: SpanKind) -> Self {
        let (start, end) = if a <= b { (a, b) } else { (b, a) };
        Self { start, end, kind }
    }

    pub fn charwise(a: Position, b: Position) -> Self {
        Self::new(a, b, SpanKind::Charwise)
    }

    /// Whole lines `first..=last` (order-insensitive).
    pub fn lines(first: usize, last: usize) -> Self {
        Self::new(
            Position::new(first, 0),
            Position::new(last, 0),
            SpanKind::Linewise,
        )
    }

    pub fn is_linewise(&self) -> bool {
        self.kind == SpanKind::Linewise
    }

    /// Empty charwise spans select nothing; linewise spans always cover at least one line.
    pub fn is_empty(&self) -> bool {
        self.kind == SpanKind::Charwise && self.start == self.end
    }
}
