//! Buffer adapter contract and the in-memory reference surface.
//!
//! The interpreter never owns the document. It reads and mutates it through
//! [`BufferAdapter`], which a host implements over its own widget. The trait
//! extends [`TextSource`] (line/character queries) with cursor, selection,
//! viewport, mutation and shared-selection hooks.
//!
//! [`EditorModel`] is the implementation used by tests and the `oxmodal`
//! harness: a rope [`Buffer`], a single [`View`] holding cursor and selection
//! anchor, a viewport height and a clipboard slot standing in for the host's
//! shared selection.
//!
//! Invariants (after every public call on `EditorModel`):
//! * the cursor names an existing line and a byte offset no greater than that
//!   line's length;
//! * a selection exists exactly when an anchor is set.

use anyhow::Result;
use core_text::{Buffer, Position, TextSource};
use tracing::trace;

/// Host document surface consumed by the interpreter.
pub trait BufferAdapter: TextSource {
    fn cursor(&self) -> Position;
    fn set_cursor(&mut self, pos: Position);

    /// Selection anchor (the fixed end); the cursor is the moving end.
    fn selection_anchor(&self) -> Option<Position>;
    fn set_selection_anchor(&mut self, anchor: Option<Position>);

    fn clear_selection(&mut self) {
        self.set_selection_anchor(None);
    }

    fn has_selection(&self) -> bool {
        self.selection_anchor().is_some()
    }

    /// Visible text lines; 0 when unknown.
    fn viewport_lines(&self) -> usize;

    /// Insert `text` at `pos`, returning the position just after it.
    fn insert_text(&mut self, pos: Position, text: &str) -> Position;

    /// Remove `[start, end)` and return the removed text.
    fn remove_range(&mut self, start: Position, end: Position) -> String;

    /// Mirror `text` to the host-level shared selection / clipboard.
    fn set_shared_selection(&mut self, text: &str);

    /// Current host shared selection, if the host exposes one.
    fn shared_selection(&self) -> Option<String>;

    /// Prefix every non-empty line in `first..=last` with `unit`.
    fn indent_lines(&mut self, first: usize, last: usize, unit: &str) {
        for line in first..=last.min(self.logical_line_count().saturating_sub(1)) {
            if self.line_byte_len(line) == 0 {
                continue;
            }
            self.insert_text(Position::new(line, 0), unit);
        }
    }

    /// Remove one indent level from every line in `first..=last`: a leading tab, or up to
    /// one unit's worth of leading spaces (8 when the unit is a tab).
    fn unindent_lines(&mut self, first: usize, last: usize, unit: &str) {
        let width = if unit.starts_with('\t') {
            8
        } else {
            unit.len().max(1)
        };
        for line in first..=last.min(self.logical_line_count().saturating_sub(1)) {
            let content = self.line_content(line);
            let strip = if content.starts_with('\t') {
                1
            } else {
                content.bytes().take(width).take_while(|b| *b == b' ').count()
            };
            if strip > 0 {
                self.remove_range(Position::new(line, 0), Position::new(line, strip));
            }
        }
    }
}

/// Cursor and selection state of the single view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct View {
    pub cursor: Position,
    pub anchor: Option<Position>,
}

/// In-memory document implementing [`BufferAdapter`].
#[derive(Debug, Clone)]
pub struct EditorModel {
    buffer: Buffer,
    view: View,
    viewport_height: usize,
    clipboard: Option<String>,
}

impl EditorModel {
    pub fn new(buffer: Buffer) -> Self {
        Self {
            buffer,
            view: View::default(),
            viewport_height: 0,
            clipboard: None,
        }
    }

    pub fn from_text(text: &str) -> Result<Self> {
        Ok(Self::new(Buffer::from_str(text)?))
    }

    pub fn with_viewport_height(mut self, lines: usize) -> Self {
        self.viewport_height = lines;
        self
    }

    /// Host clipboard contents (what the selection register mirrored last).
    pub fn clipboard(&self) -> Option<&str> {
        self.clipboard.as_deref()
    }

    /// Simulate another application placing text on the shared clipboard.
    pub fn set_clipboard(&mut self, text: impl Into<String>) {
        self.clipboard = Some(text.into());
    }

    /// Simulate a mouse selection from `anchor` to `cursor`.
    pub fn select(&mut self, anchor: Position, cursor: Position) {
        self.set_cursor(cursor);
        self.set_selection_anchor(Some(anchor));
    }

    /// Text covered by the current selection, endpoints inclusive of the cursor cell.
    pub fn selected_text(&self) -> Option<String> {
        let anchor = self.view.anchor?;
        let (a, b) = if anchor <= self.view.cursor {
            (anchor, self.view.cursor)
        } else {
            (self.view.cursor, anchor)
        };
        let content = self.buffer.line_content(b.line);
        let end = Position::new(b.line, core_text::grapheme::next_boundary(&content, b.byte));
        Some(
            self.buffer
                .slice(self.buffer.offset_of(a), self.buffer.offset_of(end)),
        )
    }

    fn clamp(&self, mut pos: Position) -> Position {
        pos.clamp_to(self.buffer.line_count(), |l| self.buffer.line_byte_len(l));
        pos
    }
}

impl TextSource for EditorModel {
    fn line_count(&self) -> usize {
        self.buffer.line_count()
    }

    fn line(&self, idx: usize) -> Option<String> {
        self.buffer.line(idx)
    }

    fn len_bytes(&self) -> usize {
        self.buffer.len_bytes()
    }

    fn offset_of(&self, pos: Position) -> usize {
        self.buffer.offset_of(pos)
    }

    fn slice(&self, start: usize, end: usize) -> String {
        self.buffer.slice(start, end)
    }

    fn text(&self) -> String {
        self.buffer.text()
    }
}

impl BufferAdapter for EditorModel {
    fn cursor(&self) -> Position {
        self.view.cursor
    }

    fn set_cursor(&mut self, pos: Position) {
        self.view.cursor = self.clamp(pos);
        trace!(
            target: "vim.exec",
            line = self.view.cursor.line,
            byte = self.view.cursor.byte,
            "cursor_set"
        );
    }

    fn selection_anchor(&self) -> Option<Position> {
        self.view.anchor
    }

    fn set_selection_anchor(&mut self, anchor: Option<Position>) {
        self.view.anchor = anchor.map(|a| self.clamp(a));
    }

    fn viewport_lines(&self) -> usize {
        self.viewport_height
    }

    fn insert_text(&mut self, pos: Position, text: &str) -> Position {
        let pos = self.clamp(pos);
        self.buffer.insert_str(pos, text)
    }

    fn remove_range(&mut self, start: Position, end: Position) -> String {
        let removed = self.buffer.remove(start, end);
        self.view.cursor = self.clamp(self.view.cursor);
        self.view.anchor = self.view.anchor.map(|a| self.clamp(a));
        removed
    }

    fn set_shared_selection(&mut self, text: &str) {
        self.clipboard = Some(text.to_string());
    }

    fn shared_selection(&self) -> Option<String> {
        self.clipboard.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn cursor_is_clamped_to_document() {
        let mut m = EditorModel::from_text("ab\ncd").unwrap();
        m.set_cursor(Position::new(9, 9));
        assert_eq!(m.cursor(), Position::new(1, 2));
    }

    #[test]
    fn remove_reclamps_cursor() {
        let mut m = EditorModel::from_text("abc\ndef").unwrap();
        m.set_cursor(Position::new(1, 2));
        let removed = m.remove_range(Position::new(0, 1), Position::new(1, 3));
        assert_eq!(removed, "bc\ndef");
        assert_eq!(m.text(), "a");
        assert_eq!(m.cursor(), Position::new(0, 1));
    }

    #[test]
    fn selection_round_trip() {
        let mut m = EditorModel::from_text("hello world").unwrap();
        assert!(!m.has_selection());
        m.select(Position::new(0, 6), Position::new(0, 10));
        assert!(m.has_selection());
        assert_eq!(m.selected_text().as_deref(), Some("world"));
        m.clear_selection();
        assert_eq!(m.selection_anchor(), None);
    }

    #[test]
    fn indent_skips_empty_lines_and_unindent_strips_one_unit() {
        let mut m = EditorModel::from_text("a\n\n      b\n").unwrap();
        m.indent_lines(0, 5, "  ");
        assert_eq!(m.text(), "  a\n\n        b\n");
        m.unindent_lines(0, 2, "    ");
        assert_eq!(m.text(), "a\n\n    b\n");
        let mut t = EditorModel::from_text("\t\tx").unwrap();
        t.unindent_lines(0, 0, "\t");
        assert_eq!(t.text(), "\tx");
    }

    #[test]
    fn shared_selection_mirror() {
        let mut m = EditorModel::from_text("").unwrap();
        assert_eq!(m.shared_selection(), None);
        m.set_shared_selection("clip");
        assert_eq!(m.clipboard(), Some("clip"));
        assert_eq!(m.shared_selection().as_deref(), Some("clip"));
    }
}
