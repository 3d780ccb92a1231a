//! Cursor placement around Insert and Replace mode.

use core_keymap::InsertEntry;
use core_model::BufferAdapter;
use core_text::{Position, grapheme, motion};
use tracing::trace;

/// Position the cursor (opening a line when asked) for an insert entry key.
pub(crate) fn enter_insert<A: BufferAdapter + ?Sized>(buf: &mut A, entry: InsertEntry) {
    let cursor = buf.cursor();
    let content = buf.line_content(cursor.line);
    let pos = match entry {
        InsertEntry::Before => cursor,
        InsertEntry::After => {
            Position::new(cursor.line, grapheme::next_boundary(&content, cursor.byte))
        }
        InsertEntry::FirstNonBlank => {
            Position::new(cursor.line, grapheme::first_non_blank(&content))
        }
        InsertEntry::LineEnd => Position::new(cursor.line, content.len()),
        InsertEntry::OpenBelow => {
            buf.insert_text(Position::new(cursor.line, content.len()), "\n");
            Position::new(cursor.line + 1, 0)
        }
        InsertEntry::OpenAbove => {
            buf.insert_text(Position::new(cursor.line, 0), "\n");
            Position::new(cursor.line, 0)
        }
    };
    trace!(target: "vim.mode", ?entry, line = pos.line, byte = pos.byte, "insert_entry");
    buf.set_cursor(pos);
}

/// Leaving Insert or Replace steps back onto the last typed character.
pub(crate) fn leave_insert<A: BufferAdapter + ?Sized>(buf: &mut A) {
    let mut pos = buf.cursor();
    motion::left(&*buf, &mut pos);
    motion::normalize_normal_mode_position(&*buf, &mut pos);
    buf.set_cursor(pos);
}

/// Overwrite the grapheme under the cursor with `c` (append at line end) and advance.
pub(crate) fn replace_char<A: BufferAdapter + ?Sized>(buf: &mut A, c: char) {
    let cursor = buf.cursor();
    let content = buf.line_content(cursor.line);
    if cursor.byte < content.len() {
        let next = grapheme::next_boundary(&content, cursor.byte);
        buf.remove_range(cursor, Position::new(cursor.line, next));
    }
    let mut utf8 = [0u8; 4];
    let end = buf.insert_text(cursor, c.encode_utf8(&mut utf8));
    buf.set_cursor(end);
}
