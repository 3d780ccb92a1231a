//! Span mutation: delete, change, copy, indent and case conversion.
//!
//! Captured text goes through [`save_to_register`], which owns the write policy:
//! placeholder markers are stripped, the selected register is updated (honoring
//! append), named writes are mirrored into the unnamed register and writes to the
//! selection register reach the host clipboard.

use core_keymap::Action;
use core_model::BufferAdapter;
use core_state::{Mode, RegisterStore, TextSpan};
use core_text::{Position, motion};
use tracing::debug;

use super::{ExecContext, Outcome, cursor_to_first_non_blank};
use crate::VimError;

/// Object replacement character hosts embed for non-text content.
const PLACEHOLDER: char = '\u{FFFC}';

pub(super) fn apply<A: BufferAdapter + ?Sized>(
    cx: &mut ExecContext<'_, A>,
    action: Action,
    span: TextSpan,
    register: char,
    levels: usize,
) -> Result<Outcome, VimError> {
    match action {
        Action::Delete => {
            if span.is_empty() {
                return Err(VimError::NoRoom);
            }
            let text = capture(&*cx.buf, span);
            save_to_register(cx.registers, cx.buf, register, &text);
            let at = remove(cx.buf, span);
            if span.is_linewise() {
                cursor_to_first_non_blank(cx.buf, at.line);
            } else {
                let mut pos = at;
                motion::normalize_normal_mode_position(&*cx.buf, &mut pos);
                cx.buf.set_cursor(pos);
            }
            Ok(Outcome::stay())
        }
        Action::Change => {
            if !span.is_empty() {
                let text = capture(&*cx.buf, span);
                save_to_register(cx.registers, cx.buf, register, &text);
            }
            let at = if span.is_linewise() {
                // the last line break survives: the cursor opens an empty line
                let first = span.start.line;
                let last = span.end.line;
                let end = Position::new(last, cx.buf.line_byte_len(last));
                cx.buf.remove_range(Position::new(first, 0), end);
                Position::new(first, 0)
            } else {
                cx.buf.remove_range(span.start, span.end);
                span.start
            };
            cx.buf.set_cursor(at);
            Ok(Outcome::enter(Mode::Insert))
        }
        Action::Copy => {
            let text = capture(&*cx.buf, span);
            save_to_register(cx.registers, cx.buf, register, &text);
            let cursor = cx.buf.cursor();
            let mut pos = if span.is_linewise() {
                Position::new(span.start.line.min(cursor.line), cursor.byte)
            } else {
                span.start.min(cursor)
            };
            motion::normalize_normal_mode_position(&*cx.buf, &mut pos);
            cx.buf.set_cursor(pos);
            Ok(Outcome::stay())
        }
        Action::Indent | Action::UnIndent => {
            let unit = cx.config.indent_unit();
            let (first, last) = (span.start.line, span.end.line);
            for _ in 0..levels.max(1) {
                if action == Action::Indent {
                    cx.buf.indent_lines(first, last, &unit);
                } else {
                    cx.buf.unindent_lines(first, last, &unit);
                }
            }
            debug!(target: "vim.exec", ?action, first, last, levels, "shift_lines");
            cursor_to_first_non_blank(cx.buf, first);
            Ok(Outcome::stay())
        }
        Action::ToUpper | Action::ToLower => {
            let (start, end) = bounds(&*cx.buf, span, true);
            let original = cx.buf.remove_range(start, end);
            let converted = if action == Action::ToUpper {
                original.to_uppercase()
            } else {
                original.to_lowercase()
            };
            cx.buf.insert_text(start, &converted);
            let mut pos = start;
            motion::normalize_normal_mode_position(&*cx.buf, &mut pos);
            cx.buf.set_cursor(pos);
            Ok(Outcome::stay())
        }
        Action::Move | Action::Paste | Action::PasteBefore => Err(VimError::OperatorRequired),
    }
}

/// `[start, end)` of `span` in document positions. Linewise spans cover whole lines,
/// including the final line break when `keep_final_newline` is false and one exists.
fn bounds<A: BufferAdapter + ?Sized>(
    buf: &A,
    span: TextSpan,
    keep_final_newline: bool,
) -> (Position, Position) {
    if !span.is_linewise() {
        return (span.start, span.end);
    }
    let first = span.start.line;
    let last = span.end.line;
    if !keep_final_newline && last + 1 < buf.line_count() {
        (Position::new(first, 0), Position::new(last + 1, 0))
    } else {
        (
            Position::new(first, 0),
            Position::new(last, buf.line_byte_len(last)),
        )
    }
}

/// Text covered by `span`. Linewise captures always end in `'\n'`.
pub(super) fn capture<A: BufferAdapter + ?Sized>(buf: &A, span: TextSpan) -> String {
    let (start, end) = bounds(buf, span, false);
    let mut text = buf.slice(buf.offset_of(start), buf.offset_of(end));
    if span.is_linewise() && !text.ends_with('\n') {
        text.push('\n');
    }
    text
}

/// Remove `span` and return where the cursor should land. Removing the last lines of
/// the document also removes the line break before them.
pub(super) fn remove<A: BufferAdapter + ?Sized>(buf: &mut A, span: TextSpan) -> Position {
    if !span.is_linewise() {
        buf.remove_range(span.start, span.end);
        return span.start;
    }
    let first = span.start.line;
    let last = span.end.line;
    if last + 1 < buf.line_count() {
        buf.remove_range(Position::new(first, 0), Position::new(last + 1, 0));
        Position::new(first, 0)
    } else if first > 0 {
        let start = Position::new(first - 1, buf.line_byte_len(first - 1));
        let end = Position::new(last, buf.line_byte_len(last));
        buf.remove_range(start, end);
        Position::new(first - 1, 0)
    } else {
        let end = Position::new(last, buf.line_byte_len(last));
        buf.remove_range(Position::origin(), end);
        Position::origin()
    }
}

/// Store `text` into `register` and propagate it per the register policy.
pub(super) fn save_to_register<A: BufferAdapter + ?Sized>(
    registers: &mut RegisterStore,
    buf: &mut A,
    register: char,
    text: &str,
) {
    let text: String = text.chars().filter(|c| *c != PLACEHOLDER).collect();
    registers.update(register, &text);
    if register == RegisterStore::BLACK_HOLE {
        return;
    }
    if register != RegisterStore::UNNAMED {
        let value = registers.read(register).to_string();
        registers.update(RegisterStore::UNNAMED, &value);
    }
    if register == RegisterStore::SELECTION {
        buf.set_shared_selection(registers.read(RegisterStore::SELECTION));
    }
}
