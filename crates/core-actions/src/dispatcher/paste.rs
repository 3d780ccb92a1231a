//! Register reads and insertion.

use core_model::BufferAdapter;
use core_state::{RegisterStore, TextSpan};
use core_text::{Position, grapheme};
use tracing::debug;

use super::{ExecContext, cursor_to_first_non_blank};
use crate::VimError;

/// Upper bound on the bytes a counted paste inserts; the count is lowered to fit.
const PASTE_LIMIT: usize = 1 << 20;

/// Content of `register` for pasting. The selection register prefers whatever the
/// host currently holds on its shared selection.
fn read_register<A: BufferAdapter + ?Sized>(
    registers: &RegisterStore,
    buf: &A,
    register: char,
) -> Result<String, VimError> {
    let value = if register == RegisterStore::SELECTION {
        buf.shared_selection()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| registers.read(register).to_string())
    } else {
        registers.read(register).to_string()
    };
    if value.is_empty() {
        debug!(target: "vim.exec", register = %register, "paste_empty_register");
        return Err(VimError::EmptyRegister(register));
    }
    Ok(value)
}

/// `value` repeated `count` times, keeping whole copies within [`PASTE_LIMIT`].
fn repeated(value: &str, count: usize) -> String {
    let fit = (PASTE_LIMIT / value.len().max(1)).max(1);
    let copies = count.clamp(1, fit);
    if copies < count {
        debug!(target: "vim.exec", count, copies, len = value.len(), "paste_count_capped");
    }
    value.repeat(copies)
}

/// `p` / `P`: block content goes on new lines below / above the cursor line; inline
/// content goes after / before the cursor cell.
pub(super) fn paste<A: BufferAdapter + ?Sized>(
    cx: &mut ExecContext<'_, A>,
    register: char,
    after: bool,
    count: usize,
) -> Result<(), VimError> {
    let value = read_register(cx.registers, &*cx.buf, register)?;
    let text = repeated(&value, count);
    let cursor = cx.buf.cursor();
    debug!(
        target: "vim.exec",
        register = %register,
        after,
        count,
        block = value.ends_with('\n'),
        len = text.len(),
        "paste"
    );
    if value.ends_with('\n') {
        let line = cursor.line;
        let first = if !after {
            cx.buf.insert_text(Position::new(line, 0), &text);
            line
        } else if line + 1 < cx.buf.line_count() {
            cx.buf.insert_text(Position::new(line + 1, 0), &text);
            line + 1
        } else {
            // last line has no break to insert after
            let end = Position::new(line, cx.buf.line_byte_len(line));
            let body = format!("\n{}", &text[..text.len() - 1]);
            cx.buf.insert_text(end, &body);
            line + 1
        };
        cursor_to_first_non_blank(cx.buf, first);
        return Ok(());
    }
    let content = cx.buf.line_content(cursor.line);
    let at = if after && !content.is_empty() {
        Position::new(cursor.line, grapheme::next_boundary(&content, cursor.byte))
    } else {
        cursor
    };
    let end = cx.buf.insert_text(at, &text);
    cx.buf.set_cursor(last_char_before(&*cx.buf, end));
    Ok(())
}

/// Paste over a Visual selection. The replaced text is discarded and no register is
/// written.
pub(super) fn replace_selection<A: BufferAdapter + ?Sized>(
    cx: &mut ExecContext<'_, A>,
    register: char,
    span: TextSpan,
    count: usize,
) -> Result<(), VimError> {
    let value = read_register(cx.registers, &*cx.buf, register)?;
    let mut text = repeated(&value, count);
    debug!(
        target: "vim.exec",
        register = %register,
        linewise = span.is_linewise(),
        "paste_replace"
    );
    if span.is_linewise() {
        let first = span.start.line;
        let last = span.end.line;
        let end = Position::new(last, cx.buf.line_byte_len(last));
        cx.buf.remove_range(Position::new(first, 0), end);
        if text.ends_with('\n') {
            text.pop();
        }
        cx.buf.insert_text(Position::new(first, 0), &text);
        cursor_to_first_non_blank(cx.buf, first);
        return Ok(());
    }
    cx.buf.remove_range(span.start, span.end);
    let end = cx.buf.insert_text(span.start, &text);
    if value.ends_with('\n') {
        cursor_to_first_non_blank(cx.buf, span.start.line + 1);
    } else {
        cx.buf.set_cursor(last_char_before(&*cx.buf, end));
    }
    Ok(())
}

/// Start of the grapheme ending at `end`.
fn last_char_before<A: BufferAdapter + ?Sized>(buf: &A, end: Position) -> Position {
    if end.byte == 0 {
        return end;
    }
    let content = buf.line_content(end.line);
    Position::new(end.line, grapheme::prev_boundary(&content, end.byte))
}
