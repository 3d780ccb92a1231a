//! Command execution.
//!
//! `execute` applies one completed [`Command`] to the document. Work is split by
//! concern:
//! * `edit`  - span capture, removal and the register write policy
//! * `paste` - register reads and block / inline insertion
//! * `mode`  - cursor placement for Insert / Replace entry and exit
//!
//! Every span is resolved before the first mutation, so a failed resolution leaves
//! both the document and the registers untouched.

use core_config::Config;
use core_keymap::{Action, Token};
use core_model::BufferAdapter;
use core_state::{Mode, RegisterStore, TextSpan};
use core_text::{Position, grapheme, motion};
use tracing::debug;

use crate::span_resolver::{self, MoveContext};
use crate::{Command, VimError, text_object};

mod edit;
pub(crate) mod mode;
mod paste;

/// Interpreter state a command may read or update, borrowed for one execution.
pub(crate) struct ExecContext<'a, A: BufferAdapter + ?Sized> {
    pub buf: &'a mut A,
    pub registers: &'a mut RegisterStore,
    pub config: &'a Config,
    pub mode: Mode,
    pub sticky_col: &'a mut Option<usize>,
}

/// What the engine must do after a successful execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct Outcome {
    /// Mode to switch to, when the command leaves the current one.
    pub mode: Option<Mode>,
}

impl Outcome {
    fn stay() -> Self {
        Self::default()
    }

    fn enter(mode: Mode) -> Self {
        Self { mode: Some(mode) }
    }
}

pub(crate) fn execute<A: BufferAdapter + ?Sized>(
    cx: &mut ExecContext<'_, A>,
    cmd: &Command,
) -> Result<Outcome, VimError> {
    let action = cmd.action();
    let count = cmd.count();
    debug!(
        target: "vim.exec",
        ?action,
        count,
        register = %cmd.register,
        target_token = ?cmd.target(),
        mode = cx.mode.label(),
        "execute"
    );
    if cx.mode.is_visual() {
        return execute_visual(cx, cmd, action, count);
    }
    match action {
        Action::Move => {
            let Some(Token::Movement(movement)) = cmd.target() else {
                return Err(VimError::OperatorRequired);
            };
            let mut pos = cx.buf.cursor();
            span_resolver::apply_movement(
                &*cx.buf,
                &mut pos,
                movement,
                count,
                MoveContext::Normal,
                cx.sticky_col,
                cx.config,
            );
            cx.buf.set_cursor(pos);
            Ok(Outcome::stay())
        }
        Action::Paste | Action::PasteBefore => {
            paste::paste(cx, cmd.register, action == Action::Paste, count)?;
            Ok(Outcome::stay())
        }
        _ => {
            let span = resolve_target(cx, cmd, action, count)?;
            edit::apply(cx, action, span, cmd.register, 1)
        }
    }
}

fn resolve_target<A: BufferAdapter + ?Sized>(
    cx: &ExecContext<'_, A>,
    cmd: &Command,
    action: Action,
    count: usize,
) -> Result<TextSpan, VimError> {
    let cursor = cx.buf.cursor();
    match cmd.target() {
        Some(Token::Movement(movement)) => span_resolver::resolve_movement_span(
            &*cx.buf, cursor, action, movement, count, cx.config,
        ),
        Some(Token::Range(range)) => {
            text_object::resolve_range(&*cx.buf, cursor, range, count).ok_or_else(|| {
                debug!(target: "vim.exec", ?range, "range_not_found");
                VimError::TargetNotFound
            })
        }
        _ => Err(VimError::OperatorRequired),
    }
}

// ---------------------------- Visual ----------------------------

fn execute_visual<A: BufferAdapter + ?Sized>(
    cx: &mut ExecContext<'_, A>,
    cmd: &Command,
    action: Action,
    count: usize,
) -> Result<Outcome, VimError> {
    if action == Action::Move {
        // the anchor stays put; only the moving end travels
        let Some(Token::Movement(movement)) = cmd.target() else {
            return Err(VimError::OperatorRequired);
        };
        if cx.buf.selection_anchor().is_none() {
            let here = cx.buf.cursor();
            cx.buf.set_selection_anchor(Some(here));
        }
        let mut pos = cx.buf.cursor();
        span_resolver::apply_movement(
            &*cx.buf,
            &mut pos,
            movement,
            count,
            MoveContext::Visual,
            cx.sticky_col,
            cx.config,
        );
        cx.buf.set_cursor(pos);
        return Ok(Outcome::stay());
    }
    let span = selection_span(&*cx.buf, cx.mode);
    if action.is_paste() {
        paste::replace_selection(cx, cmd.register, span, count)?;
        cx.buf.clear_selection();
        return Ok(Outcome::enter(Mode::Normal));
    }
    // `3>` in Visual shifts three levels; other actions ignore the count
    let levels = if matches!(action, Action::Indent | Action::UnIndent) {
        count
    } else {
        1
    };
    let outcome = edit::apply(cx, action, span, cmd.register, levels)?;
    cx.buf.clear_selection();
    Ok(Outcome::enter(outcome.mode.unwrap_or(Mode::Normal)))
}

/// Span covered by the Visual selection. Charwise selections include the character
/// under the moving end (the newline when it rests on an empty line).
pub(crate) fn selection_span<A: BufferAdapter + ?Sized>(buf: &A, mode: Mode) -> TextSpan {
    let cursor = buf.cursor();
    let anchor = buf.selection_anchor().unwrap_or(cursor);
    if mode == Mode::VisualLine {
        return TextSpan::lines(anchor.line, cursor.line);
    }
    let (start, last) = if anchor <= cursor {
        (anchor, cursor)
    } else {
        (cursor, anchor)
    };
    let content = buf.line_content(last.line);
    let end = if last.byte >= content.len() {
        if last.line + 1 < buf.line_count() {
            Position::new(last.line + 1, 0)
        } else {
            Position::new(last.line, content.len())
        }
    } else {
        Position::new(last.line, grapheme::next_boundary(&content, last.byte))
    };
    TextSpan::charwise(start, end)
}

/// Place the cursor on the first non-blank of `line` (clamped to the document).
fn cursor_to_first_non_blank<A: BufferAdapter + ?Sized>(buf: &mut A, line: usize) {
    let mut pos = Position::new(line.min(buf.logical_line_count().saturating_sub(1)), 0);
    motion::first_non_blank(&*buf, &mut pos);
    buf.set_cursor(pos);
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_model::EditorModel;
    use pretty_assertions::assert_eq;

    #[test]
    fn charwise_selection_includes_cursor_cell() {
        let mut m = EditorModel::from_text("hello world").unwrap();
        m.select(Position::new(0, 6), Position::new(0, 8));
        let span = selection_span(&m, Mode::Visual);
        assert_eq!(span, TextSpan::charwise(Position::new(0, 6), Position::new(0, 9)));
        // reversed selection
        m.select(Position::new(0, 8), Position::new(0, 6));
        assert_eq!(selection_span(&m, Mode::Visual).end, Position::new(0, 9));
    }

    #[test]
    fn selection_on_empty_line_takes_the_newline() {
        let mut m = EditorModel::from_text("a\n\nb").unwrap();
        m.select(Position::new(0, 0), Position::new(1, 0));
        assert_eq!(selection_span(&m, Mode::Visual).end, Position::new(2, 0));
    }

    #[test]
    fn linewise_selection_covers_lines() {
        let mut m = EditorModel::from_text("a\nb\nc").unwrap();
        m.select(Position::new(2, 0), Position::new(1, 0));
        assert_eq!(selection_span(&m, Mode::VisualLine), TextSpan::lines(1, 2));
    }
}
