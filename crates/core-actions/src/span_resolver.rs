//! Movement resolution.
//!
//! `apply_movement` moves a position by a `Movement` repeated `count` times;
//! it backs both plain cursor motions and operator targets. `resolve_movement_span`
//! turns an operator's movement into the span it acts on, applying the motion class
//! (exclusive / inclusive / linewise) and the two word special cases:
//! * `cw` / `cW` on a non-blank acts like `ce` / `cE`;
//! * when the last word step of an operator crosses a line break, the span ends at
//!   the end of the line where that step started.
//!
//! Resolution never mutates the document. A movement that cannot advance reports
//! `false` / `Err` and the caller turns that into a no-op.

use core_config::Config;
use core_keymap::{Action, MotionClass, Movement};
use core_model::BufferAdapter;
use core_state::TextSpan;
use core_text::{CharStream, Position, grapheme, motion, scan::CharClass};
use tracing::debug;

use crate::VimError;

/// How a movement is being applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveContext {
    /// Normal-mode cursor motion: rests on a character.
    Normal,
    /// Visual-mode selection extension.
    Visual,
    /// Operator target: may land just past the last character of a line.
    Operator,
}

/// Move `pos` by `movement` repeated `count` times. `count` is the effective repeat
/// (1 when none was typed); for `LineJump` it is the 1-based line number. Returns
/// whether the position changed.
pub fn apply_movement<A: BufferAdapter + ?Sized>(
    buf: &A,
    pos: &mut Position,
    movement: Movement,
    count: usize,
    cx: MoveContext,
    sticky_col: &mut Option<usize>,
    config: &Config,
) -> bool {
    let count = count.max(1);
    let before = *pos;
    let mut keep_sticky = false;
    match movement {
        Movement::Left => {
            for _ in 0..count {
                if !motion::left(buf, pos) {
                    break;
                }
            }
        }
        Movement::Right => {
            for _ in 0..count {
                if !motion::right(buf, pos, cx == MoveContext::Operator) {
                    break;
                }
            }
        }
        Movement::Up | Movement::VisualUp => {
            *sticky_col = motion::move_lines(buf, pos, -signed(count), *sticky_col);
            keep_sticky = true;
        }
        Movement::Down | Movement::VisualDown => {
            *sticky_col = motion::move_lines(buf, pos, signed(count), *sticky_col);
            keep_sticky = true;
        }
        Movement::PageUp | Movement::PageDown => {
            let lines = config
                .page_lines(buf.viewport_lines())
                .saturating_mul(count);
            let delta = if movement == Movement::PageUp {
                -signed(lines)
            } else {
                signed(lines)
            };
            *sticky_col = motion::move_lines(buf, pos, delta, *sticky_col);
            keep_sticky = true;
        }
        Movement::HalfPageUp | Movement::HalfPageDown => {
            let lines = config
                .half_page_lines(buf.viewport_lines())
                .saturating_mul(count);
            let delta = if movement == Movement::HalfPageUp {
                -signed(lines)
            } else {
                signed(lines)
            };
            *sticky_col = motion::move_lines(buf, pos, delta, *sticky_col);
            keep_sticky = true;
        }
        Movement::StartOfLine => motion::line_start(pos),
        Movement::EndOfLine => {
            if count > 1 {
                motion::move_lines(buf, pos, signed(count - 1), None);
            }
            motion::line_end(buf, pos);
            *sticky_col = Some(usize::MAX);
            keep_sticky = true;
        }
        Movement::FirstCharacter => motion::first_non_blank(buf, pos),
        Movement::LineJump => jump_to_line(buf, pos, count - 1),
        Movement::StartOfDocument => jump_to_line(buf, pos, 0),
        Movement::EndOfDocument => {
            jump_to_line(buf, pos, buf.logical_line_count().saturating_sub(1))
        }
        Movement::WordForward
        | Movement::BigWordForward
        | Movement::ForwardEndOfWord
        | Movement::ForwardEndOfBigWord
        | Movement::WordBackward
        | Movement::BigWordBackward
        | Movement::BackwardEndOfWord
        | Movement::BackwardEndOfBigWord => {
            let stream = CharStream::new(buf);
            let step: fn(&CharStream, &mut Position, bool) -> bool = match movement {
                Movement::WordForward | Movement::BigWordForward => motion::word_forward,
                Movement::ForwardEndOfWord | Movement::ForwardEndOfBigWord => {
                    motion::word_end_forward
                }
                Movement::WordBackward | Movement::BigWordBackward => motion::word_backward,
                _ => motion::word_end_backward,
            };
            let big = matches!(
                movement,
                Movement::BigWordForward
                    | Movement::ForwardEndOfBigWord
                    | Movement::BigWordBackward
                    | Movement::BackwardEndOfBigWord
            );
            for _ in 0..count {
                if !step(&stream, pos, big) {
                    break;
                }
            }
        }
        Movement::FindForward(_)
        | Movement::FindBackward(_)
        | Movement::TillForward(_)
        | Movement::TillBackward(_) => {
            if let Some((kind, target)) = movement.find()
                && let Some(found) = motion::find_in_line(
                    buf,
                    *pos,
                    target,
                    kind.is_forward(),
                    kind.is_till(),
                    count,
                )
            {
                *pos = found;
            }
        }
    }
    if !keep_sticky {
        *sticky_col = None;
    }
    if cx != MoveContext::Operator {
        motion::normalize_normal_mode_position(buf, pos);
    }
    *pos != before
}

fn signed(n: usize) -> isize {
    isize::try_from(n).unwrap_or(isize::MAX)
}

fn jump_to_line<A: BufferAdapter + ?Sized>(buf: &A, pos: &mut Position, line: usize) {
    pos.line = line.min(buf.logical_line_count().saturating_sub(1));
    motion::first_non_blank(buf, pos);
}

/// Movements whose span is valid even when the cursor does not move (`d$` on the last
/// character, `dG` on the last line).
fn succeeds_in_place(movement: Movement) -> bool {
    matches!(
        movement,
        Movement::EndOfLine
            | Movement::LineJump
            | Movement::StartOfDocument
            | Movement::EndOfDocument
    )
}

/// Span an operator acts on when its target is `movement`.
pub fn resolve_movement_span<A: BufferAdapter + ?Sized>(
    buf: &A,
    cursor: Position,
    action: Action,
    movement: Movement,
    count: usize,
    config: &Config,
) -> Result<TextSpan, VimError> {
    let count = count.max(1);
    if movement.is_word_forward() {
        let big = movement == Movement::BigWordForward;
        let stream = CharStream::new(buf);
        let idx = stream.index_of(cursor);
        if action == Action::Change && stream.class(idx, big) != CharClass::Blank {
            return change_word_span(&stream, idx, big, count);
        }
        return word_forward_span(buf, &stream, idx, big, count);
    }

    let mut target = cursor;
    if let Some((kind, c)) = movement.find() {
        // `dt,` with the `,` right after the cursor targets the cursor cell itself.
        let Some(found) =
            motion::find_in_line(buf, cursor, c, kind.is_forward(), kind.is_till(), count)
        else {
            debug!(target: "vim.exec", ?movement, "find_target_missing");
            return Err(VimError::TargetNotFound);
        };
        target = found;
    } else {
        let mut sticky = None;
        let moved = apply_movement(
            buf,
            &mut target,
            movement,
            count,
            MoveContext::Operator,
            &mut sticky,
            config,
        );
        if !moved && !succeeds_in_place(movement) {
            debug!(target: "vim.exec", ?movement, "operator_target_unresolved");
            return Err(VimError::NoRoom);
        }
    }
    let span = match movement.class() {
        MotionClass::Linewise => TextSpan::lines(cursor.line, target.line),
        MotionClass::Exclusive => TextSpan::charwise(cursor, target),
        MotionClass::Inclusive => {
            let (start, last) = if target < cursor {
                (target, cursor)
            } else {
                (cursor, target)
            };
            let content = buf.line_content(last.line);
            let end = Position::new(last.line, grapheme::next_boundary(&content, last.byte));
            TextSpan::charwise(start, end)
        }
    };
    Ok(span)
}

fn word_forward_span<A: BufferAdapter + ?Sized>(
    buf: &A,
    stream: &CharStream,
    start_idx: usize,
    big: bool,
    count: usize,
) -> Result<TextSpan, VimError> {
    let mut idx = start_idx;
    let mut step_start = idx;
    for _ in 0..count {
        let next = stream.next_word_start(idx, big);
        if next == idx {
            break;
        }
        step_start = idx;
        idx = next;
    }
    if idx == start_idx {
        return Err(VimError::NoRoom);
    }
    let from = stream.position_of(step_start);
    let mut target = stream.position_of(idx);
    if target.line > from.line {
        target = Position::new(from.line, buf.line_byte_len(from.line));
    }
    Ok(TextSpan::charwise(stream.position_of(start_idx), target))
}

/// `cw`: through the end of the current word, then `count - 1` further word ends.
fn change_word_span(
    stream: &CharStream,
    start_idx: usize,
    big: bool,
    count: usize,
) -> Result<TextSpan, VimError> {
    let class = stream.class(start_idx, big);
    let mut idx = start_idx;
    if stream.class(start_idx + 1, big) == class
        && let Some(end) = stream.next_word_end(idx, big)
    {
        idx = end;
    }
    for _ in 1..count {
        match stream.next_word_end(idx, big) {
            Some(end) => idx = end,
            None => break,
        }
    }
    Ok(TextSpan::charwise(
        stream.position_of(start_idx),
        stream.position_of(idx + 1),
    ))
}
