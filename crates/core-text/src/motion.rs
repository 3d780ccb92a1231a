//! Cursor motion primitives.
//!
//! These operate purely on a `TextSource` + `Position` pair and are free of
//! interpreter state. Each returns whether the cursor actually moved so callers
//! can distinguish "no room to move" from success. Word motions take a prebuilt
//! `CharStream` so a counted motion scans the document once.

use crate::{CharStream, Position, TextSource, grapheme};
use unicode_segmentation::UnicodeSegmentation;

/// Normalize a position for Normal-mode semantics: the line is clamped to the last
/// logical line and the byte to the start of the last grapheme so the cursor rests
/// on a real character cell. Empty lines keep byte 0.
pub fn normalize_normal_mode_position<T: TextSource + ?Sized>(src: &T, pos: &mut Position) {
    let last_line = src.logical_line_count().saturating_sub(1);
    if pos.line > last_line {
        pos.line = last_line;
    }
    let content = src.line_content(pos.line);
    if content.is_empty() {
        pos.byte = 0;
        return;
    }
    if pos.byte >= content.len() {
        pos.byte = grapheme::last_start(&content);
    } else if !content.is_char_boundary(pos.byte) {
        pos.byte = grapheme::prev_boundary(&content, pos.byte);
    }
}

/// Move left one grapheme boundary.
pub fn left<T: TextSource + ?Sized>(src: &T, pos: &mut Position) -> bool {
    if pos.byte == 0 {
        return false;
    }
    let content = src.line_content(pos.line);
    let prev = grapheme::prev_boundary(&content, pos.byte);
    let moved = prev < pos.byte;
    pos.byte = prev;
    moved
}

/// Move right one grapheme boundary. With `allow_eol` the cursor may land just past the
/// last grapheme (operator targets, Insert-mode style); otherwise it stops on the last one.
pub fn right<T: TextSource + ?Sized>(src: &T, pos: &mut Position, allow_eol: bool) -> bool {
    let content = src.line_content(pos.line);
    if pos.byte >= content.len() {
        return false;
    }
    let next = grapheme::next_boundary(&content, pos.byte);
    if next >= content.len() && !allow_eol {
        return false;
    }
    pos.byte = next;
    true
}

/// Move to start of line.
pub fn line_start(pos: &mut Position) {
    pos.byte = 0;
}

/// Move onto the last grapheme of the line (byte 0 on empty lines).
pub fn line_end<T: TextSource + ?Sized>(src: &T, pos: &mut Position) {
    pos.byte = grapheme::last_start(&src.line_content(pos.line));
}

/// Move to the first non-blank grapheme; all-blank lines land on their last grapheme.
pub fn first_non_blank<T: TextSource + ?Sized>(src: &T, pos: &mut Position) {
    let content = src.line_content(pos.line);
    pos.byte = grapheme::first_non_blank(&content).min(grapheme::last_start(&content));
}

/// Move `delta` lines (negative = up), clamped to the logical document, preserving a target
/// visual column (sticky). Returns the sticky column to keep across successive vertical motions;
/// when `sticky_col` is `None` it is computed from the current position.
pub fn move_lines<T: TextSource + ?Sized>(
    src: &T,
    pos: &mut Position,
    delta: isize,
    sticky_col: Option<usize>,
) -> Option<usize> {
    let last_line = src.logical_line_count().saturating_sub(1);
    let target = if delta < 0 {
        pos.line.saturating_sub(delta.unsigned_abs())
    } else {
        pos.line.saturating_add(delta as usize).min(last_line)
    };
    if target == pos.line {
        return sticky_col;
    }
    let col = sticky_col
        .unwrap_or_else(|| grapheme::visual_col(&src.line_content(pos.line), pos.byte));
    pos.line = target;
    pos.byte = byte_for_visual_col(src, target, col);
    Some(col)
}

/// Convert a target visual column into a byte offset on a given line, clamping to the
/// last grapheme.
fn byte_for_visual_col<T: TextSource + ?Sized>(src: &T, line: usize, target_col: usize) -> usize {
    let content = src.line_content(line);
    let mut col = 0;
    let mut byte = 0;
    for (b, g) in content.grapheme_indices(true) {
        let w = grapheme::cluster_width(g);
        if col + w > target_col {
            return b;
        }
        col += w;
        byte = b;
    }
    byte
}

fn step_to(stream: &CharStream, pos: &mut Position, target: Option<usize>) -> bool {
    let from = stream.index_of(*pos);
    match target {
        Some(idx) if idx != from => {
            *pos = stream.position_of(idx);
            true
        }
        _ => false,
    }
}

/// `w` / `W`: start of the next word. May land on the document end when no word follows.
pub fn word_forward(stream: &CharStream, pos: &mut Position, big: bool) -> bool {
    let from = stream.index_of(*pos);
    step_to(stream, pos, Some(stream.next_word_start(from, big)))
}

/// `e` / `E`: end of the current or next word.
pub fn word_end_forward(stream: &CharStream, pos: &mut Position, big: bool) -> bool {
    let from = stream.index_of(*pos);
    step_to(stream, pos, stream.next_word_end(from, big))
}

/// `b` / `B`: start of the current or previous word.
pub fn word_backward(stream: &CharStream, pos: &mut Position, big: bool) -> bool {
    let from = stream.index_of(*pos);
    step_to(stream, pos, stream.prev_word_start(from, big))
}

/// `ge` / `gE`: end of the previous word.
pub fn word_end_backward(stream: &CharStream, pos: &mut Position, big: bool) -> bool {
    let from = stream.index_of(*pos);
    step_to(stream, pos, stream.prev_word_end(from, big))
}

/// Same-line character search. Finds the `count`-th occurrence of `target` after
/// (`forward`) or before the cursor; `till` stops one character short. Returns `None`
/// when the line holds fewer occurrences.
pub fn find_in_line<T: TextSource + ?Sized>(
    src: &T,
    pos: Position,
    target: char,
    forward: bool,
    till: bool,
    count: usize,
) -> Option<Position> {
    let content = src.line_content(pos.line);
    let count = count.max(1);
    let hit = if forward {
        content
            .char_indices()
            .filter(|(b, c)| *b > pos.byte && *c == target)
            .nth(count - 1)
            .map(|(b, _)| b)
    } else {
        content
            .char_indices()
            .filter(|(b, c)| *b < pos.byte && *c == target)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .nth(count - 1)
            .map(|(b, _)| b)
    }?;
    let byte = match (till, forward) {
        (false, _) => hit,
        (true, true) => grapheme::prev_boundary(&content, hit),
        (true, false) => grapheme::next_boundary(&content, hit),
    };
    Some(Position::new(pos.line, byte))
}
