//! Rope-based text buffer abstraction plus the read-only `TextSource` view the
//! motion and text-object scanners operate on.

use anyhow::Result;
use ropey::Rope;

/// A text buffer backed by a `ropey::Rope`.
#[derive(Clone, Debug)]
pub struct Buffer {
    rope: Rope,
}

/// A position inside a buffer expressed as (line index, byte offset within that line).
/// Byte offsets sit on grapheme boundaries once produced by the motion helpers.
/// Ordering is document order (line first, then byte).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub line: usize,
    pub byte: usize,
}

impl Position {
    pub fn new(line: usize, byte: usize) -> Self {
        Self { line, byte }
    }
    pub fn origin() -> Self {
        Self { line: 0, byte: 0 }
    }

    /// Clamp into the document: last line at most, line length at most.
    pub fn clamp_to<F>(&mut self, line_count: usize, mut line_len_fn: F)
    where
        F: FnMut(usize) -> usize,
    {
        if line_count == 0 {
            self.line = 0;
            self.byte = 0;
            return;
        }
        if self.line >= line_count {
            self.line = line_count - 1;
        }
        let max_len = line_len_fn(self.line);
        if self.byte > max_len {
            self.byte = max_len;
        }
    }
}

pub mod motion;
pub mod scan;
pub mod width;

pub use scan::CharStream;
pub use width::egc_width;

/// Read-only document queries.
///
/// Implementors provide `line_count` and `line`; every other query has a default
/// built on those two. Lines are returned *with* their trailing `'\n'` when present,
/// matching ropey: a document ending in a newline reports one extra empty line.
pub trait TextSource {
    /// Physical line count (includes the empty line after a final newline).
    fn line_count(&self) -> usize;

    /// Line `idx` including its trailing newline, or `None` past the end.
    fn line(&self, idx: usize) -> Option<String>;

    /// Line text without the trailing newline (empty for out-of-range lines).
    fn line_content(&self, idx: usize) -> String {
        let mut s = self.line(idx).unwrap_or_default();
        if s.ends_with('\n') {
            s.pop();
        }
        s
    }

    /// Byte length of a line excluding any newline.
    fn line_byte_len(&self, idx: usize) -> usize {
        self.line_content(idx).len()
    }

    /// Lines a user can place the cursor on: the empty line after a final newline
    /// is not counted. Always at least 1.
    fn logical_line_count(&self) -> usize {
        let n = self.line_count();
        if n > 1 && self.line(n - 1).map(|l| l.is_empty()).unwrap_or(true) {
            n - 1
        } else {
            n.max(1)
        }
    }

    /// Total document length in bytes.
    fn len_bytes(&self) -> usize {
        (0..self.line_count())
            .map(|l| self.line(l).map(|s| s.len()).unwrap_or(0))
            .sum()
    }

    /// Absolute byte offset of a position (byte clamped to the line length).
    fn offset_of(&self, pos: Position) -> usize {
        let mut total = 0usize;
        for line in 0..pos.line.min(self.line_count()) {
            total += self.line(line).map(|l| l.len()).unwrap_or(0);
        }
        if pos.line >= self.line_count() {
            return total;
        }
        total + pos.byte.min(self.line_byte_len(pos.line))
    }

    /// Position of an absolute byte offset. Offsets pointing at a newline map to the
    /// end of that line; offsets past the end map to the end of the last line.
    fn position_of(&self, offset: usize) -> Position {
        let mut total = 0usize;
        for line in 0..self.line_count() {
            let len = self.line(line).map(|l| l.len()).unwrap_or(0);
            if total + len > offset {
                return Position::new(line, (offset - total).min(self.line_byte_len(line)));
            }
            total += len;
        }
        let last = self.line_count().saturating_sub(1);
        Position::new(last, self.line_byte_len(last))
    }

    /// Text in the absolute byte range `[start, end)`.
    fn slice(&self, start: usize, end: usize) -> String {
        let mut out = String::new();
        if start >= end {
            return out;
        }
        let mut total = 0usize;
        for line in 0..self.line_count() {
            let Some(text) = self.line(line) else {
                break;
            };
            let len = text.len();
            let (ls, le) = (total, total + len);
            if le > start && ls < end {
                let a = start.max(ls) - ls;
                let b = end.min(le) - ls;
                out.push_str(&text[a..b]);
            }
            if le >= end {
                break;
            }
            total = le;
        }
        out
    }

    /// Character starting at `pos`, if any (None at or past line end).
    fn char_at(&self, pos: Position) -> Option<char> {
        let content = self.line_content(pos.line);
        content.get(pos.byte..).and_then(|rest| rest.chars().next())
    }

    /// Whole document as a string.
    fn text(&self) -> String {
        (0..self.line_count())
            .filter_map(|l| self.line(l))
            .collect()
    }
}

impl Buffer {
    /// Construct a buffer from an in-memory string slice.
    pub fn from_str(content: &str) -> Result<Self> {
        Ok(Self {
            rope: Rope::from_str(content),
        })
    }

    fn byte_to_char_index(&self, abs_byte: usize) -> usize {
        self.rope.byte_to_char(abs_byte.min(self.rope.len_bytes()))
    }

    /// Insert `text` at `pos`; returns the position just after the inserted text.
    pub fn insert_str(&mut self, pos: Position, text: &str) -> Position {
        let abs = self.offset_of(pos);
        let char_index = self.byte_to_char_index(abs);
        self.rope.insert(char_index, text);
        self.position_of(abs + text.len())
    }

    /// Remove `[start, end)` and return the removed text.
    pub fn remove(&mut self, start: Position, end: Position) -> String {
        let a = self.offset_of(start);
        let b = self.offset_of(end);
        self.delete_bytes(a.min(b), a.max(b))
    }

    /// Return the UTF-8 slice in the absolute byte range `[start,end)` (clamped).
    pub fn slice_bytes(&self, start: usize, end: usize) -> String {
        let total = self.rope.len_bytes();
        let s = start.min(total);
        let e = end.min(total);
        if s >= e {
            return String::new();
        }
        let start_char = self.rope.byte_to_char(s);
        let end_char = self.rope.byte_to_char(e);
        debug_assert_eq!(self.rope.char_to_byte(start_char), s);
        debug_assert_eq!(self.rope.char_to_byte(end_char), e);
        self.rope.slice(start_char..end_char).to_string()
    }

    /// Delete the UTF-8 slice in absolute byte range `[start,end)` (clamped).
    /// Returns the removed text for register capture.
    pub fn delete_bytes(&mut self, start: usize, end: usize) -> String {
        let total = self.rope.len_bytes();
        let s = start.min(total);
        let e = end.min(total);
        if s >= e {
            return String::new();
        }
        let start_char = self.rope.byte_to_char(s);
        let end_char = self.rope.byte_to_char(e);
        debug_assert_eq!(self.rope.char_to_byte(start_char), s);
        debug_assert_eq!(self.rope.char_to_byte(end_char), e);
        let removed = self.rope.slice(start_char..end_char).to_string();
        self.rope.remove(start_char..end_char);
        removed
    }
}

impl TextSource for Buffer {
    fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    fn line(&self, idx: usize) -> Option<String> {
        if idx < self.rope.len_lines() {
            Some(self.rope.line(idx).to_string())
        } else {
            None
        }
    }

    fn len_bytes(&self) -> usize {
        self.rope.len_bytes()
    }

    fn offset_of(&self, pos: Position) -> usize {
        if pos.line >= self.rope.len_lines() {
            return self.rope.len_bytes();
        }
        self.rope.line_to_byte(pos.line) + pos.byte.min(self.line_byte_len(pos.line))
    }

    fn slice(&self, start: usize, end: usize) -> String {
        self.slice_bytes(start, end)
    }

    fn text(&self) -> String {
        self.rope.to_string()
    }
}

impl TextSource for str {
    fn line_count(&self) -> usize {
        self.split_inclusive('\n').count() + usize::from(self.is_empty() || self.ends_with('\n'))
    }

    fn line(&self, idx: usize) -> Option<String> {
        let mut lines = self.split_inclusive('\n');
        match lines.nth(idx) {
            Some(l) => Some(l.to_string()),
            None if idx == self.split_inclusive('\n').count()
                && (self.is_empty() || self.ends_with('\n')) =>
            {
                Some(String::new())
            }
            None => None,
        }
    }
}

/// Grapheme and width utilities. These are pure helpers operating on a single line.
pub mod grapheme {
    use crate::egc_width;
    use unicode_segmentation::UnicodeSegmentation;

    /// Previous grapheme boundary (returns 0 if already at or below 1st boundary).
    pub fn prev_boundary(line: &str, byte: usize) -> usize {
        if byte == 0 {
            return 0;
        }
        let byte = byte.min(line.len());
        let mut last = 0;
        for (idx, _) in line.grapheme_indices(true) {
            if idx >= byte {
                break;
            }
            last = idx;
        }
        last
    }

    /// Next grapheme boundary (returns line.len() if at or beyond end).
    pub fn next_boundary(line: &str, byte: usize) -> usize {
        if byte >= line.len() {
            return line.len();
        }
        for (idx, _) in line.grapheme_indices(true) {
            if idx > byte {
                return idx;
            }
        }
        line.len()
    }

    /// Start of the last grapheme in the line (0 for empty lines).
    pub fn last_start(line: &str) -> usize {
        prev_boundary(line, line.len())
    }

    /// Compute visual column (terminal cells) up to (but not including) byte offset.
    pub fn visual_col(line: &str, byte: usize) -> usize {
        let mut col = 0;
        for (idx, g) in line.grapheme_indices(true) {
            if idx >= byte {
                break;
            }
            col += egc_width(g) as usize;
        }
        col
    }

    /// Width in terminal cells of this grapheme cluster.
    pub fn cluster_width(g: &str) -> usize {
        egc_width(g) as usize
    }

    /// Byte offset of the first non-blank grapheme (line length if the line is all blank).
    pub fn first_non_blank(line: &str) -> usize {
        line.char_indices()
            .find(|(_, c)| !matches!(c, ' ' | '\t'))
            .map(|(i, _)| i)
            .unwrap_or(line.len())
    }
}
