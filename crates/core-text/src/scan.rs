//! Character scanning for word motions and text objects.
//!
//! `CharStream` flattens a run of lines from a `TextSource` into a `Vec<char>`
//! (newlines included) with a parallel table of `Position`s, so scanners can walk
//! across line boundaries with plain index arithmetic and map results back to
//! positions. Line-local scans build a window over just their lines with
//! [`CharStream::lines`]; scans that may cross any number of lines use the whole
//! document.

use crate::{Position, TextSource};

/// Lexical class used by word / WORD scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    /// Space, tab, newline.
    Blank,
    /// Alphanumeric or underscore (any non-blank for WORD scans).
    Word,
    /// Any other non-blank character.
    Punct,
}

/// Classify a character. With `big` set, every non-blank is `Word` (WORD semantics).
pub fn classify(c: char, big: bool) -> CharClass {
    if c.is_whitespace() {
        CharClass::Blank
    } else if big || c == '_' || c.is_alphanumeric() {
        CharClass::Word
    } else {
        CharClass::Punct
    }
}

#[derive(Debug, Clone)]
pub struct CharStream {
    chars: Vec<char>,
    /// `positions[i]` is the position of `chars[i]`; one extra entry for the document end.
    positions: Vec<Position>,
}

impl CharStream {
    /// The whole document.
    pub fn new<T: TextSource + ?Sized>(src: &T) -> Self {
        Self::lines(src, 0, usize::MAX)
    }

    /// Lines `first..=last` only (clamped to the document). Indices are local to the
    /// window; index `0` is the start of `first` and `len()` maps to the start of the
    /// line after `last` (the document end when there is none).
    pub fn lines<T: TextSource + ?Sized>(src: &T, first: usize, last: usize) -> Self {
        let line_count = src.line_count();
        let last = last.min(line_count.saturating_sub(1));
        let first = first.min(last);
        let mut chars = Vec::new();
        let mut positions = Vec::new();
        for line in first..=last {
            let Some(text) = src.line(line) else {
                break;
            };
            for (byte, c) in text.char_indices() {
                chars.push(c);
                positions.push(Position::new(line, byte));
            }
        }
        let end = if last + 1 < line_count {
            Position::new(last + 1, 0)
        } else {
            Position::new(last, src.line_byte_len(last))
        };
        positions.push(end);
        Self { chars, positions }
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<char> {
        self.chars.get(idx).copied()
    }

    pub fn class(&self, idx: usize, big: bool) -> CharClass {
        self.get(idx)
            .map(|c| classify(c, big))
            .unwrap_or(CharClass::Blank)
    }

    /// Index of the first character at or after `pos` (`len()` when past the end).
    pub fn index_of(&self, pos: Position) -> usize {
        self.positions[..self.chars.len()].partition_point(|p| *p < pos)
    }

    /// Position of character `idx`; `len()` (or more) maps to the end of the stream.
    pub fn position_of(&self, idx: usize) -> Position {
        self.positions[idx.min(self.chars.len())]
    }

    /// True when `idx` is the newline of an empty line (word motions stop there).
    pub fn is_empty_line(&self, idx: usize) -> bool {
        self.get(idx) == Some('\n') && (idx == 0 || self.get(idx - 1) == Some('\n'))
    }

    /// `[start, end)` of the line containing `idx`, newline excluded.
    pub fn line_bounds(&self, idx: usize) -> (usize, usize) {
        let idx = idx.min(self.chars.len());
        let mut start = idx;
        while start > 0 && self.chars[start - 1] != '\n' {
            start -= 1;
        }
        let mut end = idx;
        while end < self.chars.len() && self.chars[end] != '\n' {
            end += 1;
        }
        (start, end)
    }

    /// Start of the next word (`w`). Empty lines count as words. Returns `len()` when no
    /// further word exists.
    pub fn next_word_start(&self, idx: usize, big: bool) -> usize {
        let n = self.len();
        if idx >= n {
            return n;
        }
        let start_class = self.class(idx, big);
        let mut j = idx;
        if start_class != CharClass::Blank {
            while j < n && self.class(j, big) == start_class {
                j += 1;
            }
        }
        while j < n && self.class(j, big) == CharClass::Blank {
            if j != idx && self.is_empty_line(j) {
                break;
            }
            j += 1;
        }
        j
    }

    /// End of the current or next word (`e`). `None` when no word follows.
    pub fn next_word_end(&self, idx: usize, big: bool) -> Option<usize> {
        let n = self.len();
        let mut j = idx + 1;
        while j < n && self.class(j, big) == CharClass::Blank {
            j += 1;
        }
        if j >= n {
            return None;
        }
        let class = self.class(j, big);
        while j + 1 < n && self.class(j + 1, big) == class {
            j += 1;
        }
        Some(j)
    }

    /// Start of the current or previous word (`b`). `None` at document start.
    pub fn prev_word_start(&self, idx: usize, big: bool) -> Option<usize> {
        if idx == 0 || self.is_empty() {
            return None;
        }
        let mut j = idx.min(self.len()) - 1;
        while j > 0 && self.class(j, big) == CharClass::Blank && !self.is_empty_line(j) {
            j -= 1;
        }
        if self.class(j, big) == CharClass::Blank {
            return Some(j);
        }
        let class = self.class(j, big);
        while j > 0 && self.class(j - 1, big) == class {
            j -= 1;
        }
        Some(j)
    }

    /// End of the previous word (`ge`). `None` when no word precedes.
    pub fn prev_word_end(&self, idx: usize, big: bool) -> Option<usize> {
        let mut j = idx.min(self.len());
        let class = self.class(j, big);
        if class != CharClass::Blank {
            while j > 0 && self.class(j - 1, big) == class {
                j -= 1;
            }
        }
        if j == 0 {
            return None;
        }
        j -= 1;
        while j > 0 && self.class(j, big) == CharClass::Blank && !self.is_empty_line(j) {
            j -= 1;
        }
        Some(j)
    }
}
