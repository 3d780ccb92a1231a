//! Text objects: `Range` tokens resolved against document content.
//!
//! Each implementation of [`TextObject`] scans outward from the cursor and returns
//! the span an operator acts on, or `None` when no object encloses the cursor.
//! * `Line`: `count` whole lines starting at the cursor line.
//! * Word / WORD: runs of one character class on the cursor line. Inner selects
//!   the run(s) only; around adds trailing blanks (leading blanks when none trail).
//! * Quotes: same-line pairs counted from the line start. Around adds one adjacent
//!   whitespace run.
//! * Brackets: balanced pairs scanned across lines; `count` selects the n-th
//!   enclosing pair.

use core_keymap::Range;
use core_state::TextSpan;
use core_text::{CharStream, Position, TextSource, scan::CharClass};

/// A lexically scanned span around a position.
pub trait TextObject {
    /// Stable identifier used for logging.
    fn name(&self) -> &'static str;
    fn resolve(&self, stream: &CharStream, cursor: usize, count: usize) -> Option<TextSpan>;

    /// Lines `(first, last)` the object can span from `line`, or `None` for the whole
    /// document.
    fn window(&self, _line: usize, _count: usize) -> Option<(usize, usize)> {
        None
    }
}

pub struct Word {
    pub big: bool,
    pub around: bool,
}

pub struct Quote {
    pub quote: char,
    pub around: bool,
}

pub struct Pair {
    pub open: char,
    pub close: char,
    pub around: bool,
}

pub struct Line;

/// Resolve `range` at `cursor`. `count` is the effective repeat.
pub fn resolve_range<T: TextSource + ?Sized>(
    src: &T,
    cursor: Position,
    range: Range,
    count: usize,
) -> Option<TextSpan> {
    let count = count.max(1);
    let object = object_for(range);
    let stream = match object.window(cursor.line, count) {
        Some((first, last)) => CharStream::lines(src, first, last),
        None => CharStream::new(src),
    };
    let idx = stream.index_of(cursor);
    let span = object.resolve(&stream, idx, count);
    tracing::debug!(
        target: "vim.exec",
        object = object.name(),
        count,
        found = span.is_some(),
        "text_object"
    );
    span
}

fn object_for(range: Range) -> Box<dyn TextObject> {
    let around = !range.is_inner();
    match range {
        Range::Line => Box::new(Line),
        Range::WordInner | Range::WordAround => Box::new(Word { big: false, around }),
        Range::BigWordInner | Range::BigWordAround => Box::new(Word { big: true, around }),
        Range::QuoteInner | Range::QuoteAround => Box::new(Quote { quote: '\'', around }),
        Range::DoubleQuoteInner | Range::DoubleQuoteAround => {
            Box::new(Quote { quote: '"', around })
        }
        Range::ParenthesisInner | Range::ParenthesisAround => Box::new(Pair::new('(', ')', around)),
        Range::BracketInner | Range::BracketAround => Box::new(Pair::new('[', ']', around)),
        Range::AngleBracketInner | Range::AngleBracketAround => {
            Box::new(Pair::new('<', '>', around))
        }
        Range::BraceInner | Range::BraceAround => Box::new(Pair::new('{', '}', around)),
    }
}

fn charwise(stream: &CharStream, start: usize, end: usize) -> TextSpan {
    TextSpan::charwise(stream.position_of(start), stream.position_of(end))
}

// ---------------------------- Line ----------------------------

impl TextObject for Line {
    fn name(&self) -> &'static str {
        "line"
    }

    fn window(&self, line: usize, count: usize) -> Option<(usize, usize)> {
        Some((line, line.saturating_add(count - 1)))
    }

    fn resolve(&self, stream: &CharStream, cursor: usize, count: usize) -> Option<TextSpan> {
        let first = stream.position_of(cursor).line;
        let last_line = stream.position_of(stream.len()).line;
        // a trailing newline leaves an empty phantom line that is not selectable
        let last_line = if last_line > 0 && stream.get(stream.len().wrapping_sub(1)) == Some('\n')
        {
            last_line - 1
        } else {
            last_line
        };
        let last = first.saturating_add(count - 1).min(last_line.max(first));
        Some(TextSpan::lines(first, last))
    }
}

// ---------------------------- Word ----------------------------

impl Word {
    /// Exclusive end of the run containing `idx`, bounded by `limit`.
    fn run_end(&self, stream: &CharStream, idx: usize, limit: usize) -> usize {
        let class = stream.class(idx, self.big);
        let mut j = idx;
        while j < limit && stream.class(j, self.big) == class {
            j += 1;
        }
        j
    }

    /// Start of the run containing `idx`, bounded by `floor`.
    fn run_start(&self, stream: &CharStream, idx: usize, floor: usize) -> usize {
        let class = stream.class(idx, self.big);
        let mut j = idx;
        while j > floor && stream.class(j - 1, self.big) == class {
            j -= 1;
        }
        j
    }

    fn is_blank(&self, stream: &CharStream, idx: usize) -> bool {
        stream.class(idx, self.big) == CharClass::Blank
    }
}

impl TextObject for Word {
    fn name(&self) -> &'static str {
        match (self.big, self.around) {
            (false, false) => "inner-word",
            (false, true) => "a-word",
            (true, false) => "inner-WORD",
            (true, true) => "a-WORD",
        }
    }

    fn window(&self, line: usize, _count: usize) -> Option<(usize, usize)> {
        Some((line, line))
    }

    fn resolve(&self, stream: &CharStream, cursor: usize, count: usize) -> Option<TextSpan> {
        let (line_start, line_end) = stream.line_bounds(cursor);
        if line_start == line_end {
            return None;
        }
        let cursor = cursor.min(line_end - 1);
        let mut start = self.run_start(stream, cursor, line_start);
        let mut end = self.run_end(stream, cursor, line_end);
        if !self.around {
            for _ in 1..count {
                if end >= line_end {
                    break;
                }
                end = self.run_end(stream, end, line_end);
            }
            return Some(charwise(stream, start, end));
        }
        if self.is_blank(stream, cursor) {
            // blanks first, then the word that follows
            for i in 0..count {
                if end >= line_end {
                    break;
                }
                end = self.run_end(stream, end, line_end);
                if i + 1 < count && end < line_end {
                    end = self.run_end(stream, end, line_end);
                }
            }
            return Some(charwise(stream, start, end));
        }
        for i in 0..count {
            if i > 0 {
                if end >= line_end {
                    break;
                }
                end = self.run_end(stream, end, line_end);
            }
            if end < line_end && self.is_blank(stream, end) {
                end = self.run_end(stream, end, line_end);
            }
        }
        let trailing = end > 0 && self.is_blank(stream, end - 1);
        if !trailing && start > line_start && self.is_blank(stream, start - 1) {
            start = self.run_start(stream, start - 1, line_start);
        }
        Some(charwise(stream, start, end))
    }
}

// ---------------------------- Quote ----------------------------

impl TextObject for Quote {
    fn name(&self) -> &'static str {
        if self.around { "a-quote" } else { "inner-quote" }
    }

    fn window(&self, line: usize, _count: usize) -> Option<(usize, usize)> {
        Some((line, line))
    }

    fn resolve(&self, stream: &CharStream, cursor: usize, _count: usize) -> Option<TextSpan> {
        let (line_start, line_end) = stream.line_bounds(cursor);
        let quotes: Vec<usize> = (line_start..line_end)
            .filter(|&i| {
                stream.get(i) == Some(self.quote)
                    && (i == line_start || stream.get(i - 1) != Some('\\'))
            })
            .collect();
        let pairs: Vec<(usize, usize)> = quotes.chunks_exact(2).map(|p| (p[0], p[1])).collect();
        let (open, close) = pairs
            .iter()
            .copied()
            .find(|&(o, c)| o <= cursor && cursor <= c)
            // cursor before the first pair on the line selects that pair
            .or_else(|| pairs.iter().copied().find(|&(o, _)| o > cursor))?;
        if !self.around {
            return Some(charwise(stream, open + 1, close));
        }
        let blank = |i: usize| matches!(stream.get(i), Some(' ' | '\t'));
        let mut start = open;
        let mut end = close + 1;
        if end < line_end && blank(end) {
            while end < line_end && blank(end) {
                end += 1;
            }
        } else {
            while start > line_start && blank(start - 1) {
                start -= 1;
            }
        }
        Some(charwise(stream, start, end))
    }
}

// ---------------------------- Pair ----------------------------

impl Pair {
    pub fn new(open: char, close: char, around: bool) -> Self {
        Self {
            open,
            close,
            around,
        }
    }

    /// Unmatched `open` at or before `from` (`from` is never a closing delimiter).
    fn find_open(&self, stream: &CharStream, from: usize) -> Option<usize> {
        let mut depth = 0usize;
        let mut j = from;
        loop {
            match stream.get(j) {
                Some(c) if c == self.close => depth += 1,
                Some(c) if c == self.open => {
                    if depth == 0 {
                        return Some(j);
                    }
                    depth -= 1;
                }
                _ => {}
            }
            if j == 0 {
                return None;
            }
            j -= 1;
        }
    }

    /// `close` matching the `open` at `open_idx`.
    fn find_close(&self, stream: &CharStream, open_idx: usize) -> Option<usize> {
        let mut depth = 0usize;
        for j in open_idx + 1..stream.len() {
            match stream.get(j) {
                Some(c) if c == self.open => depth += 1,
                Some(c) if c == self.close => {
                    if depth == 0 {
                        return Some(j);
                    }
                    depth -= 1;
                }
                _ => {}
            }
        }
        None
    }
}

impl TextObject for Pair {
    fn name(&self) -> &'static str {
        if self.around { "a-block" } else { "inner-block" }
    }

    fn resolve(&self, stream: &CharStream, cursor: usize, count: usize) -> Option<TextSpan> {
        if stream.is_empty() {
            return None;
        }
        let cursor = cursor.min(stream.len() - 1);
        // on a closing delimiter: its own pair is the innermost one
        let mut from = if stream.get(cursor) == Some(self.close) {
            self.matching_open_of_close(stream, cursor)?
        } else {
            self.find_open(stream, cursor)?
        };
        for _ in 1..count {
            from = self.find_open(stream, from.checked_sub(1)?)?;
        }
        let close = self.find_close(stream, from)?;
        if self.around {
            Some(charwise(stream, from, close + 1))
        } else {
            Some(charwise(stream, from + 1, close))
        }
    }
}

impl Pair {
    fn matching_open_of_close(&self, stream: &CharStream, close_idx: usize) -> Option<usize> {
        let mut depth = 0usize;
        let mut j = close_idx;
        while j > 0 {
            j -= 1;
            match stream.get(j) {
                Some(c) if c == self.close => depth += 1,
                Some(c) if c == self.open => {
                    if depth == 0 {
                        return Some(j);
                    }
                    depth -= 1;
                }
                _ => {}
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn select(text: &str, cursor: usize, range: Range, count: usize) -> Option<String> {
        let pos = text.position_of(cursor);
        resolve_range(text, pos, range, count)
            .map(|s| text.slice(text.offset_of(s.start), text.offset_of(s.end)))
    }

    #[test]
    fn inner_and_around_word() {
        let t = "foo bar  baz";
        assert_eq!(select(t, 5, Range::WordInner, 1).as_deref(), Some("bar"));
        assert_eq!(select(t, 5, Range::WordAround, 1).as_deref(), Some("bar  "));
        // last word has no trailing blanks: leading blanks are taken instead
        assert_eq!(select(t, 10, Range::WordAround, 1).as_deref(), Some("  baz"));
        assert_eq!(select(t, 0, Range::WordInner, 3).as_deref(), Some("foo bar"));
        assert_eq!(select(t, 0, Range::WordAround, 2).as_deref(), Some("foo bar  "));
        // on blanks, aw takes the blanks and the following word
        assert_eq!(select(t, 7, Range::WordAround, 1).as_deref(), Some("  baz"));
    }

    #[test]
    fn big_word_spans_punctuation() {
        let t = "a foo.bar(x) b";
        assert_eq!(select(t, 4, Range::WordInner, 1).as_deref(), Some("foo"));
        assert_eq!(select(t, 4, Range::BigWordInner, 1).as_deref(), Some("foo.bar(x)"));
    }

    #[test]
    fn word_on_empty_line_is_not_found() {
        assert_eq!(select("a\n\nb", 2, Range::WordInner, 1), None);
    }

    #[test]
    fn quotes() {
        let t = r#"say "hello there" now"#;
        assert_eq!(select(t, 7, Range::DoubleQuoteInner, 1).as_deref(), Some("hello there"));
        assert_eq!(select(t, 7, Range::DoubleQuoteAround, 1).as_deref(), Some("\"hello there\" "));
        // cursor before the pair
        assert_eq!(select(t, 0, Range::DoubleQuoteInner, 1).as_deref(), Some("hello there"));
        assert_eq!(select("it's", 0, Range::QuoteInner, 1), None);
        // escaped quotes do not close the string
        let e = r#"x = 'a\'b'"#;
        assert_eq!(select(e, 6, Range::QuoteInner, 1).as_deref(), Some("a\\'b"));
    }

    #[test]
    fn parentheses_nested_and_multiline() {
        let t = "(abc)";
        assert_eq!(select(t, 1, Range::ParenthesisInner, 1).as_deref(), Some("abc"));
        assert_eq!(select(t, 1, Range::ParenthesisAround, 1).as_deref(), Some("(abc)"));
        let n = "f(a, (b), c)";
        assert_eq!(select(n, 6, Range::ParenthesisInner, 1).as_deref(), Some("b"));
        assert_eq!(select(n, 6, Range::ParenthesisInner, 2).as_deref(), Some("a, (b), c"));
        // cursor after an inner pair still finds the outer one
        assert_eq!(select(n, 9, Range::ParenthesisInner, 1).as_deref(), Some("a, (b), c"));
        // on delimiters
        assert_eq!(select(n, 1, Range::ParenthesisInner, 1).as_deref(), Some("a, (b), c"));
        assert_eq!(select(n, 7, Range::ParenthesisAround, 1).as_deref(), Some("(b)"));
        let m = "fn x() {\n    body;\n}";
        assert_eq!(select(m, 12, Range::BraceInner, 1).as_deref(), Some("\n    body;\n"));
    }

    #[test]
    fn missing_pairs() {
        assert_eq!(select("abc)", 1, Range::ParenthesisInner, 1), None);
        assert_eq!(select("(abc", 2, Range::ParenthesisInner, 1), None);
        assert_eq!(select("(a) x", 4, Range::ParenthesisInner, 1), None);
        assert_eq!(select("[a]", 1, Range::ParenthesisInner, 1), None);
        assert_eq!(select("<a>", 1, Range::AngleBracketInner, 1).as_deref(), Some("a"));
    }

    #[test]
    fn line_object_counts_whole_lines() {
        let t = "a\nb\nc\n";
        let span = resolve_range(t, Position::new(1, 0), Range::Line, 5).unwrap();
        assert_eq!(span, TextSpan::lines(1, 2));
    }

    #[test]
    fn line_local_objects_below_the_first_line() {
        let t = "one\n  two three\n'q' x\nlast";
        let word = resolve_range(t, Position::new(1, 8), Range::WordInner, 1).unwrap();
        assert_eq!(word, TextSpan::charwise(Position::new(1, 6), Position::new(1, 11)));
        let quote = resolve_range(t, Position::new(2, 1), Range::QuoteInner, 1).unwrap();
        assert_eq!(quote, TextSpan::charwise(Position::new(2, 1), Position::new(2, 2)));
        let lines = resolve_range(t, Position::new(1, 0), Range::Line, 2).unwrap();
        assert_eq!(lines, TextSpan::lines(1, 2));
    }
}
