//! Grammar vocabulary: the tokens a command is built from.
//!
//! A completed command is `[Repeat?, Action?, Repeat?, Movement | Range]` (or
//! `[Repeat?, Action, Repeat?]` for actions that consume a selection or need no
//! target). Find/till movements carry their target character as a payload.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Move,
    Delete,
    Copy,
    Paste,
    PasteBefore,
    Change,
    Indent,
    UnIndent,
    ToUpper,
    ToLower,
}

impl Action {
    /// Paste variants complete without a movement or range.
    pub fn needs_target(self) -> bool {
        !matches!(self, Action::Paste | Action::PasteBefore)
    }

    pub fn is_paste(self) -> bool {
        !self.needs_target()
    }

    /// Actions valid in front of a text object (everything but Move and paste).
    pub fn accepts_text_object(self) -> bool {
        !matches!(self, Action::Move | Action::Paste | Action::PasteBefore)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Movement {
    Left,
    Right,
    Up,
    Down,
    VisualUp,
    VisualDown,
    PageUp,
    PageDown,
    HalfPageUp,
    HalfPageDown,
    StartOfLine,
    EndOfLine,
    FirstCharacter,
    /// Jump to the 1-based line given by the command's repeat.
    LineJump,
    StartOfDocument,
    EndOfDocument,
    WordForward,
    BigWordForward,
    ForwardEndOfWord,
    ForwardEndOfBigWord,
    WordBackward,
    BigWordBackward,
    BackwardEndOfWord,
    BackwardEndOfBigWord,
    FindForward(char),
    FindBackward(char),
    TillForward(char),
    TillBackward(char),
}

/// How an operator treats the span between the cursor and a movement's target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionClass {
    /// Target character excluded.
    Exclusive,
    /// Target character included.
    Inclusive,
    /// Every line touched is taken whole.
    Linewise,
}

impl Movement {
    pub fn class(self) -> MotionClass {
        use Movement::*;
        match self {
            ForwardEndOfWord
            | ForwardEndOfBigWord
            | BackwardEndOfWord
            | BackwardEndOfBigWord
            | FindForward(_)
            | TillForward(_)
            | EndOfLine => MotionClass::Inclusive,
            Up | Down | VisualUp | VisualDown | PageUp | PageDown | HalfPageUp | HalfPageDown
            | LineJump | StartOfDocument | EndOfDocument => MotionClass::Linewise,
            _ => MotionClass::Exclusive,
        }
    }

    /// Find/till kind and target for the four same-line searches.
    pub fn find(self) -> Option<(FindKind, char)> {
        match self {
            Movement::FindForward(c) => Some((FindKind::FindForward, c)),
            Movement::FindBackward(c) => Some((FindKind::FindBackward, c)),
            Movement::TillForward(c) => Some((FindKind::TillForward, c)),
            Movement::TillBackward(c) => Some((FindKind::TillBackward, c)),
            _ => None,
        }
    }

    pub fn is_word_forward(self) -> bool {
        matches!(self, Movement::WordForward | Movement::BigWordForward)
    }
}

/// A find/till movement still waiting for its target character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FindKind {
    FindForward,
    FindBackward,
    TillForward,
    TillBackward,
}

impl FindKind {
    pub fn with_target(self, target: char) -> Movement {
        match self {
            FindKind::FindForward => Movement::FindForward(target),
            FindKind::FindBackward => Movement::FindBackward(target),
            FindKind::TillForward => Movement::TillForward(target),
            FindKind::TillBackward => Movement::TillBackward(target),
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            FindKind::FindForward => FindKind::FindBackward,
            FindKind::FindBackward => FindKind::FindForward,
            FindKind::TillForward => FindKind::TillBackward,
            FindKind::TillBackward => FindKind::TillForward,
        }
    }

    pub fn is_forward(self) -> bool {
        matches!(self, FindKind::FindForward | FindKind::TillForward)
    }

    pub fn is_till(self) -> bool {
        matches!(self, FindKind::TillForward | FindKind::TillBackward)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Range {
    Line,
    WordInner,
    WordAround,
    BigWordInner,
    BigWordAround,
    QuoteInner,
    QuoteAround,
    DoubleQuoteInner,
    DoubleQuoteAround,
    ParenthesisInner,
    ParenthesisAround,
    BracketInner,
    BracketAround,
    AngleBracketInner,
    AngleBracketAround,
    BraceInner,
    BraceAround,
}

impl Range {
    /// Every range except `Line` is an inner/around text object.
    pub fn is_text_object(self) -> bool {
        self != Range::Line
    }

    pub fn is_inner(self) -> bool {
        use Range::*;
        matches!(
            self,
            WordInner
                | BigWordInner
                | QuoteInner
                | DoubleQuoteInner
                | ParenthesisInner
                | BracketInner
                | AngleBracketInner
                | BraceInner
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    Action(Action),
    Repeat(usize),
    Movement(Movement),
    Range(Range),
}

impl Token {
    pub fn is_action(&self) -> bool {
        matches!(self, Token::Action(_))
    }

    pub fn is_repeat(&self) -> bool {
        matches!(self, Token::Repeat(_))
    }

    /// Movement or Range: the token that terminates a command.
    pub fn is_target(&self) -> bool {
        matches!(self, Token::Movement(_) | Token::Range(_))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Action(a) => write!(f, "action {a:?}"),
            Token::Repeat(n) => write!(f, "repeat {n}"),
            Token::Movement(m) => write!(f, "movement {m:?}"),
            Token::Range(r) => write!(f, "range {r:?}"),
        }
    }
}
