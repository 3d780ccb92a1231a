//! Token sequences and their validity.
//!
//! Valid completed forms:
//! * `[Repeat?, Action?, Repeat?, Movement]`
//! * `[Repeat?, Action?, Repeat?, Range]`
//! * `[Repeat?, Action, Repeat?]` when the action needs no target (paste) or acts on
//!   a Visual selection.
//!
//! Anything else that still fits the grammar is pending; the rest is invalid.

use core_keymap::{Action, Movement, Token};

/// Repeats saturate here.
pub const MAX_COUNT: usize = 999_999;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Pending,
    Complete,
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Register targeted by the command (unnamed unless one was selected).
    pub register: char,
    pub tokens: Vec<Token>,
}

impl Command {
    pub fn new(register: char, tokens: Vec<Token>) -> Self {
        Self { register, tokens }
    }

    /// The explicit action, or `Move` for a bare motion.
    pub fn action(&self) -> Action {
        self.explicit_action().unwrap_or(Action::Move)
    }

    pub fn explicit_action(&self) -> Option<Action> {
        self.tokens.iter().find_map(|t| match t {
            Token::Action(a) => Some(*a),
            _ => None,
        })
    }

    /// Product of every repeat (1 when none was typed).
    pub fn count(&self) -> usize {
        self.explicit_count().unwrap_or(1)
    }

    pub fn explicit_count(&self) -> Option<usize> {
        self.tokens
            .iter()
            .filter_map(|t| match t {
                Token::Repeat(n) => Some(*n),
                _ => None,
            })
            .reduce(|a, b| a.saturating_mul(b).min(MAX_COUNT))
    }

    /// The terminating Movement or Range token.
    pub fn target(&self) -> Option<Token> {
        self.tokens.iter().copied().find(Token::is_target)
    }

    pub fn status(&self, visual: bool) -> CommandStatus {
        let actions = self.tokens.iter().filter(|t| t.is_action()).count();
        let targets = self.tokens.iter().filter(|t| t.is_target()).count();
        let repeats = self.tokens.iter().filter(|t| t.is_repeat()).count();
        if actions > 1 || targets > 1 || repeats > 2 {
            return CommandStatus::Invalid;
        }
        if targets == 1 && !self.tokens.last().is_some_and(Token::is_target) {
            return CommandStatus::Invalid;
        }
        let action = self.explicit_action();
        if let Some(idx) = self.tokens.iter().position(Token::is_action)
            && self.tokens[..idx].iter().filter(|t| t.is_repeat()).count() > 1
        {
            return CommandStatus::Invalid;
        }
        match (action, targets) {
            (Some(a), 1) if a.is_paste() => CommandStatus::Invalid,
            (_, 1) => CommandStatus::Complete,
            (Some(a), 0) if a.is_paste() || visual => CommandStatus::Complete,
            _ => CommandStatus::Pending,
        }
    }

    /// `gg` / `G` with a count become a jump to that line.
    pub fn normalized(mut self) -> Self {
        if self.explicit_count().is_some()
            && let Some(slot) = self.tokens.iter_mut().find(|t| {
                matches!(
                    t,
                    Token::Movement(Movement::StartOfDocument | Movement::EndOfDocument)
                )
            })
        {
            *slot = Token::Movement(Movement::LineJump);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_keymap::Range;
    use pretty_assertions::assert_eq;

    fn cmd(tokens: Vec<Token>) -> Command {
        Command::new('"', tokens)
    }

    #[test]
    fn counts_multiply() {
        let c = cmd(vec![
            Token::Repeat(2),
            Token::Action(Action::Delete),
            Token::Repeat(3),
            Token::Movement(Movement::WordForward),
        ]);
        assert_eq!(c.count(), 6);
        assert_eq!(c.action(), Action::Delete);
        assert_eq!(c.status(false), CommandStatus::Complete);
    }

    #[test]
    fn counts_saturate() {
        let c = cmd(vec![
            Token::Repeat(MAX_COUNT),
            Token::Action(Action::Delete),
            Token::Repeat(MAX_COUNT),
            Token::Movement(Movement::Down),
        ]);
        assert_eq!(c.count(), MAX_COUNT);
    }

    #[test]
    fn bare_motion_is_move() {
        let c = cmd(vec![Token::Movement(Movement::Right)]);
        assert_eq!(c.action(), Action::Move);
        assert_eq!(c.count(), 1);
        assert_eq!(c.status(false), CommandStatus::Complete);
    }

    #[test]
    fn bare_action_pending_in_normal_complete_in_visual() {
        let c = cmd(vec![Token::Repeat(2), Token::Action(Action::Delete)]);
        assert_eq!(c.status(false), CommandStatus::Pending);
        assert_eq!(c.status(true), CommandStatus::Complete);
        let p = cmd(vec![Token::Action(Action::Paste)]);
        assert_eq!(p.status(false), CommandStatus::Complete);
    }

    #[test]
    fn duplicate_tokens_are_invalid() {
        let c = cmd(vec![
            Token::Action(Action::Delete),
            Token::Action(Action::Copy),
        ]);
        assert_eq!(c.status(false), CommandStatus::Invalid);
        let t = cmd(vec![
            Token::Range(Range::Line),
            Token::Movement(Movement::Left),
        ]);
        assert_eq!(t.status(false), CommandStatus::Invalid);
        let r = cmd(vec![
            Token::Action(Action::Paste),
            Token::Movement(Movement::Left),
        ]);
        assert_eq!(r.status(false), CommandStatus::Invalid);
    }

    #[test]
    fn counted_document_jumps_become_line_jumps() {
        let c = cmd(vec![
            Token::Repeat(5),
            Token::Movement(Movement::EndOfDocument),
        ])
        .normalized();
        assert_eq!(c.target(), Some(Token::Movement(Movement::LineJump)));
        let plain = cmd(vec![Token::Movement(Movement::StartOfDocument)]).normalized();
        assert_eq!(
            plain.target(),
            Some(Token::Movement(Movement::StartOfDocument))
        );
    }
}
