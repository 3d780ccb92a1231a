//! core-keymap: grammar tokens and the layered key-binding trie.
//!
//! Design principles:
//! - Pure and deterministic: resolution depends only on the pending key buffer and the
//!   layer the engine selects (Normal, operator-pending, Visual).
//! - Each layer is compiled once into a trie; lookups walk it with the keys typed so far.
//! - A strict prefix of one or more bindings resolves to `NeedMore`, letting the engine
//!   keep the keys pending (`g` before `gg`, `i` before `iw`).
//! - No side effects: logging only at TRACE for traversal steps.
//!
//! Counts, the register prefix target and find targets are not bound here; the engine
//! handles them before consulting the trie. A lone `0` is bound to `StartOfLine`.

use core_events::{KeyCode, KeyEvent, KeyModifiers};
use smallvec::SmallVec;
use tracing::trace;

pub mod token;

pub use token::{Action, FindKind, MotionClass, Movement, Range, Token};

// -------------------------------------------------------------------------------------------------
// Binding outputs
// -------------------------------------------------------------------------------------------------

/// Where the cursor goes when an Insert-entry key is pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InsertEntry {
    /// `i`
    Before,
    /// `a`
    After,
    /// `I`
    FirstNonBlank,
    /// `A`
    LineEnd,
    /// `o`
    OpenBelow,
    /// `O`
    OpenAbove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Binding {
    Action(Action),
    Movement(Movement),
    /// `f` `F` `t` `T`: the next key is the target character.
    Find(FindKind),
    /// `;` (same direction) and `,` (reversed).
    RepeatFind { reverse: bool },
    Range(Range),
    /// `"`: the next key names a register.
    RegisterPrefix,
    Insert(InsertEntry),
    Visual,
    VisualLine,
    Replace,
    /// Single-key abbreviation for an action plus its target (`x` = `dl`, `Y` = `yy`).
    Shorthand { action: Action, target: Token },
}

// -------------------------------------------------------------------------------------------------
// Key pattern
// -------------------------------------------------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyPattern {
    /// Printable character without Ctrl/Alt.
    Char(char),
    /// `<C-x>`
    Ctrl(char),
    /// Non-character key without Ctrl/Alt.
    Named(KeyCode),
}

impl KeyPattern {
    fn matches(&self, key: &KeyEvent) -> bool {
        match self {
            KeyPattern::Char(c) => key.as_char() == Some(*c),
            KeyPattern::Ctrl(c) => {
                key.code == KeyCode::Char(*c)
                    && key.mods.contains(KeyModifiers::CTRL)
                    && !key.mods.contains(KeyModifiers::ALT)
            }
            KeyPattern::Named(code) => {
                key.code == *code && !key.mods.intersects(KeyModifiers::CTRL | KeyModifiers::ALT)
            }
        }
    }

    /// Patterns for a plain character sequence such as `"gU"`.
    pub fn chars(seq: &str) -> Vec<KeyPattern> {
        seq.chars().map(KeyPattern::Char).collect()
    }
}

// -------------------------------------------------------------------------------------------------
// Mapping Specification
// -------------------------------------------------------------------------------------------------
#[derive(Debug, Clone)]
pub struct MappingSpec {
    pub sequence: Vec<KeyPattern>,
    pub binding: Binding,
}

impl MappingSpec {
    pub fn new(sequence: Vec<KeyPattern>, binding: Binding) -> Self {
        Self { sequence, binding }
    }

    fn chars(seq: &str, binding: Binding) -> Self {
        Self::new(KeyPattern::chars(seq), binding)
    }
}

// -------------------------------------------------------------------------------------------------
// Trie Representation
// -------------------------------------------------------------------------------------------------
#[derive(Debug, Clone)]
struct Edge {
    pat: KeyPattern,
    next: usize,
}

#[derive(Debug, Clone)]
struct Node {
    terminal: Option<usize>, // index into mappings vec
    edges: SmallVec<[Edge; 4]>,
}

impl Node {
    fn new() -> Self {
        Self {
            terminal: None,
            edges: SmallVec::new(),
        }
    }
}

#[derive(Debug)]
pub struct MappingTrie {
    nodes: Vec<Node>,
    mappings: Vec<MappingSpec>,
}

impl MappingTrie {
    pub fn build(specs: Vec<MappingSpec>) -> Self {
        let mut trie = MappingTrie {
            nodes: vec![Node::new()],
            mappings: specs,
        };
        for (idx, m) in trie.mappings.iter().enumerate() {
            let mut cur = 0usize;
            for pat in &m.sequence {
                let next = if let Some(e) = trie.nodes[cur].edges.iter().find(|e| e.pat == *pat) {
                    e.next
                } else {
                    let new_idx = trie.nodes.len();
                    trie.nodes.push(Node::new());
                    trie.nodes[cur].edges.push(Edge {
                        pat: pat.clone(),
                        next: new_idx,
                    });
                    new_idx
                };
                cur = next;
            }
            if trie.nodes[cur].terminal.is_some() {
                // Later mapping overrides earlier.
                trace!(
                    target: "vim.keys",
                    mapping_index = idx,
                    node = cur,
                    "terminal_override"
                );
            }
            trie.nodes[cur].terminal = Some(idx);
        }
        trie
    }

    /// Longest binding matching a prefix of `keys`.
    pub fn resolve(&self, keys: &[KeyEvent]) -> Resolution {
        let mut node_idx = 0usize;
        let mut last_terminal: Option<usize> = None; // mapping index
        let mut walked = 0usize;
        for (i, key) in keys.iter().enumerate() {
            let Some(edge) = self.nodes[node_idx].edges.iter().find(|e| e.pat.matches(key))
            else {
                break;
            };
            node_idx = edge.next;
            walked = i + 1;
            trace!(target: "vim.keys", step = i, key = %key, node = node_idx, "advance");
            if let Some(mi) = self.nodes[node_idx].terminal {
                last_terminal = Some(mi);
            }
        }
        match last_terminal {
            Some(mi) => Resolution::Matched {
                binding: self.mappings[mi].binding,
            },
            // every key so far walked an edge (or nothing typed yet)
            None if walked == keys.len() => Resolution::NeedMore,
            None => Resolution::Unbound,
        }
    }
}

// -------------------------------------------------------------------------------------------------
// Resolution Result
// -------------------------------------------------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A complete binding. Taken at once, even when it also prefixes a longer one.
    Matched { binding: Binding },
    /// Strict prefix of one or more bindings.
    NeedMore,
    Unbound,
}

// -------------------------------------------------------------------------------------------------
// Layers
// -------------------------------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Normal,
    /// Normal mode after an action key: motions, text objects, doubled actions.
    OperatorPending,
    Visual,
}

/// The three compiled binding layers.
#[derive(Debug)]
pub struct Keymap {
    normal: MappingTrie,
    operator: MappingTrie,
    visual: MappingTrie,
}

impl Keymap {
    /// Vim-style bindings.
    pub fn vim() -> Self {
        Self {
            normal: MappingTrie::build(normal_specs()),
            operator: MappingTrie::build(operator_specs()),
            visual: MappingTrie::build(visual_specs()),
        }
    }

    pub fn layer(&self, layer: Layer) -> &MappingTrie {
        match layer {
            Layer::Normal => &self.normal,
            Layer::OperatorPending => &self.operator,
            Layer::Visual => &self.visual,
        }
    }

    pub fn resolve(&self, layer: Layer, keys: &[KeyEvent]) -> Resolution {
        self.layer(layer).resolve(keys)
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self::vim()
    }
}

// -------------------------------------------------------------------------------------------------
// Baseline mapping specs
// -------------------------------------------------------------------------------------------------

fn movement_specs() -> Vec<MappingSpec> {
    use KeyPattern as K;
    use Movement as M;
    let mv = Binding::Movement;
    let mut v = vec![
        MappingSpec::chars("h", mv(M::Left)),
        MappingSpec::new(vec![K::Named(KeyCode::Left)], mv(M::Left)),
        MappingSpec::new(vec![K::Named(KeyCode::Backspace)], mv(M::Left)),
        MappingSpec::chars("l", mv(M::Right)),
        MappingSpec::new(vec![K::Named(KeyCode::Right)], mv(M::Right)),
        MappingSpec::chars(" ", mv(M::Right)),
        MappingSpec::chars("k", mv(M::Up)),
        MappingSpec::new(vec![K::Named(KeyCode::Up)], mv(M::Up)),
        MappingSpec::chars("j", mv(M::Down)),
        MappingSpec::new(vec![K::Named(KeyCode::Down)], mv(M::Down)),
        MappingSpec::new(vec![K::Named(KeyCode::Enter)], mv(M::Down)),
        MappingSpec::chars("gk", mv(M::VisualUp)),
        MappingSpec::chars("gj", mv(M::VisualDown)),
        MappingSpec::new(vec![K::Ctrl('b')], mv(M::PageUp)),
        MappingSpec::new(vec![K::Named(KeyCode::PageUp)], mv(M::PageUp)),
        MappingSpec::new(vec![K::Ctrl('f')], mv(M::PageDown)),
        MappingSpec::new(vec![K::Named(KeyCode::PageDown)], mv(M::PageDown)),
        MappingSpec::new(vec![K::Ctrl('u')], mv(M::HalfPageUp)),
        MappingSpec::new(vec![K::Ctrl('d')], mv(M::HalfPageDown)),
        MappingSpec::chars("0", mv(M::StartOfLine)),
        MappingSpec::new(vec![K::Named(KeyCode::Home)], mv(M::StartOfLine)),
        MappingSpec::chars("$", mv(M::EndOfLine)),
        MappingSpec::new(vec![K::Named(KeyCode::End)], mv(M::EndOfLine)),
        MappingSpec::chars("^", mv(M::FirstCharacter)),
        MappingSpec::chars("gg", mv(M::StartOfDocument)),
        MappingSpec::chars("G", mv(M::EndOfDocument)),
        MappingSpec::chars("w", mv(M::WordForward)),
        MappingSpec::chars("W", mv(M::BigWordForward)),
        MappingSpec::chars("e", mv(M::ForwardEndOfWord)),
        MappingSpec::chars("E", mv(M::ForwardEndOfBigWord)),
        MappingSpec::chars("b", mv(M::WordBackward)),
        MappingSpec::chars("B", mv(M::BigWordBackward)),
        MappingSpec::chars("ge", mv(M::BackwardEndOfWord)),
        MappingSpec::chars("gE", mv(M::BackwardEndOfBigWord)),
        MappingSpec::chars(";", Binding::RepeatFind { reverse: false }),
        MappingSpec::chars(",", Binding::RepeatFind { reverse: true }),
    ];
    for (key, kind) in [
        ("f", FindKind::FindForward),
        ("F", FindKind::FindBackward),
        ("t", FindKind::TillForward),
        ("T", FindKind::TillBackward),
    ] {
        v.push(MappingSpec::chars(key, Binding::Find(kind)));
    }
    v
}

fn action_specs() -> Vec<MappingSpec> {
    use Action as A;
    [
        ("d", A::Delete),
        ("y", A::Copy),
        ("c", A::Change),
        ("p", A::Paste),
        ("P", A::PasteBefore),
        (">", A::Indent),
        ("<", A::UnIndent),
        ("gu", A::ToLower),
        ("gU", A::ToUpper),
    ]
    .into_iter()
    .map(|(key, action)| MappingSpec::chars(key, Binding::Action(action)))
    .collect()
}

fn range_specs() -> Vec<MappingSpec> {
    use Range as R;
    let pairs: [(&[&str], R, R); 8] = [
        (&["w"], R::WordInner, R::WordAround),
        (&["W"], R::BigWordInner, R::BigWordAround),
        (&["'"], R::QuoteInner, R::QuoteAround),
        (&["\""], R::DoubleQuoteInner, R::DoubleQuoteAround),
        (&["(", ")", "b"], R::ParenthesisInner, R::ParenthesisAround),
        (&["[", "]"], R::BracketInner, R::BracketAround),
        (&["<", ">"], R::AngleBracketInner, R::AngleBracketAround),
        (&["{", "}", "B"], R::BraceInner, R::BraceAround),
    ];
    let mut v = Vec::new();
    for (keys, inner, around) in pairs {
        for key in keys {
            v.push(MappingSpec::chars(&format!("i{key}"), Binding::Range(inner)));
            v.push(MappingSpec::chars(&format!("a{key}"), Binding::Range(around)));
        }
    }
    v
}

/// Normal mode layer.
pub fn normal_specs() -> Vec<MappingSpec> {
    use Action as A;
    use Movement as M;
    let mut v = movement_specs();
    v.extend(action_specs());
    let short = |action, target| Binding::Shorthand { action, target };
    v.extend([
        MappingSpec::chars("x", short(A::Delete, Token::Movement(M::Right))),
        MappingSpec::new(
            vec![KeyPattern::Named(KeyCode::Delete)],
            short(A::Delete, Token::Movement(M::Right)),
        ),
        MappingSpec::chars("X", short(A::Delete, Token::Movement(M::Left))),
        MappingSpec::chars("D", short(A::Delete, Token::Movement(M::EndOfLine))),
        MappingSpec::chars("C", short(A::Change, Token::Movement(M::EndOfLine))),
        MappingSpec::chars("s", short(A::Change, Token::Movement(M::Right))),
        MappingSpec::chars("Y", short(A::Copy, Token::Range(Range::Line))),
        MappingSpec::chars("i", Binding::Insert(InsertEntry::Before)),
        MappingSpec::chars("a", Binding::Insert(InsertEntry::After)),
        MappingSpec::chars("I", Binding::Insert(InsertEntry::FirstNonBlank)),
        MappingSpec::chars("A", Binding::Insert(InsertEntry::LineEnd)),
        MappingSpec::chars("o", Binding::Insert(InsertEntry::OpenBelow)),
        MappingSpec::chars("O", Binding::Insert(InsertEntry::OpenAbove)),
        MappingSpec::chars("v", Binding::Visual),
        MappingSpec::chars("V", Binding::VisualLine),
        MappingSpec::chars("R", Binding::Replace),
        MappingSpec::chars("\"", Binding::RegisterPrefix),
    ]);
    v
}

/// Operator-pending layer: active in Normal mode once an action token exists.
pub fn operator_specs() -> Vec<MappingSpec> {
    let mut v = movement_specs();
    v.extend(range_specs());
    v.extend(action_specs());
    // `guu` / `gUU`
    v.push(MappingSpec::chars("u", Binding::Action(Action::ToLower)));
    v.push(MappingSpec::chars("U", Binding::Action(Action::ToUpper)));
    // only to report a register typed after the action
    v.push(MappingSpec::chars("\"", Binding::RegisterPrefix));
    v
}

/// Visual and VisualLine layer.
pub fn visual_specs() -> Vec<MappingSpec> {
    use Action as A;
    let mut v = movement_specs();
    v.extend(range_specs());
    v.extend(action_specs());
    v.extend([
        MappingSpec::chars("x", Binding::Action(A::Delete)),
        MappingSpec::new(
            vec![KeyPattern::Named(KeyCode::Delete)],
            Binding::Action(A::Delete),
        ),
        MappingSpec::chars("s", Binding::Action(A::Change)),
        MappingSpec::chars("u", Binding::Action(A::ToLower)),
        MappingSpec::chars("U", Binding::Action(A::ToUpper)),
        MappingSpec::chars("v", Binding::Visual),
        MappingSpec::chars("V", Binding::VisualLine),
        MappingSpec::chars("\"", Binding::RegisterPrefix),
    ]);
    v
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------
#[cfg(test)]
mod tests {
    use super::*;
    use core_events::parse_keys;
    use pretty_assertions::assert_eq;

    fn resolve(layer: Layer, keys: &str) -> Resolution {
        let keymap = Keymap::vim();
        let keys = parse_keys(keys).unwrap();
        keymap.resolve(layer, &keys)
    }

    fn matched(binding: Binding) -> Resolution {
        Resolution::Matched { binding }
    }

    #[test]
    fn single_key_match() {
        assert_eq!(
            resolve(Layer::Normal, "w"),
            matched(Binding::Movement(Movement::WordForward))
        );
        assert_eq!(
            resolve(Layer::Normal, "d"),
            matched(Binding::Action(Action::Delete))
        );
    }

    #[test]
    fn need_more_for_prefix() {
        assert_eq!(resolve(Layer::Normal, "g"), Resolution::NeedMore);
        assert_eq!(resolve(Layer::OperatorPending, "i"), Resolution::NeedMore);
    }

    #[test]
    fn multi_key_match() {
        assert_eq!(
            resolve(Layer::Normal, "gU"),
            matched(Binding::Action(Action::ToUpper))
        );
        assert_eq!(
            resolve(Layer::OperatorPending, "ib"),
            matched(Binding::Range(Range::ParenthesisInner))
        );
        assert_eq!(
            resolve(Layer::OperatorPending, "a\""),
            matched(Binding::Range(Range::DoubleQuoteAround))
        );
    }

    #[test]
    fn unbound_keys() {
        assert_eq!(resolve(Layer::Normal, "z"), Resolution::Unbound);
        assert_eq!(resolve(Layer::Normal, "gz"), Resolution::Unbound);
        // text objects are not reachable without an operator in Normal mode
        assert_eq!(
            resolve(Layer::Normal, "iw"),
            matched(Binding::Insert(InsertEntry::Before))
        );
    }

    #[test]
    fn control_chords_and_named_keys() {
        assert_eq!(
            resolve(Layer::Normal, "<C-d>"),
            matched(Binding::Movement(Movement::HalfPageDown))
        );
        assert_eq!(
            resolve(Layer::Normal, "<CR>"),
            matched(Binding::Movement(Movement::Down))
        );
        assert_eq!(
            resolve(Layer::Normal, "<Space>"),
            matched(Binding::Movement(Movement::Right))
        );
        // plain 'd' and <C-d> do not collide
        assert_eq!(
            resolve(Layer::Visual, "<C-d>"),
            matched(Binding::Movement(Movement::HalfPageDown))
        );
    }

    #[test]
    fn shorthands_and_layers() {
        assert_eq!(
            resolve(Layer::Normal, "Y"),
            matched(Binding::Shorthand {
                action: Action::Copy,
                target: Token::Range(Range::Line)
            })
        );
        assert_eq!(
            resolve(Layer::Visual, "x"),
            matched(Binding::Action(Action::Delete))
        );
        assert_eq!(
            resolve(Layer::OperatorPending, "u"),
            matched(Binding::Action(Action::ToLower))
        );
        assert_eq!(resolve(Layer::Normal, "u"), Resolution::Unbound);
    }

    #[test]
    fn find_and_repeat_find() {
        assert_eq!(
            resolve(Layer::Normal, "T"),
            matched(Binding::Find(FindKind::TillBackward))
        );
        assert_eq!(
            resolve(Layer::OperatorPending, ","),
            matched(Binding::RepeatFind { reverse: true })
        );
    }

    #[test]
    fn later_mapping_overrides_earlier() {
        let trie = MappingTrie::build(vec![
            MappingSpec::chars("q", Binding::Visual),
            MappingSpec::chars("q", Binding::VisualLine),
        ]);
        let keys = parse_keys("q").unwrap();
        assert_eq!(trie.resolve(&keys), matched(Binding::VisualLine));
    }

    #[test]
    fn shorter_binding_wins_over_longer_prefix() {
        let trie = MappingTrie::build(vec![
            MappingSpec::chars("g", Binding::Visual),
            MappingSpec::chars("gg", Binding::VisualLine),
        ]);
        let keys = parse_keys("g").unwrap();
        assert_eq!(trie.resolve(&keys), matched(Binding::Visual));
    }
}
