//! Register store.
//!
//! Slots are fixed at construction: `a`-`z`, the unnamed register, the black hole and
//! the selection register. Uppercase names select the matching lowercase slot and arm
//! its append flag for the next write only.
//!
//! Block-wise content is content ending in `'\n'`; it is derived from the value and
//! never stored separately. Appending block content to a value that does not already
//! end with a newline inserts exactly one separating `'\n'`.

use std::collections::BTreeMap;

use core_events::KeyEvent;
use thiserror::Error;
use tracing::{debug, trace};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegisterError {
    #[error("invalid register name `{0}`")]
    InvalidName(char),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Register {
    pub name: char,
    pub value: String,
    /// One-shot hint for the next `update`; only ever set on `a`-`z`.
    pub append: bool,
}

impl Register {
    pub fn new(name: char) -> Self {
        Self {
            name,
            value: String::new(),
            append: false,
        }
    }

    pub fn is_block(&self) -> bool {
        self.value.ends_with('\n')
    }

    /// Write `text`, honoring (and consuming) the append flag.
    pub fn update(&mut self, text: &str) {
        if self.append {
            let last_is_newline = self.value.is_empty() || self.value.ends_with('\n');
            if !last_is_newline && text.ends_with('\n') {
                self.value.push('\n');
            }
            self.value.push_str(text);
        } else {
            self.value = text.to_string();
        }
        self.append = false;
    }

    pub fn read(&self) -> &str {
        &self.value
    }
}

/// Named storage for captured text, created once per interpreter.
#[derive(Debug, Clone)]
pub struct RegisterStore {
    slots: BTreeMap<char, Register>,
    current: char,
}

impl Default for RegisterStore {
    fn default() -> Self {
        let mut store = Self {
            slots: BTreeMap::new(),
            current: Self::UNNAMED,
        };
        store.initialize();
        store
    }
}

impl RegisterStore {
    pub const UNNAMED: char = '"';
    pub const BLACK_HOLE: char = '_';
    pub const SELECTION: char = '+';

    pub fn new() -> Self {
        Self::default()
    }

    /// (Re)populate every slot with an empty value and clear append flags.
    pub fn initialize(&mut self) {
        self.slots.clear();
        for name in ('a'..='z').chain([Self::UNNAMED, Self::BLACK_HOLE, Self::SELECTION]) {
            self.slots.insert(name, Register::new(name));
        }
        self.current = Self::UNNAMED;
    }

    /// Target `name` for the next write. Uppercase letters resolve to the lowercase slot
    /// with append semantics. Returns the resolved slot name.
    pub fn select(&mut self, name: char) -> Result<char, RegisterError> {
        let (slot, append) = if name.is_ascii_uppercase() {
            (name.to_ascii_lowercase(), true)
        } else {
            (name, false)
        };
        let Some(reg) = self.slots.get_mut(&slot) else {
            return Err(RegisterError::InvalidName(name));
        };
        reg.append = append;
        self.current = slot;
        debug!(target: "vim.registers", register = %slot, append, "register_select");
        Ok(slot)
    }

    /// Name of the register targeted by the command being built.
    pub fn current(&self) -> char {
        self.current
    }

    /// Forget the per-command selection (back to unnamed) and drop unused append hints.
    pub fn reset_selection(&mut self) {
        if let Some(reg) = self.slots.get_mut(&self.current) {
            reg.append = false;
        }
        self.current = Self::UNNAMED;
    }

    /// Write into `name`. The black hole discards; unknown names are ignored.
    pub fn update(&mut self, name: char, text: &str) {
        if name == Self::BLACK_HOLE {
            trace!(target: "vim.registers", "black_hole_discard");
            return;
        }
        if let Some(reg) = self.slots.get_mut(&name) {
            reg.update(text);
            debug!(
                target: "vim.registers",
                register = %name,
                len = reg.value.len(),
                block = reg.is_block(),
                "register_write"
            );
        }
    }

    /// Current value of `name` (empty for the black hole and unknown names).
    pub fn read(&self, name: char) -> &str {
        if name == Self::BLACK_HOLE {
            return "";
        }
        self.slots.get(&name).map(Register::read).unwrap_or("")
    }

    pub fn get(&self, name: char) -> Option<&Register> {
        self.slots.get(&name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Register> {
        self.slots.values()
    }
}

/// Register name designated by `key`, if it is one (`a`-`z`, `A`-`Z`, `"`, `_`, `+`).
pub fn key_to_register_name(key: &KeyEvent) -> Option<char> {
    if key.is_alphabet() {
        return Some(key.to_alphabet());
    }
    match key.as_char()? {
        c @ (RegisterStore::UNNAMED | RegisterStore::BLACK_HOLE | RegisterStore::SELECTION) => {
            Some(c)
        }
        _ => None,
    }
}
