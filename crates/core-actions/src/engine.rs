//! The interpreter: per-key grammar state machine.
//!
//! Keys arrive one at a time through [`Vim::handle_key_press`]. In the grammar modes
//! each key is, in order of precedence:
//! 1. a register name, right after `"`;
//! 2. the target character of a pending `f` / `F` / `t` / `T`;
//! 3. a count digit (a leading `0` is never a count: it is `StartOfLine`);
//! 4. part of a binding, resolved through the layer matching the current state
//!    (Normal, operator-pending after an action, Visual).
//!
//! Resolved bindings become grammar tokens. As soon as the token list forms a
//! complete command it is executed against the host buffer and all pending state is
//! reset. Malformed input resets too and is reported through a status message; it
//! never reaches the host as an error.

use core_config::Config;
use core_events::{EventSink, KeyCode, KeyEvent, VimEvent, VimStatus, render_keys};
use core_keymap::{
    Action, Binding, FindKind, InsertEntry, Keymap, Layer, Movement, Range, Resolution, Token,
};
use core_model::BufferAdapter;
use core_state::{Mode, ModeController, RegisterStore, key_to_register_name};
use tracing::{debug, trace};

use crate::VimError;
use crate::command::{Command, CommandStatus, MAX_COUNT};
use crate::dispatcher::{self, ExecContext, mode as mode_ops};

/// A modal key interpreter bound to one host document at a time.
///
/// The buffer is borrowed per call; the interpreter owns only its grammar state,
/// registers and mode.
#[derive(Debug)]
pub struct Vim {
    modes: ModeController,
    registers: RegisterStore,
    keymap: Keymap,
    config: Config,
    sink: EventSink,
    /// Every key of the command being built (status line).
    typed: Vec<KeyEvent>,
    /// Digits not yet turned into a `Repeat` token.
    count_keys: Vec<KeyEvent>,
    /// Keys of a partially typed binding (`g` before `gg`).
    keys: Vec<KeyEvent>,
    tokens: Vec<Token>,
    awaiting_register: bool,
    pending_find: Option<FindKind>,
    last_find: Option<Movement>,
    /// Column kept across vertical motions.
    sticky_col: Option<usize>,
    last_status: Option<VimStatus>,
}

impl Default for Vim {
    fn default() -> Self {
        Self::new(Config::default(), EventSink::disconnected())
    }
}

impl Vim {
    pub fn new(config: Config, sink: EventSink) -> Self {
        Self {
            modes: ModeController::new(),
            registers: RegisterStore::new(),
            keymap: Keymap::vim(),
            config,
            sink,
            typed: Vec::new(),
            count_keys: Vec::new(),
            keys: Vec::new(),
            tokens: Vec::new(),
            awaiting_register: false,
            pending_find: None,
            last_find: None,
            sticky_col: None,
            last_status: None,
        }
    }

    // ---------------------------- Introspection ----------------------------

    pub fn mode(&self) -> Mode {
        self.modes.current()
    }

    pub fn registers(&self) -> &RegisterStore {
        &self.registers
    }

    pub fn current_register_name(&self) -> char {
        self.registers.current()
    }

    /// Keys typed for the command being built, in notation form.
    pub fn pending_keys(&self) -> String {
        render_keys(&self.typed)
    }

    pub fn status(&self) -> VimStatus {
        VimStatus {
            mode: self.mode(),
            pending_keys: self.pending_keys(),
            register: self.current_register_name(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // ---------------------------- Host overrides ----------------------------

    /// Programmatic mode switch. Abandons any pending command.
    pub fn set_mode(&mut self, mode: Mode) {
        self.reset();
        self.switch_mode(mode);
        self.publish_status();
    }

    /// Programmatic register selection for the next command.
    pub fn set_register(&mut self, name: char) -> Result<(), VimError> {
        let result = self
            .registers
            .select(name)
            .map(|_| ())
            .map_err(|_| VimError::InvalidRegister(name));
        self.publish_status();
        result
    }

    /// The host reports that its selection changed (e.g. a mouse drag). A selection
    /// appearing in Normal mode enters Visual; one vanishing in a Visual mode leaves it.
    pub fn on_host_selection_changed(&mut self, has_selection: bool) {
        match (self.mode(), has_selection) {
            (Mode::Normal, true) => {
                self.reset();
                self.switch_mode(Mode::Visual);
            }
            (m, false) if m.is_visual() => {
                self.reset();
                self.switch_mode(Mode::Normal);
            }
            _ => return,
        }
        self.publish_status();
    }

    // ---------------------------- Key handling ----------------------------

    /// Feed one key. Returns whether the key was consumed; the host applies its own
    /// default handling to keys that were not.
    pub fn handle_key_press<A: BufferAdapter + ?Sized>(
        &mut self,
        buf: &mut A,
        key: KeyEvent,
    ) -> bool {
        let key = key.normalized();
        if !key.is_valid() {
            trace!(target: "vim.keys", ?key, "ignored_invalid_key");
            return false;
        }
        trace!(target: "vim.keys", key = %key, mode = %self.mode(), "key");
        let consumed = match self.mode() {
            Mode::Insert => self.handle_insert_key(buf, key),
            Mode::Replace if key.code == KeyCode::Esc || key.as_char().is_some() => {
                self.handle_replace_key(buf, key)
            }
            _ => self.handle_grammar_key(buf, key),
        };
        self.publish_status();
        consumed
    }

    fn handle_insert_key<A: BufferAdapter + ?Sized>(
        &mut self,
        buf: &mut A,
        key: KeyEvent,
    ) -> bool {
        if key.code != KeyCode::Esc {
            return false;
        }
        mode_ops::leave_insert(buf);
        self.switch_mode(Mode::Normal);
        true
    }

    fn handle_replace_key<A: BufferAdapter + ?Sized>(
        &mut self,
        buf: &mut A,
        key: KeyEvent,
    ) -> bool {
        if let Some(c) = key.as_char() {
            mode_ops::replace_char(buf, c);
            return true;
        }
        mode_ops::leave_insert(buf);
        self.reset();
        self.switch_mode(Mode::Normal);
        true
    }

    fn handle_grammar_key<A: BufferAdapter + ?Sized>(
        &mut self,
        buf: &mut A,
        key: KeyEvent,
    ) -> bool {
        if key.code == KeyCode::Esc {
            debug!(target: "vim.grammar", pending = %self.pending_keys(), "escape");
            self.reset();
            if self.modes.is_visual() {
                buf.clear_selection();
                self.switch_mode(Mode::Normal);
            }
            return true;
        }

        if self.awaiting_register {
            self.awaiting_register = false;
            let Some(name) = key_to_register_name(&key).or(key.as_char()) else {
                self.reset();
                return false;
            };
            self.typed.push(key);
            if let Err(e) = self.registers.select(name) {
                debug!(target: "vim.grammar", error = %e, "register_select_failed");
                return self.fail(VimError::InvalidRegister(name));
            }
            return true;
        }

        if let Some(kind) = self.pending_find.take() {
            let Some(c) = key.as_char() else {
                debug!(target: "vim.grammar", key = %key, "find_target_not_a_character");
                self.reset();
                return false;
            };
            self.typed.push(key);
            let movement = kind.with_target(c);
            self.last_find = Some(movement);
            self.tokens.push(Token::Movement(movement));
            return self.advance(buf);
        }

        if self.keys.is_empty()
            && key.is_digit()
            && (!self.count_keys.is_empty() || key.to_digit() != 0)
        {
            self.typed.push(key);
            self.count_keys.push(key);
            trace!(target: "vim.grammar", count = %render_keys(&self.count_keys), "count_digit");
            return true;
        }

        self.keys.push(key);
        let layer = if self.modes.is_visual() {
            Layer::Visual
        } else if self.tokens.iter().any(Token::is_action) {
            Layer::OperatorPending
        } else {
            Layer::Normal
        };
        match self.keymap.resolve(layer, &self.keys) {
            Resolution::Matched { binding } => {
                self.typed.push(key);
                self.keys.clear();
                match self.apply_binding(buf, binding) {
                    Ok(()) => self.advance(buf),
                    Err(e) => self.fail(e),
                }
            }
            Resolution::NeedMore => {
                self.typed.push(key);
                true
            }
            Resolution::Unbound => {
                debug!(
                    target: "vim.grammar",
                    ?layer,
                    keys = %render_keys(&self.keys),
                    "unbound_sequence"
                );
                self.reset();
                false
            }
        }
    }

    // ---------------------------- Bindings -> tokens ----------------------------

    fn apply_binding<A: BufferAdapter + ?Sized>(
        &mut self,
        buf: &mut A,
        binding: Binding,
    ) -> Result<(), VimError> {
        trace!(target: "vim.grammar", ?binding, "binding");
        match binding {
            Binding::Action(action) => {
                if let Some(existing) = self.explicit_action() {
                    if existing != action || self.modes.is_visual() {
                        return Err(VimError::ConflictingAction);
                    }
                    // `dd`, `yy`, `>>`, `guu`: the action typed twice acts on lines
                    self.flush_count();
                    self.push(Token::Range(Range::Line));
                } else {
                    self.flush_count();
                    self.push(Token::Action(action));
                }
            }
            Binding::Movement(movement) => {
                self.flush_count();
                self.push(Token::Movement(movement));
            }
            Binding::Find(kind) => {
                self.flush_count();
                self.pending_find = Some(kind);
            }
            Binding::RepeatFind { reverse } => {
                let Some(last) = self.last_find else {
                    return Err(VimError::NoFindToRepeat);
                };
                let movement = if reverse {
                    last.find()
                        .map(|(kind, c)| kind.reversed().with_target(c))
                        .unwrap_or(last)
                } else {
                    last
                };
                self.flush_count();
                self.push(Token::Movement(movement));
            }
            Binding::Range(range) => {
                if range.is_text_object()
                    && !self
                        .explicit_action()
                        .is_some_and(Action::accepts_text_object)
                {
                    return Err(VimError::OperatorRequired);
                }
                self.flush_count();
                self.push(Token::Range(range));
            }
            Binding::RegisterPrefix => {
                if self.explicit_action().is_some() {
                    return Err(VimError::RegisterAfterAction);
                }
                self.awaiting_register = true;
            }
            Binding::Insert(entry) => {
                self.enter_insert(buf, entry);
            }
            Binding::Visual | Binding::VisualLine => {
                let target = if binding == Binding::Visual {
                    Mode::Visual
                } else {
                    Mode::VisualLine
                };
                self.reset();
                if self.mode() == target {
                    buf.clear_selection();
                    self.switch_mode(Mode::Normal);
                } else {
                    if !self.modes.is_visual() {
                        let here = buf.cursor();
                        buf.set_selection_anchor(Some(here));
                    }
                    self.switch_mode(target);
                }
            }
            Binding::Replace => {
                self.reset();
                self.switch_mode(Mode::Replace);
            }
            Binding::Shorthand { action, target } => {
                if self.explicit_action().is_some() {
                    return Err(VimError::ConflictingAction);
                }
                self.flush_count();
                self.push(Token::Action(action));
                self.push(target);
            }
        }
        Ok(())
    }

    fn enter_insert<A: BufferAdapter + ?Sized>(&mut self, buf: &mut A, entry: InsertEntry) {
        self.reset();
        if self.modes.is_visual() {
            buf.clear_selection();
        }
        mode_ops::enter_insert(buf, entry);
        self.switch_mode(Mode::Insert);
    }

    /// Execute the token list once it forms a complete command.
    fn advance<A: BufferAdapter + ?Sized>(&mut self, buf: &mut A) -> bool {
        if self.pending_find.is_some() || self.awaiting_register {
            return true;
        }
        if self.tokens.is_empty() {
            // mode keys and register selection leave nothing to run
            return true;
        }
        let command = Command::new(self.registers.current(), self.tokens.clone());
        match command.status(self.modes.is_visual()) {
            CommandStatus::Pending => true,
            CommandStatus::Invalid => {
                debug!(target: "vim.grammar", tokens = ?self.tokens, "invalid_command");
                self.fail(VimError::ConflictingAction)
            }
            CommandStatus::Complete => {
                let command = command.normalized();
                let mut cx = ExecContext {
                    buf,
                    registers: &mut self.registers,
                    config: &self.config,
                    mode: self.modes.current(),
                    sticky_col: &mut self.sticky_col,
                };
                let result = dispatcher::execute(&mut cx, &command);
                self.reset();
                match result {
                    Ok(outcome) => {
                        if let Some(mode) = outcome.mode {
                            self.switch_mode(mode);
                        }
                        true
                    }
                    Err(e) => self.fail(e),
                }
            }
        }
    }

    // ---------------------------- State helpers ----------------------------

    fn explicit_action(&self) -> Option<Action> {
        self.tokens.iter().find_map(|t| match t {
            Token::Action(a) => Some(*a),
            _ => None,
        })
    }

    fn push(&mut self, token: Token) {
        trace!(target: "vim.grammar", token = %token, "push_token");
        self.tokens.push(token);
    }

    /// Turn collected digits into a `Repeat` token.
    fn flush_count(&mut self) {
        if self.count_keys.is_empty() {
            return;
        }
        let n = self
            .count_keys
            .iter()
            .fold(0usize, |acc, k| {
                acc.saturating_mul(10)
                    .saturating_add(k.to_digit() as usize)
                    .min(MAX_COUNT)
            });
        self.count_keys.clear();
        self.push(Token::Repeat(n));
    }

    /// Drop every piece of the command being built.
    fn reset(&mut self) {
        if !self.tokens.is_empty() || !self.typed.is_empty() {
            trace!(target: "vim.grammar", pending = %self.pending_keys(), "reset");
        }
        self.typed.clear();
        self.count_keys.clear();
        self.keys.clear();
        self.tokens.clear();
        self.awaiting_register = false;
        self.pending_find = None;
        self.registers.reset_selection();
    }

    /// Abandon the command after `error`. Always consumes the key.
    fn fail(&mut self, error: VimError) -> bool {
        debug!(target: "vim.grammar", %error, visible = error.is_user_visible(), "command_failed");
        if error.is_user_visible() {
            self.sink.emit(VimEvent::Message(error.to_string()));
        }
        self.reset();
        true
    }

    fn switch_mode(&mut self, mode: Mode) {
        if self.modes.set(mode) {
            self.sticky_col = None;
            self.sink.emit(VimEvent::ModeChanged(mode));
        }
    }

    fn publish_status(&mut self) {
        let status = self.status();
        if self.last_status.as_ref() == Some(&status) {
            return;
        }
        trace!(
            target: "vim.events",
            mode = %status.mode,
            pending = %status.pending_keys,
            register = %status.register,
            "status_update"
        );
        self.sink.emit(VimEvent::StatusUpdated(status.clone()));
        self.last_status = Some(status);
    }
}
