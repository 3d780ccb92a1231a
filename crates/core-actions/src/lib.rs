//! Modal command interpreter.
//!
//! [`Vim`] turns key presses into grammar tokens, recognizes complete commands
//! (`[count] [action] [count] target`) and executes them against a host document
//! reached through [`core_model::BufferAdapter`]:
//! * `engine` - per-key state machine, mode switching, notifications
//! * `command` - token list validity and count arithmetic
//! * `span_resolver` - movements and the spans operators act on
//! * `text_object` - `iw`, `a(`, `i"` and friends
//! * `dispatcher` - execution, register side effects, paste
//!
//! ```
//! use core_actions::Vim;
//! use core_events::parse_keys;
//! use core_model::EditorModel;
//! use core_text::TextSource;
//!
//! let mut doc = EditorModel::from_text("hello world\nfoo bar\n").unwrap();
//! let mut vim = Vim::default();
//! for key in parse_keys("dw").unwrap() {
//!     vim.handle_key_press(&mut doc, key);
//! }
//! assert_eq!(doc.text(), "world\nfoo bar\n");
//! assert_eq!(vim.registers().read('"'), "hello ");
//! ```

mod command;
mod dispatcher;
mod engine;
mod error;
pub mod span_resolver;
pub mod text_object;

pub use command::{Command, CommandStatus, MAX_COUNT};
pub use core_keymap::{Action, FindKind, Movement, Range, Token};
pub use engine::Vim;
pub use error::VimError;
