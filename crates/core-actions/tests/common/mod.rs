#![allow(dead_code)] // Shared across many integration tests; each test binary uses a subset of helpers.

use core_actions::Vim;
use core_config::Config;
use core_events::{EventSink, VimEvent, parse_keys};
use core_model::{BufferAdapter, EditorModel};
use core_text::{Position, TextSource};
use tokio::sync::mpsc::UnboundedReceiver;

/// A document, an interpreter and the receiving end of its notifications.
pub struct Session {
    pub doc: EditorModel,
    pub vim: Vim,
    events: UnboundedReceiver<VimEvent>,
}

impl Session {
    pub fn new(text: &str) -> Self {
        Self::with_config(text, Config::default())
    }

    pub fn with_config(text: &str, config: Config) -> Self {
        let (sink, events) = EventSink::channel();
        Self {
            doc: EditorModel::from_text(text).expect("scratch buffer"),
            vim: Vim::new(config, sink),
            events,
        }
    }

    pub fn at(mut self, line: usize, byte: usize) -> Self {
        self.doc.set_cursor(Position::new(line, byte));
        self
    }

    /// Feed a key script in notation form; returns the consumed flag of the last key.
    pub fn keys(&mut self, script: &str) -> bool {
        let mut consumed = false;
        for key in parse_keys(script).expect("valid key notation") {
            consumed = self.vim.handle_key_press(&mut self.doc, key);
        }
        consumed
    }

    pub fn text(&self) -> String {
        self.doc.text()
    }

    pub fn cursor(&self) -> (usize, usize) {
        let c = self.doc.cursor();
        (c.line, c.byte)
    }

    pub fn reg(&self, name: char) -> String {
        self.vim.registers().read(name).to_string()
    }

    /// Everything emitted since the last drain.
    pub fn drain(&mut self) -> Vec<VimEvent> {
        let mut out = Vec::new();
        while let Ok(ev) = self.events.try_recv() {
            out.push(ev);
        }
        out
    }

    pub fn messages(&mut self) -> Vec<String> {
        self.drain()
            .into_iter()
            .filter_map(|e| match e {
                VimEvent::Message(m) => Some(m),
                _ => None,
            })
            .collect()
    }
}

/// Run `script` on `text` with the cursor at the origin.
pub fn run(text: &str, script: &str) -> Session {
    let mut s = Session::new(text);
    s.keys(script);
    s
}
