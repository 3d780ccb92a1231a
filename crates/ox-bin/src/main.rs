//! oxmodal entrypoint: runs a key script against a document and reports the outcome.
//!
//! ```text
//! oxmodal --text "hello world" --keys "dw"
//! ```
//!
//! The document comes from `--text` or `--file`; the result (mode, cursor, registers
//! written, notifications and the final text) goes to stdout. The file is never
//! written back.
use anyhow::{Context, Result};
use clap::Parser;
use core_actions::Vim;
use core_config::{Config, load_from};
use core_events::{EventSink, KeyEvent, VimEvent, parse_keys};
use core_model::{BufferAdapter, EditorModel};
use core_text::TextSource;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;

const LOG_FILE_NAME: &str = "oxmodal.log";

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "oxmodal", version, about = "Run a Vim key script against a document")]
struct Args {
    /// Initial document text (ignored when --file is given).
    #[arg(long, default_value = "")]
    text: String,
    /// Key script in Vim notation, e.g. `d2w`, `ci(<Esc>`, `<C-d>`.
    #[arg(long)]
    keys: String,
    /// Read the initial document from this UTF-8 file.
    #[arg(long)]
    file: Option<PathBuf>,
    /// Configuration file path (overrides discovery of `oxmodal.toml`).
    #[arg(long = "config")]
    config: Option<PathBuf>,
    /// Directory receiving `oxmodal.log`. Logging is disabled when omitted.
    #[arg(long = "log-dir")]
    log_dir: Option<PathBuf>,
    /// Viewport height reported to page motions (0 uses the configured fallback).
    #[arg(long, default_value_t = 0)]
    viewport: usize,
}

/// Everything observed while running one script.
struct Outcome {
    doc: EditorModel,
    vim: Vim,
    consumed: usize,
    events: Vec<VimEvent>,
}

fn run_script(doc: EditorModel, config: Config, keys: &[KeyEvent]) -> Outcome {
    let (sink, mut rx) = EventSink::channel();
    let mut vim = Vim::new(config, sink);
    let mut doc = doc;
    let mut consumed = 0;
    for key in keys {
        if vim.handle_key_press(&mut doc, *key) {
            consumed += 1;
        }
    }
    let mut events = Vec::new();
    while let Ok(ev) = rx.try_recv() {
        events.push(ev);
    }
    info!(target: "runtime", keys = keys.len(), consumed, events = events.len(), "script_complete");
    Outcome {
        doc,
        vim,
        consumed,
        events,
    }
}

fn render_report(outcome: &Outcome, total_keys: usize) -> String {
    let mut out = String::new();
    let cursor = outcome.doc.cursor();
    let _ = writeln!(out, "mode: {}", outcome.vim.mode());
    let _ = writeln!(out, "cursor: {}:{}", cursor.line, cursor.byte);
    let _ = writeln!(out, "consumed: {}/{}", outcome.consumed, total_keys);
    for reg in outcome.vim.registers().iter().filter(|r| !r.value.is_empty()) {
        let _ = writeln!(out, "register {}: {:?}", reg.name, reg.value);
    }
    for ev in &outcome.events {
        let line = match ev {
            VimEvent::ModeChanged(m) => format!("mode-changed {m}"),
            VimEvent::Message(msg) => format!("message {msg:?}"),
            VimEvent::StatusUpdated(s) => {
                format!("status {} {:?} {}", s.mode, s.pending_keys, s.register)
            }
        };
        let _ = writeln!(out, "event: {line}");
    }
    let _ = writeln!(out, "---");
    out.push_str(&outcome.doc.text());
    out
}

fn configure_logging(log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let Some(log_dir) = log_dir else {
        return Ok(None);
    };
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("creating log directory {}", log_dir.display()))?;
    let log_path = log_dir.join(LOG_FILE_NAME);
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }
    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE_NAME);
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(nb_writer)
        .try_init()
    {
        Ok(_) => Ok(Some(guard)),
        // Global tracing subscriber already installed; drop guard so writer shuts down.
        Err(_err) => Ok(None),
    }
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = configure_logging(args.log_dir.as_deref())?;
    install_panic_hook();
    info!(target: "runtime", "startup");

    let config = load_from(args.config.clone())?;
    let text = match &args.file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => args.text.clone(),
    };
    let keys = parse_keys(&args.keys)
        .with_context(|| format!("parsing key script {:?}", args.keys))?;
    let doc = EditorModel::from_text(&text)?.with_viewport_height(args.viewport);
    let path_str = args.file.as_ref().map(|p| p.to_string_lossy().to_string());
    info!(
        target: "runtime.startup",
        path = path_str.as_deref(),
        config_override = args.config.is_some(),
        bytes = text.len(),
        keys = keys.len(),
        "bootstrap_complete"
    );

    let outcome = run_script(doc, config, &keys);
    print!("{}", render_report(&outcome, keys.len()));
    if !outcome.doc.text().ends_with('\n') {
        println!();
    }
    Ok(())
}
