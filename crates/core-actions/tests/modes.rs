mod common;

use common::{Session, run};
use core_events::{KeyEvent, Mode, VimEvent};
use pretty_assertions::assert_eq;

fn mode_events(s: &mut Session) -> Vec<Mode> {
    s.drain()
        .into_iter()
        .filter_map(|e| match e {
            VimEvent::ModeChanged(m) => Some(m),
            _ => None,
        })
        .collect()
}

#[test]
fn insert_entry_and_escape() {
    let mut s = Session::new("abc");
    s.keys("a");
    assert_eq!(s.vim.mode(), Mode::Insert);
    assert_eq!(s.cursor(), (0, 1));
    // typing is the host's job
    assert!(!s.vim.handle_key_press(&mut s.doc, KeyEvent::char('x')));
    assert!(s.keys("<Esc>"));
    assert_eq!(s.vim.mode(), Mode::Normal);
    assert_eq!(s.cursor(), (0, 0));

    s.keys("A");
    assert_eq!(s.cursor(), (0, 3));
    s.keys("<Esc>");
    assert_eq!(s.cursor(), (0, 2));

    let mut s = Session::new("  abc").at(0, 4);
    s.keys("I");
    assert_eq!(s.cursor(), (0, 2));
}

#[test]
fn open_line_below_and_above() {
    let s = run("a\nb", "o");
    assert_eq!(s.text(), "a\n\nb");
    assert_eq!(s.cursor(), (1, 0));
    assert_eq!(s.vim.mode(), Mode::Insert);

    let s = run("a\nb", "jO");
    assert_eq!(s.text(), "a\n\nb");
    assert_eq!(s.cursor(), (1, 0));
}

#[test]
fn mode_changes_are_notified_once() {
    let mut s = Session::new("abc");
    s.keys("i<Esc>");
    assert_eq!(mode_events(&mut s), vec![Mode::Insert, Mode::Normal]);
    s.vim.set_mode(Mode::Normal);
    assert!(mode_events(&mut s).is_empty());
    s.vim.set_mode(Mode::VisualLine);
    assert_eq!(mode_events(&mut s), vec![Mode::VisualLine]);
}

#[test]
fn change_enters_insert_with_one_notification() {
    let mut s = Session::new("foo bar");
    s.keys("cw");
    assert_eq!(mode_events(&mut s), vec![Mode::Insert]);
}

#[test]
fn escape_in_normal_is_consumed() {
    let mut s = Session::new("abc");
    assert!(s.keys("<Esc>"));
    assert!(mode_events(&mut s).is_empty());
}

#[test]
fn counted_insert_drops_the_count() {
    let s = run("abc", "2i");
    assert_eq!(s.vim.mode(), Mode::Insert);
    assert_eq!(s.vim.pending_keys(), "");
}

#[test]
fn replace_mode_overwrites_and_appends() {
    let mut s = Session::new("abc");
    s.keys("Rxy");
    assert_eq!(s.vim.mode(), Mode::Replace);
    assert_eq!(s.text(), "xyc");
    s.keys("<Esc>");
    assert_eq!(s.vim.mode(), Mode::Normal);
    assert_eq!(s.cursor(), (0, 1));

    let s = run("ab", "$Rxyz");
    assert_eq!(s.text(), "axyz");
}

#[test]
fn replace_mode_still_moves_with_arrows() {
    let mut s = Session::new("abc");
    s.keys("R<Right>x");
    assert_eq!(s.text(), "axc");
    assert_eq!(s.vim.mode(), Mode::Replace);
}

#[test]
fn modifier_only_keys_are_ignored() {
    use core_events::{KeyCode, KeyModifiers};
    let mut s = Session::new("abc");
    let shift = KeyEvent::new(KeyCode::Modifier, KeyModifiers::SHIFT);
    assert!(!s.vim.handle_key_press(&mut s.doc, shift));
    assert_eq!(s.vim.pending_keys(), "");
}
