mod common;

use common::{Session, run};
use core_events::{Mode, VimEvent};
use core_model::BufferAdapter;
use core_text::Position;
use pretty_assertions::assert_eq;

#[test]
fn charwise_delete() {
    let mut s = Session::new("hello world");
    s.keys("vll");
    assert_eq!(s.vim.mode(), Mode::Visual);
    assert_eq!(s.doc.selected_text().as_deref(), Some("hel"));
    s.keys("d");
    assert_eq!(s.text(), "lo world");
    assert_eq!(s.reg('"'), "hel");
    assert_eq!(s.vim.mode(), Mode::Normal);
    assert!(!s.doc.has_selection());
    assert_eq!(s.cursor(), (0, 0));
}

#[test]
fn charwise_copy_returns_to_start() {
    let s = run("hello world", "vey");
    assert_eq!(s.reg('"'), "hello");
    assert_eq!(s.text(), "hello world");
    assert_eq!(s.cursor(), (0, 0));
    assert_eq!(s.vim.mode(), Mode::Normal);
}

#[test]
fn backwards_selection() {
    let mut s = Session::new("hello world").at(0, 4);
    s.keys("vbd");
    assert_eq!(s.text(), " world");
    assert_eq!(s.reg('"'), "hello");
}

#[test]
fn linewise_delete_and_copy() {
    let s = run("a\nb\nc\n", "Vjd");
    assert_eq!(s.text(), "c\n");
    assert_eq!(s.reg('"'), "a\nb\n");

    let s = run("a\nb\nc\n", "Vy");
    assert_eq!(s.reg('"'), "a\n");
    assert_eq!(s.cursor(), (0, 0));
}

#[test]
fn paste_replaces_selection_without_touching_registers() {
    let mut s = Session::new("foo bar");
    s.keys("yiwwvep");
    assert_eq!(s.text(), "foo foo");
    assert_eq!(s.reg('"'), "foo");
    assert_eq!(s.vim.mode(), Mode::Normal);
    assert_eq!(s.cursor(), (0, 6));
}

#[test]
fn linewise_paste_over_lines() {
    let mut s = Session::new("keep\nold\n");
    s.keys("yyjVp");
    assert_eq!(s.text(), "keep\nkeep\n");
    assert_eq!(s.cursor(), (1, 0));
}

#[test]
fn shift_and_case_in_visual() {
    let s = run("a\nb", "Vj>");
    assert_eq!(s.text(), "    a\n    b");
    assert_eq!(s.vim.mode(), Mode::Normal);

    let s = run("a", "V2>");
    assert_eq!(s.text(), "        a");

    let s = run("abc def", "veU");
    assert_eq!(s.text(), "ABC def");

    let s = run("ABC DEF", "Vu");
    assert_eq!(s.text(), "abc def");
}

#[test]
fn change_enters_insert() {
    let s = run("hello world", "vec");
    assert_eq!(s.text(), " world");
    assert_eq!(s.vim.mode(), Mode::Insert);
}

#[test]
fn escape_and_toggling() {
    let mut s = Session::new("hello");
    s.keys("vl<Esc>");
    assert_eq!(s.vim.mode(), Mode::Normal);
    assert!(!s.doc.has_selection());

    s.keys("vV");
    assert_eq!(s.vim.mode(), Mode::VisualLine);
    assert!(s.doc.has_selection());
    s.keys("V");
    assert_eq!(s.vim.mode(), Mode::Normal);
    assert!(!s.doc.has_selection());
}

#[test]
fn host_selection_enters_visual() {
    let mut s = Session::new("hello world");
    s.doc.select(Position::new(0, 0), Position::new(0, 4));
    s.vim.on_host_selection_changed(true);
    assert_eq!(s.vim.mode(), Mode::Visual);
    assert!(s.drain().contains(&VimEvent::ModeChanged(Mode::Visual)));
    s.keys("d");
    assert_eq!(s.text(), " world");
    assert_eq!(s.reg('"'), "hello");

    s.doc.select(Position::new(0, 1), Position::new(0, 2));
    s.vim.on_host_selection_changed(true);
    s.doc.clear_selection();
    s.vim.on_host_selection_changed(false);
    assert_eq!(s.vim.mode(), Mode::Normal);
}

#[test]
fn selection_extends_across_lines() {
    let mut s = Session::new("ab\ncd");
    s.keys("vjd");
    assert_eq!(s.text(), "d");
    assert_eq!(s.reg('"'), "ab\nc");
}
