mod common;

use common::{Session, run};
use core_config::{Config, ConfigFile, IndentConfig};
use core_events::Mode;
use pretty_assertions::assert_eq;

#[test]
fn dw_from_document_start() {
    let s = run("hello world\nfoo bar\n", "dw");
    assert_eq!(s.text(), "world\nfoo bar\n");
    assert_eq!(s.cursor(), (0, 0));
    assert_eq!(s.reg('"'), "hello ");
}

#[test]
fn dw_on_last_word_stops_at_line_end() {
    let s = Session::new("foo bar\nbaz").at(0, 4);
    let mut s = s;
    s.keys("dw");
    assert_eq!(s.text(), "foo \nbaz");
    assert_eq!(s.reg('"'), "bar");
}

#[test]
fn delete_inner_parentheses() {
    let mut s = Session::new("(abc)").at(0, 1);
    s.keys("di(");
    assert_eq!(s.text(), "()");
    assert_eq!(s.reg('"'), "abc");
    assert_eq!(s.cursor(), (0, 1));
}

#[test]
fn missing_text_object_is_a_no_op() {
    let mut s = Session::new("abc").at(0, 1);
    assert!(s.keys("di("));
    assert_eq!(s.text(), "abc");
    assert_eq!(s.reg('"'), "");
    assert!(s.messages().is_empty());
}

#[test]
fn delete_around_word_and_change_inner_quotes() {
    let mut s = Session::new("foo bar baz").at(0, 4);
    s.keys("daw");
    assert_eq!(s.text(), "foo baz");
    assert_eq!(s.reg('"'), "bar ");

    let mut q = Session::new("say \"hi\" now").at(0, 5);
    q.keys("ci\"");
    assert_eq!(q.text(), "say \"\" now");
    assert_eq!(q.vim.mode(), Mode::Insert);
    assert_eq!(q.cursor(), (0, 5));
}

#[test]
fn big_word_operators_and_objects() {
    let s = run("foo.bar baz", "dW");
    assert_eq!(s.text(), "baz");
    assert_eq!(s.reg('"'), "foo.bar ");

    let mut w = Session::new("x foo.bar(y) z").at(0, 4);
    w.keys("daW");
    assert_eq!(w.text(), "x z");
    assert_eq!(w.reg('"'), "foo.bar(y) ");
}

#[test]
fn bracket_objects_after_find_and_across_lines() {
    let s = run("f(a, [x, y], c)", "fxdi[");
    assert_eq!(s.text(), "f(a, [], c)");
    assert_eq!(s.reg('"'), "x, y");

    let mut b = Session::new("fn x() {\n    body;\n}\nend").at(1, 4);
    b.keys("da{");
    assert_eq!(b.text(), "fn x() \nend");
    assert_eq!(b.reg('"'), "{\n    body;\n}");
}

#[test]
fn delete_lines() {
    let mut s = Session::new("one\ntwo\nthree\n").at(1, 0);
    s.keys("dd");
    assert_eq!(s.text(), "one\nthree\n");
    assert_eq!(s.reg('"'), "two\n");
    assert_eq!(s.cursor(), (1, 0));

    let s = run("one\ntwo\nthree\n", "2dd");
    assert_eq!(s.text(), "three\n");
    assert_eq!(s.reg('"'), "one\ntwo\n");

    let mut last = Session::new("one\ntwo").at(1, 0);
    last.keys("dd");
    assert_eq!(last.text(), "one");
    assert_eq!(last.reg('"'), "two\n");
    assert_eq!(last.cursor(), (0, 0));
}

#[test]
fn linewise_motions() {
    let mut s = Session::new("a\nb\nc").at(1, 0);
    s.keys("dG");
    assert_eq!(s.text(), "a");

    let mut s = Session::new("a\nb\nc").at(1, 0);
    s.keys("dgg");
    assert_eq!(s.text(), "c");
    assert_eq!(s.cursor(), (0, 0));

    let mut s = Session::new("a\nb\nc");
    s.keys("dj");
    assert_eq!(s.text(), "c");
    assert_eq!(s.reg('"'), "a\nb\n");
}

#[test]
fn motion_without_room_leaves_registers_alone() {
    let mut s = Session::new("a\nb").at(1, 0);
    assert!(s.keys("dj"));
    assert_eq!(s.text(), "a\nb");
    assert_eq!(s.reg('"'), "");
}

#[test]
fn delete_and_paste_round_trips() {
    let s = run("a\nb\nc\n", "ddp");
    assert_eq!(s.text(), "b\na\nc\n");
    assert_eq!(s.cursor(), (1, 0));

    let s = run("hello world", "dwP");
    assert_eq!(s.text(), "hello world");
    assert_eq!(s.cursor(), (0, 5));
}

#[test]
fn change_word_acts_on_word_end() {
    let s = run("foo bar", "cw");
    assert_eq!(s.text(), " bar");
    assert_eq!(s.reg('"'), "foo");
    assert_eq!(s.vim.mode(), Mode::Insert);
    assert_eq!(s.cursor(), (0, 0));
}

#[test]
fn change_line_keeps_the_line() {
    let s = run("  one\ntwo\n", "cc");
    assert_eq!(s.text(), "\ntwo\n");
    assert_eq!(s.reg('"'), "  one\n");
    assert_eq!(s.vim.mode(), Mode::Insert);
    assert_eq!(s.cursor(), (0, 0));
}

#[test]
fn shorthands() {
    let mut s = Session::new("hello world").at(0, 5);
    s.keys("D");
    assert_eq!(s.text(), "hello");
    assert_eq!(s.reg('"'), " world");
    assert_eq!(s.cursor(), (0, 4));

    let s = run("abcdef", "3x");
    assert_eq!(s.text(), "def");
    assert_eq!(s.reg('"'), "abc");

    let mut s = Session::new("abc").at(0, 2);
    s.keys("x");
    assert_eq!(s.text(), "ab");
    assert_eq!(s.cursor(), (0, 1));

    let mut s = Session::new("abc").at(0, 2);
    s.keys("X");
    assert_eq!(s.text(), "ac");

    let s = run("abc", "C");
    assert_eq!(s.text(), "");
    assert_eq!(s.vim.mode(), Mode::Insert);

    let s = run("", "x");
    assert_eq!(s.text(), "");
    assert_eq!(s.reg('"'), "");
}

#[test]
fn indent_and_unindent() {
    let s = run("a\nb", ">>");
    assert_eq!(s.text(), "    a\nb");
    assert_eq!(s.cursor(), (0, 4));

    let s = run("a\nb", ">j");
    assert_eq!(s.text(), "    a\n    b");

    let s = run("      x", "<lt><lt>");
    assert_eq!(s.text(), "  x");
    assert_eq!(s.reg('"'), "");

    let config = Config {
        raw: None,
        file: ConfigFile {
            indent: IndentConfig {
                width: 2,
                expand_tab: false,
            },
            ..ConfigFile::default()
        },
    };
    let mut s = Session::with_config("a", config);
    s.keys(">>");
    assert_eq!(s.text(), "\ta");
}

#[test]
fn case_conversion() {
    let s = run("hello world", "gUiw");
    assert_eq!(s.text(), "HELLO world");
    assert_eq!(s.cursor(), (0, 0));

    let s = run("ABC\nDEF", "guu");
    assert_eq!(s.text(), "abc\nDEF");

    let s = run("abc\ndef", "gUgU");
    assert_eq!(s.text(), "ABC\ndef");

    let s = run("one two", "gUe");
    assert_eq!(s.text(), "ONE two");
}

#[test]
fn find_and_repeat() {
    let mut s = Session::new("a,b,c,d");
    s.keys("f,;");
    assert_eq!(s.cursor(), (0, 3));
    s.keys("$F,;");
    assert_eq!(s.cursor(), (0, 3));
    s.keys(",");
    assert_eq!(s.cursor(), (0, 5));
    s.keys("02f,");
    assert_eq!(s.cursor(), (0, 3));

    let s = run("a,b", "dt,");
    assert_eq!(s.text(), ",b");
    assert_eq!(s.reg('"'), "a");

    let s = run("a,b,c", "df,");
    assert_eq!(s.text(), "b,c");

    let s = run("abc", "dfz");
    assert_eq!(s.text(), "abc");
}

#[test]
fn find_target_with_non_character_key_aborts() {
    let mut s = Session::new("a,b");
    s.keys("f");
    assert_eq!(s.vim.pending_keys(), "f");
    assert!(!s.keys("<Left>"));
    assert_eq!(s.vim.pending_keys(), "");
}

#[test]
fn copy_and_paste_with_count() {
    let mut s = Session::new("ab");
    s.keys("yl");
    assert_eq!(s.reg('"'), "a");
    assert_eq!(s.cursor(), (0, 0));
    s.keys("3p");
    assert_eq!(s.text(), "aaaab");
    assert_eq!(s.cursor(), (0, 3));
}

#[test]
fn copy_backwards_moves_cursor_to_start() {
    let mut s = Session::new("foo bar").at(0, 4);
    s.keys("yb");
    assert_eq!(s.reg('"'), "foo ");
    assert_eq!(s.cursor(), (0, 0));
    assert_eq!(s.text(), "foo bar");
}
