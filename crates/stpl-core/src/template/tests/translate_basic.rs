//! Translation of literal text and single code lines

use super::helpers::{generated, generated_untrimmed, translate};

#[test]
fn test_plain_text() {
    assert_eq!(generated("Hello World"), "_printlist(('Hello World',))\n");
}

#[test]
fn test_empty_template_generates_nothing() {
    assert!(translate("").lines.is_empty());
}

#[test]
fn test_multiline_text() {
    assert_eq!(generated("a\nb"), "_printlist(('a\\n'\\\n'b',))\n");
}

#[test]
fn test_code_line() {
    assert_eq!(generated("% x = 1\n"), "x = 1\n");
}

#[test]
fn test_indented_marker() {
    assert_eq!(generated("   % x = 1\n"), "x = 1\n");
}

#[test]
fn test_comment_kept_after_code() {
    assert_eq!(generated("% x = 1  # note\n"), "x = 1# note\n");
}

#[test]
fn test_code_line_at_end_of_source() {
    assert_eq!(generated("a\n% x = 1"), "_printlist(('a',))\nx = 1\n");
}

#[test]
fn test_line_break_before_code_kept_without_trimming() {
    assert_eq!(
        generated_untrimmed("a\n% x = 1\nb"),
        "_printlist(('a\\n',))\nx = 1\n_printlist(('b',))\n"
    );
}

#[test]
fn test_backslash_escaped_marker() {
    assert_eq!(
        generated("\\% not code\n"),
        "_printlist(('% not code\\n',))\n"
    );
}

#[test]
fn test_legacy_double_percent_escape() {
    assert_eq!(
        generated("%% not code\n"),
        "_printlist(('% not code\\n',))\n"
    );
}

#[test]
fn test_escaped_marker_keeps_indentation() {
    assert_eq!(generated("  \\% x"), "_printlist(('  % x',))\n");
}

#[test]
fn test_marker_inside_line_is_text() {
    assert_eq!(generated("100% sure"), "_printlist(('100% sure',))\n");
}

#[test]
fn test_ambiguous_keyword_in_inline_expression() {
    assert_eq!(
        generated("{{ 1 if True else 2 }}"),
        "_printlist((_escape(1 if True else 2),))\n"
    );
}

#[test]
fn test_ambiguous_keyword_in_code_line() {
    assert_eq!(generated("% x = 1 if y else 2\n"), "x = 1 if y else 2\n");
}

#[test]
fn test_newline_inside_parentheses_continues_code() {
    let code = translate("% x = f(1,\n  2)\nrest");
    assert_eq!(code.lines.len(), 2);
    assert_eq!(code.lines[0].code, "x = f(1,\n  2)");
    assert_eq!(code.lines[0].line, 1);
    assert_eq!(code.lines[1].line, 3);
}

#[test]
fn test_line_numbers_follow_template() {
    let code = translate("a\nb\n% x = 1\n{{y}}");
    let lines: Vec<usize> = code.lines.iter().map(|l| l.line).collect();
    assert_eq!(lines, vec![1, 3, 4]);
}

#[test]
fn test_stray_close_paren_does_not_hide_keywords() {
    let code = translate("% x = 1)\n% if y:\nz\n% end\nafter");
    let shape: Vec<(usize, &str)> = code
        .lines
        .iter()
        .map(|l| (l.indent, l.code.as_str()))
        .collect();
    assert_eq!(
        shape,
        vec![
            (0, "x = 1)"),
            (0, "if y:"),
            (1, "_printlist(('z',))"),
            (0, "_printlist(('after',))"),
        ]
    );
}
