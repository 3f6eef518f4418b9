//! Unit tests for inline expression compilation

use crate::template::inline::compile_text;
use crate::template::SyntaxConfig;

fn compile(text: &str, indent: usize) -> String {
    compile_text(text, indent, &SyntaxConfig::default()).unwrap()
}

#[test]
fn test_escaped_expression() {
    assert_eq!(
        compile("Hello {{name}}!", 0),
        "_printlist(('Hello ', _escape(name), '!',))"
    );
}

#[test]
fn test_raw_expression_keeps_text_after_sigil() {
    assert_eq!(compile("{{! html }}", 0), "_printlist((_str( html),))");
}

#[test]
fn test_expression_is_trimmed() {
    assert_eq!(compile("{{   a + b   }}", 0), "_printlist((_escape(a + b),))");
}

#[test]
fn test_adjacent_expressions() {
    assert_eq!(
        compile("{{a}}{{b}}", 0),
        "_printlist((_escape(a), _escape(b),))"
    );
}

#[test]
fn test_string_containing_end_marker() {
    assert_eq!(
        compile("{{ '}}' }}", 0),
        "_printlist((_escape('}}'),))"
    );
}

#[test]
fn test_multiline_text_uses_indented_continuation() {
    assert_eq!(
        compile("x {{a}}\ny {{b}}", 1),
        "_printlist(('x ', _escape(a), '\\n'\\\n  'y ', _escape(b),))"
    );
}

#[test]
fn test_line_break_before_expression_continues_line() {
    assert_eq!(
        compile("a\n{{b}}", 0),
        "_printlist(('a\\n'\\\n, _escape(b),))"
    );
}

#[test]
fn test_expression_cannot_span_lines() {
    assert_eq!(compile("{{ a\n}}", 0), "_printlist(('{{ a\\n'\\\n'}}',))");
}

#[test]
fn test_double_backslash_joins_lines() {
    assert_eq!(compile("line\\\\\n", 0), "_printlist(('line',))");
    assert_eq!(compile("line\\\\\r\n", 0), "_printlist(('line',))");
}

#[test]
fn test_empty_expression_is_an_error() {
    let err = compile_text("ok\n{{ }}", 0, &SyntaxConfig::default()).unwrap_err();
    assert_eq!(err.line_offset, 1);
    assert!(err.message.contains("empty inline expression"));
}

#[test]
fn test_custom_inline_markers() {
    let syntax = SyntaxConfig::parse("<% %> % ${ }").unwrap();
    assert_eq!(
        compile_text("v=${x}", 0, &syntax).unwrap(),
        "_printlist(('v=', _escape(x),))"
    );
}
