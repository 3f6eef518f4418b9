//! Code line tokenizer

use crate::script::token::{tokenize, Sym, Tok};

fn toks(code: &str) -> Vec<Tok> {
    tokenize(code).unwrap().into_iter().map(|t| t.tok).collect()
}

#[test]
fn test_names_numbers_and_symbols() {
    assert_eq!(
        toks("x = 1 + 2.5"),
        vec![
            Tok::Name("x".to_string()),
            Tok::Sym(Sym::Assign),
            Tok::Int(1),
            Tok::Sym(Sym::Plus),
            Tok::Float(2.5),
        ]
    );
}

#[test]
fn test_longest_symbol_wins() {
    assert_eq!(
        toks("a ** b // c <= d"),
        vec![
            Tok::Name("a".to_string()),
            Tok::Sym(Sym::DoubleStar),
            Tok::Name("b".to_string()),
            Tok::Sym(Sym::DoubleSlash),
            Tok::Name("c".to_string()),
            Tok::Sym(Sym::Le),
            Tok::Name("d".to_string()),
        ]
    );
}

#[test]
fn test_number_forms() {
    assert_eq!(toks("0x1F"), vec![Tok::Int(31)]);
    assert_eq!(toks("1_000"), vec![Tok::Int(1000)]);
    assert_eq!(toks("1e3"), vec![Tok::Float(1000.0)]);
    assert_eq!(toks(".5"), vec![Tok::Float(0.5)]);
}

#[test]
fn test_integer_overflow_is_error() {
    let err = tokenize("99999999999999999999").unwrap_err();
    assert!(err.message.contains("out of range"));
}

#[test]
fn test_string_escapes() {
    assert_eq!(toks(r#"'a\nb'"#), vec![Tok::Str("a\nb".to_string())]);
    assert_eq!(toks(r#""\x41é""#), vec![Tok::Str("Aé".to_string())]);
    assert_eq!(toks(r#"'it\'s'"#), vec![Tok::Str("it's".to_string())]);
}

#[test]
fn test_unknown_escape_keeps_backslash() {
    assert_eq!(toks(r#"'\d'"#), vec![Tok::Str("\\d".to_string())]);
}

#[test]
fn test_raw_and_prefixed_strings() {
    assert_eq!(toks(r#"r'\n'"#), vec![Tok::Str("\\n".to_string())]);
    assert_eq!(toks("u'x'"), vec![Tok::Str("x".to_string())]);
    assert_eq!(toks("rb'x'"), vec![Tok::Str("x".to_string())]);
}

#[test]
fn test_prefix_letter_alone_is_a_name() {
    assert_eq!(toks("r"), vec![Tok::Name("r".to_string())]);
}

#[test]
fn test_triple_quoted_string_spans_lines() {
    let tokens = tokenize("'''a\nb''' + x").unwrap();
    assert_eq!(tokens[0].tok, Tok::Str("a\nb".to_string()));
    assert_eq!(tokens[2].line, 1);
}

#[test]
fn test_comment_is_skipped() {
    assert_eq!(toks("x # note"), vec![Tok::Name("x".to_string())]);
}

#[test]
fn test_line_join_advances_line() {
    let tokens = tokenize("_printlist(('a\\n',\\\n'b',))").unwrap();
    let b = tokens
        .iter()
        .find(|t| t.tok == Tok::Str("b".to_string()))
        .unwrap();
    assert_eq!(b.line, 1);
}

#[test]
fn test_unterminated_string() {
    let err = tokenize("x = 'abc").unwrap_err();
    assert_eq!(err.message, "unterminated string literal");
}

#[test]
fn test_unexpected_character() {
    let err = tokenize("x = $y").unwrap_err();
    assert_eq!(err.message, "unexpected character '$'");
}
