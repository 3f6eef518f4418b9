//! Unit tests for the code tokenizer

use crate::template::lexer::{match_string_literal, TokenKind, Tokenizer};
use crate::template::SyntaxConfig;

fn first_token(src: &str) -> Option<(TokenKind, String)> {
    let syntax = SyntaxConfig::default();
    Tokenizer::new(src, &syntax)
        .next_token(0, 0)
        .map(|t| (t.kind, t.text.to_string()))
}

fn all_tokens(src: &str) -> Vec<TokenKind> {
    let syntax = SyntaxConfig::default();
    let tokenizer = Tokenizer::new(src, &syntax);
    let mut kinds = Vec::new();
    let mut pos = 0;
    let mut line_begin = 0;
    while let Some(token) = tokenizer.next_token(pos, line_begin) {
        kinds.push(token.kind);
        pos = token.end;
        if token.kind == TokenKind::Newline {
            line_begin = pos;
        }
    }
    kinds
}

#[test]
fn test_block_start_keyword_at_line_start() {
    assert_eq!(
        first_token(" if x:"),
        Some((TokenKind::BlockStart, " if".to_string()))
    );
    assert_eq!(
        first_token("for item in items:"),
        Some((TokenKind::BlockStart, "for".to_string()))
    );
}

#[test]
fn test_block_continue_keyword() {
    assert_eq!(
        first_token(" else:"),
        Some((TokenKind::BlockContinue, " else".to_string()))
    );
    assert_eq!(
        first_token("elif y:"),
        Some((TokenKind::BlockContinue, "elif".to_string()))
    );
}

#[test]
fn test_keyword_requires_word_boundary() {
    // `iffy` and `end_date` are plain names
    assert_eq!(all_tokens(" iffy = 1"), vec![]);
    assert_eq!(all_tokens(" end_date = 2"), vec![]);
}

#[test]
fn test_keyword_inside_expression_is_not_a_token() {
    assert_eq!(
        all_tokens(" x = 1 if y else 2\n"),
        vec![TokenKind::Newline]
    );
}

#[test]
fn test_string_wins_over_comment() {
    assert_eq!(
        all_tokens("'a # b' # c"),
        vec![TokenKind::StringLiteral, TokenKind::Comment]
    );
}

#[test]
fn test_comment_excludes_line_break() {
    assert_eq!(
        first_token("# note\nx"),
        Some((TokenKind::Comment, "# note".to_string()))
    );
}

#[test]
fn test_grouping_chars() {
    assert_eq!(
        all_tokens("f([{}])"),
        vec![
            TokenKind::OpenParen,
            TokenKind::OpenParen,
            TokenKind::OpenParen,
            TokenKind::CloseParen,
            TokenKind::CloseParen,
            TokenKind::CloseParen,
        ]
    );
}

#[test]
fn test_end_alone_on_line() {
    assert_eq!(first_token(" end"), Some((TokenKind::End, " end".to_string())));
    assert_eq!(
        first_token(" end %>"),
        Some((TokenKind::End, " end ".to_string()))
    );
    assert_eq!(
        first_token("end # done"),
        Some((TokenKind::End, "end ".to_string()))
    );
}

#[test]
fn test_end_after_semicolon() {
    assert_eq!(
        first_token(" x = 1; end"),
        Some((TokenKind::End, "; end".to_string()))
    );
}

#[test]
fn test_end_followed_by_code_is_not_end() {
    assert_eq!(all_tokens(" end = 3"), vec![]);
    assert_eq!(all_tokens(" ending"), vec![]);
}

#[test]
fn test_block_close_only_at_line_end() {
    assert_eq!(
        first_token("x %>  \n"),
        Some((TokenKind::BlockClose, "%>  ".to_string()))
    );
    assert_eq!(all_tokens("x %> y"), vec![]);
}

#[test]
fn test_crlf_is_one_newline() {
    assert_eq!(
        first_token("x\r\ny"),
        Some((TokenKind::Newline, "\r\n".to_string()))
    );
}

#[test]
fn test_triple_quoted_string_spans_lines() {
    assert_eq!(
        all_tokens("'''a\nb''' x\n"),
        vec![TokenKind::StringLiteral, TokenKind::Newline]
    );
}

#[test]
fn test_string_literal_shapes() {
    assert_eq!(match_string_literal("''", 0, false), Some(2));
    assert_eq!(match_string_literal("''''''", 0, false), Some(6));
    assert_eq!(match_string_literal("'a\\'b'", 0, false), Some(6));
    assert_eq!(match_string_literal("r'\\d'", 0, false), Some(5));
    assert_eq!(match_string_literal("\"\"\"x\"\"\"", 0, false), Some(7));
    assert_eq!(match_string_literal("'unterminated", 0, false), None);
    assert_eq!(match_string_literal("'a\nb'", 0, false), None);
    assert_eq!(match_string_literal("'''a\nb'''", 0, false), None);
    assert_eq!(match_string_literal("'''a\nb'''", 0, true), Some(9));
    assert_eq!(match_string_literal("name", 0, false), None);
}
