//! Malformed templates and parser reuse

use crate::error::StplError;
use crate::template::{SyntaxConfig, TemplateParser};

fn translate_err(src: &str) -> StplError {
    let syntax = SyntaxConfig::default();
    TemplateParser::new(src, &syntax)
        .with_name("page.tpl")
        .translate()
        .unwrap_err()
}

#[test]
fn test_unmatched_end() {
    match translate_err("a\n% end\n") {
        StplError::Syntax {
            template,
            line,
            message,
        } => {
            assert_eq!(template, "page.tpl");
            assert_eq!(line, 2);
            assert!(message.contains("unmatched 'end'"));
        }
        other => panic!("Expected Syntax error, got {:?}", other),
    }
}

#[test]
fn test_extra_end_after_balanced_block() {
    let err = translate_err("% if x:\n% end\n% end\n");
    assert!(err.is_syntax());
}

#[test]
fn test_unterminated_code_block() {
    match translate_err("text\n<% x = 1\ny = 2\n") {
        StplError::Syntax { line, message, .. } => {
            assert_eq!(line, 2);
            assert!(message.contains("unterminated code block"));
        }
        other => panic!("Expected Syntax error, got {:?}", other),
    }
}

#[test]
fn test_empty_inline_expression() {
    match translate_err("line one\n{{ }}") {
        StplError::Syntax { line, .. } => assert_eq!(line, 2),
        other => panic!("Expected Syntax error, got {:?}", other),
    }
}

#[test]
fn test_parser_is_single_use() {
    let syntax = SyntaxConfig::default();
    let mut parser = TemplateParser::new("Hello", &syntax);
    assert!(parser.translate().is_ok());

    let err = parser.translate().unwrap_err();
    assert!(err.is_syntax());
    assert!(err.to_string().contains("already used"));
}

#[test]
fn test_error_message_has_code_prefix() {
    let err = translate_err("% end");
    assert!(err.to_string().starts_with("SYNTAX_ERROR: page.tpl:1:"));
}
