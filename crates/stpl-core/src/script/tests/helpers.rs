//! Shared test helpers for script tests

use crate::error::Result;
use crate::script::ast::Line;
use crate::script::{compile, parser, token, Program};
use crate::template::{SyntaxConfig, TemplateParser};

/// Parse one generated code line
pub(super) fn parse(code: &str) -> Line {
    let tokens = token::tokenize(code).unwrap();
    parser::parse_line(&tokens).unwrap()
}

/// Parse one generated code line, returning the error message
pub(super) fn parse_err(code: &str) -> String {
    let tokens = token::tokenize(code).unwrap();
    parser::parse_line(&tokens).unwrap_err().message
}

/// Translate a template and compile it into a program
pub(super) fn program(src: &str) -> Result<Program> {
    let syntax = SyntaxConfig::default();
    let code = TemplateParser::new(src, &syntax)
        .with_name("page.tpl")
        .translate()?;
    compile(&code, "page.tpl")
}
