//! Shared test helpers for translation tests

use crate::template::{GeneratedCode, SyntaxConfig, TemplateParser};

/// Translate with the default syntax and line-break trimming on
pub(super) fn translate(src: &str) -> GeneratedCode {
    let syntax = SyntaxConfig::default();
    TemplateParser::new(src, &syntax).translate().unwrap()
}

/// Translate and return the generated program text
pub(super) fn generated(src: &str) -> String {
    translate(src).to_string()
}

/// Translate keeping every literal line break
pub(super) fn generated_untrimmed(src: &str) -> String {
    let syntax = SyntaxConfig::default();
    TemplateParser::new(src, &syntax)
        .trim_line_breaks(false)
        .translate()
        .unwrap()
        .to_string()
}
