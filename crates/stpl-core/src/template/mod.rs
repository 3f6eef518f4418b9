//! Template translation: source text → generated code
//!
//! # Syntax
//!
//! - `% code` - a line of code (the marker may be indented)
//! - `<% code ... %>` - a block of code lines
//! - `{{ expr }}` - inline expression, HTML-escaped
//! - `{{! expr }}` - inline expression, raw
//! - `\%` or `%%` at line start - a literal `%` line
//! - `end` - closes the innermost block
//!
//! Delimiters are configurable through [`SyntaxConfig`].

mod encode;
mod inline;
mod lexer;
mod source;
mod syntax;
mod translator;

pub(crate) use encode::encode_str;
pub use source::{Encoding, Source};
pub use syntax::SyntaxConfig;
pub use translator::{CodeLine, GeneratedCode, TemplateParser};

#[cfg(test)]
mod tests;
