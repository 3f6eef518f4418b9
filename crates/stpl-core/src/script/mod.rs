//! Script language compiled from generated code
//!
//! Each generated code line is tokenized and parsed on its own; the
//! indentation written by the translator then nests the parsed lines into
//! blocks. Emission calls become [`Instruction::Emit`] with literal and
//! expression fragments.

pub mod ast;
mod parser;
mod program;
mod token;

pub use program::{Block, Clause, Conversion, Fragment, Instruction, Program};

use crate::error::{Result, StplError};
use crate::template::GeneratedCode;
use program::IndentedLine;

/// Compile generated code into an instruction program
pub fn compile(code: &GeneratedCode, template: &str) -> Result<Program> {
    let mut lines = Vec::with_capacity(code.lines.len());
    for code_line in &code.lines {
        let tokens = token::tokenize(&code_line.code).map_err(|err| {
            StplError::syntax(template, code_line.line + err.line, err.message)
        })?;
        if tokens.is_empty() {
            continue;
        }
        let parsed = parser::parse_line(&tokens).map_err(|err| {
            StplError::syntax(template, code_line.line + err.line, err.message)
        })?;
        lines.push(IndentedLine {
            indent: code_line.indent,
            line: code_line.line,
            parsed,
        });
    }
    program::build(template, lines)
}

#[cfg(test)]
mod tests;
