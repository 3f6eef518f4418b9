//! Template → generated code translator
//!
//! Two states: literal text and code. Text mode searches for the next
//! line-anchored code start; everything before it is flushed through the
//! inline compiler as one emission line. Code mode drives the tokenizer and
//! rebuilds block structure from keywords and `end` markers.

use std::fmt;

use super::inline::compile_text;
use super::lexer::{TokenKind, Tokenizer};
use super::syntax::{find_code_start, CodeStart, SyntaxConfig};
use crate::config::consts::{codegen::INDENT_UNIT, ANONYMOUS_TEMPLATE};
use crate::error::{Result, StplError};

/// One line of generated code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeLine {
    pub indent: usize,
    /// Trimmed code text; may span several physical lines
    pub code: String,
    pub comment: String,
    /// Template line the code originates from (1-based)
    pub line: usize,
}

/// Output of a translation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedCode {
    pub lines: Vec<CodeLine>,
}

impl fmt::Display for GeneratedCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(
                f,
                "{}{}{}",
                INDENT_UNIT.repeat(line.indent),
                line.code,
                line.comment
            )?;
        }
        Ok(())
    }
}

/// Single-use translator over one template source
pub struct TemplateParser<'a> {
    source: &'a str,
    syntax: &'a SyntaxConfig,
    name: String,
    trim_line_breaks: bool,

    offset: usize,
    lineno: usize,
    indent: usize,
    indent_mod: isize,
    paren_depth: usize,

    code_buffer: Vec<CodeLine>,
    text_buffer: String,
    text_line: usize,
    used: bool,
}

impl<'a> TemplateParser<'a> {
    pub fn new(source: &'a str, syntax: &'a SyntaxConfig) -> Self {
        Self {
            source,
            syntax,
            name: ANONYMOUS_TEMPLATE.to_string(),
            trim_line_breaks: true,
            offset: 0,
            lineno: 1,
            indent: 0,
            indent_mod: 0,
            paren_depth: 0,
            code_buffer: Vec::new(),
            text_buffer: String::new(),
            text_line: 1,
            used: false,
        }
    }

    /// Template name used in error messages
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Drop the line break ending a literal span that precedes a code start
    pub fn trim_line_breaks(mut self, enabled: bool) -> Self {
        self.trim_line_breaks = enabled;
        self
    }

    /// Translate the whole source
    ///
    /// A parser instance can only be used once; a second call fails with a
    /// syntax error.
    pub fn translate(&mut self) -> Result<GeneratedCode> {
        if self.used {
            return Err(StplError::syntax(
                &self.name,
                self.lineno,
                "parser is a one-time instance and was already used",
            ));
        }
        self.used = true;

        while let Some(start) = find_code_start(self.source, self.offset, self.syntax) {
            self.push_text(start.start);
            if start.escaped || start.legacy_escape {
                self.push_escaped_line(&start);
                continue;
            }

            if self.trim_line_breaks {
                self.trim_trailing_line_break();
            }
            self.flush_text()?;
            self.advance(start.end);
            self.read_code(start.multiline)?;
        }

        self.push_text(self.source.len());
        self.flush_text()?;
        Ok(GeneratedCode {
            lines: std::mem::take(&mut self.code_buffer),
        })
    }

    /// Move the scan offset forward, counting consumed line breaks
    fn advance(&mut self, to: usize) {
        self.lineno += self.source[self.offset..to].matches('\n').count();
        self.offset = to;
    }

    fn push_text(&mut self, to: usize) {
        if to <= self.offset {
            return;
        }
        if self.text_buffer.is_empty() {
            self.text_line = self.lineno;
        }
        self.text_buffer.push_str(&self.source[self.offset..to]);
        self.advance(to);
    }

    /// An escaped marker and the rest of its line are literal text
    fn push_escaped_line(&mut self, start: &CodeStart) {
        let line_end = self.source[start.end..]
            .find('\n')
            .map_or(self.source.len(), |i| start.end + i + 1);

        if self.text_buffer.is_empty() {
            self.text_line = self.lineno;
        }
        self.text_buffer
            .push_str(&self.source[start.start..start.indent_end]);
        if start.escaped {
            // `\%` keeps the marker and a following `%`
            self.text_buffer
                .push_str(&self.source[start.marker.start..line_end]);
        } else {
            // `%%` collapses to a single marker
            self.text_buffer.push_str(&self.source[start.marker.clone()]);
            self.text_buffer.push_str(&self.source[start.end..line_end]);
        }
        self.advance(line_end);
    }

    fn trim_trailing_line_break(&mut self) {
        if self.text_buffer.ends_with("\r\n") {
            self.text_buffer.truncate(self.text_buffer.len() - 2);
        } else if self.text_buffer.ends_with('\n') {
            self.text_buffer.truncate(self.text_buffer.len() - 1);
        }
    }

    /// Compile pending literal text into one emission line
    fn flush_text(&mut self) -> Result<()> {
        if self.text_buffer.is_empty() {
            return Ok(());
        }
        let text = std::mem::take(&mut self.text_buffer);
        let code = compile_text(&text, self.indent, self.syntax).map_err(|err| {
            StplError::syntax(&self.name, self.text_line + err.line_offset, err.message)
        })?;
        self.write_code(code, String::new(), self.text_line);
        Ok(())
    }

    fn read_code(&mut self, mut multiline: bool) -> Result<()> {
        let tokenizer = Tokenizer::new(self.source, self.syntax);
        let opened_at = self.lineno;
        let mut code_line = String::new();
        let mut comment = String::new();
        let mut line_begin = self.offset;
        let mut code_lineno = self.lineno;

        loop {
            let Some(token) = tokenizer.next_token(self.offset, line_begin) else {
                if multiline {
                    return Err(StplError::syntax(
                        &self.name,
                        opened_at,
                        format!("unterminated code block, missing '{}'", self.syntax.block_close),
                    ));
                }
                code_line.push_str(&self.source[self.offset..]);
                self.advance(self.source.len());
                self.write_code(code_line.trim().to_string(), comment, code_lineno);
                break;
            };

            code_line.push_str(&self.source[self.offset..token.start]);
            self.advance(token.end);

            let keyword = matches!(token.kind, TokenKind::BlockStart | TokenKind::BlockContinue);
            if keyword && (!code_line.is_empty() || self.paren_depth > 0) {
                // `a if b else c`
                code_line.push_str(token.text);
                continue;
            }

            match token.kind {
                TokenKind::StringLiteral => code_line.push_str(token.text),
                TokenKind::Comment => {
                    comment = token.text.to_string();
                    if multiline && comment.trim().ends_with(&self.syntax.block_close) {
                        multiline = false;
                    }
                }
                TokenKind::OpenParen => {
                    self.paren_depth += 1;
                    code_line.push_str(token.text);
                }
                TokenKind::CloseParen => {
                    self.paren_depth = self.paren_depth.saturating_sub(1);
                    code_line.push_str(token.text);
                }
                TokenKind::BlockStart => {
                    code_line = token.text.to_string();
                    self.indent_mod = -1;
                    self.indent += 1;
                }
                TokenKind::BlockContinue => {
                    code_line = token.text.to_string();
                    self.indent_mod = -1;
                }
                TokenKind::End => {
                    if self.indent == 0 {
                        return Err(StplError::syntax(
                            &self.name,
                            code_lineno,
                            "unmatched 'end'",
                        ));
                    }
                    self.indent -= 1;
                }
                TokenKind::BlockClose => {
                    if multiline {
                        multiline = false;
                    } else {
                        code_line.push_str(token.text);
                    }
                }
                TokenKind::Newline => {
                    line_begin = token.end;
                    if self.paren_depth > 0 {
                        code_line.push('\n');
                        continue;
                    }
                    self.write_code(
                        code_line.trim().to_string(),
                        std::mem::take(&mut comment),
                        code_lineno,
                    );
                    code_line.clear();
                    self.indent_mod = 0;
                    code_lineno = self.lineno;
                    if !multiline {
                        break;
                    }
                }
            }
        }

        self.indent_mod = 0;
        Ok(())
    }

    fn write_code(&mut self, code: String, comment: String, line: usize) {
        if code.is_empty() && comment.is_empty() {
            return;
        }
        let indent = (self.indent as isize + self.indent_mod).max(0) as usize;
        self.code_buffer.push(CodeLine {
            indent,
            code,
            comment,
            line,
        });
    }
}
