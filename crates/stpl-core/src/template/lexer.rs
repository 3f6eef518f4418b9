//! Tokenizer for code regions
//!
//! At every scan position the token categories are tried in a fixed order and
//! the first one that matches wins:
//!
//! 1. string literal (`'..'`, `".."`, triple quoted, optional `r`/`b`/`u` prefix)
//! 2. comment (`#` up to, not including, the line break)
//! 3. open grouping char `( [ {`
//! 4. close grouping char `) ] }`
//! 5. block-start keyword (`if for while with try def class`), line start only
//! 6. block-continue keyword (`elif else except finally`), line start only
//! 7. `end`, alone on its line or after `;`
//! 8. block-close marker at end of line
//! 9. line break
//!
//! Everything between two tokens is raw code text.

use super::syntax::{next_char_len, SyntaxConfig};

const BLOCK_START_KEYWORDS: [&str; 7] = ["if", "for", "while", "with", "try", "def", "class"];
const BLOCK_CONTINUE_KEYWORDS: [&str; 4] = ["elif", "else", "except", "finally"];

/// Token classification, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    StringLiteral,
    Comment,
    OpenParen,
    CloseParen,
    BlockStart,
    BlockContinue,
    End,
    BlockClose,
    Newline,
}

/// A single token with its byte span
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token<'a> {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
    pub text: &'a str,
}

/// Ordered-alternation tokenizer over a template source
pub(crate) struct Tokenizer<'a> {
    src: &'a str,
    syntax: &'a SyntaxConfig,
}

impl<'a> Tokenizer<'a> {
    pub fn new(src: &'a str, syntax: &'a SyntaxConfig) -> Self {
        Self { src, syntax }
    }

    /// Find the next token at or after `from`
    ///
    /// `line_begin` is where the current logical line starts; keywords and
    /// `end` are only recognised when anchored there.
    pub fn next_token(&self, from: usize, line_begin: usize) -> Option<Token<'a>> {
        let mut pos = from;
        while pos < self.src.len() {
            if let Some((kind, end)) = self.match_at(pos, pos == line_begin) {
                return Some(Token {
                    kind,
                    start: pos,
                    end,
                    text: &self.src[pos..end],
                });
            }
            pos += next_char_len(self.src, pos);
        }
        None
    }

    fn match_at(&self, pos: usize, at_line_start: bool) -> Option<(TokenKind, usize)> {
        let bytes = self.src.as_bytes();

        if let Some(end) = match_string_literal(self.src, pos, true) {
            return Some((TokenKind::StringLiteral, end));
        }
        match bytes[pos] {
            b'#' => {
                let end = self.src[pos..].find('\n').map_or(self.src.len(), |i| pos + i);
                return Some((TokenKind::Comment, end));
            }
            b'(' | b'[' | b'{' => return Some((TokenKind::OpenParen, pos + 1)),
            b')' | b']' | b'}' => return Some((TokenKind::CloseParen, pos + 1)),
            _ => {}
        }
        if at_line_start {
            if let Some(end) = self.match_keyword(pos, &BLOCK_START_KEYWORDS) {
                return Some((TokenKind::BlockStart, end));
            }
            if let Some(end) = self.match_keyword(pos, &BLOCK_CONTINUE_KEYWORDS) {
                return Some((TokenKind::BlockContinue, end));
            }
        }
        if at_line_start || bytes[pos] == b';' {
            if let Some(end) = self.match_end(pos, at_line_start) {
                return Some((TokenKind::End, end));
            }
        }
        if let Some(end) = self.match_block_close(pos) {
            return Some((TokenKind::BlockClose, end));
        }
        if self.src[pos..].starts_with("\r\n") {
            return Some((TokenKind::Newline, pos + 2));
        }
        if bytes[pos] == b'\n' {
            return Some((TokenKind::Newline, pos + 1));
        }
        None
    }

    /// `[ \t]*keyword\b`
    fn match_keyword(&self, pos: usize, keywords: &[&str]) -> Option<usize> {
        let word = skip_blanks(self.src, pos);
        keywords.iter().find_map(|keyword| {
            let end = word + keyword.len();
            (self.src[word..].starts_with(keyword) && !is_word_byte(self.src.as_bytes().get(end)))
                .then_some(end)
        })
    }

    /// `(^|;)[ \t]*end[ \t]*` followed by `(block_close[ \t]*)?` end of line, `;` or `#`
    fn match_end(&self, pos: usize, at_line_start: bool) -> Option<usize> {
        let mut word = pos;
        if !at_line_start || self.src.as_bytes()[pos] == b';' {
            word += 1;
        }
        let word = skip_blanks(self.src, word);
        if !self.src[word..].starts_with("end") {
            return None;
        }
        let end = skip_blanks(self.src, word + 3);
        let rest = &self.src[end..];
        let closes_block = rest.starts_with(&self.syntax.block_close)
            && is_line_end(self.src, skip_blanks(self.src, end + self.syntax.block_close.len()));
        if closes_block || is_line_end(self.src, end) || rest.starts_with(';') || rest.starts_with('#')
        {
            Some(end)
        } else {
            None
        }
    }

    /// `block_close[ \t]*` followed by end of line
    fn match_block_close(&self, pos: usize) -> Option<usize> {
        if !self.src[pos..].starts_with(&self.syntax.block_close) {
            return None;
        }
        let end = skip_blanks(self.src, pos + self.syntax.block_close.len());
        is_line_end(self.src, end).then_some(end)
    }
}

/// Match a string literal starting at `pos`, returning its end
///
/// Accepts an optional one or two letter `r`/`b`/`u` prefix, empty strings,
/// single and double quoted strings with backslash escapes, and triple quoted
/// strings. Only triple quoted strings may span lines, and only when
/// `allow_newlines` is set.
pub(crate) fn match_string_literal(src: &str, pos: usize, allow_newlines: bool) -> Option<usize> {
    let bytes = src.as_bytes();
    let mut quote_pos = pos;
    while quote_pos < pos + 2 && bytes.get(quote_pos).is_some_and(|b| is_prefix_letter(*b)) {
        quote_pos += 1;
    }
    let quote = *bytes.get(quote_pos)?;
    if quote != b'\'' && quote != b'"' {
        return None;
    }

    let triple = [quote; 3];
    if bytes[quote_pos..].starts_with(&triple) {
        let body = quote_pos + 3;
        if bytes[body..].starts_with(&triple) {
            return Some(body + 3);
        }
        if let Some(end) = scan_quoted(bytes, body, &triple, allow_newlines) {
            return Some(end);
        }
    }
    if bytes.get(quote_pos + 1) == Some(&quote) {
        // `''` but not the start of `'''`
        return (bytes.get(quote_pos + 2) != Some(&quote)).then_some(quote_pos + 2);
    }
    scan_quoted(bytes, quote_pos + 1, &[quote], false)
}

fn scan_quoted(bytes: &[u8], mut pos: usize, closing: &[u8], allow_newlines: bool) -> Option<usize> {
    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' => {
                if bytes.get(pos + 1) == Some(&b'\n') && !allow_newlines {
                    return None;
                }
                pos += 2;
            }
            b'\n' if !allow_newlines => return None,
            _ if bytes[pos..].starts_with(closing) => return Some(pos + closing.len()),
            _ => pos += 1,
        }
    }
    None
}

fn is_prefix_letter(b: u8) -> bool {
    matches!(b, b'r' | b'R' | b'b' | b'B' | b'u' | b'U')
}

fn is_word_byte(b: Option<&u8>) -> bool {
    b.is_some_and(|b| b.is_ascii_alphanumeric() || *b == b'_' || *b >= 0x80)
}

fn skip_blanks(src: &str, mut pos: usize) -> usize {
    let bytes = src.as_bytes();
    while pos < bytes.len() && (bytes[pos] == b' ' || bytes[pos] == b'\t') {
        pos += 1;
    }
    pos
}

/// `\r?$` in multi-line mode
fn is_line_end(src: &str, pos: usize) -> bool {
    let rest = &src[pos..];
    rest.is_empty() || rest.starts_with('\n') || rest.starts_with("\r\n")
}
