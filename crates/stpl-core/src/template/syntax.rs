//! Delimiter configuration and the two text-mode scanners
//!
//! Text mode looks for two things: the start of a code region (a line-anchored
//! `%` or `<%`) and inline expressions (`{{ ... }}`). Both are plain forward
//! scans over the source; the code tokenizer lives in [`super::lexer`].

use std::fmt;
use std::ops::Range;

use super::lexer::match_string_literal;
use crate::error::{Result, StplError};

/// The five delimiter tokens of a template
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SyntaxConfig {
    pub block_start: String,
    pub block_close: String,
    pub line_start: String,
    pub inline_start: String,
    pub inline_end: String,
}

impl SyntaxConfig {
    /// Parse `"<% %> % {{ }}"`-style syntax strings
    pub fn parse(syntax: &str) -> Result<Self> {
        let tokens: Vec<&str> = syntax.split_whitespace().collect();
        if tokens.len() != 5 {
            return Err(StplError::ConfigInvalidValue {
                field: "engine.syntax".to_string(),
                reason: format!(
                    "expected 5 whitespace-separated tokens, found {} in '{}'",
                    tokens.len(),
                    syntax
                ),
            });
        }
        Ok(Self {
            block_start: tokens[0].to_string(),
            block_close: tokens[1].to_string(),
            line_start: tokens[2].to_string(),
            inline_start: tokens[3].to_string(),
            inline_end: tokens[4].to_string(),
        })
    }
}

impl Default for SyntaxConfig {
    fn default() -> Self {
        Self {
            block_start: "<%".to_string(),
            block_close: "%>".to_string(),
            line_start: "%".to_string(),
            inline_start: "{{".to_string(),
            inline_end: "}}".to_string(),
        }
    }
}

impl fmt::Display for SyntaxConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.block_start, self.block_close, self.line_start, self.inline_start, self.inline_end
        )
    }
}

/// A line-anchored code start found in text mode
///
/// ```text
/// ^[ \t]* (\\)? ( line_start | block_start ) (%)?
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CodeStart {
    /// Start of the physical line (leading blanks included)
    pub start: usize,
    /// End of the leading blanks
    pub indent_end: usize,
    /// Byte range of the marker itself
    pub marker: Range<usize>,
    /// End of the whole match
    pub end: usize,
    /// Marker was preceded by a backslash
    pub escaped: bool,
    /// Marker was followed by a single `%` (legacy escape)
    pub legacy_escape: bool,
    /// Block marker (`<%`) rather than line marker (`%`)
    pub multiline: bool,
}

/// Find the next code start at or after `from`
///
/// `from` itself counts as a line start, as does every position following a
/// line feed.
pub(crate) fn find_code_start(src: &str, from: usize, syntax: &SyntaxConfig) -> Option<CodeStart> {
    let mut line = from;
    while line <= src.len() {
        if let Some(found) = code_start_at(src, line, syntax) {
            return Some(found);
        }
        match src[line..].find('\n') {
            Some(nl) => line += nl + 1,
            None => return None,
        }
    }
    None
}

fn code_start_at(src: &str, line: usize, syntax: &SyntaxConfig) -> Option<CodeStart> {
    let bytes = src.as_bytes();
    let mut pos = line;
    while pos < bytes.len() && (bytes[pos] == b' ' || bytes[pos] == b'\t') {
        pos += 1;
    }
    let indent_end = pos;

    let escaped = bytes.get(pos) == Some(&b'\\') && marker_at(src, pos + 1, syntax).is_some();
    if escaped {
        pos += 1;
    }
    let (marker_len, multiline) = marker_at(src, pos, syntax)?;
    let marker = pos..pos + marker_len;
    let mut end = marker.end;
    let legacy_escape = bytes.get(end) == Some(&b'%');
    if legacy_escape {
        end += 1;
    }

    Some(CodeStart {
        start: line,
        indent_end,
        marker,
        end,
        escaped,
        legacy_escape,
        multiline,
    })
}

/// Line marker is tried before block marker
fn marker_at(src: &str, pos: usize, syntax: &SyntaxConfig) -> Option<(usize, bool)> {
    let rest = src.get(pos..)?;
    if rest.starts_with(&syntax.line_start) {
        Some((syntax.line_start.len(), false))
    } else if rest.starts_with(&syntax.block_start) {
        Some((syntax.block_start.len(), true))
    } else {
        None
    }
}

/// An inline expression `{{ ... }}` inside a literal span
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct InlineMatch {
    pub start: usize,
    pub end: usize,
    /// Text between the markers, untrimmed
    pub content: Range<usize>,
}

/// Find the next inline expression at or after `from`
///
/// The content may contain string literals (which may themselves contain the
/// end marker) but never a raw line break. Matches never overlap.
pub(crate) fn find_inline(text: &str, from: usize, syntax: &SyntaxConfig) -> Option<InlineMatch> {
    let mut search = from;
    while let Some(rel) = text.get(search..)?.find(&syntax.inline_start) {
        let start = search + rel;
        let content_start = start + syntax.inline_start.len();
        if let Some(content_end) = scan_inline_body(text, content_start, &syntax.inline_end) {
            return Some(InlineMatch {
                start,
                end: content_end + syntax.inline_end.len(),
                content: content_start..content_end,
            });
        }
        search = start + next_char_len(text, start);
    }
    None
}

/// Returns the position of the closing marker, or None if the body is malformed
fn scan_inline_body(text: &str, from: usize, inline_end: &str) -> Option<usize> {
    let mut pos = from;
    while pos < text.len() {
        let rest = &text[pos..];
        if rest.starts_with(inline_end) {
            return Some(pos);
        }
        match rest.as_bytes()[0] {
            b'\n' => return None,
            b'\'' | b'"' => pos = match_string_literal(text, pos, false)?,
            _ => pos += next_char_len(text, pos),
        }
    }
    None
}

pub(crate) fn next_char_len(text: &str, pos: usize) -> usize {
    text[pos..].chars().next().map_or(1, char::len_utf8)
}
