//! Literal text → string constants for generated code

use std::fmt::Write;

/// Encode `text` as a quoted string constant
///
/// Single quotes are used unless the text contains a single quote and no
/// double quote. Backslashes, the chosen quote and control characters are
/// escaped so the constant always fits on one generated line.
pub(crate) fn encode_str(text: &str) -> String {
    let quote = if text.contains('\'') && !text.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(text.len() + 2);
    out.push(quote);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || ('\u{7f}'..='\u{a0}').contains(&c) => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// Encode a multi-line literal as adjacent constants, one per source line
///
/// Constants are joined with `nl`, a line continuation followed by the
/// indentation of the surrounding code, so the result stays a single
/// expression.
pub(crate) fn encode_lines(text: &str, nl: &str) -> String {
    if text.is_empty() {
        return encode_str("");
    }
    text.split_inclusive('\n')
        .map(encode_str)
        .collect::<Vec<_>>()
        .join(nl)
}
