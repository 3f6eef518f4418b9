//! Inline expression compiler
//!
//! Turns a flushed literal span into a single emission call:
//!
//! ```text
//! Hello {{name}}!\n   →   _printlist(('Hello ', _escape(name), '!\n',))
//! ```

use super::encode::encode_lines;
use super::syntax::{find_inline, SyntaxConfig};
use crate::config::consts::codegen::{
    ESCAPE_FN, INDENT_UNIT, PRINTLIST, STR_FN, UNESCAPE_SIGIL,
};

/// Failure while compiling an inline expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct InlineError {
    /// Line offset of the bad expression within the span
    pub line_offset: usize,
    pub message: String,
}

/// Build the emission call for `text` at indentation level `indent`
pub(crate) fn compile_text(
    text: &str,
    indent: usize,
    syntax: &SyntaxConfig,
) -> Result<String, InlineError> {
    let nl = format!("\\\n{}", INDENT_UNIT.repeat(indent));
    let mut parts: Vec<String> = Vec::new();
    let mut pos = 0;

    while let Some(found) = find_inline(text, pos, syntax) {
        let prefix = &text[pos..found.start];
        pos = found.end;
        if !prefix.is_empty() {
            parts.push(encode_lines(prefix, &nl));
            if prefix.ends_with('\n') {
                if let Some(last) = parts.last_mut() {
                    last.push_str(&nl);
                }
            }
        }

        let chunk = text[found.content.clone()].trim();
        let expr = compile_expr(chunk).ok_or_else(|| InlineError {
            line_offset: text[..found.start].matches('\n').count(),
            message: format!(
                "empty inline expression '{}{}'",
                syntax.inline_start, syntax.inline_end
            ),
        })?;
        parts.push(expr);
    }

    if pos < text.len() {
        parts.push(encode_lines(trim_line_join(&text[pos..]), &nl));
    }

    Ok(format!("{}(({},))", PRINTLIST, parts.join(", ")))
}

/// `!expr` → `_str(expr)`, otherwise `_escape(expr)`
fn compile_expr(chunk: &str) -> Option<String> {
    let first = chunk.chars().next()?;
    if first == UNESCAPE_SIGIL {
        Some(format!("{}({})", STR_FN, &chunk[first.len_utf8()..]))
    } else {
        Some(format!("{}({})", ESCAPE_FN, chunk))
    }
}

/// A trailing `\\` line break joins the span with whatever follows
fn trim_line_join(tail: &str) -> &str {
    tail.strip_suffix("\\\\\n")
        .or_else(|| tail.strip_suffix("\\\\\r\n"))
        .unwrap_or(tail)
}
