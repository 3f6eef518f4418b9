//! Unit tests for literal encoding

use crate::template::encode::{encode_lines, encode_str};

#[test]
fn test_plain_text_uses_single_quotes() {
    assert_eq!(encode_str("Hello"), "'Hello'");
    assert_eq!(encode_str(""), "''");
}

#[test]
fn test_apostrophe_switches_to_double_quotes() {
    assert_eq!(encode_str("it's"), "\"it's\"");
}

#[test]
fn test_both_quotes_escape_single() {
    assert_eq!(encode_str("a'b\"c"), "'a\\'b\"c'");
}

#[test]
fn test_control_characters_escaped() {
    assert_eq!(encode_str("a\tb\r\n"), "'a\\tb\\r\\n'");
    assert_eq!(encode_str("\u{1}"), "'\\x01'");
    assert_eq!(encode_str("back\\slash"), "'back\\\\slash'");
}

#[test]
fn test_unicode_kept_verbatim() {
    assert_eq!(encode_str("héllo ✓"), "'héllo ✓'");
}

#[test]
fn test_lines_joined_with_continuation() {
    assert_eq!(encode_lines("a\nb\n", " + "), "'a\\n' + 'b\\n'");
    assert_eq!(encode_lines("single", " + "), "'single'");
    assert_eq!(encode_lines("", " + "), "''");
}
