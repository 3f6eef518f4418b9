//! Tests for template translation
//!
//! Organized into focused submodules, one per translation stage.

// Test helper functions
mod helpers;

// Tokenizer and literal encoding
mod encode;
mod tokens;

// Inline expressions
mod inline_exprs;

// Translator
mod translate_basic;

// Malformed templates
mod errors;
