//! Tests for the script language
//!
//! Organized into focused submodules, one per compilation stage.

// Test helper functions
mod helpers;

// Tokenizer
mod tokens;
