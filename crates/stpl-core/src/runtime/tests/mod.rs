//! Tests for program execution
//!
//! Organized into focused submodules by language area.

// Test helper functions
mod helpers;

// Expressions and operators
mod expressions;



// Reserved helpers and host calls
mod reserved;
