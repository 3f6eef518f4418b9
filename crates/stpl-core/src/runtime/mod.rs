//! Tree-walking interpreter for compiled programs
//!
//! A program runs against a flat variable namespace seeded by the caller.
//! Reserved helpers (`_escape`, `_str`, `get`, `setdefault`, `defined`,
//! `include`, `http_get`, `local_http_get`, `html_escape`) are resolved
//! before variables; builtins after them.

mod args;
mod builtins;
mod env;
mod interp;
mod methods;
mod ops;

use std::collections::BTreeMap;

use crate::error::{Result, RuntimeErrorKind, StplError};
use crate::host::HostError;
use crate::script::Program;
use crate::value::Value;

pub use env::HELPERS;

/// Services a running program reaches through its helpers
pub(crate) trait Resolver {
    /// Render another template with its own arguments
    fn include(
        &self,
        name: &str,
        args: BTreeMap<String, Value>,
    ) -> std::result::Result<String, IncludeFailure>;

    fn http_get(&self, url: &str) -> std::result::Result<String, HostError>;

    fn local_http_get(&self, uri: &str) -> std::result::Result<String, HostError>;
}

/// Why an `include` call produced no output
#[derive(Debug)]
pub(crate) enum IncludeFailure {
    /// Failure attributed to the calling line
    Kind(RuntimeErrorKind),
    /// Failure inside the included template, surfaced unchanged
    Child(StplError),
}

impl From<HostError> for IncludeFailure {
    fn from(err: HostError) -> Self {
        IncludeFailure::Kind(RuntimeErrorKind::Host(err))
    }
}

/// Run `program` and return the joined output
pub(crate) fn execute(
    program: &Program,
    template: &str,
    vars: BTreeMap<String, Value>,
    autoescape: bool,
    resolver: &dyn Resolver,
) -> Result<String> {
    let mut interpreter = interp::Interpreter::new(template, autoescape, resolver, vars);
    interpreter.run(&program.body)?;
    Ok(interpreter.into_output())
}

#[cfg(test)]
mod tests;
