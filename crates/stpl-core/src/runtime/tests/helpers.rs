//! Shared test helpers for runtime tests

use std::collections::BTreeMap;

use crate::error::{Result, StplError};
use crate::host::HostError;
use crate::runtime::{execute, IncludeFailure, Resolver};
use crate::script::compile;
use crate::template::{SyntaxConfig, TemplateParser};
use crate::value::Value;

/// Resolver with canned answers
///
/// `include` echoes its arguments; the names `missing` and `broken` fail.
/// `http_get` fails for URLs containing `down`.
pub(super) struct StubResolver;

impl Resolver for StubResolver {
    fn include(
        &self,
        name: &str,
        args: BTreeMap<String, Value>,
    ) -> std::result::Result<String, IncludeFailure> {
        match name {
            "missing" => Err(HostError::NotFound {
                path: name.to_string(),
            }
            .into()),
            "broken" => Err(IncludeFailure::Child(StplError::Syntax {
                template: "broken".to_string(),
                line: 4,
                message: "boom".to_string(),
            })),
            _ => {
                let args: Vec<String> = args.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
                Ok(format!("[{} {}]", name, args.join(" ")))
            }
        }
    }

    fn http_get(&self, url: &str) -> std::result::Result<String, HostError> {
        if url.contains("down") {
            return Err(HostError::Network {
                url: url.to_string(),
                message: "connection refused".to_string(),
            });
        }
        Ok(format!("GET {}", url))
    }

    fn local_http_get(&self, uri: &str) -> std::result::Result<String, HostError> {
        Ok(format!("LOCAL {}", uri))
    }
}

fn run(src: &str, vars: &[(&str, Value)], autoescape: bool) -> Result<String> {
    let syntax = SyntaxConfig::default();
    let code = TemplateParser::new(src, &syntax)
        .with_name("page.tpl")
        .translate()?;
    let program = compile(&code, "page.tpl")?;
    let vars = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect();
    execute(&program, "page.tpl", vars, autoescape, &StubResolver)
}

/// Render without variables
pub(super) fn render(src: &str) -> String {
    run(src, &[], true).unwrap()
}

pub(super) fn render_with(src: &str, vars: &[(&str, Value)]) -> String {
    run(src, vars, true).unwrap()
}

/// Render with the escaped and raw converters swapped
pub(super) fn render_noescape(src: &str) -> String {
    run(src, &[], false).unwrap()
}

pub(super) fn render_err(src: &str) -> StplError {
    run(src, &[], true).unwrap_err()
}

pub(super) fn render_err_with(src: &str, vars: &[(&str, Value)]) -> StplError {
    run(src, vars, true).unwrap_err()
}

/// Map value from key/value pairs
pub(super) fn map(pairs: &[(&str, Value)]) -> Value {
    Value::Map(
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect(),
    )
}
