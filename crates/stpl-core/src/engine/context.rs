use std::collections::BTreeMap;

use crate::error::{Result, StplError};
use crate::value::Value;

/// Variables supplied to one render call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateContext {
    vars: BTreeMap<String, Value>,
}

impl TemplateContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one variable
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.vars.insert(name.into(), value.into());
    }

    /// Context from a TOML table
    pub fn from_toml(table: toml::Table) -> Self {
        Self {
            vars: table
                .into_iter()
                .map(|(k, v)| (k, Value::from(v)))
                .collect(),
        }
    }

    /// Context from a JSON object string
    pub fn from_json(json: &str) -> Result<Self> {
        match serde_json::from_str::<serde_json::Value>(json)? {
            serde_json::Value::Object(map) => Ok(Self {
                vars: map.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
            }),
            other => Err(StplError::InvalidArguments(format!(
                "template arguments must be a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    pub fn vars(&self) -> &BTreeMap<String, Value> {
        &self.vars
    }

    pub fn into_vars(self) -> BTreeMap<String, Value> {
        self.vars
    }
}

impl From<BTreeMap<String, Value>> for TemplateContext {
    fn from(vars: BTreeMap<String, Value>) -> Self {
        Self { vars }
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
