use std::collections::BTreeMap;

use crate::value::Value;

/// Reserved helper names, resolved before variables
pub const HELPERS: &[&str] = &[
    "_escape",
    "_str",
    "get",
    "setdefault",
    "defined",
    "include",
    "http_get",
    "local_http_get",
    "html_escape",
];

pub(crate) fn is_helper(name: &str) -> bool {
    HELPERS.contains(&name)
}

/// Variable namespace of one render
///
/// Comprehensions push a scope for their loop variables; everything else
/// writes to the template-level globals.
pub(crate) struct Env {
    globals: BTreeMap<String, Value>,
    scopes: Vec<BTreeMap<String, Value>>,
}

impl Env {
    pub fn new(globals: BTreeMap<String, Value>) -> Self {
        Self {
            globals,
            scopes: Vec::new(),
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
            .or_else(|| self.globals.get(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    pub fn assign(&mut self, name: &str, value: Value) {
        let scope = self.scopes.last_mut().unwrap_or(&mut self.globals);
        scope.insert(name.to_string(), value);
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(BTreeMap::new());
    }

    pub fn pop_scope(&mut self) {
        self.scopes.pop();
    }
}
