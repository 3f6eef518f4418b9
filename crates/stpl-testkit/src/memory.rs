//! In-memory host with call accounting

use std::collections::HashMap;
use std::sync::Mutex;

use stpl_core::{Host, HostError};

/// Host serving templates and responses from memory
///
/// Every call is counted so tests can tell cache hits from host reads.
#[derive(Debug, Default)]
pub struct MemoryHost {
    files: Mutex<HashMap<String, String>>,
    responses: Mutex<HashMap<String, String>>,
    calls: Mutex<Vec<String>>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a template file
    pub fn with_file(self, name: &str, text: &str) -> Self {
        self.set_file(name, text);
        self
    }

    /// Add a response for `http_get` or `local_http_get`
    pub fn with_response(self, location: &str, body: &str) -> Self {
        lock(&self.responses).insert(location.to_string(), body.to_string());
        self
    }

    pub fn set_file(&self, name: &str, text: &str) {
        lock(&self.files).insert(name.to_string(), text.to_string());
    }

    pub fn remove_file(&self, name: &str) {
        lock(&self.files).remove(name);
    }

    /// Number of `read_file` calls for `name`
    pub fn reads(&self, name: &str) -> usize {
        let wanted = format!("read_file:{}", name);
        lock(&self.calls).iter().filter(|call| **call == wanted).count()
    }

    /// Every call made so far, as `operation:argument`
    pub fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }

    fn record(&self, operation: &str, argument: &str) {
        lock(&self.calls).push(format!("{}:{}", operation, argument));
    }

    fn response(&self, location: &str) -> Result<String, HostError> {
        lock(&self.responses)
            .get(location)
            .cloned()
            .ok_or_else(|| HostError::Network {
                url: location.to_string(),
                message: "no canned response".to_string(),
            })
    }
}

impl Host for MemoryHost {
    fn read_file(&self, path: &str) -> Result<String, HostError> {
        self.record("read_file", path);
        lock(&self.files)
            .get(path)
            .cloned()
            .ok_or_else(|| HostError::NotFound {
                path: path.to_string(),
            })
    }

    fn http_get(&self, url: &str) -> Result<String, HostError> {
        self.record("http_get", url);
        self.response(url)
    }

    fn local_http_get(&self, uri: &str) -> Result<String, HostError> {
        self.record("local_http_get", uri);
        self.response(uri)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_file_counts_calls() {
        let host = MemoryHost::new().with_file("a.tpl", "A");
        assert_eq!(host.read_file("a.tpl").unwrap(), "A");
        assert_eq!(host.read_file("a.tpl").unwrap(), "A");
        assert_eq!(host.reads("a.tpl"), 2);
        assert_eq!(host.reads("b.tpl"), 0);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let host = MemoryHost::new();
        assert!(matches!(
            host.read_file("nope"),
            Err(HostError::NotFound { path }) if path == "nope"
        ));
    }

    #[test]
    fn test_canned_responses() {
        let host = MemoryHost::new().with_response("/api", "{}");
        assert_eq!(host.local_http_get("/api").unwrap(), "{}");
        assert!(host.http_get("http://elsewhere").is_err());
        assert_eq!(
            host.calls(),
            vec!["local_http_get:/api", "http_get:http://elsewhere"]
        );
    }
}
