//! Shared test helpers for engine tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::host::{Host, HostError};

/// Host serving templates from a map and counting reads
#[derive(Default)]
pub(super) struct MapHost {
    files: Mutex<HashMap<String, String>>,
    reads: AtomicUsize,
}

impl MapHost {
    pub fn with_files(files: &[(&str, &str)]) -> Arc<Self> {
        let host = Self::default();
        for (name, text) in files {
            host.set(name, text);
        }
        Arc::new(host)
    }

    pub fn set(&self, name: &str, text: &str) {
        self.files
            .lock()
            .unwrap()
            .insert(name.to_string(), text.to_string());
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl Host for MapHost {
    fn read_file(&self, path: &str) -> Result<String, HostError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| HostError::NotFound {
                path: path.to_string(),
            })
    }

    fn http_get(&self, url: &str) -> Result<String, HostError> {
        Ok(format!("remote:{}", url))
    }

    fn local_http_get(&self, uri: &str) -> Result<String, HostError> {
        Ok(format!("local:{}", uri))
    }
}

/// Engine over `host` with the default configuration
pub(super) fn engine_with(host: Arc<MapHost>) -> Engine {
    Engine::new(EngineConfig::default(), host).unwrap()
}

/// Engine without any host files
pub(super) fn engine() -> Engine {
    engine_with(MapHost::with_files(&[]))
}
