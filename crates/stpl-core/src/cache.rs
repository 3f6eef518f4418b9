//! Compiled-artifact cache
//!
//! One live artifact per template name. Artifacts are shared as `Arc` and
//! never mutated after insertion; a racing compile of the same name replaces
//! the entry wholesale (last write wins).

use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

use crate::artifact::CompiledArtifact;
use crate::error::Result;

#[derive(Debug, Default)]
pub struct ArtifactCache {
    entries: DashMap<String, Arc<CompiledArtifact>>,
}

impl ArtifactCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<Arc<CompiledArtifact>> {
        let found = self.entries.get(name).map(|entry| Arc::clone(entry.value()));
        debug!(template = name, hit = found.is_some(), "artifact cache lookup");
        found
    }

    pub fn insert(&self, artifact: CompiledArtifact) -> Arc<CompiledArtifact> {
        let artifact = Arc::new(artifact);
        debug!(template = %artifact.name, "artifact cached");
        self.entries
            .insert(artifact.name.clone(), Arc::clone(&artifact));
        artifact
    }

    /// Cached artifact for `name`, or the result of `compile` stored under it
    ///
    /// `compile` runs without holding any lock, so two threads missing the
    /// same name may both compile; the later insert wins.
    pub fn get_or_try_insert_with<F>(&self, name: &str, compile: F) -> Result<Arc<CompiledArtifact>>
    where
        F: FnOnce() -> Result<CompiledArtifact>,
    {
        if let Some(artifact) = self.get(name) {
            return Ok(artifact);
        }
        let artifact = compile()?;
        Ok(self.insert(artifact))
    }

    /// Remove `name`; reports whether it was cached
    pub fn invalidate(&self, name: &str) -> bool {
        let removed = self.entries.remove(name).is_some();
        if removed {
            debug!(template = name, "artifact invalidated");
        }
        removed
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact;
    use crate::template::{Source, SyntaxConfig};

    fn compiled(name: &str, text: &str) -> CompiledArtifact {
        artifact::compile(name, &Source::new(text), &SyntaxConfig::default(), true).unwrap()
    }

    #[test]
    fn test_insert_and_get() {
        let cache = ArtifactCache::new();
        assert!(cache.get("a").is_none());
        cache.insert(compiled("a", "hello"));
        assert_eq!(cache.get("a").unwrap().name, "a");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_invalidate_reports_presence() {
        let cache = ArtifactCache::new();
        cache.insert(compiled("a", "hello"));
        assert!(cache.invalidate("a"));
        assert!(!cache.invalidate("a"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_get_or_try_insert_with_compiles_once() {
        let cache = ArtifactCache::new();
        let mut calls = 0;
        cache
            .get_or_try_insert_with("a", || {
                calls += 1;
                Ok(compiled("a", "first"))
            })
            .unwrap();
        let artifact = cache
            .get_or_try_insert_with("a", || {
                calls += 1;
                Ok(compiled("a", "second"))
            })
            .unwrap();
        assert_eq!(calls, 1);
        assert!(artifact.code.contains("first"));
    }

    #[test]
    fn test_failed_compile_leaves_no_entry() {
        let cache = ArtifactCache::new();
        let result = cache.get_or_try_insert_with("bad", || {
            artifact::compile("bad", &Source::new("% end\n"), &SyntaxConfig::default(), true)
        });
        assert!(result.is_err());
        assert!(!cache.contains("bad"));
    }

    #[test]
    fn test_replacing_entry_keeps_old_arc_intact() {
        let cache = ArtifactCache::new();
        let old = cache.insert(compiled("a", "old"));
        cache.insert(compiled("a", "new"));
        assert!(old.code.contains("old"));
        assert!(cache.get("a").unwrap().code.contains("new"));
    }
}
