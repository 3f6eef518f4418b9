use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::warn;

use super::{debug_mode, Engine};
use crate::artifact::{self, CompiledArtifact};
use crate::error::RuntimeErrorKind;
use crate::host::HostError;
use crate::runtime::{IncludeFailure, Resolver};
use crate::template::Source;
use crate::value::Value;

/// Helper services for one (possibly nested) render
pub(super) struct RenderScope<'e> {
    engine: &'e Engine,
    depth: usize,
}

impl<'e> RenderScope<'e> {
    pub fn new(engine: &'e Engine, depth: usize) -> Self {
        Self { engine, depth }
    }

    /// Artifact for an included template, reading it through the host when needed
    fn included_artifact(&self, name: &str) -> Result<Arc<CompiledArtifact>, IncludeFailure> {
        let engine = self.engine;
        if !debug_mode() {
            if let Some(artifact) = engine.cache.get(name) {
                return Ok(artifact);
            }
        } else {
            engine.cache.invalidate(name);
        }

        let text = engine.host.read_file(name).map_err(|err| {
            warn!(template = name, "{}", err);
            err
        })?;
        let compiled = artifact::compile(
            name,
            &Source::new(text),
            &engine.syntax,
            engine.config.trim_line_breaks,
        )
        .map_err(IncludeFailure::Child)?;
        Ok(engine.cache.insert(compiled))
    }
}

impl Resolver for RenderScope<'_> {
    fn include(
        &self,
        name: &str,
        args: BTreeMap<String, Value>,
    ) -> Result<String, IncludeFailure> {
        let limit = self.engine.config.max_include_depth;
        if self.depth >= limit {
            warn!(template = name, depth = self.depth, "include depth limit reached");
            return Err(IncludeFailure::Kind(RuntimeErrorKind::IncludeDepth(limit)));
        }
        let artifact = self.included_artifact(name)?;
        self.engine
            .execute(&artifact, args, self.depth + 1)
            .map_err(IncludeFailure::Child)
    }

    fn http_get(&self, url: &str) -> Result<String, HostError> {
        self.engine.host.http_get(url)
    }

    fn local_http_get(&self, uri: &str) -> Result<String, HostError> {
        self.engine.host.local_http_get(uri)
    }
}
