//! Render entry points
//!
//! [`Engine`] ties the pieces together: it compiles sources through the
//! [`ArtifactCache`], seeds the execution namespace with template defaults
//! and caller arguments, and resolves `include` and fetch helpers through
//! its [`Host`].

mod context;
mod resolve;

pub use context::TemplateContext;

use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

use crate::artifact::{self, CompiledArtifact};
use crate::cache::ArtifactCache;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::host::Host;
use crate::runtime;
use crate::template::{Source, SyntaxConfig};
use crate::value::Value;
use resolve::RenderScope;

static DEBUG_MODE: AtomicBool = AtomicBool::new(false);

/// Process-wide debug toggle
///
/// While enabled, every render recompiles its template and every `include`
/// re-reads its source from the host. Error behaviour is unchanged.
pub fn set_debug_mode(enabled: bool) {
    DEBUG_MODE.store(enabled, Ordering::SeqCst);
    info!(enabled, "debug mode");
}

pub fn debug_mode() -> bool {
    DEBUG_MODE.load(Ordering::SeqCst)
}

/// A template to render by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Template {
    /// Rendered through the cache
    Static { name: String, content: String },
    /// Never observes or leaves a cached artifact
    Dynamic { name: String, content: String },
}

impl Template {
    pub fn name(&self) -> &str {
        match self {
            Template::Static { name, .. } | Template::Dynamic { name, .. } => name,
        }
    }
}

pub struct Engine {
    config: EngineConfig,
    syntax: SyntaxConfig,
    syntaxes: DashMap<String, SyntaxConfig>,
    cache: Arc<ArtifactCache>,
    host: Arc<dyn Host>,
    defaults: BTreeMap<String, Value>,
}

impl Engine {
    /// Engine with its own empty cache
    pub fn new(config: EngineConfig, host: Arc<dyn Host>) -> Result<Self> {
        Self::with_cache(config, host, Arc::new(ArtifactCache::new()))
    }

    /// Engine sharing `cache` with other engines
    pub fn with_cache(
        config: EngineConfig,
        host: Arc<dyn Host>,
        cache: Arc<ArtifactCache>,
    ) -> Result<Self> {
        let syntax = SyntaxConfig::parse(&config.syntax)?;
        let defaults = match Value::from(toml::Value::Table(config.defaults.clone())) {
            Value::Map(map) => map,
            _ => BTreeMap::new(),
        };
        Ok(Self {
            config,
            syntax,
            syntaxes: DashMap::new(),
            cache,
            host,
            defaults,
        })
    }

    /// Set the process-wide debug toggle from `config.debug`
    pub fn apply_debug_mode(&self) {
        set_debug_mode(self.config.debug);
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<ArtifactCache> {
        &self.cache
    }

    pub fn host(&self) -> &Arc<dyn Host> {
        &self.host
    }

    /// Parsed delimiter set, memoized per syntax string
    pub fn syntax_for(&self, syntax: &str) -> Result<SyntaxConfig> {
        if let Some(parsed) = self.syntaxes.get(syntax) {
            return Ok(parsed.value().clone());
        }
        let parsed = SyntaxConfig::parse(syntax)?;
        self.syntaxes.insert(syntax.to_string(), parsed.clone());
        Ok(parsed)
    }

    /// Cached artifact for `name`, compiling `source` on a miss
    pub fn compile(&self, name: &str, source: &str) -> Result<Arc<CompiledArtifact>> {
        self.compile_source(name, &Source::new(source))
    }

    pub fn compile_source(&self, name: &str, source: &Source) -> Result<Arc<CompiledArtifact>> {
        self.artifact(name, source, &self.syntax)
    }

    pub fn compile_with_syntax(
        &self,
        name: &str,
        source: &Source,
        syntax: &str,
    ) -> Result<Arc<CompiledArtifact>> {
        let syntax = self.syntax_for(syntax)?;
        self.artifact(name, source, &syntax)
    }

    fn artifact(
        &self,
        name: &str,
        source: &Source,
        syntax: &SyntaxConfig,
    ) -> Result<Arc<CompiledArtifact>> {
        let compile = || artifact::compile(name, source, syntax, self.config.trim_line_breaks);
        if debug_mode() {
            self.cache.invalidate(name);
            return Ok(self.cache.insert(compile()?));
        }
        self.cache.get_or_try_insert_with(name, compile)
    }

    /// Compile `source` and store it under `name`, replacing any cached entry
    pub fn precompile(&self, name: &str, source: &str) -> Result<()> {
        let compiled = artifact::compile(
            name,
            &Source::new(source),
            &self.syntax,
            self.config.trim_line_breaks,
        )?;
        self.cache.insert(compiled);
        info!(template = name, "template cached");
        Ok(())
    }

    pub fn invalidate(&self, name: &str) -> bool {
        self.cache.invalidate(name)
    }

    /// Render `source` under `name` with `args`
    pub fn render(&self, source: &str, name: &str, args: &TemplateContext) -> Result<String> {
        self.render_source(&Source::new(source), name, args)
    }

    pub fn render_source(
        &self,
        source: &Source,
        name: &str,
        args: &TemplateContext,
    ) -> Result<String> {
        let artifact = self.compile_source(name, source)?;
        self.execute(&artifact, args.vars().clone(), 0)
    }

    /// Render with a delimiter set other than the configured one
    pub fn render_with_syntax(
        &self,
        source: &str,
        name: &str,
        syntax: &str,
        args: &TemplateContext,
    ) -> Result<String> {
        let artifact = self.compile_with_syntax(name, &Source::new(source), syntax)?;
        self.execute(&artifact, args.vars().clone(), 0)
    }

    pub fn render_template(&self, template: &Template, args: &TemplateContext) -> Result<String> {
        match template {
            Template::Static { name, content } => self.render(content, name, args),
            Template::Dynamic { name, content } => self.render_uncached(content, name, args),
        }
    }

    /// Render with arguments given as a JSON object string
    pub fn render_with_json_args(
        &self,
        source: &str,
        name: &str,
        json_args: &str,
        use_cache: bool,
    ) -> Result<String> {
        let args = TemplateContext::from_json(json_args)?;
        if use_cache {
            self.render(source, name, &args)
        } else {
            self.render_uncached(source, name, &args)
        }
    }

    fn render_uncached(&self, source: &str, name: &str, args: &TemplateContext) -> Result<String> {
        self.cache.invalidate(name);
        let result = self.render(source, name, args);
        self.cache.invalidate(name);
        result
    }

    /// Run a compiled artifact; `depth` counts enclosing `include` calls
    fn execute(
        &self,
        artifact: &CompiledArtifact,
        args: BTreeMap<String, Value>,
        depth: usize,
    ) -> Result<String> {
        let mut vars = self.defaults.clone();
        vars.extend(args);
        debug!(template = %artifact.name, depth, "render");

        let scope = RenderScope::new(self, depth);
        runtime::execute(
            &artifact.program,
            &artifact.name,
            vars,
            self.config.autoescape,
            &scope,
        )
    }
}

#[cfg(test)]
mod tests;
