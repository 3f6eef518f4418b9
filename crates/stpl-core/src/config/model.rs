use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::consts;
use crate::error::{Result, StplError};

/// stpl.toml schema
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub host: HostConfig,
}

impl Config {
    /// Parse configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        config.engine.validate()?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Five delimiter tokens, whitespace separated
    #[serde(default = "default_syntax")]
    pub syntax: String,

    /// `false` swaps the escaped and raw converters
    #[serde(default = "default_true")]
    pub autoescape: bool,

    /// Debug toggle value set by `Engine::apply_debug_mode`
    #[serde(default)]
    pub debug: bool,

    /// Drop the line break ending a literal span that precedes a line-anchored code start
    #[serde(default = "default_true")]
    pub trim_line_breaks: bool,

    #[serde(default = "default_max_include_depth")]
    pub max_include_depth: usize,

    /// Template-level default bindings
    #[serde(default)]
    pub defaults: toml::Table,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            syntax: default_syntax(),
            autoescape: true,
            debug: false,
            trim_line_breaks: true,
            max_include_depth: default_max_include_depth(),
            defaults: toml::Table::new(),
        }
    }
}

impl EngineConfig {
    fn validate(&self) -> Result<()> {
        if self.max_include_depth == 0 {
            return Err(StplError::ConfigInvalidValue {
                field: "engine.max_include_depth".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        crate::template::SyntaxConfig::parse(&self.syntax)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    #[serde(default = "default_template_root")]
    pub template_root: PathBuf,

    #[serde(default = "default_local_base_url")]
    pub local_base_url: String,

    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            template_root: default_template_root(),
            local_base_url: default_local_base_url(),
            http_timeout_secs: default_http_timeout_secs(),
        }
    }
}

fn default_syntax() -> String {
    consts::DEFAULT_SYNTAX.to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_include_depth() -> usize {
    consts::limits::MAX_INCLUDE_DEPTH
}

fn default_template_root() -> PathBuf {
    PathBuf::from(consts::host::TEMPLATE_ROOT)
}

fn default_local_base_url() -> String {
    consts::host::LOCAL_BASE_URL.to_string()
}

fn default_http_timeout_secs() -> u64 {
    consts::host::HTTP_TIMEOUT_SECS
}
