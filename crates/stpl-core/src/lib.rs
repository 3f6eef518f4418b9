// Core modules
pub mod artifact;
pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod host;
pub mod runtime;
pub mod script;
pub mod template;
pub mod value;

// Re-export commonly used types
pub use artifact::CompiledArtifact;
pub use cache::ArtifactCache;
pub use config::{Config, EngineConfig, HostConfig};
pub use engine::{debug_mode, set_debug_mode, Engine, Template, TemplateContext};
pub use error::{Result, RuntimeErrorKind, StplError};
pub use host::{Host, HostError, NoHost};
pub use template::{Encoding, Source, SyntaxConfig, TemplateParser};
pub use value::{Number, Value};
