//! Engine configuration (`stpl.toml`)

pub mod consts;
mod model;

pub use model::{Config, EngineConfig, HostConfig};
