//! Standard host collaborator for stpl
//!
//! Serves `include` reads from a template root directory and the
//! `http_get`/`local_http_get` helpers through a blocking HTTP client.

pub mod client;

use reqwest::blocking::Client;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use stpl_core::{Host, HostConfig, HostError, Result, StplError};
use tracing::{debug, warn};

pub use client::build_client;

/// Host reading templates from disk and fetching over HTTP
#[derive(Debug, Clone)]
pub struct StdHost {
    template_root: PathBuf,
    local_base_url: String,
    client: Client,
}

impl StdHost {
    pub fn new(config: &HostConfig) -> Result<Self> {
        let client = build_client(Duration::from_secs(config.http_timeout_secs)).map_err(|err| {
            StplError::ConfigInvalidValue {
                field: "host.http_timeout_secs".to_string(),
                reason: err.to_string(),
            }
        })?;
        Ok(Self {
            template_root: config.template_root.clone(),
            local_base_url: config.local_base_url.clone(),
            client,
        })
    }

    pub fn template_root(&self) -> &Path {
        &self.template_root
    }

    /// Path of template `name` under the root
    ///
    /// A leading `/` is ignored; any other absolute path or `..` component
    /// is rejected.
    pub fn resolve(&self, name: &str) -> std::result::Result<PathBuf, HostError> {
        let relative = Path::new(name.trim_start_matches('/'));
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes || relative.as_os_str().is_empty() {
            return Err(HostError::PathEscape {
                path: name.to_string(),
            });
        }
        Ok(self.template_root.join(relative))
    }

    /// Absolute URL for a request against the embedding server
    pub fn local_url(&self, uri: &str) -> String {
        format!(
            "{}/{}",
            self.local_base_url.trim_end_matches('/'),
            uri.trim_start_matches('/')
        )
    }

    fn fetch(&self, url: &str) -> std::result::Result<String, HostError> {
        debug!(url, "fetch");
        let network = |err: reqwest::Error| {
            warn!(url, "fetch failed: {}", err);
            HostError::Network {
                url: url.to_string(),
                message: err.to_string(),
            }
        };
        self.client
            .get(url)
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.text())
            .map_err(network)
    }
}

impl Host for StdHost {
    fn read_file(&self, path: &str) -> std::result::Result<String, HostError> {
        let file = self.resolve(path)?;
        debug!(template = path, file = %file.display(), "read template");
        std::fs::read_to_string(&file).map_err(|err| match err.kind() {
            std::io::ErrorKind::NotFound => HostError::NotFound {
                path: path.to_string(),
            },
            _ => HostError::Unavailable(format!("{}: {}", file.display(), err)),
        })
    }

    fn http_get(&self, url: &str) -> std::result::Result<String, HostError> {
        self.fetch(url)
    }

    fn local_http_get(&self, uri: &str) -> std::result::Result<String, HostError> {
        self.fetch(&self.local_url(uri))
    }
}
