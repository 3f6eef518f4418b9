//! Host collaborator capability
//!
//! The engine never touches the filesystem or the network itself: template
//! reads for `include` and the `http_get`/`local_http_get` helpers go through
//! a [`Host`] supplied by the embedding application.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HostError {
    #[error("HOST_NOT_FOUND: {path}")]
    NotFound { path: String },

    #[error("HOST_PATH_ESCAPE: {path} resolves outside the template root")]
    PathEscape { path: String },

    #[error("HOST_NETWORK_ERROR: {url}: {message}")]
    Network { url: String, message: String },

    #[error("HOST_UNAVAILABLE: {0}")]
    Unavailable(String),
}

/// Synchronous capabilities used while a program runs
pub trait Host: Send + Sync {
    /// Source text of the template called `path`
    fn read_file(&self, path: &str) -> Result<String, HostError>;

    fn http_get(&self, url: &str) -> Result<String, HostError>;

    /// `http_get` against the embedding server
    fn local_http_get(&self, uri: &str) -> Result<String, HostError>;
}

/// Host without any capability; every call fails with `Unavailable`
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHost;

impl Host for NoHost {
    fn read_file(&self, path: &str) -> Result<String, HostError> {
        Err(HostError::Unavailable(format!("read_file({})", path)))
    }

    fn http_get(&self, url: &str) -> Result<String, HostError> {
        Err(HostError::Unavailable(format!("http_get({})", url)))
    }

    fn local_http_get(&self, uri: &str) -> Result<String, HostError> {
        Err(HostError::Unavailable(format!("local_http_get({})", uri)))
    }
}
