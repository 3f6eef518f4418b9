//! HTTP client construction for fetch helpers

use reqwest::blocking::Client;
use std::time::Duration;

/// User agent sent with every fetch
pub const USER_AGENT: &str = "stpl";

/// Blocking client with the given request timeout
///
/// # Errors
///
/// Returns error if client construction fails
pub fn build_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
}
