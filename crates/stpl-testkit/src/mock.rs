//! Shared mock HTTP server
//!
//! One mockito server for every test in the process, so fetch tests can
//! run in parallel against distinct paths.

use lazy_static::lazy_static;
use mockito::{Server, ServerGuard};
use std::sync::Mutex;

lazy_static! {
    /// Global shared mockito server, started on first access
    pub static ref SHARED_MOCK_SERVER: Mutex<ServerGuard> = Mutex::new(Server::new());
}

/// Lock the shared mock server
///
/// Hold the guard only while creating mocks; mocks are removed when they
/// drop. Use a unique path per test.
///
/// # Examples
///
/// ```no_run
/// use stpl_testkit::get_shared_mock_server;
///
/// let (mock, url) = {
///     let mut server = get_shared_mock_server();
///     let mock = server.mock("GET", "/unique-path").with_body("ok").create();
///     (mock, format!("{}/unique-path", server.url()))
/// };
/// ```
pub fn get_shared_mock_server() -> std::sync::MutexGuard<'static, ServerGuard> {
    SHARED_MOCK_SERVER.lock().unwrap_or_else(|poisoned| {
        // Mocks are keyed by path; a panicking holder leaves the server usable
        poisoned.into_inner()
    })
}
