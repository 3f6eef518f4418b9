//! Test utilities for stpl
//!
//! Shared helpers used across the stpl workspace: workspace-local temp
//! dirs, a serialized debug-mode toggle, an in-memory host and a shared
//! mock HTTP server.

mod debug;
mod memory;
mod mock;

pub use debug::{with_debug_mode, DEBUG_LOCK};
pub use memory::MemoryHost;
pub use mock::{get_shared_mock_server, SHARED_MOCK_SERVER};

use tempfile::TempDir;

/// Creates a temporary directory within `.tmp/` at the project root
///
/// The directory is removed when the returned `TempDir` drops.
///
/// # Panics
///
/// Panics if the current directory is unknown or `.tmp/` cannot be created.
///
/// # Examples
///
/// ```rust
/// use stpl_testkit::temp_dir_in_workspace;
///
/// let temp = temp_dir_in_workspace();
/// std::fs::write(temp.path().join("page.tpl"), "Hello {{name}}").unwrap();
/// ```
pub fn temp_dir_in_workspace() -> TempDir {
    let workspace_root = std::env::current_dir().expect("Failed to get current directory");
    let tmp_base = workspace_root.join(".tmp");
    std::fs::create_dir_all(&tmp_base).expect("Failed to create .tmp directory");
    TempDir::new_in(&tmp_base).expect("Failed to create temporary directory in .tmp/")
}

/// Alternative with Result for non-test code
pub fn try_temp_dir_in_workspace() -> std::io::Result<TempDir> {
    let workspace_root = std::env::current_dir()?;
    let tmp_base = workspace_root.join(".tmp");
    std::fs::create_dir_all(&tmp_base)?;
    TempDir::new_in(&tmp_base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_dir_in_workspace_creates_in_tmp() {
        let temp = temp_dir_in_workspace();
        let path = temp.path();
        assert!(
            path.to_string_lossy().contains(".tmp"),
            "Path should contain .tmp, got: {}",
            path.display()
        );
        assert!(path.is_dir());
    }

    #[test]
    fn test_temp_dir_auto_cleanup() {
        let path = {
            let temp = temp_dir_in_workspace();
            temp.path().to_path_buf()
        };
        assert!(!path.exists(), "Directory should not exist after drop");
    }

    #[test]
    fn test_multiple_temp_dirs_unique() {
        let temp1 = temp_dir_in_workspace();
        let temp2 = temp_dir_in_workspace();
        assert_ne!(temp1.path(), temp2.path());
    }

    #[test]
    fn test_try_temp_dir_in_workspace_returns_ok() {
        let temp = try_temp_dir_in_workspace().unwrap();
        assert!(temp.path().exists());
    }
}
