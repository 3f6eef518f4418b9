//! Serialized access to the process-wide debug toggle

use std::sync::Mutex;

/// Static mutex to serialize tests that flip debug mode
pub static DEBUG_LOCK: Mutex<()> = Mutex::new(());

/// Run `f` with debug mode set to `enabled`, restoring the previous value after
///
/// Holds [`DEBUG_LOCK`] for the whole call, so two tests using this helper
/// never observe each other's setting.
///
/// # Examples
///
/// ```no_run
/// use stpl_testkit::with_debug_mode;
///
/// with_debug_mode(true, || {
///     assert!(stpl_core::debug_mode());
/// });
/// ```
pub fn with_debug_mode<F, R>(enabled: bool, f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = DEBUG_LOCK.lock().unwrap_or_else(|poisoned| {
        // The toggle is restored below even after a panicking test
        poisoned.into_inner()
    });

    let original = stpl_core::debug_mode();
    stpl_core::set_debug_mode(enabled);
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(f));
    stpl_core::set_debug_mode(original);

    match result {
        Ok(value) => value,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}
