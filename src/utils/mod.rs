// Utility functions

use std::sync::{Mutex, MutexGuard};

/// Extension trait for Result that provides convenient error context methods.
/// Converts any error to a String with a descriptive message prefix.
///
/// # Example
/// ```ignore
/// use crate::utils::ResultExt;
///
/// let file = std::fs::read_to_string("outline.txt")
///     .with_context("Failed to read outline file")?;
/// ```
pub trait ResultExt<T> {
    /// Converts the error to a String with context message.
    fn with_context(self, msg: &str) -> Result<T, String>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for Result<T, E> {
    fn with_context(self, msg: &str) -> Result<T, String> {
        self.map_err(|e| format!("{}: {}", msg, e))
    }
}

/// Safely acquire a mutex lock, recovering from poisoning by returning the guard.
/// Use this instead of `.lock().unwrap()`.
pub fn lock_mutex_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            log::warn!("Mutex was poisoned, recovering: {}", poisoned);
            poisoned.into_inner()
        }
    }
}

/// Milliseconds since the Unix epoch, used in export file names
pub fn unix_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
