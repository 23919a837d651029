//! Durable local storage medium trait.

use crate::error::Result;

/// A synchronous, string-keyed key-value medium with a capacity limit.
///
/// Implementations are shared process-wide; the session cache store is the
/// only writer for the keys it reserves.
pub trait StorageMedium: Send + Sync {
    /// Reads the value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Writes `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `RetouchError::QuotaExceeded` when the write would push the
    /// medium past its capacity, or `RetouchError::Storage` when the medium
    /// is unavailable.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<()>;

    /// Lists every key currently stored.
    fn keys(&self) -> Result<Vec<String>>;
}
