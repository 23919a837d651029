//! In-process storage medium.

use retouch_core::error::{Result, RetouchError};
use retouch_core::storage::StorageMedium;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

/// A `StorageMedium` held in memory, with an optional byte capacity.
///
/// Capacity is measured as the sum of key and value lengths, matching
/// [`FileStorage`](super::FileStorage).
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
    capacity_bytes: Option<u64>,
}

impl MemoryStorage {
    /// Creates an unbounded medium.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a medium that rejects writes beyond `capacity_bytes`.
    pub fn with_capacity(capacity_bytes: u64) -> Self {
        Self {
            entries: Mutex::new(BTreeMap::new()),
            capacity_bytes: Some(capacity_bytes),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|e| RetouchError::storage(format!("Memory storage lock poisoned: {}", e)))
    }
}

impl StorageMedium for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.lock()?;

        if let Some(capacity) = self.capacity_bytes {
            let others: u64 = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| (k.len() + v.len()) as u64)
                .sum();
            let required = others + (key.len() + value.len()) as u64;
            if required > capacity {
                return Err(RetouchError::QuotaExceeded { required, capacity });
            }
        }

        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.lock()?.keys().cloned().collect())
    }
}
