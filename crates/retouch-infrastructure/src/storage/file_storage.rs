//! Directory-backed storage medium with atomic writes.

use fs2::FileExt;
use retouch_core::error::{Result, RetouchError};
use retouch_core::storage::StorageMedium;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write as IoWrite};
use std::path::{Path, PathBuf};

const ENTRY_EXTENSION: &str = "entry";
const LOCK_FILE_NAME: &str = ".storage.lock";

/// A `StorageMedium` that keeps one file per key inside a directory.
///
/// Provides:
/// - **Atomicity**: Writes go to a tmp file, are fsynced, then renamed over the entry
/// - **Isolation**: Writers take an exclusive lock on the directory's lock file
/// - **Capacity**: The sum of key and value bytes never exceeds `capacity_bytes`
///
/// Keys are percent-encoded into file names, so any string is a valid key.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
    capacity_bytes: u64,
}

impl FileStorage {
    /// Opens (creating if needed) a storage directory.
    pub fn open(dir: impl Into<PathBuf>, capacity_bytes: u64) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            capacity_bytes,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", encode_key(key), ENTRY_EXTENSION))
    }

    fn temp_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!(".{}.{}.tmp", encode_key(key), ENTRY_EXTENSION))
    }

    /// Iterates `(key, entry_bytes)` for every readable entry.
    fn entries(&self) -> Result<Vec<(String, u64)>> {
        let mut entries = Vec::new();
        for dir_entry in fs::read_dir(&self.dir)? {
            let dir_entry = dir_entry?;
            let file_name = dir_entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            let Some(encoded) = name.strip_suffix(&format!(".{}", ENTRY_EXTENSION)) else {
                continue;
            };
            if encoded.starts_with('.') {
                continue;
            }
            let Some(key) = decode_key(encoded) else {
                tracing::warn!("[FileStorage] Skipping undecodable entry: {}", name);
                continue;
            };
            let len = dir_entry.metadata()?.len();
            entries.push((key, len));
        }
        Ok(entries)
    }

    fn used_bytes_excluding(&self, key: &str) -> Result<u64> {
        Ok(self
            .entries()?
            .into_iter()
            .filter(|(k, _)| k != key)
            .map(|(k, len)| k.len() as u64 + len)
            .sum())
    }

    fn acquire_lock(&self) -> Result<DirLock> {
        DirLock::acquire(&self.dir.join(LOCK_FILE_NAME))
    }
}

impl StorageMedium for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.entry_path(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let _lock = self.acquire_lock()?;

        let required = self.used_bytes_excluding(key)? + (key.len() + value.len()) as u64;
        if required > self.capacity_bytes {
            return Err(RetouchError::QuotaExceeded {
                required,
                capacity: self.capacity_bytes,
            });
        }

        let tmp_path = self.temp_path(key);
        if let Err(e) = write_then_rename(&tmp_path, &self.entry_path(key), value) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let _lock = self.acquire_lock()?;
        match fs::remove_file(self.entry_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut keys: Vec<String> = self.entries()?.into_iter().map(|(k, _)| k).collect();
        keys.sort();
        Ok(keys)
    }
}

/// Writes `value` to `tmp_path`, fsyncs it, and renames it over `entry_path`.
fn write_then_rename(tmp_path: &Path, entry_path: &Path, value: &str) -> Result<()> {
    let mut tmp_file = File::create(tmp_path)?;
    tmp_file.write_all(value.as_bytes())?;
    tmp_file.sync_all()?;
    drop(tmp_file);

    fs::rename(tmp_path, entry_path)?;
    Ok(())
}

/// Exclusive lock on the storage directory, released on drop.
struct DirLock {
    file: File,
}

impl DirLock {
    fn acquire(lock_path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(lock_path)?;

        file.lock_exclusive()
            .map_err(|e| RetouchError::storage(format!("Failed to acquire lock: {}", e)))?;

        Ok(Self { file })
    }
}

impl Drop for DirLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

fn encode_key(key: &str) -> String {
    let mut encoded = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-' {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{:02X}", byte));
        }
    }
    encoded
}

fn decode_key(encoded: &str) -> Option<String> {
    let bytes = encoded.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = encoded.get(i + 1..i + 3)?;
            decoded.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            decoded.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(decoded).ok()
}
