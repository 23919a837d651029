//! Infrastructure layer for Retouch: storage media, the session cache
//! store, configuration, and path resolution.

pub mod config;
pub mod paths;
pub mod session_cache_store;
pub mod storage;

pub use crate::config::CacheConfig;
pub use crate::paths::RetouchPaths;
pub use crate::session_cache_store::SessionCacheStore;
pub use crate::storage::{FileStorage, MemoryStorage};
