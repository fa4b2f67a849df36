//! Runtime configuration, read from `TAXOTREE_*` environment variables.
//!
//! Command line flags override whatever is resolved here.

use std::path::PathBuf;
use std::time::Duration;

mod env;

pub const ENV_DB_PATH: &str = "TAXOTREE_DB";
pub const ENV_READER_POOL: &str = "TAXOTREE_READER_POOL";
pub const ENV_CACHE_TTL_SECS: &str = "TAXOTREE_CACHE_TTL_SECS";
pub const ENV_CACHE_MAX_ENTRIES: &str = "TAXOTREE_CACHE_MAX_ENTRIES";

pub const DEFAULT_DB_PATH: &str = "taxotree.sqlite3";
// One reader per concurrent child check.
const DEFAULT_READER_POOL: usize = crate::engine::MAX_CHILD_CHECK_WORKERS;
const DEFAULT_CACHE_TTL_SECS: u64 = 300;
const DEFAULT_CACHE_MAX_ENTRIES: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub db_path: PathBuf,
    pub reader_pool: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            reader_pool: DEFAULT_READER_POOL,
        }
    }
}

impl StoreConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            db_path: env::read_non_empty_env(ENV_DB_PATH)
                .map_or_else(|| PathBuf::from(DEFAULT_DB_PATH), PathBuf::from),
            reader_pool: env::read_env_usize(ENV_READER_POOL, DEFAULT_READER_POOL, 1),
        }
    }
}

/// Freshness policy for listings cached at the HTTP boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    pub ttl: Duration,
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            max_entries: DEFAULT_CACHE_MAX_ENTRIES,
        }
    }
}

impl CacheConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            ttl: Duration::from_secs(env::read_env_u64(
                ENV_CACHE_TTL_SECS,
                DEFAULT_CACHE_TTL_SECS,
            )),
            max_entries: env::read_env_usize(ENV_CACHE_MAX_ENTRIES, DEFAULT_CACHE_MAX_ENTRIES, 1),
        }
    }

    /// A zero TTL turns caching off.
    #[must_use]
    pub fn enabled(&self) -> bool {
        !self.ttl.is_zero()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub cache: CacheConfig,
}

impl AppConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            store: StoreConfig::from_env(),
            cache: CacheConfig::from_env(),
        }
    }
}
