// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Time-boxed cache for the last successful enrichment.
//!
//! The backing [`Storage`] is treated as unreliable: it may be missing,
//! read-only or full. [`ExpiringCache`] absorbs every storage and decoding
//! failure, so a broken cache behaves like an empty one and a failed write
//! behaves like a no-op.

use std::{
    collections::HashMap,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::{
        Mutex,
        atomic::{AtomicU64, Ordering},
    },
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{error::Error, project::EnrichedProject};

/// Storage key holding the enriched project list.
pub const CACHE_KEY: &str = "projects";

/// Cached enrichment result together with its expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize,)]
pub struct CacheEntry
{
    /// Enriched projects in ranked order.
    pub data:    Vec<EnrichedProject,>,
    /// Expiry as milliseconds since the Unix epoch.
    pub expires: u64,
}

impl CacheEntry
{
    /// Returns `true` while `now` (epoch milliseconds) precedes the expiry.
    pub fn is_valid_at(&self, now: u64,) -> bool
    {
        now < self.expires
    }
}

/// Key-value backend with the failure modes of browser local storage.
pub trait Storage: Send + Sync
{
    /// Loads the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CacheUnavailable`] when the backend cannot be read.
    fn load(&self, key: &str,) -> Result<Option<String,>, Error,>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CacheUnavailable`] when the backend cannot be written.
    fn store(&self, key: &str, value: &str,) -> Result<(), Error,>;

    /// Removes the value stored under `key`. Removing a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CacheUnavailable`] when the backend cannot be written.
    fn remove(&self, key: &str,) -> Result<(), Error,>;
}

/// Directory-backed storage holding one JSON file per key.
#[derive(Debug, Clone,)]
pub struct FileStorage
{
    root: PathBuf,
}

impl FileStorage
{
    /// Creates storage rooted at `root`. The directory is created on first
    /// write.
    pub fn new(root: impl Into<PathBuf,>,) -> Self
    {
        Self {
            root: root.into(),
        }
    }

    /// Directory holding the cache files.
    pub fn root(&self,) -> &Path
    {
        &self.root
    }

    fn path_for(&self, key: &str,) -> PathBuf
    {
        self.root.join(format!("{key}.json"),)
    }
}

impl Storage for FileStorage
{
    fn load(&self, key: &str,) -> Result<Option<String,>, Error,>
    {
        let path = self.path_for(key,);
        match fs::read_to_string(&path,) {
            Ok(contents,) => Ok(Some(contents,),),
            Err(error,) if error.kind() == ErrorKind::NotFound => Ok(None,),
            Err(error,) => {
                Err(Error::cache(format!("failed to read {}: {error}", path.display()),),)
            }
        }
    }

    fn store(&self, key: &str, value: &str,) -> Result<(), Error,>
    {
        fs::create_dir_all(&self.root,).map_err(|e| {
            Error::cache(format!("failed to create {}: {e}", self.root.display()),)
        },)?;

        let path = self.path_for(key,);
        let staging = self.root.join(format!(".{key}.json.tmp"),);
        fs::write(&staging, value,).map_err(|e| {
            Error::cache(format!("failed to write {}: {e}", staging.display()),)
        },)?;
        fs::rename(&staging, &path,).map_err(|e| {
            Error::cache(format!("failed to replace {}: {e}", path.display()),)
        },)
    }

    fn remove(&self, key: &str,) -> Result<(), Error,>
    {
        let path = self.path_for(key,);
        match fs::remove_file(&path,) {
            Ok((),) => Ok((),),
            Err(error,) if error.kind() == ErrorKind::NotFound => Ok((),),
            Err(error,) => {
                Err(Error::cache(format!("failed to remove {}: {error}", path.display()),),)
            }
        }
    }
}

/// In-process storage used for `--no-cache` runs and tests.
#[derive(Debug, Default,)]
pub struct MemoryStorage
{
    entries: Mutex<HashMap<String, String,>,>,
}

impl MemoryStorage
{
    fn with_entries<T,>(
        &self,
        f: impl FnOnce(&mut HashMap<String, String,>,) -> T,
    ) -> Result<T, Error,>
    {
        let mut entries =
            self.entries.lock().map_err(|_| Error::cache("memory storage lock poisoned",),)?;
        Ok(f(&mut entries,),)
    }
}

impl Storage for MemoryStorage
{
    fn load(&self, key: &str,) -> Result<Option<String,>, Error,>
    {
        self.with_entries(|entries| entries.get(key,).cloned(),)
    }

    fn store(&self, key: &str, value: &str,) -> Result<(), Error,>
    {
        self.with_entries(|entries| {
            entries.insert(key.to_owned(), value.to_owned(),);
        },)
    }

    fn remove(&self, key: &str,) -> Result<(), Error,>
    {
        self.with_entries(|entries| {
            entries.remove(key,);
        },)
    }
}

/// Source of the current time in epoch milliseconds.
pub trait Clock: Send + Sync
{
    /// Milliseconds elapsed since the Unix epoch.
    fn now_millis(&self,) -> u64;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default,)]
pub struct SystemClock;

impl Clock for SystemClock
{
    fn now_millis(&self,) -> u64
    {
        SystemTime::now()
            .duration_since(UNIX_EPOCH,)
            .map(|elapsed| u64::try_from(elapsed.as_millis(),).unwrap_or(u64::MAX,),)
            .unwrap_or_default()
    }
}

/// Clock advanced explicitly by the caller.
#[derive(Debug, Default,)]
pub struct ManualClock
{
    now: AtomicU64,
}

impl ManualClock
{
    /// Creates a clock frozen at `now` epoch milliseconds.
    pub fn new(now: u64,) -> Self
    {
        Self {
            now: AtomicU64::new(now,),
        }
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: Duration,) -> u64
    {
        let by = u64::try_from(by.as_millis(),).unwrap_or(u64::MAX,);
        self.now.fetch_add(by, Ordering::SeqCst,).saturating_add(by,)
    }
}

impl Clock for ManualClock
{
    fn now_millis(&self,) -> u64
    {
        self.now.load(Ordering::SeqCst,)
    }
}

impl<C: Clock + ?Sized,> Clock for std::sync::Arc<C,>
{
    fn now_millis(&self,) -> u64
    {
        (**self).now_millis()
    }
}

/// Single-key cache with wholesale replacement and wall-clock expiry.
#[derive(Debug,)]
pub struct ExpiringCache<S, C = SystemClock,>
{
    storage: S,
    clock:   C,
}

impl<S: Storage,> ExpiringCache<S, SystemClock,>
{
    /// Creates a cache driven by the system clock.
    pub fn new(storage: S,) -> Self
    {
        Self::with_clock(storage, SystemClock,)
    }
}

impl<S: Storage, C: Clock,> ExpiringCache<S, C,>
{
    /// Creates a cache driven by the provided clock.
    pub fn with_clock(storage: S, clock: C,) -> Self
    {
        Self {
            storage,
            clock,
        }
    }

    /// Underlying storage backend.
    pub fn storage(&self,) -> &S
    {
        &self.storage
    }

    /// Current time according to the cache clock.
    pub fn now_millis(&self,) -> u64
    {
        self.clock.now_millis()
    }

    /// Reads the stored entry regardless of expiry.
    ///
    /// Missing entries, storage failures and undecodable contents all yield
    /// `None`.
    pub fn read(&self,) -> Option<CacheEntry,>
    {
        let raw = match self.storage.load(CACHE_KEY,) {
            Ok(Some(raw,),) => raw,
            Ok(None,) => {
                debug!("Cache miss: no stored entry");
                return None;
            }
            Err(error,) => {
                warn!("Treating cache as empty: {}", error);
                return None;
            }
        };

        match serde_json::from_str(&raw,) {
            Ok(entry,) => Some(entry,),
            Err(error,) => {
                warn!("Discarding undecodable cache entry: {}", error);
                None
            }
        }
    }

    /// Reads the stored entry only when it has not expired yet.
    pub fn read_valid(&self,) -> Option<CacheEntry,>
    {
        let entry = self.read()?;
        let now = self.clock.now_millis();
        if entry.is_valid_at(now,) {
            debug!("Cache hit: {} projects, {}ms left", entry.data.len(), entry.expires - now);
            Some(entry,)
        } else {
            debug!("Cache entry expired {}ms ago", now - entry.expires);
            None
        }
    }

    /// Replaces the stored entry with `entries`, expiring `ttl` from now.
    ///
    /// Failures are logged and otherwise ignored.
    pub fn write(&self, entries: &[EnrichedProject], ttl: Duration,)
    {
        let ttl = u64::try_from(ttl.as_millis(),).unwrap_or(u64::MAX,);
        let entry = CacheEntry {
            data:    entries.to_vec(),
            expires: self.clock.now_millis().saturating_add(ttl,),
        };

        let serialized = match serde_json::to_string(&entry,) {
            Ok(serialized,) => serialized,
            Err(error,) => {
                warn!("Skipping cache write, entry could not be encoded: {}", error);
                return;
            }
        };

        match self.storage.store(CACHE_KEY, &serialized,) {
            Ok((),) => debug!("Cached {} projects until {}", entry.data.len(), entry.expires),
            Err(error,) => warn!("Skipping cache write: {}", error),
        }
    }

    /// Drops the stored entry. Returns `false` when the backend refused the
    /// removal; the failure is logged and never propagated.
    pub fn clear(&self,) -> bool
    {
        match self.storage.remove(CACHE_KEY,) {
            Ok((),) => {
                debug!("Cache cleared");
                true
            }
            Err(error,) => {
                warn!("Failed to clear cache: {}", error);
                false
            }
        }
    }
}
