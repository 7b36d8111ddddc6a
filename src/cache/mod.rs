//! Sanitized-content cache: freshness gate and key-value store.
//!
//! One entry per feed item, keyed by the item's decoded identifier.
//! The store is a plain capability trait so the gate logic can be
//! exercised against an in-memory fake; the real implementation is one
//! file per entry under a scratch directory that survives across
//! builds.

use crate::utils::date::DateTimeUtc;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

// ============================================================================
// Freshness Gate
// ============================================================================

/// Per-item decision: recompute from the rendered page, or reuse the
/// stored entry verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Fresh,
    Cached,
}

/// Decide whether an item's cached content may be reused.
///
/// Evaluated in this order:
/// 1. no last-updated timestamp: always recompute (nothing to compare
///    the entry against, so it is never trusted)
/// 2. no cache entry: recompute
/// 3. no build marker configured: recompute (cache validity cannot be
///    proven)
/// 4. recompute iff the timestamp is strictly later than the marker
pub fn decide(
    last_updated: Option<DateTimeUtc>,
    has_entry: bool,
    marker: Option<DateTimeUtc>,
) -> Freshness {
    let Some(updated) = last_updated else {
        return Freshness::Fresh;
    };
    if !has_entry {
        return Freshness::Fresh;
    }
    let Some(marker) = marker else {
        return Freshness::Fresh;
    };
    if updated > marker {
        Freshness::Fresh
    } else {
        Freshness::Cached
    }
}

// ============================================================================
// Cache Store
// ============================================================================

/// Key-value capability over sanitized item HTML.
///
/// `read` failures of any kind are a miss, never an error; `write` is
/// an unconditional overwrite.
pub trait CacheStore {
    fn has(&self, id: &str) -> bool;
    fn read(&self, id: &str) -> Option<String>;
    fn write(&self, id: &str, html: &str) -> Result<()>;
}

/// Directory-backed store: `<dir>/<id>.html`, one file per item.
pub struct DirStore {
    dir: PathBuf,
}

impl DirStore {
    /// Open the store, creating the directory if needed (idempotent).
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create cache directory {}", dir.display()))?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    fn entry_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.html"))
    }
}

impl CacheStore for DirStore {
    fn has(&self, id: &str) -> bool {
        self.entry_path(id).is_file()
    }

    fn read(&self, id: &str) -> Option<String> {
        fs::read_to_string(self.entry_path(id)).ok()
    }

    fn write(&self, id: &str, html: &str) -> Result<()> {
        let path = self.entry_path(id);
        fs::write(&path, html)
            .with_context(|| format!("failed to write cache entry {}", path.display()))
    }
}

/// In-memory fake for gate/pipeline tests.
#[cfg(test)]
pub struct MemoryStore {
    entries: parking_lot::Mutex<rustc_hash::FxHashMap<String, String>>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: parking_lot::Mutex::new(rustc_hash::FxHashMap::default()),
        }
    }
}

#[cfg(test)]
impl CacheStore for MemoryStore {
    fn has(&self, id: &str) -> bool {
        self.entries.lock().contains_key(id)
    }

    fn read(&self, id: &str) -> Option<String> {
        self.entries.lock().get(id).cloned()
    }

    fn write(&self, id: &str, html: &str) -> Result<()> {
        self.entries.lock().insert(id.to_string(), html.to_string());
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
