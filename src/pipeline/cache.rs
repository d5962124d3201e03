//! Dataset cache keyed by the identity of the source file
//!
//! The cache owns at most one enriched table. When the file's fingerprint
//! (canonical path, length, modification time) changes, the next
//! [`DatasetCache::get_or_load`] builds a fresh table and swaps the `Arc`;
//! tables already handed out stay valid and unchanged.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use super::error::ChurnResult;
use super::loader::{load_and_enrich, LoadOptions};
use super::record::EnrichedTable;

/// Identity of a source file version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFingerprint {
    pub path: PathBuf,
    pub len: u64,
    pub modified: Option<SystemTime>,
}

impl SourceFingerprint {
    pub fn of(path: &Path) -> ChurnResult<Self> {
        let metadata = std::fs::metadata(path)?;
        Ok(Self {
            path: path.canonicalize()?,
            len: metadata.len(),
            modified: metadata.modified().ok(),
        })
    }
}

#[derive(Debug)]
struct CachedTable {
    fingerprint: SourceFingerprint,
    table: Arc<EnrichedTable>,
}

/// Holds the enriched table for one source path
#[derive(Debug)]
pub struct DatasetCache {
    path: PathBuf,
    options: LoadOptions,
    current: Option<CachedTable>,
    loads: usize,
}

impl DatasetCache {
    pub fn new(path: impl Into<PathBuf>, options: LoadOptions) -> Self {
        Self {
            path: path.into(),
            options,
            current: None,
            loads: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Return the cached table, reloading it first if the source changed.
    pub fn get_or_load(&mut self) -> ChurnResult<Arc<EnrichedTable>> {
        let fingerprint = SourceFingerprint::of(&self.path)?;

        if let Some(cached) = &self.current {
            if cached.fingerprint == fingerprint {
                return Ok(Arc::clone(&cached.table));
            }
        }

        let table = Arc::new(load_and_enrich(&self.path, &self.options)?);
        self.loads += 1;
        self.current = Some(CachedTable {
            fingerprint,
            table: Arc::clone(&table),
        });
        Ok(table)
    }

    /// True when nothing is cached or the file on disk no longer matches.
    pub fn is_stale(&self) -> bool {
        match (&self.current, SourceFingerprint::of(&self.path)) {
            (Some(cached), Ok(fingerprint)) => cached.fingerprint != fingerprint,
            _ => true,
        }
    }

    /// Drop the cached table so the next access reloads.
    pub fn invalidate(&mut self) {
        self.current = None;
    }

    /// Number of times the source has been read.
    pub fn load_count(&self) -> usize {
        self.loads
    }
}
