//! Filesystem memoization of whole collections

use crate::fetch::ResourceSource;
use crate::record::EntityRecord;
use crate::Result;
use std::path::PathBuf;

/// Default cache directory, relative to the working directory
pub const DEFAULT_CACHE_DIR: &str = ".swapicache";

/// Wraps a source and stores each fetched collection as one JSON file.
///
/// A collection found on disk is returned as-is; the inner source is only
/// asked for collections that have never been cached. Entries never expire.
pub struct CachedSource<S> {
    inner: S,
    dir: PathBuf,
}

impl<S: ResourceSource> CachedSource<S> {
    pub fn new(inner: S, dir: impl Into<PathBuf>) -> Self {
        Self {
            inner,
            dir: dir.into(),
        }
    }

    /// Cache file for an endpoint URL
    pub fn cache_path(&self, url: &str) -> PathBuf {
        self.dir.join(cache_key(url))
    }
}

/// File name derived from an endpoint URL: `:` and `/` become `-`
pub fn cache_key(url: &str) -> String {
    url.replace([':', '/'], "-")
}

impl<S: ResourceSource> ResourceSource for CachedSource<S> {
    fn fetch_collection(&self, url: &str) -> Result<Vec<EntityRecord>> {
        let path = self.cache_path(url);
        if path.is_file() {
            tracing::debug!("Cache hit for {} ({})", url, path.display());
            let contents = std::fs::read_to_string(&path)?;
            return Ok(serde_json::from_str(&contents)?);
        }

        let records = self.inner.fetch_collection(url)?;

        if !self.dir.exists() {
            std::fs::create_dir_all(&self.dir)?;
        }
        // Rename into place so an interrupted write never leaves a cache hit
        let partial = self.dir.join(format!("{}.tmp", cache_key(url)));
        std::fs::write(&partial, serde_json::to_string(&records)?)?;
        std::fs::rename(&partial, &path)?;
        tracing::debug!("Cached {} records for {} at {}", records.len(), url, path.display());

        Ok(records)
    }
}
