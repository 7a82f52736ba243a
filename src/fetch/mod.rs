//! Resource sources - where entity records come from
//!
//! The importer only needs "all records of this collection, in order".
//! [`HttpSource`] walks the paginated API every time; [`CachedSource`]
//! wraps any source and memoizes whole collections on disk so repeated
//! runs skip the network.

pub mod cache;
pub mod http;

pub use cache::CachedSource;
pub use http::HttpSource;

use crate::record::EntityRecord;
use crate::{Error, Result};
use std::collections::HashMap;

/// Supplies the full, ordered record list of a collection endpoint.
pub trait ResourceSource {
    /// Fetch every record behind `url`, following pagination until exhausted
    fn fetch_collection(&self, url: &str) -> Result<Vec<EntityRecord>>;
}

impl<S: ResourceSource + ?Sized> ResourceSource for &S {
    fn fetch_collection(&self, url: &str) -> Result<Vec<EntityRecord>> {
        (**self).fetch_collection(url)
    }
}

impl<S: ResourceSource + ?Sized> ResourceSource for Box<S> {
    fn fetch_collection(&self, url: &str) -> Result<Vec<EntityRecord>> {
        (**self).fetch_collection(url)
    }
}

/// Source backed by records held in memory, keyed by endpoint URL.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    collections: HashMap<String, Vec<EntityRecord>>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the records served for `url`
    pub fn with_collection(mut self, url: impl Into<String>, records: Vec<EntityRecord>) -> Self {
        self.collections.insert(url.into(), records);
        self
    }
}

impl ResourceSource for StaticSource {
    fn fetch_collection(&self, url: &str) -> Result<Vec<EntityRecord>> {
        self.collections
            .get(url)
            .cloned()
            .ok_or_else(|| Error::Fetch {
                url: url.to_string(),
                reason: "no such collection".to_string(),
            })
    }
}
