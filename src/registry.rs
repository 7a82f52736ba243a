//! Identifier registry - run-scoped surrogate keys for source identifiers
//!
//! Source identifiers are origin URLs, which are unstable across catalog
//! mirrors. Each one is bound to a fresh v4 UUID the first time it is seen;
//! the binding holds for the rest of the run and is discarded afterwards.

use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Surrogate primary key substituted for a source identifier in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurrogateKey(Uuid);

impl SurrogateKey {
    /// Generate a new random key
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Hyphenated lowercase text form, as stored in the database
    pub fn to_key_string(&self) -> String {
        self.0.hyphenated().to_string()
    }
}

impl fmt::Display for SurrogateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Append-only map from source identifier to surrogate key.
#[derive(Debug, Default)]
pub struct IdentifierRegistry {
    keys: HashMap<String, SurrogateKey>,
}

impl IdentifierRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the key bound to `source_id`, binding a new one on first use
    pub fn resolve(&mut self, source_id: &str) -> SurrogateKey {
        if let Some(key) = self.keys.get(source_id) {
            return *key;
        }
        let key = SurrogateKey::generate();
        self.keys.insert(source_id.to_string(), key);
        key
    }

    /// Look up an existing binding without creating one
    pub fn get(&self, source_id: &str) -> Option<SurrogateKey> {
        self.keys.get(source_id).copied()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
