//! Entity records as delivered by the upstream catalog
//!
//! Every record carries its origin URL (the source identifier) and an
//! ordered map of the remaining fields.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One item of a fetched resource collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    /// Origin URL, unique per record upstream
    pub url: String,
    /// All other fields, keyed by upstream name
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl EntityRecord {
    /// Create a record from its source identifier and field map
    pub fn new(url: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            url: url.into(),
            fields,
        }
    }

    /// Decode a record from an upstream JSON object
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(mut fields) => match fields.remove("url") {
                Some(Value::String(url)) => Ok(Self { url, fields }),
                Some(other) => Err(Error::DataIntegrity(format!(
                    "record url must be a string, got {}",
                    other
                ))),
                None => Err(Error::DataIntegrity("record has no url field".to_string())),
            },
            other => Err(Error::DataIntegrity(format!(
                "expected a JSON object record, got {}",
                other
            ))),
        }
    }

    /// Look up a field by its upstream name. `url` resolves to the source identifier.
    pub fn field(&self, key: &str) -> Option<Value> {
        if key == "url" {
            return Some(Value::String(self.url.clone()));
        }
        self.fields.get(key).cloned()
    }

    /// Read a collection-valued field of source identifiers.
    ///
    /// A missing field (or JSON null) yields an empty list.
    pub fn id_list(&self, key: &str) -> Result<Vec<String>> {
        match self.fields.get(key) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(id) => Ok(id.clone()),
                    other => Err(Error::DataIntegrity(format!(
                        "{}: field '{}' contains non-string identifier {}",
                        self.url, key, other
                    ))),
                })
                .collect(),
            Some(other) => Err(Error::DataIntegrity(format!(
                "{}: field '{}' is not a list of identifiers: {}",
                self.url, key, other
            ))),
        }
    }
}
