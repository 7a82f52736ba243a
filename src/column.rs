//! Column descriptors - declarative metadata for one stored column
//!
//! A descriptor is consumed twice: once to emit its DDL fragment and once
//! per record to project the stored value. The two are independent.

use crate::normalize::normalize;
use crate::record::EntityRecord;
use crate::registry::IdentifierRegistry;
use crate::storage::schema::quote_ident;
use crate::{Error, Result};
use rusqlite::types::Value as SqlValue;
use serde_json::Value;

/// Storage types a column can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlType {
    Text,
    Integer,
    Real,
}

impl SqlType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SqlType::Text => "TEXT",
            SqlType::Integer => "INTEGER",
            SqlType::Real => "REAL",
        }
    }
}

impl std::fmt::Display for SqlType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Declarative description of one entity-table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    /// Column name in the store
    pub name: &'static str,
    /// Declared storage type
    pub sql_type: SqlType,
    /// Field name in the upstream record
    pub source_key: &'static str,
    /// Source always supplies the field; no sentinel filtering
    pub not_null: bool,
    /// Table whose primary key this column references
    pub references: Option<&'static str>,
    /// Value is a source identifier to swap for its surrogate key
    pub map_id: bool,
}

impl Column {
    /// Nullable TEXT column read from the field of the same name
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            sql_type: SqlType::Text,
            source_key: name,
            not_null: false,
            references: None,
            map_id: false,
        }
    }

    /// NOT NULL TEXT column read from the field of the same name
    pub const fn required(name: &'static str) -> Self {
        Self {
            not_null: true,
            ..Self::new(name)
        }
    }

    /// Column holding the surrogate key of a row in `table`
    pub const fn foreign(name: &'static str, table: &'static str) -> Self {
        Self {
            references: Some(table),
            map_id: true,
            ..Self::new(name)
        }
    }

    /// DDL fragment: `"name" TYPE [NOT NULL] [REFERENCES "t" ("id") ON UPDATE CASCADE]`
    pub fn sql_def(&self) -> String {
        let mut def = format!("{} {}", quote_ident(self.name), self.sql_type.as_str());
        if self.not_null {
            def.push_str(" NOT NULL");
        }
        if let Some(table) = self.references {
            def.push_str(&format!(
                " REFERENCES {} ({}) ON UPDATE CASCADE",
                quote_ident(table),
                quote_ident("id")
            ));
        }
        def
    }

    /// Project the stored value of this column for one record
    pub fn value(&self, record: &EntityRecord, registry: &mut IdentifierRegistry) -> Result<SqlValue> {
        let raw = record.field(self.source_key);

        let value = if self.not_null {
            match raw {
                Some(Value::Null) | None => {
                    return Err(Error::DataIntegrity(format!(
                        "{}: missing required field '{}'",
                        record.url, self.source_key
                    )));
                }
                Some(v) => Some(v),
            }
        } else {
            raw.and_then(normalize)
        };

        let value = match value {
            Some(v) if self.map_id => Some(self.remap(record, v, registry)?),
            other => other,
        };

        Ok(value.map(to_sql_value).unwrap_or(SqlValue::Null))
    }

    fn remap(&self, record: &EntityRecord, value: Value, registry: &mut IdentifierRegistry) -> Result<Value> {
        match value {
            Value::String(source_id) => Ok(Value::String(registry.resolve(&source_id).to_key_string())),
            other => Err(Error::DataIntegrity(format!(
                "{}: field '{}' should hold a source identifier, got {}",
                record.url, self.source_key, other
            ))),
        }
    }
}

/// Convert a JSON value into a storable SQLite value
pub fn to_sql_value(value: Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(b as i64),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => SqlValue::Real(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => SqlValue::Text(s),
        nested @ (Value::Array(_) | Value::Object(_)) => SqlValue::Text(nested.to_string()),
    }
}
