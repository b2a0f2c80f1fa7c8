//! Partial-update compiler.
//!
//! Turns a sparse [`FieldMap`] into the body of an `UPDATE ... SET` clause with
//! `$1, $2, ...` placeholders and a value list in the same order.
//!
//! # Example
//!
//! ```ignore
//! use jobly::{ColumnAliases, FieldMap, compile_set_clause};
//!
//! let fields = FieldMap::new().with("numEmployees", 12).with("logoUrl", "http://x.io/l.png");
//! let aliases = ColumnAliases::from([("numEmployees", "num_employees"), ("logoUrl", "logo_url")]);
//!
//! let set = compile_set_clause(&fields, &aliases)?;
//! assert_eq!(set.set_cols, r#""num_employees"=$1, "logo_url"=$2"#);
//! let sql = format!("UPDATE companies SET {} WHERE handle = ${}", set.set_cols, set.next_placeholder());
//! ```

use crate::error::{JoblyError, JoblyResult};
use crate::ident;
use crate::value::SqlValue;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use tokio_postgres::types::ToSql;


/// Logical field name -> new value, in insertion order.
///
/// Insertion order decides placeholder numbering. Inserting a key that is
/// already present replaces its value and keeps its original position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMap {
    fields: IndexMap<String, SqlValue>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<SqlValue>) -> &mut Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Insert a field (consuming version).
    pub fn with(mut self, field: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.insert(field, value);
        self
    }

    /// Build from a JSON object, keeping the object's key order.
    pub fn from_json(value: serde_json::Value) -> JoblyResult<Self> {
        match value {
            serde_json::Value::Object(map) => Self::from_json_map(map),
            _ => Err(JoblyError::bad_request("Expected a JSON object")),
        }
    }

    pub fn from_json_map(map: serde_json::Map<String, serde_json::Value>) -> JoblyResult<Self> {
        let mut fields = IndexMap::with_capacity(map.len());
        for (key, value) in map {
            let value = SqlValue::from_json(&key, value)?;
            fields.insert(key, value);
        }
        Ok(Self { fields })
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&SqlValue> {
        self.fields.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Fail with a bad request if any field is outside `allowed`.
    pub fn ensure_only(&self, allowed: &[&str]) -> JoblyResult<()> {
        match self.keys().find(|k| !allowed.contains(k)) {
            Some(unknown) => Err(JoblyError::bad_request(format!(
                "Field '{unknown}' cannot be updated"
            ))),
            None => Ok(()),
        }
    }
}

impl<K, V> FromIterator<(K, V)> for FieldMap
where
    K: Into<String>,
    V: Into<SqlValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl<'de> Deserialize<'de> for FieldMap {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let map = serde_json::Map::deserialize(deserializer)?;
        Self::from_json_map(map).map_err(serde::de::Error::custom)
    }
}

/// Logical field name -> physical column name.
///
/// Fields without an entry are used verbatim as column names.
#[derive(Debug, Clone, Default)]
pub struct ColumnAliases {
    map: HashMap<String, String>,
}

impl ColumnAliases {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, column: impl Into<String>) -> &mut Self {
        self.map.insert(field.into(), column.into());
        self
    }

    pub fn with(mut self, field: impl Into<String>, column: impl Into<String>) -> Self {
        self.insert(field, column);
        self
    }

    /// Physical column for `field`.
    pub fn resolve<'a>(&'a self, field: &'a str) -> &'a str {
        self.map.get(field).map_or(field, String::as_str)
    }
}

impl<K, V> FromIterator<(K, V)> for ColumnAliases
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut aliases = Self::new();
        for (k, v) in iter {
            aliases.insert(k, v);
        }
        aliases
    }
}

impl<const N: usize> From<[(&str, &str); N]> for ColumnAliases {
    fn from(pairs: [(&str, &str); N]) -> Self {
        pairs.into_iter().collect()
    }
}

/// Compiled `SET` body: `"col"=$1, "other"=$2` plus the values to bind.
#[derive(Debug, Clone, PartialEq)]
pub struct SetClause {
    pub set_cols: String,
    pub values: Vec<SqlValue>,
}

impl SetClause {
    /// Index of the first placeholder not used by this clause.
    pub fn next_placeholder(&self) -> usize {
        self.values.len() + 1
    }

    /// Get parameter references for tokio-postgres.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.values
            .iter()
            .map(|v| v as &(dyn ToSql + Sync))
            .collect()
    }
}

/// Compile a partial update.
///
/// The i-th field of `fields` becomes `"<column>"=$i` and `values[i - 1]`.
/// Values are never written into the SQL text. Fails with
/// [`JoblyError::BadRequest`] when `fields` is empty.
pub fn compile_set_clause(fields: &FieldMap, aliases: &ColumnAliases) -> JoblyResult<SetClause> {
    if fields.is_empty() {
        return Err(JoblyError::bad_request("No data"));
    }

    let mut set_cols = String::new();
    let mut values = Vec::with_capacity(fields.len());

    for (idx, (field, value)) in fields.iter().enumerate() {
        let column = aliases.resolve(field);
        ident::validate_column(column)?;

        if idx > 0 {
            set_cols.push_str(", ");
        }
        ident::write_quoted(&mut set_cols, column);
        set_cols.push_str("=$");
        set_cols.push_str(&(idx + 1).to_string());

        values.push(value.clone());
    }

    Ok(SetClause { set_cols, values })
}
