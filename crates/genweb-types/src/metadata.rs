//! Metadata record payloads
//!
//! A metadata record is a flat JSON object. The editor knows a fixed set of
//! field names, but the server may add more at any time, so the record keeps
//! the raw object instead of a closed struct.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Well-known metadata field names.
pub mod fields {
    pub const ID: &str = "id";
    pub const TYPE: &str = "type";
    pub const TITLE: &str = "title";
    pub const PATH: &str = "path";
    pub const FILE: &str = "file";
    pub const MOD_DATE: &str = "mod_date";
    pub const PEOPLE: &str = "people";
    pub const CAPTION: &str = "caption";
    pub const FOLDER: &str = "folder";
    pub const HEIGHT: &str = "height";
    pub const WIDTH: &str = "width";
    pub const CONTENTS: &str = "contents";
    pub const REFERENCES: &str = "references";
    pub const ORIGINAL: &str = "original";

    /// Fields whose wire value is an array of strings.
    pub const LIST_FIELDS: [&str; 2] = [PEOPLE, REFERENCES];

    pub fn is_list_field(name: &str) -> bool {
        LIST_FIELDS.contains(&name)
    }
}

/// One metadata record as sent to and received from `/api/v1/metadata/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetadataRecord(Map<String, Value>);

impl MetadataRecord {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn id(&self) -> Option<&str> {
        self.0.get(fields::ID).and_then(Value::as_str)
    }

    pub fn record_type(&self) -> Option<&str> {
        self.0.get(fields::TYPE).and_then(Value::as_str)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// String view of a scalar field (`None` for missing, arrays and objects)
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    /// Items of a list field; non-string items are skipped
    pub fn get_list(&self, field: &str) -> Vec<&str> {
        match self.0.get(field) {
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(field.into(), value.into())
    }

    pub fn contains_field(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for MetadataRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for MetadataRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
