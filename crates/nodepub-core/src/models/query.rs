use std::collections::BTreeMap;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Serialize, Serializer};

/// Column name to declared column type, shared by every row of one result set.
pub type ColumnTypes = Arc<BTreeMap<String, String>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    Text(String),
    Binary(Vec<u8>),
}

impl QueryValue {
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Binary(_) => None,
        }
    }

    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Text(_) => None,
            Self::Binary(bytes) => Some(bytes),
        }
    }
}

impl Serialize for QueryValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Text(text) => serializer.serialize_str(text),
            Self::Binary(bytes) => serializer.serialize_str(&STANDARD.encode(bytes)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryRow {
    types: ColumnTypes,
    values: BTreeMap<String, QueryValue>,
}

impl QueryRow {
    #[must_use]
    pub fn new(types: ColumnTypes, values: BTreeMap<String, QueryValue>) -> Self {
        Self { types, values }
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    #[must_use]
    pub fn value(&self, column: &str) -> Option<&QueryValue> {
        self.values.get(column)
    }

    #[must_use]
    pub fn column_type(&self, column: &str) -> Option<&str> {
        self.types.get(column).map(String::as_str)
    }

    #[must_use]
    pub fn column_types(&self) -> &ColumnTypes {
        &self.types
    }
}
