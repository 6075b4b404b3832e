//! Data types exchanged with callers.
//!
//! # Design
//! Rows are loosely typed on the remote side (text, numbers, booleans,
//! `{id, value}` select options, lists of linked rows), so a [`Record`] is an
//! ordered map of JSON values rather than a struct. Order matters: inbound
//! records are rebuilt in the order the table map declares its fields, and
//! outbound payloads keep the caller's order. A missing key is simply absent.

use std::fmt;

use indexmap::IndexMap;
use serde_json::Value;

/// One row, keyed by field alias or field id depending on direction.
pub type Record = IndexMap<String, Value>;

/// Query string parameters, in the order they will be encoded.
pub type QueryParams = IndexMap<String, ParamValue>;

/// A single query parameter value.
///
/// Lists are encoded as repeated keys (`include=a&include=b`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Text(String),
    Int(i64),
    List(Vec<String>),
}

impl ParamValue {
    /// The value as a positive integer, if it is one (`"3"` counts).
    pub fn as_positive(&self) -> Option<u64> {
        match self {
            ParamValue::Int(n) if *n > 0 => Some(*n as u64),
            ParamValue::Text(s) => s.parse::<u64>().ok().filter(|n| *n > 0),
            _ => None,
        }
    }

    /// Every `(key, value)` pair this parameter expands to on the wire.
    pub fn encoded_values(&self) -> Vec<String> {
        match self {
            ParamValue::Text(s) => vec![s.clone()],
            ParamValue::Int(n) => vec![n.to_string()],
            ParamValue::List(items) => items.clone(),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Int(value.into())
    }
}

/// Values past `i64::MAX` saturate.
impl From<u64> for ParamValue {
    fn from(value: u64) -> Self {
        ParamValue::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Int(value.into())
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(value: Vec<String>) -> Self {
        ParamValue::List(value)
    }
}

impl From<Vec<&str>> for ParamValue {
    fn from(value: Vec<&str>) -> Self {
        ParamValue::List(value.into_iter().map(str::to_string).collect())
    }
}

/// Server-assigned row identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RowId(String);

impl RowId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Reads a row id out of a payload value. Null, `false`, `0` and empty
    /// strings count as "no id".
    pub fn from_value(value: &Value) -> Option<RowId> {
        match value {
            Value::Number(n) if n.as_u64() == Some(0) => None,
            Value::Number(n) => Some(RowId(n.to_string())),
            Value::String(s) if s.is_empty() || s == "0" => None,
            Value::String(s) => Some(RowId(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RowId {
    fn from(value: &str) -> Self {
        RowId(value.to_string())
    }
}

impl From<String> for RowId {
    fn from(value: String) -> Self {
        RowId(value)
    }
}

impl From<u64> for RowId {
    fn from(value: u64) -> Self {
        RowId(value.to_string())
    }
}

impl From<i64> for RowId {
    fn from(value: i64) -> Self {
        RowId(value.to_string())
    }
}

impl From<u32> for RowId {
    fn from(value: u32) -> Self {
        RowId(value.to_string())
    }
}

impl From<i32> for RowId {
    fn from(value: i32) -> Self {
        RowId(value.to_string())
    }
}

/// One page of a `list` call.
#[derive(Debug, Clone, PartialEq)]
pub struct ListPage {
    pub records: Vec<Record>,
    pub page: u64,
    pub total_pages: u64,
    pub count: u64,
    pub next: bool,
    pub previous: bool,
}

/// Every row of a table, as gathered by `all`.
#[derive(Debug, Clone, PartialEq)]
pub struct AllRows {
    pub records: Vec<Record>,
    pub count: u64,
}
