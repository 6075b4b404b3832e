//! Bidirectional alias ↔ identifier registry for tables and their fields.
//!
//! # Design
//! The remote service names tables and fields by opaque ids (`16453`,
//! `field_75605`). Application code uses stable aliases instead. A
//! [`TableMap`] is supplied wholesale and never mutated piecemeal; replacing
//! it rebuilds every derived index.
//!
//! Per table three views are kept:
//! - alias → id, in declaration order,
//! - id → alias, in declaration order (drives inbound record order),
//! - alias → id sorted longest alias first, for substring substitution where
//!   one alias may be a prefix of another (`name` / `namespace`).

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::error::ClientError;
use crate::mapper::FieldMapper;

/// Alias for one field of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMapping {
    pub alias: String,
    pub field_id: String,
}

impl FieldMapping {
    pub fn new(alias: impl Into<String>, field_id: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            field_id: field_id.into(),
        }
    }
}

/// Alias for one table plus its field aliases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableMapping {
    pub alias: String,
    pub table_id: String,
    pub fields: Vec<FieldMapping>,
}

impl TableMapping {
    pub fn new(alias: impl Into<String>, table_id: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            table_id: table_id.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, alias: impl Into<String>, field_id: impl Into<String>) -> Self {
        self.fields.push(FieldMapping::new(alias, field_id));
        self
    }
}

/// Field indexes for a single table.
#[derive(Debug, Clone, Default)]
pub struct TableFields {
    by_alias: IndexMap<String, String>,
    by_id: IndexMap<String, String>,
    longest_first: Vec<(String, String)>,
}

impl TableFields {
    /// Indexes `fields` of one table id. A pair repeated verbatim (the same
    /// alias and id declared under two table aliases) counts once.
    fn build(table_id: &str, fields: &[FieldMapping]) -> Result<Self, ClientError> {
        let mut by_alias: IndexMap<String, String> = IndexMap::with_capacity(fields.len());
        let mut by_id: IndexMap<String, String> = IndexMap::with_capacity(fields.len());

        for field in fields {
            if field.alias.is_empty() {
                return Err(ClientError::Configuration(format!(
                    "table '{table_id}' has a field with an empty alias"
                )));
            }
            if by_alias.get(&field.alias) == Some(&field.field_id) {
                continue;
            }
            if by_alias
                .insert(field.alias.clone(), field.field_id.clone())
                .is_some()
            {
                return Err(ClientError::Configuration(format!(
                    "table '{table_id}' maps alias '{}' twice",
                    field.alias
                )));
            }
            if by_id
                .insert(field.field_id.clone(), field.alias.clone())
                .is_some()
            {
                return Err(ClientError::Configuration(format!(
                    "table '{table_id}' maps field id '{}' twice",
                    field.field_id
                )));
            }
        }

        let mut longest_first: Vec<(String, String)> = by_alias
            .iter()
            .map(|(alias, id)| (alias.clone(), id.clone()))
            .collect();
        // Stable, so equal-length aliases keep declaration order.
        longest_first.sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()));

        Ok(Self {
            by_alias,
            by_id,
            longest_first,
        })
    }

    pub fn field_id(&self, alias: &str) -> Option<&str> {
        self.by_alias.get(alias).map(String::as_str)
    }

    pub fn alias(&self, field_id: &str) -> Option<&str> {
        self.by_id.get(field_id).map(String::as_str)
    }

    /// `(field_id, alias)` pairs in declaration order.
    pub fn ids(&self) -> impl Iterator<Item = (&str, &str)> {
        self.by_id.iter().map(|(id, alias)| (id.as_str(), alias.as_str()))
    }

    /// `(alias, field_id)` pairs, longest alias first.
    pub fn longest_first(&self) -> &[(String, String)] {
        &self.longest_first
    }

    pub fn len(&self) -> usize {
        self.by_alias.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_alias.is_empty()
    }
}

/// Registry of every configured table.
///
/// Deserializes from the JSON configuration format
/// `{"Alias": [tableId, {"fieldAlias": "fieldId", ...}], ...}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(try_from = "Value")]
pub struct TableMap {
    table_ids: IndexMap<String, String>,
    fields: HashMap<String, TableFields>,
}

impl TableMap {
    /// Builds a map from explicit mappings. Several aliases may name the
    /// same table id; their field aliases are merged and must stay unique.
    pub fn new(tables: impl IntoIterator<Item = TableMapping>) -> Result<Self, ClientError> {
        let mut table_ids = IndexMap::new();
        let mut merged: IndexMap<String, Vec<FieldMapping>> = IndexMap::new();
        for table in tables {
            if table_ids
                .insert(table.alias.clone(), table.table_id.clone())
                .is_some()
            {
                return Err(ClientError::Configuration(format!(
                    "table alias '{}' is mapped more than once",
                    table.alias
                )));
            }
            merged
                .entry(table.table_id)
                .or_default()
                .extend(table.fields);
        }

        let mut fields = HashMap::with_capacity(merged.len());
        for (table_id, declared) in merged {
            let indexed = TableFields::build(&table_id, &declared)?;
            if !indexed.is_empty() {
                fields.insert(table_id, indexed);
            }
        }
        Ok(TableMap { table_ids, fields })
    }

    /// Parses the JSON configuration format.
    pub fn from_value(value: &Value) -> Result<Self, ClientError> {
        let Value::Object(entries) = value else {
            return Err(ClientError::Configuration(
                "table map must be an object of table aliases".to_string(),
            ));
        };

        let mut tables = Vec::with_capacity(entries.len());
        for (alias, details) in entries {
            let (table_id, fields) = match details.as_array().map(Vec::as_slice) {
                Some([table_id, fields]) => (table_id, fields),
                _ => {
                    return Err(ClientError::Configuration(format!(
                        "table '{alias}' must be a [tableId, {{fieldAlias: fieldId}}] pair"
                    )));
                }
            };
            let Value::Object(fields) = fields else {
                return Err(ClientError::Configuration(format!(
                    "fields of table '{alias}' must be an object"
                )));
            };

            let mut table = TableMapping::new(alias.as_str(), identifier(table_id, alias)?);
            for (field_alias, field_id) in fields {
                table = table.field(field_alias.as_str(), identifier(field_id, field_alias)?);
            }
            tables.push(table);
        }

        TableMap::new(tables)
    }

    /// Replaces the whole configuration with `other`. An empty `other`
    /// leaves the current configuration untouched.
    pub fn configure(&mut self, other: TableMap) {
        if other.is_empty() {
            return;
        }
        info!(
            tables = other.table_ids.len(),
            mapped = other.fields.len(),
            "configured table map"
        );
        *self = other;
    }

    pub fn is_empty(&self) -> bool {
        self.table_ids.is_empty()
    }

    /// Table id for a known alias, otherwise the input itself so raw ids can
    /// be passed straight through.
    pub fn resolve_table_id<'a>(&'a self, alias_or_id: &'a str) -> &'a str {
        self.table_ids
            .get(alias_or_id)
            .map(String::as_str)
            .unwrap_or(alias_or_id)
    }

    pub fn has_mapping(&self, table_id: &str) -> bool {
        self.fields.contains_key(table_id)
    }

    pub fn fields(&self, table_id: &str) -> Option<&TableFields> {
        self.fields.get(table_id)
    }

    /// Field mapper for a resolved table id. Unmapped tables get a
    /// pass-through mapper.
    pub fn mapper(&self, table_id: &str) -> FieldMapper<'_> {
        FieldMapper::new(self.fields(table_id))
    }
}

impl TryFrom<Value> for TableMap {
    type Error = ClientError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        TableMap::from_value(&value)
    }
}

fn identifier(value: &Value, owner: &str) -> Result<String, ClientError> {
    match value {
        Value::String(s) if !s.is_empty() => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(ClientError::Configuration(format!(
            "'{owner}' must map to a non-empty string or numeric id"
        ))),
    }
}
