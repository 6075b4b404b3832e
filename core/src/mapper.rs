//! Applies a table's field aliases to payloads, query parameters and
//! inbound records.
//!
//! # Design
//! Outbound translation is substring substitution, not exact key lookup: a
//! filter name such as `filter__name__contains` or an ordering value such as
//! `-namespace,name` embeds aliases inside a larger string. Substitution walks
//! the input once and, at every position, tries aliases longest first, so
//! `namespace` is never split by an earlier match on `name` and an emitted
//! field id is never rescanned.
//!
//! A mapper built for a table without field aliases is the identity in every
//! direction, which is how raw table and field ids keep working.

use crate::table_map::TableFields;
use crate::types::{ParamValue, QueryParams, Record, RowId};

const FILTER_PREFIX: &str = "filter__";
const FIELD_LIST_PARAMS: [&str; 3] = ["order_by", "include", "exclude"];

/// Field translation for one resolved table.
#[derive(Debug, Clone, Copy)]
pub struct FieldMapper<'a> {
    fields: Option<&'a TableFields>,
}

impl<'a> FieldMapper<'a> {
    pub fn new(fields: Option<&'a TableFields>) -> Self {
        Self { fields }
    }

    pub fn is_passthrough(&self) -> bool {
        self.fields.is_none()
    }

    /// Rekeys an inbound record from field ids to aliases.
    ///
    /// The row's own `id` comes first if it is set, then mapped fields in
    /// declaration order. Keys without an alias are dropped.
    pub fn record_alias_from_ids(&self, mut record: Record) -> Record {
        let Some(fields) = self.fields else {
            return record;
        };

        let mut mapped = Record::with_capacity(fields.len() + 1);
        // Only an id that `RowId::from_value` accepts is kept.
        if let Some(row_id) = record
            .swap_remove("id")
            .filter(|id| RowId::from_value(id).is_some())
        {
            mapped.insert("id".to_string(), row_id);
        }
        for (field_id, alias) in fields.ids() {
            if let Some(value) = record.swap_remove(field_id) {
                mapped.insert(alias.to_string(), value);
            }
        }
        mapped
    }

    /// Rekeys an outbound payload from aliases to field ids. Values are left
    /// untouched.
    pub fn fields_alias_to_ids(&self, payload: Record) -> Record {
        let Some(fields) = self.fields else {
            return payload;
        };

        payload
            .into_iter()
            .map(|(key, value)| (substitute_aliases(&key, fields.longest_first()), value))
            .collect()
    }

    /// Translates aliases embedded in `filter__<field>__<op>` names and in
    /// `order_by` / `include` / `exclude` values. Everything else passes
    /// through.
    pub fn query_params_alias_to_ids(&self, params: QueryParams) -> QueryParams {
        let Some(fields) = self.fields else {
            return params;
        };
        let pairs = fields.longest_first();

        params
            .into_iter()
            .map(|(key, value)| {
                let key = if key.starts_with(FILTER_PREFIX) {
                    let mut parts: Vec<String> = key.split("__").map(str::to_string).collect();
                    if let Some(field) = parts.get_mut(1) {
                        *field = substitute_aliases(field, pairs);
                    }
                    parts.join("__")
                } else {
                    key
                };

                let value = if FIELD_LIST_PARAMS.contains(&key.as_str()) {
                    match value {
                        ParamValue::Text(text) => {
                            ParamValue::Text(substitute_aliases(&text, pairs))
                        }
                        ParamValue::List(items) => ParamValue::List(
                            items
                                .iter()
                                .map(|item| substitute_aliases(item, pairs))
                                .collect(),
                        ),
                        other => other,
                    }
                } else {
                    value
                };

                (key, value)
            })
            .collect()
    }
}

/// Replaces every non-overlapping occurrence of each alias with its id.
///
/// `pairs` must be sorted longest alias first; at each position the first
/// matching alias wins and scanning resumes after it.
pub fn substitute_aliases(input: &str, pairs: &[(String, String)]) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    'scan: while !rest.is_empty() {
        for (alias, id) in pairs {
            if !alias.is_empty() && rest.starts_with(alias.as_str()) {
                out.push_str(id);
                rest = &rest[alias.len()..];
                continue 'scan;
            }
        }
        let mut chars = rest.chars();
        if let Some(ch) = chars.next() {
            out.push(ch);
        }
        rest = chars.as_str();
    }

    out
}
