//! Turns an operation, a resolved target path and its data into an
//! [`HttpRequest`].
//!
//! # Design
//! Reads (`GET`) and deletes (`DELETE`) carry their parameters in a
//! form-encoded query string; creates (`POST`) and updates (`PATCH`) carry a
//! JSON body. Every request gets the JSON content type and the `Token`
//! authorization header.
//!
//! The remote service reinterprets quoted integers as text, which breaks
//! writes to select and link-row fields. Before encoding a body, string
//! values that are integer literals are therefore turned into JSON numbers,
//! element-wise for lists. The accepted grammar is `-?(0|[1-9][0-9]*)` within
//! `i64` range; leading zeros, decimals and exponents stay strings.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::Value;
use url::{form_urlencoded, Url};

use crate::error::ClientError;
use crate::http::{HttpMethod, HttpRequest};
use crate::types::{QueryParams, Record};

const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// The kinds of call the client makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Get,
    List,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn method(self) -> HttpMethod {
        match self {
            Operation::Get | Operation::List => HttpMethod::Get,
            Operation::Create => HttpMethod::Post,
            Operation::Update => HttpMethod::Patch,
            Operation::Delete => HttpMethod::Delete,
        }
    }

    fn has_body(self) -> bool {
        matches!(self, Operation::Create | Operation::Update)
    }
}

/// Builds requests against one API root with one key.
#[derive(Debug, Clone, Copy)]
pub struct RequestBuilder<'a> {
    api_url: &'a str,
    api_key: &'a str,
}

impl<'a> RequestBuilder<'a> {
    pub fn new(api_url: &'a str, api_key: &'a str) -> Self {
        Self { api_url, api_key }
    }

    /// Builds the request for `operation` on `path` (`"{table}"` or
    /// `"{table}/{row}"`).
    ///
    /// `data` is only encoded for `Create` and `Update`; a missing payload
    /// encodes as `{}`. Non-empty `params` are appended as a query string for
    /// every operation.
    pub fn build(
        &self,
        operation: Operation,
        path: &str,
        params: &QueryParams,
        data: Option<&Record>,
    ) -> Result<HttpRequest, ClientError> {
        let url = self.url(path, params)?;

        let body = if operation.has_body() {
            let coerced = data.map(coerce_integer_strings).unwrap_or_default();
            let json = serde_json::to_string(&coerced)
                .map_err(|e| ClientError::Serialization(e.to_string()))?;
            Some(json)
        } else {
            None
        };

        Ok(HttpRequest {
            method: operation.method(),
            url,
            headers: vec![
                ("Content-Type".to_string(), "application/json".to_string()),
                ("Authorization".to_string(), format!("Token {}", self.api_key)),
            ],
            body,
        })
    }

    fn url(&self, path: &str, params: &QueryParams) -> Result<String, ClientError> {
        let base = Url::parse(self.api_url).map_err(|e| {
            ClientError::Configuration(format!("invalid API url '{}': {e}", self.api_url))
        })?;
        if base.cannot_be_a_base() {
            return Err(ClientError::Configuration(format!(
                "API url '{}' cannot take a path",
                self.api_url
            )));
        }

        // Assembled as text: `Url` would drop or resolve `.`/`..` segments.
        let mut url = self.api_url.trim_end_matches('/').to_string();
        for segment in path.split('/') {
            url.push('/');
            url.push_str(&encode_segment(segment));
        }
        // The remote API requires a trailing slash.
        url.push('/');

        let pairs: Vec<(&str, String)> = params
            .iter()
            .flat_map(|(key, value)| {
                value
                    .encoded_values()
                    .into_iter()
                    .map(move |v| (key.as_str(), v))
            })
            .collect();
        if !pairs.is_empty() {
            let query = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(pairs)
                .finish();
            url.push('?');
            url.push_str(&query);
        }

        Ok(url)
    }
}

/// Percent-encodes one path segment, keeping only RFC 3986 unreserved
/// characters. Dot segments are encoded too so they address a row literally.
pub fn encode_segment(segment: &str) -> String {
    match segment {
        "." => "%2E".to_string(),
        ".." => "%2E%2E".to_string(),
        _ => utf8_percent_encode(segment, PATH_SEGMENT).to_string(),
    }
}

/// Copy of `record` with integer-literal strings turned into JSON numbers.
pub fn coerce_integer_strings(record: &Record) -> Record {
    record
        .iter()
        .map(|(key, value)| {
            let value = match value {
                Value::Array(items) => Value::Array(items.iter().map(coerce_scalar).collect()),
                other => coerce_scalar(other),
            };
            (key.clone(), value)
        })
        .collect()
}

fn coerce_scalar(value: &Value) -> Value {
    match value {
        Value::String(s) => parse_integer_literal(s).map_or_else(|| value.clone(), Value::from),
        other => other.clone(),
    }
}

/// Parses `-?(0|[1-9][0-9]*)` into an `i64`.
pub fn parse_integer_literal(s: &str) -> Option<i64> {
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if digits.starts_with('0') && (digits.len() > 1 || negative) {
        return None;
    }
    s.parse().ok()
}
