//! Client configuration.
//!
//! A [`ClientConfig`] can be written out in code, deserialized from JSON, or
//! read from `BASEROW_*` environment variables. Validation (blank key, bad
//! url) happens when the client is built from it.

use serde::Deserialize;

use crate::error::ClientError;
use crate::table_map::TableMap;

pub const DEFAULT_API_URL: &str = "https://api.baserow.io/api/database/rows/table";

pub const ENV_API_KEY: &str = "BASEROW_API_KEY";
pub const ENV_API_URL: &str = "BASEROW_API_URL";
pub const ENV_DEBUG: &str = "BASEROW_DEBUG";
pub const ENV_TABLE_MAP: &str = "BASEROW_TABLE_MAP";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub api_key: String,
    pub api_url: String,
    pub table_map: TableMap,
    /// Halt on the first per-call error. Development only.
    pub debug: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_url: DEFAULT_API_URL.to_string(),
            table_map: TableMap::default(),
            debug: false,
        }
    }
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_table_map(mut self, table_map: TableMap) -> Self {
        self.table_map = table_map;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ClientError> {
        serde_json::from_str(raw).map_err(|e| ClientError::Configuration(e.to_string()))
    }

    /// Reads `BASEROW_API_KEY`, `BASEROW_API_URL`, `BASEROW_DEBUG` and
    /// `BASEROW_TABLE_MAP` (JSON). Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ClientError> {
        let mut config = ClientConfig::default();
        if let Some(key) = lookup(ENV_API_KEY) {
            config.api_key = key;
        }
        if let Some(url) = lookup(ENV_API_URL) {
            config.api_url = url;
        }
        if let Some(debug) = lookup(ENV_DEBUG) {
            config.debug = matches!(debug.trim(), "1" | "true" | "yes" | "on");
        }
        if let Some(raw) = lookup(ENV_TABLE_MAP) {
            let value: serde_json::Value = serde_json::from_str(&raw)
                .map_err(|e| ClientError::Configuration(format!("{ENV_TABLE_MAP}: {e}")))?;
            config.table_map = TableMap::from_value(&value)?;
        }
        Ok(config)
    }
}
