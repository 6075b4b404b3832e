//! Error types for the Baserow client.
//!
//! # Design
//! `Configuration` is the only variant raised at construction or setter time.
//! Every other variant is a per-call failure: it is returned from the facade
//! operation and also appended to the client's error log as an
//! [`ErrorRecord`], using the same `error`/`detail` pair the remote service
//! puts in its own error bodies.

use std::fmt;

use thiserror::Error;

/// Errors returned by `BaserowClient`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Missing or invalid client configuration (blank key, bad table map).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// `create` was called without any field data.
    #[error("no column data provided for create action")]
    MissingSaveData,

    /// `update` was called without any field data.
    #[error("no column data provided for update action")]
    MissingUpdateData,

    /// No row id was given and none could be taken from the payload.
    #[error("no row ID provided")]
    MissingRowId,

    /// The remote service answered with an `error`/`detail` body.
    #[error("{error}: {detail}")]
    Remote { error: String, detail: String },

    /// Non-2xx status whose body carried no remote error.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The response body could not be parsed as JSON of the expected shape.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The transport could not complete the round-trip.
    #[error("transport failed: {0}")]
    Transport(String),
}

impl ClientError {
    /// Stable error code, in the remote service's `ERROR_*` style.
    pub fn code(&self) -> &str {
        match self {
            ClientError::Configuration(_) => "ERROR_CONFIGURATION",
            ClientError::MissingSaveData => "ERROR_MISSING_SAVE_DATA",
            ClientError::MissingUpdateData => "ERROR_MISSING_UPDATE_DATA",
            ClientError::MissingRowId => "ERROR_MISSING_ROW_ID",
            ClientError::Remote { error, .. } => error,
            ClientError::Http { .. } => "ERROR_HTTP",
            ClientError::Deserialization(_) => "ERROR_DESERIALIZATION",
            ClientError::Serialization(_) => "ERROR_SERIALIZATION",
            ClientError::Transport(_) => "ERROR_TRANSPORT",
        }
    }

    pub fn detail(&self) -> String {
        match self {
            ClientError::MissingSaveData => "No column data provided for create action".to_string(),
            ClientError::MissingUpdateData => {
                "No column data provided for update action".to_string()
            }
            ClientError::MissingRowId => "No row ID provided".to_string(),
            ClientError::Remote { detail, .. } => detail.clone(),
            ClientError::Configuration(msg)
            | ClientError::Deserialization(msg)
            | ClientError::Serialization(msg)
            | ClientError::Transport(msg) => msg.clone(),
            ClientError::Http { status, body } => format!("HTTP {status}: {body}"),
        }
    }

    pub fn to_record(&self) -> ErrorRecord {
        ErrorRecord {
            error: self.code().to_string(),
            detail: self.detail(),
        }
    }
}

/// One entry of the client's error log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorRecord {
    pub error: String,
    pub detail: String,
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error, self.detail)
    }
}
