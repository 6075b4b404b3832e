//! Synchronous client for the Baserow row API with field-alias mapping.
//!
//! # Overview
//! Baserow addresses tables and fields by opaque ids (`16453`,
//! `field_75605`). This crate lets application code use stable aliases
//! instead: a [`TableMap`] translates table and field aliases to ids on the
//! way out (payload keys, `filter__<field>__<op>` names, `order_by` /
//! `include` / `exclude` values) and field ids back to aliases on the way in.
//!
//! # Design
//! - Host-does-IO: `BaserowClient::build_*` produces an `HttpRequest`,
//!   `parse_*` consumes an `HttpResponse`. The facade methods (`get`, `list`,
//!   `all`, `create`, `update`, `delete`) chain them through a [`Transport`].
//! - The `ureq` feature (on by default) provides [`UreqTransport`].
//! - Tables without field aliases pass through untouched, so raw ids work.
//!
//! ```no_run
//! use baserow_core::{BaserowClient, ClientConfig, QueryParams, TableMap, UreqTransport};
//!
//! let table_map: TableMap = serde_json::from_str(
//!     r#"{"Contacts": [16453, {"name": "field_75605", "email": "field_75621"}]}"#,
//! )?;
//! let config = ClientConfig::new("my-token").with_table_map(table_map);
//! let client = BaserowClient::new(config, UreqTransport::default())?;
//!
//! let page = client.list("Contacts", QueryParams::from([
//!     ("order_by".to_string(), "-name".into()),
//! ]))?;
//! for record in page.records {
//!     println!("{:?}", record.get("email"));
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod mapper;
pub mod request;
pub mod table_map;
pub mod types;

pub use client::{BaserowClient, RowsPage};
pub use config::ClientConfig;
pub use error::{ClientError, ErrorRecord};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
#[cfg(feature = "ureq")]
pub use http::UreqTransport;
pub use mapper::FieldMapper;
pub use request::{Operation, RequestBuilder};
pub use table_map::{FieldMapping, TableFields, TableMap, TableMapping};
pub use types::{AllRows, ListPage, ParamValue, QueryParams, Record, RowId};
