//! Row operations against the Baserow REST API.
//!
//! # Design
//! Every operation is split the same way: a `build_*` method resolves the
//! table alias, maps field aliases to ids and produces an `HttpRequest`; the
//! transport executes it; a `parse_*` method turns the `HttpResponse` back
//! into alias-keyed records. Callers that do their own I/O can use the
//! `build_*` / `parse_*` halves directly.
//!
//! Per-call failures are returned as `Err` and also appended to a log owned
//! by this client instance, readable through [`BaserowClient::last_error`].
//! In debug mode the first such failure halts the program.

use std::sync::{Mutex, PoisonError};

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ClientError, ErrorRecord};
use crate::http::{HttpRequest, HttpResponse, Transport};
use crate::request::{Operation, RequestBuilder};
use crate::table_map::TableMap;
use crate::types::{AllRows, ListPage, ParamValue, QueryParams, Record, RowId};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PAGE_SIZE: u64 = 100;
/// Largest page the remote API will serve.
pub const MAX_PAGE_SIZE: u64 = 200;

/// One page of rows as returned by the list endpoint, already mapped.
#[derive(Debug, Clone, PartialEq)]
pub struct RowsPage {
    pub records: Vec<Record>,
    pub count: u64,
    pub next: bool,
    pub previous: bool,
}

#[derive(Deserialize)]
struct RowsBody {
    #[serde(default)]
    results: Vec<Record>,
    #[serde(default)]
    count: u64,
    #[serde(default)]
    next: Option<String>,
    #[serde(default)]
    previous: Option<String>,
}

/// Client for the row endpoints of one Baserow instance.
#[derive(Debug)]
pub struct BaserowClient<T> {
    api_key: String,
    api_url: String,
    table_map: TableMap,
    debug: bool,
    transport: T,
    errors: Mutex<Vec<ErrorRecord>>,
}

impl<T> BaserowClient<T> {
    pub fn new(config: ClientConfig, transport: T) -> Result<Self, ClientError> {
        let mut client = Self {
            api_key: String::new(),
            api_url: String::new(),
            table_map: TableMap::default(),
            debug: config.debug,
            transport,
            errors: Mutex::new(Vec::new()),
        };
        client.set_key(config.api_key)?;
        client.set_api_url(&config.api_url)?;
        client.set_table_map(config.table_map);
        Ok(client)
    }

    pub fn set_key(&mut self, key: impl Into<String>) -> Result<(), ClientError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(ClientError::Configuration(
                "API key cannot be blank".to_string(),
            ));
        }
        self.api_key = key;
        Ok(())
    }

    pub fn key(&self) -> &str {
        &self.api_key
    }

    pub fn set_api_url(&mut self, url: &str) -> Result<(), ClientError> {
        let url = url.trim().trim_end_matches('/');
        if url.is_empty() {
            return Err(ClientError::Configuration(
                "API url cannot be blank".to_string(),
            ));
        }
        let parsed =
            Url::parse(url).map_err(|e| ClientError::Configuration(format!("API url: {e}")))?;
        if parsed.cannot_be_a_base() {
            return Err(ClientError::Configuration(format!(
                "API url '{url}' cannot take a path"
            )));
        }
        self.api_url = url.to_string();
        Ok(())
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    /// Replaces the table map wholesale. An empty map is ignored.
    pub fn set_table_map(&mut self, table_map: TableMap) {
        self.table_map.configure(table_map);
    }

    pub fn table_map(&self) -> &TableMap {
        &self.table_map
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Pops the most recent error from the log.
    pub fn last_error(&self) -> Option<ErrorRecord> {
        self.error_log().pop()
    }

    /// Drains the whole log, oldest first.
    pub fn errors(&self) -> Vec<ErrorRecord> {
        std::mem::take(&mut *self.error_log())
    }

    fn error_log(&self) -> std::sync::MutexGuard<'_, Vec<ErrorRecord>> {
        self.errors.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn request_builder(&self) -> RequestBuilder<'_> {
        RequestBuilder::new(&self.api_url, &self.api_key)
    }

    fn track<R>(&self, op: impl FnOnce() -> Result<R, ClientError>) -> Result<R, ClientError> {
        op().inspect_err(|err| {
            let record = err.to_record();
            warn!(error = %record.error, detail = %record.detail, "request failed");
            self.error_log().push(record.clone());
            if self.debug {
                error!(error = %record.error, detail = %record.detail, "halting (debug mode)");
                panic!("baserow: {record}");
            }
        })
    }

    // -----------------------------------------------------------------------
    // Request building
    // -----------------------------------------------------------------------

    pub fn build_get(&self, table: &str, row_id: &RowId) -> Result<HttpRequest, ClientError> {
        let table_id = self.table_map.resolve_table_id(table);
        self.request_builder().build(
            Operation::Get,
            &format!("{table_id}/{row_id}"),
            &QueryParams::new(),
            None,
        )
    }

    pub fn build_list(&self, table: &str, params: QueryParams) -> Result<HttpRequest, ClientError> {
        let table_id = self.table_map.resolve_table_id(table);
        let params = self.table_map.mapper(table_id).query_params_alias_to_ids(params);
        self.request_builder()
            .build(Operation::List, table_id, &params, None)
    }

    pub fn build_create(&self, table: &str, fields: Record) -> Result<HttpRequest, ClientError> {
        if fields.is_empty() {
            return Err(ClientError::MissingSaveData);
        }
        let table_id = self.table_map.resolve_table_id(table);
        let fields = self.table_map.mapper(table_id).fields_alias_to_ids(fields);
        self.request_builder()
            .build(Operation::Create, table_id, &QueryParams::new(), Some(&fields))
    }

    /// Builds a PATCH for one row. Without an explicit `row_id` the payload's
    /// `id` is used; `id` is never sent as a field.
    pub fn build_update(
        &self,
        table: &str,
        fields: Record,
        row_id: Option<RowId>,
    ) -> Result<HttpRequest, ClientError> {
        if fields.is_empty() {
            return Err(ClientError::MissingUpdateData);
        }
        let table_id = self.table_map.resolve_table_id(table);
        let mut fields = self.table_map.mapper(table_id).fields_alias_to_ids(fields);

        let payload_id = fields
            .shift_remove("id")
            .and_then(|value| RowId::from_value(&value));
        let row_id = row_id
            .filter(|id| !id.as_str().is_empty())
            .or(payload_id)
            .ok_or(ClientError::MissingRowId)?;

        self.request_builder().build(
            Operation::Update,
            &format!("{table_id}/{row_id}"),
            &QueryParams::new(),
            Some(&fields),
        )
    }

    pub fn build_delete(&self, table: &str, row_id: &RowId) -> Result<HttpRequest, ClientError> {
        if row_id.as_str().is_empty() {
            return Err(ClientError::MissingRowId);
        }
        let table_id = self.table_map.resolve_table_id(table);
        self.request_builder().build(
            Operation::Delete,
            &format!("{table_id}/{row_id}"),
            &QueryParams::new(),
            None,
        )
    }

    // -----------------------------------------------------------------------
    // Response parsing
    // -----------------------------------------------------------------------

    /// Parses a single-row response and maps it to aliases.
    pub fn parse_record(&self, table: &str, response: HttpResponse) -> Result<Record, ClientError> {
        let table_id = self.table_map.resolve_table_id(table);
        match parse_body(&response)? {
            Some(Value::Object(fields)) => Ok(self
                .table_map
                .mapper(table_id)
                .record_alias_from_ids(fields.into_iter().collect())),
            _ => Err(ClientError::Deserialization(
                "expected a JSON object for a row".to_string(),
            )),
        }
    }

    /// Parses a list response and maps every row to aliases.
    pub fn parse_rows(&self, table: &str, response: HttpResponse) -> Result<RowsPage, ClientError> {
        let table_id = self.table_map.resolve_table_id(table);
        let body = parse_body(&response)?.ok_or_else(|| {
            ClientError::Deserialization("expected a JSON object for a row list".to_string())
        })?;
        let body: RowsBody = serde_json::from_value(body)
            .map_err(|e| ClientError::Deserialization(e.to_string()))?;

        let mapper = self.table_map.mapper(table_id);
        Ok(RowsPage {
            records: body
                .results
                .into_iter()
                .map(|row| mapper.record_alias_from_ids(row))
                .collect(),
            count: body.count,
            next: body.next.is_some_and(|link| !link.is_empty()),
            previous: body.previous.is_some_and(|link| !link.is_empty()),
        })
    }

    /// Checks a delete response; success carries no payload.
    pub fn parse_delete(&self, response: HttpResponse) -> Result<(), ClientError> {
        parse_body(&response).map(|_| ())
    }
}

impl<T: Transport> BaserowClient<T> {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ClientError> {
        debug!(method = request.method.as_str(), url = %request.url, "sending request");
        let response = self.transport.execute(request)?;
        debug!(status = response.status, "received response");
        Ok(response)
    }

    /// Fetches one row.
    pub fn get(&self, table: &str, row_id: impl Into<RowId>) -> Result<Record, ClientError> {
        let row_id = row_id.into();
        self.track(|| {
            let request = self.build_get(table, &row_id)?;
            self.parse_record(table, self.execute(&request)?)
        })
    }

    /// Fetches one page of rows. `page` defaults to 1 and `size` to 100.
    pub fn list(&self, table: &str, params: QueryParams) -> Result<ListPage, ClientError> {
        self.track(|| {
            let page = params
                .get("page")
                .and_then(ParamValue::as_positive)
                .unwrap_or(DEFAULT_PAGE);
            let size = params
                .get("size")
                .and_then(ParamValue::as_positive)
                .unwrap_or(DEFAULT_PAGE_SIZE);

            let request = self.build_list(table, params)?;
            let rows = self.parse_rows(table, self.execute(&request)?)?;

            Ok(ListPage {
                records: rows.records,
                page,
                total_pages: rows.count.div_ceil(size),
                count: rows.count,
                next: rows.next,
                previous: rows.previous,
            })
        })
    }

    /// Fetches every row by walking pages of the maximum size until the
    /// server reports no next page.
    pub fn all(&self, table: &str, params: QueryParams) -> Result<AllRows, ClientError> {
        self.track(|| {
            let table_id = self.table_map.resolve_table_id(table);
            let mut params = self
                .table_map
                .mapper(table_id)
                .query_params_alias_to_ids(params);
            params.insert("size".to_string(), ParamValue::from(MAX_PAGE_SIZE));

            let builder = self.request_builder();
            let mut records = Vec::new();
            let mut page = DEFAULT_PAGE;
            loop {
                params.insert("page".to_string(), ParamValue::from(page));
                let request = builder.build(Operation::List, table_id, &params, None)?;
                let rows = self.parse_rows(table, self.execute(&request)?)?;
                records.extend(rows.records);
                if !rows.next {
                    return Ok(AllRows {
                        records,
                        count: rows.count,
                    });
                }
                page += 1;
            }
        })
    }

    /// Creates a row and returns it as stored.
    pub fn create(&self, table: &str, fields: Record) -> Result<Record, ClientError> {
        self.track(|| {
            let request = self.build_create(table, fields)?;
            self.parse_record(table, self.execute(&request)?)
        })
    }

    /// Updates a row and returns it as stored.
    pub fn update(
        &self,
        table: &str,
        fields: Record,
        row_id: Option<RowId>,
    ) -> Result<Record, ClientError> {
        self.track(|| {
            let request = self.build_update(table, fields, row_id)?;
            self.parse_record(table, self.execute(&request)?)
        })
    }

    /// Deletes a row and returns its id.
    pub fn delete(&self, table: &str, row_id: impl Into<RowId>) -> Result<RowId, ClientError> {
        let row_id = row_id.into();
        self.track(|| {
            let request = self.build_delete(table, &row_id)?;
            self.parse_delete(self.execute(&request)?)?;
            Ok(row_id)
        })
    }
}

/// Reads a response body, surfacing remote `error`/`detail` bodies and
/// non-2xx statuses. An empty 2xx body (a delete's 204) parses to `None`.
fn parse_body(response: &HttpResponse) -> Result<Option<Value>, ClientError> {
    let http_error = || ClientError::Http {
        status: response.status,
        body: response.body.clone(),
    };

    let raw = response.body.trim();
    if raw.is_empty() {
        return if response.is_success() {
            Ok(None)
        } else {
            Err(http_error())
        };
    }

    let value: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(_) if !response.is_success() => return Err(http_error()),
        Err(e) => return Err(ClientError::Deserialization(e.to_string())),
    };

    if let Some(code) = value.get("error") {
        return Err(ClientError::Remote {
            error: text_of(code),
            detail: value.get("detail").map(text_of).unwrap_or_default(),
        });
    }
    if !response.is_success() {
        return Err(http_error());
    }
    Ok(Some(value))
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::http::HttpMethod;
    use crate::table_map::TableMapping;

    const API_URL: &str = "http://localhost:3000/api/database/rows/table";

    /// Replays canned responses and remembers every request it was given.
    #[derive(Debug, Default)]
    struct ScriptedTransport {
        responses: RefCell<VecDeque<HttpResponse>>,
        requests: RefCell<Vec<HttpRequest>>,
    }

    impl ScriptedTransport {
        fn reply(self, status: u16, body: Value) -> Self {
            self.responses.borrow_mut().push_back(HttpResponse {
                status,
                headers: Vec::new(),
                body: body.to_string(),
            });
            self
        }

        fn reply_empty(self, status: u16) -> Self {
            self.responses.borrow_mut().push_back(HttpResponse {
                status,
                headers: Vec::new(),
                body: String::new(),
            });
            self
        }

        fn requests(&self) -> Vec<HttpRequest> {
            self.requests.borrow().clone()
        }
    }

    impl Transport for ScriptedTransport {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ClientError> {
            self.requests.borrow_mut().push(request.clone());
            self.responses
                .borrow_mut()
                .pop_front()
                .ok_or_else(|| ClientError::Transport("no scripted response left".to_string()))
        }
    }

    fn table_map() -> TableMap {
        TableMap::new([TableMapping::new("People", "16453")
            .field("name", "field_1")
            .field("namespace", "field_2")
            .field("status", "field_3")])
        .unwrap()
    }

    fn client(transport: ScriptedTransport) -> BaserowClient<ScriptedTransport> {
        let config = ClientConfig::new("secret")
            .with_api_url(format!("{API_URL}/"))
            .with_table_map(table_map());
        BaserowClient::new(config, transport).unwrap()
    }

    fn body_of(request: &HttpRequest) -> Value {
        serde_json::from_str(request.body.as_deref().unwrap()).unwrap()
    }

    fn rows(count: u64, ids: std::ops::Range<u64>, next: bool) -> Value {
        let results: Vec<Value> = ids
            .map(|id| json!({"id": id, "field_1": format!("row {id}")}))
            .collect();
        json!({
            "count": count,
            "next": if next { json!("http://next") } else { Value::Null },
            "previous": null,
            "results": results,
        })
    }

    #[test]
    fn blank_key_is_rejected() {
        let err = BaserowClient::new(ClientConfig::default(), ScriptedTransport::default())
            .unwrap_err();
        assert_eq!(
            err,
            ClientError::Configuration("API key cannot be blank".to_string())
        );

        let mut client = client(ScriptedTransport::default());
        assert!(client.set_key("").is_err());
        client.set_key("other").unwrap();
        assert_eq!(client.key(), "other");
    }

    #[test]
    fn api_url_is_trimmed_and_validated() {
        let mut client = client(ScriptedTransport::default());
        assert_eq!(client.api_url(), API_URL);
        assert!(matches!(
            client.set_api_url("   "),
            Err(ClientError::Configuration(_))
        ));
        assert!(matches!(
            client.set_api_url("mailto:someone"),
            Err(ClientError::Configuration(_))
        ));
    }

    #[test]
    fn get_maps_record_to_aliases() {
        let transport = ScriptedTransport::default().reply(
            200,
            json!({
                "id": 1,
                "field_3": {"id": 2307, "value": "Option 1"},
                "field_1": "Test Row 1",
                "field_99": 5,
            }),
        );
        let client = client(transport);

        let record = client.get("People", 1).unwrap();

        assert_eq!(
            record.into_iter().collect::<Vec<_>>(),
            vec![
                ("id".to_string(), json!(1)),
                ("name".to_string(), json!("Test Row 1")),
                ("status".to_string(), json!({"id": 2307, "value": "Option 1"})),
            ]
        );
        let requests = client.transport().requests();
        assert_eq!(requests[0].method, HttpMethod::Get);
        assert_eq!(requests[0].url, format!("{API_URL}/16453/1/"));
        assert_eq!(requests[0].header("authorization"), Some("Token secret"));
    }

    #[test]
    fn raw_table_ids_bypass_mapping() {
        let transport = ScriptedTransport::default().reply(200, json!({"id": 3, "field_1": "x"}));
        let client = client(transport);

        let record = client.get("999", 3).unwrap();

        assert_eq!(record.get("field_1"), Some(&json!("x")));
        assert_eq!(client.transport().requests()[0].url, format!("{API_URL}/999/3/"));
    }

    #[test]
    fn list_maps_params_and_computes_pages() {
        let transport = ScriptedTransport::default().reply(200, rows(250, 1..3, true));
        let client = client(transport);
        let params = QueryParams::from([
            ("filter__namespace__equal".to_string(), ParamValue::from("x")),
            ("order_by".to_string(), ParamValue::from("-name")),
        ]);

        let page = client.list("People", params).unwrap();

        assert_eq!(page.page, 1);
        assert_eq!(page.count, 250);
        assert_eq!(page.total_pages, 3);
        assert!(page.next);
        assert!(!page.previous);
        assert_eq!(page.records.len(), 2);
        assert_eq!(page.records[0].get("name"), Some(&json!("row 1")));
        assert_eq!(
            client.transport().requests()[0].url,
            format!("{API_URL}/16453/?filter__field_2__equal=x&order_by=-field_1")
        );
    }

    #[test]
    fn list_honours_explicit_page_and_size() {
        let transport = ScriptedTransport::default().reply(200, rows(45, 0..0, false));
        let client = client(transport);
        let params = QueryParams::from([
            ("page".to_string(), ParamValue::from(2)),
            ("size".to_string(), ParamValue::from("20")),
        ]);

        let page = client.list("People", params).unwrap();

        assert_eq!(page.page, 2);
        assert_eq!(page.total_pages, 3);
        assert!(page.records.is_empty());
    }

    #[test]
    fn all_walks_pages_until_no_next_link() {
        let transport = ScriptedTransport::default()
            .reply(200, rows(401, 0..200, true))
            .reply(200, rows(401, 200..400, true))
            .reply(200, rows(401, 400..401, false));
        let client = client(transport);

        let all = client.all("People", QueryParams::new()).unwrap();

        assert_eq!(all.count, 401);
        assert_eq!(all.records.len(), 401);
        let urls: Vec<String> = client
            .transport()
            .requests()
            .into_iter()
            .map(|r| r.url)
            .collect();
        assert_eq!(
            urls,
            vec![
                format!("{API_URL}/16453/?size=200&page=1"),
                format!("{API_URL}/16453/?size=200&page=2"),
                format!("{API_URL}/16453/?size=200&page=3"),
            ]
        );
    }

    #[test]
    fn create_maps_fields_and_coerces_integers() {
        let transport = ScriptedTransport::default().reply(
            200,
            json!({"id": 10, "field_1": "New", "field_3": {"id": 42, "value": "Done"}}),
        );
        let client = client(transport);
        let fields = Record::from([
            ("name".to_string(), json!("New")),
            ("status".to_string(), json!("42")),
        ]);

        let created = client.create("People", fields).unwrap();

        assert_eq!(created.get("id"), Some(&json!(10)));
        assert_eq!(created.get("status"), Some(&json!({"id": 42, "value": "Done"})));
        let request = &client.transport().requests()[0];
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.url, format!("{API_URL}/16453/"));
        assert_eq!(body_of(request), json!({"field_1": "New", "field_3": 42}));
    }

    #[test]
    fn missing_data_is_reported_without_a_request() {
        let client = client(ScriptedTransport::default());

        let err = client.create("People", Record::new()).unwrap_err();
        assert_eq!(err, ClientError::MissingSaveData);

        let err = client
            .update("People", Record::new(), Some(RowId::from(5)))
            .unwrap_err();
        assert_eq!(err, ClientError::MissingUpdateData);

        assert!(client.transport().requests().is_empty());
        assert_eq!(
            client.errors(),
            vec![
                ClientError::MissingSaveData.to_record(),
                ClientError::MissingUpdateData.to_record(),
            ]
        );
    }

    #[test]
    fn update_takes_row_id_from_payload() {
        let transport =
            ScriptedTransport::default().reply(200, json!({"id": 7, "field_1": "x"}));
        let client = client(transport);
        let fields = Record::from([
            ("id".to_string(), json!(7)),
            ("name".to_string(), json!("x")),
        ]);

        let updated = client.update("People", fields, None).unwrap();

        assert_eq!(updated.get("name"), Some(&json!("x")));
        let request = &client.transport().requests()[0];
        assert_eq!(request.method, HttpMethod::Patch);
        assert_eq!(request.url, format!("{API_URL}/16453/7/"));
        assert_eq!(body_of(request), json!({"field_1": "x"}));
    }

    #[test]
    fn explicit_row_id_wins_over_payload_id() {
        let transport =
            ScriptedTransport::default().reply(200, json!({"id": 3, "field_1": "x"}));
        let client = client(transport);
        let fields = Record::from([
            ("id".to_string(), json!(7)),
            ("name".to_string(), json!("x")),
        ]);

        client.update("People", fields, Some(RowId::from(3))).unwrap();

        let request = &client.transport().requests()[0];
        assert_eq!(request.url, format!("{API_URL}/16453/3/"));
        assert_eq!(body_of(request), json!({"field_1": "x"}));
    }

    #[test]
    fn update_without_any_row_id_fails() {
        let client = client(ScriptedTransport::default());
        let fields = Record::from([("name".to_string(), json!("x"))]);

        let err = client.update("People", fields, None).unwrap_err();

        assert_eq!(err, ClientError::MissingRowId);
        assert!(client.transport().requests().is_empty());
        assert_eq!(
            client.last_error().map(|r| r.error),
            Some("ERROR_MISSING_ROW_ID".to_string())
        );
    }

    #[test]
    fn delete_returns_row_id() {
        let client = client(ScriptedTransport::default().reply_empty(204));

        let deleted = client.delete("People", 12).unwrap();

        assert_eq!(deleted, RowId::from(12));
        let request = &client.transport().requests()[0];
        assert_eq!(request.method, HttpMethod::Delete);
        assert_eq!(request.url, format!("{API_URL}/16453/12/"));
        assert!(request.body.is_none());
    }

    #[test]
    fn dot_segment_row_ids_stay_inside_the_table() {
        let client = client(ScriptedTransport::default());
        let request = client.build_delete("People", &RowId::from("..")).unwrap();
        assert_eq!(request.url, format!("{API_URL}/16453/%2E%2E/"));
    }

    #[test]
    fn delete_requires_row_id() {
        let client = client(ScriptedTransport::default());
        let err = client.delete("People", "").unwrap_err();
        assert_eq!(err, ClientError::MissingRowId);
        assert!(client.transport().requests().is_empty());
    }

    #[test]
    fn remote_errors_are_logged_and_consumed_on_read() {
        let transport = ScriptedTransport::default().reply(
            404,
            json!({"error": "ERROR_ROW_DOES_NOT_EXIST", "detail": "The row 9 does not exist."}),
        );
        let client = client(transport);

        let err = client.get("People", 9).unwrap_err();

        assert_eq!(
            err,
            ClientError::Remote {
                error: "ERROR_ROW_DOES_NOT_EXIST".to_string(),
                detail: "The row 9 does not exist.".to_string(),
            }
        );
        let record = client.last_error().unwrap();
        assert_eq!(record.error, "ERROR_ROW_DOES_NOT_EXIST");
        assert!(client.last_error().is_none());
    }

    #[test]
    fn non_json_error_body_becomes_http_error() {
        let transport = ScriptedTransport::default();
        transport.responses.borrow_mut().push_back(HttpResponse {
            status: 502,
            headers: Vec::new(),
            body: "Bad Gateway".to_string(),
        });
        let client = client(transport);

        let err = client.get("People", 1).unwrap_err();

        assert!(matches!(err, ClientError::Http { status: 502, .. }));
    }

    #[test]
    fn transport_failures_are_logged() {
        let client = client(ScriptedTransport::default());
        let err = client.get("People", 1).unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
        assert_eq!(
            client.last_error().map(|r| r.error),
            Some("ERROR_TRANSPORT".to_string())
        );
    }

    #[test]
    #[should_panic(expected = "ERROR_MISSING_SAVE_DATA")]
    fn debug_mode_halts_on_error() {
        let mut client = client(ScriptedTransport::default());
        client.set_debug(true);
        let _ = client.create("People", Record::new());
    }

    #[test]
    #[should_panic(expected = "ERROR_MISSING_ROW_ID")]
    fn debug_from_config_halts_on_error() {
        let config = ClientConfig::new("secret")
            .with_table_map(table_map())
            .with_debug(true);
        let client = BaserowClient::new(config, ScriptedTransport::default()).unwrap();
        let _ = client.delete("People", "");
    }

    #[test]
    fn empty_table_map_keeps_existing_configuration() {
        let mut client = client(ScriptedTransport::default());
        client.set_table_map(TableMap::default());
        assert_eq!(client.table_map().resolve_table_id("People"), "16453");
    }
}
