use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};

pub const ROWS_PREFIX: &str = "/api/database/rows/table";
pub const DEFAULT_PAGE_SIZE: usize = 100;
pub const MAX_PAGE_SIZE: usize = 200;

/// Rows of one table, keyed by row id.
#[derive(Debug, Default)]
pub struct Table {
    next_id: u64,
    rows: BTreeMap<u64, Map<String, Value>>,
}

impl Table {
    fn insert(&mut self, fields: Map<String, Value>) -> Value {
        self.next_id += 1;
        let id = self.next_id;
        self.rows.insert(id, fields);
        row_json(id, &self.rows[&id])
    }
}

pub type Db = Arc<RwLock<HashMap<u64, Table>>>;

#[derive(Debug, Serialize)]
pub struct RowList {
    pub count: usize,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<Value>,
}

/// Error body in the shape the real API uses.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error: &'static str,
    detail: String,
}

impl ApiError {
    fn new(status: StatusCode, error: &'static str, detail: impl Into<String>) -> Self {
        Self {
            status,
            error,
            detail: detail.into(),
        }
    }

    fn row_missing(row_id: u64) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "ERROR_ROW_DOES_NOT_EXIST",
            format!("The row {row_id} does not exist."),
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({"error": self.error, "detail": self.detail});
        (self.status, Json(body)).into_response()
    }
}

pub fn app() -> Router {
    app_with_db(Db::default())
}

/// Router over an existing store, so tests can seed or inspect rows.
pub fn app_with_db(db: Db) -> Router {
    Router::new()
        .route(
            &format!("{ROWS_PREFIX}/{{table_id}}/"),
            get(list_rows).post(create_row),
        )
        .route(
            &format!("{ROWS_PREFIX}/{{table_id}}/{{row_id}}/"),
            get(get_row).patch(update_row).delete(delete_row),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn row_json(id: u64, fields: &Map<String, Value>) -> Value {
    let mut row = Map::new();
    row.insert("id".to_string(), json!(id));
    row.insert("order".to_string(), json!(format!("{id}.00000000000000000000")));
    row.extend(fields.iter().map(|(k, v)| (k.clone(), v.clone())));
    Value::Object(row)
}

fn authorize(headers: &HeaderMap) -> Result<(), ApiError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Token "))
        .unwrap_or("");
    if token.trim().is_empty() {
        return Err(ApiError::new(
            StatusCode::UNAUTHORIZED,
            "ERROR_INVALID_TOKEN",
            "Token does not exist or has expired.",
        ));
    }
    Ok(())
}

fn parse_id(raw: &str, what: &'static str) -> Result<u64, ApiError> {
    raw.parse().map_err(|_| {
        ApiError::new(
            StatusCode::BAD_REQUEST,
            "ERROR_REQUEST_BODY_VALIDATION",
            format!("{what} must be an integer, got '{raw}'"),
        )
    })
}

/// Only `field_<n>` keys are writable.
fn writable_fields(input: Map<String, Value>) -> Result<Map<String, Value>, ApiError> {
    for key in input.keys() {
        let valid = key
            .strip_prefix("field_")
            .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()));
        if !valid {
            return Err(ApiError::new(
                StatusCode::BAD_REQUEST,
                "ERROR_REQUEST_BODY_VALIDATION",
                format!("Field '{key}' does not exist."),
            ));
        }
    }
    Ok(input)
}

fn matches_filters(row: &Value, filters: &[(String, String, String)]) -> bool {
    filters.iter().all(|(field, op, expected)| {
        let actual = match row.get(field) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };
        match op.as_str() {
            "equal" => actual == *expected,
            "not_equal" => actual != *expected,
            "contains" => actual.to_lowercase().contains(&expected.to_lowercase()),
            _ => true,
        }
    })
}

fn sort_key(row: &Value, field: &str) -> String {
    match row.get(field) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => format!("{:020}", n.as_u64().unwrap_or_default()),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

async fn list_rows(
    State(db): State<Db>,
    Path(table_id): Path<String>,
    headers: HeaderMap,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<RowList>, ApiError> {
    authorize(&headers)?;
    let table_id = parse_id(&table_id, "table id")?;

    let mut page = 1usize;
    let mut size = DEFAULT_PAGE_SIZE;
    let mut filters = Vec::new();
    let mut order_by: Option<String> = None;
    for (key, value) in &params {
        match key.as_str() {
            "page" => page = parse_id(value, "page")? as usize,
            "size" => size = parse_id(value, "size")? as usize,
            "order_by" => order_by = Some(value.clone()),
            _ => {
                if let Some(rest) = key.strip_prefix("filter__") {
                    if let Some((field, op)) = rest.split_once("__") {
                        filters.push((field.to_string(), op.to_string(), value.clone()));
                    }
                }
            }
        }
    }
    if size == 0 || size > MAX_PAGE_SIZE {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "ERROR_PAGE_SIZE_LIMIT",
            format!("The page size is limited to {MAX_PAGE_SIZE}."),
        ));
    }

    let tables = db.read().await;
    let mut rows: Vec<Value> = tables
        .get(&table_id)
        .map(|t| t.rows.iter().map(|(id, f)| row_json(*id, f)).collect())
        .unwrap_or_default();
    rows.retain(|row| matches_filters(row, &filters));

    if let Some(order_by) = order_by {
        for field in order_by.split(',').rev() {
            let (descending, field) = match field.strip_prefix('-') {
                Some(field) => (true, field),
                None => (false, field.strip_prefix('+').unwrap_or(field)),
            };
            rows.sort_by(|a, b| {
                let ordering = sort_key(a, field).cmp(&sort_key(b, field));
                if descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }
    }

    let count = rows.len();
    let pages = count.div_ceil(size).max(1);
    if page == 0 || page > pages {
        return Err(ApiError::new(
            StatusCode::NOT_FOUND,
            "ERROR_INVALID_PAGE",
            "Invalid page.",
        ));
    }

    let link = |n: usize| format!("{ROWS_PREFIX}/{table_id}/?page={n}&size={size}");
    let results = rows.into_iter().skip((page - 1) * size).take(size).collect();
    Ok(Json(RowList {
        count,
        next: (page < pages).then(|| link(page + 1)),
        previous: (page > 1).then(|| link(page - 1)),
        results,
    }))
}

async fn create_row(
    State(db): State<Db>,
    Path(table_id): Path<String>,
    headers: HeaderMap,
    Json(input): Json<Map<String, Value>>,
) -> Result<Json<Value>, ApiError> {
    authorize(&headers)?;
    let table_id = parse_id(&table_id, "table id")?;
    let fields = writable_fields(input)?;
    let mut tables = db.write().await;
    Ok(Json(tables.entry(table_id).or_default().insert(fields)))
}

async fn get_row(
    State(db): State<Db>,
    Path((table_id, row_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    authorize(&headers)?;
    let table_id = parse_id(&table_id, "table id")?;
    let row_id = parse_id(&row_id, "row id")?;
    let tables = db.read().await;
    tables
        .get(&table_id)
        .and_then(|t| t.rows.get(&row_id))
        .map(|fields| Json(row_json(row_id, fields)))
        .ok_or_else(|| ApiError::row_missing(row_id))
}

async fn update_row(
    State(db): State<Db>,
    Path((table_id, row_id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(input): Json<Map<String, Value>>,
) -> Result<Json<Value>, ApiError> {
    authorize(&headers)?;
    let table_id = parse_id(&table_id, "table id")?;
    let row_id = parse_id(&row_id, "row id")?;
    let changes = writable_fields(input)?;
    let mut tables = db.write().await;
    let fields = tables
        .get_mut(&table_id)
        .and_then(|t| t.rows.get_mut(&row_id))
        .ok_or_else(|| ApiError::row_missing(row_id))?;
    fields.extend(changes);
    Ok(Json(row_json(row_id, fields)))
}

async fn delete_row(
    State(db): State<Db>,
    Path((table_id, row_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    authorize(&headers)?;
    let table_id = parse_id(&table_id, "table id")?;
    let row_id = parse_id(&row_id, "row id")?;
    let mut tables = db.write().await;
    tables
        .get_mut(&table_id)
        .and_then(|t| t.rows.remove(&row_id))
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| ApiError::row_missing(row_id))
}
