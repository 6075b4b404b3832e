//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each request vector names an operation and its inputs and describes the
//! request the client must produce; each response vector feeds a simulated
//! response to a parse method. Bodies are compared as parsed JSON so field
//! formatting does not matter; record key order is compared exactly.

use baserow_core::{
    BaserowClient, ClientConfig, HttpMethod, HttpRequest, HttpResponse, ParamValue, QueryParams,
    Record, RowId, TableMap, Transport,
};
use serde_json::Value;

/// Build/parse vectors never reach the network.
#[derive(Debug)]
struct NoTransport;

impl Transport for NoTransport {
    fn execute(&self, _: &HttpRequest) -> Result<HttpResponse, baserow_core::ClientError> {
        panic!("test vectors must not execute requests");
    }
}

fn client(vectors: &Value) -> BaserowClient<NoTransport> {
    let mut config = ClientConfig::new(vectors["api_key"].as_str().unwrap_or("vector-token"));
    if let Some(url) = vectors["api_url"].as_str() {
        config = config.with_api_url(url);
    }
    let table_map = TableMap::from_value(&vectors["table_map"]).unwrap();
    BaserowClient::new(config.with_table_map(table_map), NoTransport).unwrap()
}

fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PATCH" => HttpMethod::Patch,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn parse_params(case: &Value) -> QueryParams {
    let Some(pairs) = case["params"].as_array() else {
        return QueryParams::new();
    };
    pairs
        .iter()
        .map(|pair| {
            let key = pair[0].as_str().unwrap().to_string();
            let value = match &pair[1] {
                Value::String(s) => ParamValue::from(s.as_str()),
                Value::Number(n) => ParamValue::Int(n.as_i64().unwrap()),
                Value::Array(items) => ParamValue::List(
                    items
                        .iter()
                        .map(|i| i.as_str().unwrap().to_string())
                        .collect(),
                ),
                other => panic!("unsupported param value: {other}"),
            };
            (key, value)
        })
        .collect()
}

fn parse_fields(case: &Value) -> Record {
    case["fields"]
        .as_object()
        .map(|fields| fields.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
        .unwrap_or_default()
}

fn simulated_response(case: &Value) -> HttpResponse {
    let sim = &case["simulated_response"];
    HttpResponse {
        status: sim["status"].as_u64().unwrap() as u16,
        headers: Vec::new(),
        body: sim["body"].as_str().unwrap().to_string(),
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[test]
fn request_test_vectors() {
    let raw = include_str!("../../test-vectors/requests.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();
    let api_url = vectors["api_url"].as_str().unwrap();

    let c = client(&vectors);
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let table = case["table"].as_str().unwrap();
        let row_id = case["row_id"].as_str().map(RowId::from);
        let expected = &case["expected_request"];

        let req = match case["operation"].as_str().unwrap() {
            "get" => c.build_get(table, row_id.as_ref().unwrap()),
            "list" => c.build_list(table, parse_params(case)),
            "create" => c.build_create(table, parse_fields(case)),
            "update" => c.build_update(table, parse_fields(case), row_id),
            "delete" => c.build_delete(table, row_id.as_ref().unwrap()),
            other => panic!("{name}: unknown operation {other}"),
        }
        .unwrap();

        let method = parse_method(expected["method"].as_str().unwrap());
        assert_eq!(req.method, method, "{name}: method");
        assert_eq!(
            req.url,
            format!("{api_url}{}", expected["url"].as_str().unwrap()),
            "{name}: url"
        );
        assert_eq!(req.header("content-type"), Some("application/json"), "{name}: content type");
        assert_eq!(
            req.header("authorization"),
            Some(format!("Token {}", vectors["api_key"].as_str().unwrap()).as_str()),
            "{name}: authorization"
        );

        match &expected["body"] {
            Value::Null => assert!(req.body.is_none(), "{name}: body should be None"),
            body => {
                let req_body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
                assert_eq!(&req_body, body, "{name}: body");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[test]
fn response_test_vectors() {
    let raw = include_str!("../../test-vectors/responses.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let c = client(&vectors);
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let table = case["table"].as_str().unwrap();
        let response = simulated_response(case);

        let result = match case["operation"].as_str().unwrap() {
            "record" => c.parse_record(table, response).map(Some),
            "delete" => c.parse_delete(response).map(|()| None),
            other => panic!("{name}: unknown operation {other}"),
        };

        if let Some(expected_error) = case["expected_error"].as_str() {
            let err = result.unwrap_err();
            assert_eq!(err.code(), expected_error, "{name}: error code");
            continue;
        }

        let record = result.unwrap_or_else(|e| panic!("{name}: unexpected error {e}"));
        let Some(expected) = case["expected_result"].as_array() else {
            assert!(record.is_none(), "{name}: expected no payload");
            continue;
        };
        let expected: Vec<(String, Value)> = expected
            .iter()
            .map(|pair| (pair[0].as_str().unwrap().to_string(), pair[1].clone()))
            .collect();
        let actual: Vec<(String, Value)> = record.unwrap().into_iter().collect();
        assert_eq!(actual, expected, "{name}: parsed record");
    }
}
