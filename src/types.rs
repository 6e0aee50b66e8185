//! kairos-mock types
//!
//! Internal types definitions
use crate::capture::CaptureStore;
use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::process::ExitStatus;

/// Query endpoints recognized by the mock backend.
///
/// Serialized as the literal request path so that capture records match what
/// an external assertion reads from the wire.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq, Serialize)]
pub enum Endpoint {
    #[serde(rename = "/api/v1/datapoints/query")]
    QueryData,
    #[serde(rename = "/api/v1/datapoints/query/tags")]
    QueryTags,
}

impl Endpoint {
    /// Request path this endpoint is served under
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::QueryData => "/api/v1/datapoints/query",
            Endpoint::QueryTags => "/api/v1/datapoints/query/tags",
        }
    }
}

/// One record per successfully parsed inbound query request.
///
/// The payload is kept verbatim (no re-typing), appended in arrival order and
/// never mutated afterwards.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CapturedRequest {
    /// Which API path received the request
    pub endpoint: Endpoint,
    /// Exact parsed request body
    pub payload: Value,
    /// Logical name of the instance that received it
    pub server: String,
    /// Inbound headers (names lowercased by the http stack, values verbatim)
    pub headers: BTreeMap<String, String>,
}

impl CapturedRequest {
    pub fn new(endpoint: Endpoint, payload: Value, server: &str, headers: &HeaderMap) -> Self {
        let headers = headers
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).to_string(),
                )
            })
            .collect();
        CapturedRequest {
            endpoint,
            payload,
            server: server.to_string(),
            headers,
        }
    }
}

/// Fixed sample size reported in every synthesized query block
pub const MOCK_SAMPLE_SIZE: u32 = 10;
/// Fixed 3-point time series returned for every metric
pub const MOCK_DATAPOINTS: [(u64, f64); 3] = [
    (1609459200000, 42.5),
    (1609459260000, 43.0),
    (1609459320000, 43.5),
];
/// Fixed secondary tag returned by the tags endpoint
pub const MOCK_REGION: &str = "us-east-1";

/// Sentinel metric name used when an input metric carries no string `name`
pub const UNKNOWN_METRIC: &str = "unknown";

/// Response of the /api/v1/datapoints/query endpoint
#[derive(Debug, Deserialize, Serialize)]
pub struct QueryResponse {
    pub queries: Vec<QueryBlock>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct QueryBlock {
    pub sample_size: u32,
    pub results: Vec<QueryResult>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct QueryResult {
    pub name: String,
    pub group_by: Vec<Value>,
    pub tags: BTreeMap<String, Vec<String>>,
    pub values: Vec<(u64, f64)>,
}

/// Response of the /api/v1/datapoints/query/tags endpoint
#[derive(Debug, Deserialize, Serialize)]
pub struct TagsResponse {
    pub results: Vec<TagResult>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct TagResult {
    pub name: String,
    pub tags: BTreeMap<String, Vec<String>>,
}

/// Extract metric names from a query payload.
///
/// Entries without a string `name` map to the `"unknown"` sentinel rather
/// than failing; a missing or non-list `metrics` field yields no names.
pub fn metric_names(payload: &Value) -> Vec<String> {
    payload
        .get("metrics")
        .and_then(Value::as_array)
        .map(|metrics| {
            metrics
                .iter()
                .map(|metric| {
                    metric
                        .get("name")
                        .and_then(Value::as_str)
                        .unwrap_or(UNKNOWN_METRIC)
                        .to_string()
                })
                .collect()
        })
        .unwrap_or_default()
}

impl QueryResponse {
    /// Synthesize one query block per input metric, tagging every result with
    /// the serving instance so a test can prove which backend answered.
    pub fn for_metrics(names: &[String], server: &str) -> Self {
        QueryResponse {
            queries: names
                .iter()
                .map(|name| QueryBlock {
                    sample_size: MOCK_SAMPLE_SIZE,
                    results: vec![QueryResult {
                        name: name.clone(),
                        group_by: Vec::new(),
                        tags: BTreeMap::from([("host".to_string(), vec![server.to_string()])]),
                        values: MOCK_DATAPOINTS.to_vec(),
                    }],
                })
                .collect(),
        }
    }
}

impl TagsResponse {
    /// Synthesize one tag-set result per input metric.
    pub fn for_metrics(names: &[String], server: &str) -> Self {
        TagsResponse {
            results: names
                .iter()
                .map(|name| TagResult {
                    name: name.clone(),
                    tags: BTreeMap::from([
                        ("host".to_string(), vec![server.to_string()]),
                        ("region".to_string(), vec![MOCK_REGION.to_string()]),
                    ]),
                })
                .collect(),
        }
    }
}

/// Shared state of one mock backend instance
#[derive(Clone)]
pub struct AppState {
    /// Logical name, fixed for the process lifetime
    pub identity: String,
    /// Injectable capture log, the only mutable state in the process
    pub captures: CaptureStore,
}

impl AppState {
    pub fn new<S: Into<String>>(identity: S) -> Self {
        Self {
            identity: identity.into(),
            captures: CaptureStore::new(),
        }
    }
}

/// Errors of the fleet bring-up / supervision path
pub enum FleetError {
    /// Child process could not be spawned
    SpawnFailed { name: String, error: std::io::Error },
    /// Instance never reported healthy within the retry bound
    StartupTimeout {
        name: String,
        attempts: u32,
        last_error: String,
    },
    /// Child exited before being told to stop
    ChildExited { name: String, status: ExitStatus },
}
impl std::error::Error for FleetError {}

impl fmt::Display for FleetError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FleetError::SpawnFailed { name, error } => {
                write!(f, "failed to spawn instance {}: {}", name, error)
            }
            FleetError::StartupTimeout {
                name,
                attempts,
                last_error,
            } => write!(
                f,
                "instance {} failed to become healthy after {} attempts, last error: {}",
                name, attempts, last_error
            ),
            FleetError::ChildExited { name, status } => {
                write!(f, "instance {} exited unexpectedly with {}", name, status)
            }
        }
    }
}
impl fmt::Debug for FleetError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_endpoint_serializes_as_path() {
        assert_eq!(
            serde_json::to_value(Endpoint::QueryData).unwrap(),
            json!("/api/v1/datapoints/query")
        );
        assert_eq!(
            serde_json::to_value(Endpoint::QueryTags).unwrap(),
            json!("/api/v1/datapoints/query/tags")
        );
        assert_eq!(Endpoint::QueryData.path(), "/api/v1/datapoints/query");
        assert_eq!(Endpoint::QueryTags.path(), "/api/v1/datapoints/query/tags");
    }

    #[test]
    fn test_metric_names_extraction() {
        let payload = json!({
            "start_relative": {"value": "1", "unit": "hours"},
            "metrics": [
                {"name": "cpu.user"},
                {"name": "cpu.system", "tags": {"host": ["a"]}},
            ]
        });
        assert_eq!(metric_names(&payload), vec!["cpu.user", "cpu.system"]);
    }

    #[test]
    fn test_metric_names_unknown_sentinel() {
        // Entries without a string name fall back to "unknown"
        let payload = json!({"metrics": [{"tags": {}}, {"name": 42}, "bare"]});
        assert_eq!(
            metric_names(&payload),
            vec!["unknown", "unknown", "unknown"]
        );
    }

    #[test]
    fn test_metric_names_missing_list() {
        assert!(metric_names(&json!({})).is_empty());
        assert!(metric_names(&json!({"metrics": "oops"})).is_empty());
        assert!(metric_names(&json!(null)).is_empty());
    }

    #[test]
    fn test_query_response_fixture_shape() {
        let names = vec!["cpu.user".to_string(), "cpu.system".to_string()];
        let response = QueryResponse::for_metrics(&names, "kairosdb-1");
        assert_eq!(response.queries.len(), 2);
        for (block, name) in response.queries.iter().zip(names.iter()) {
            assert_eq!(block.sample_size, MOCK_SAMPLE_SIZE);
            assert_eq!(block.results.len(), 1);
            assert_eq!(&block.results[0].name, name);
            assert!(block.results[0].group_by.is_empty());
            assert_eq!(
                block.results[0].tags.get("host"),
                Some(&vec!["kairosdb-1".to_string()])
            );
            assert_eq!(block.results[0].values.len(), 3);
            assert_eq!(block.results[0].values[0], (1609459200000, 42.5));
        }
    }

    #[test]
    fn test_tags_response_fixture_shape() {
        let names = vec!["mem.free".to_string()];
        let response = TagsResponse::for_metrics(&names, "kairosdb-2");
        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].name, "mem.free");
        assert_eq!(
            response.results[0].tags.get("host"),
            Some(&vec!["kairosdb-2".to_string()])
        );
        assert_eq!(
            response.results[0].tags.get("region"),
            Some(&vec![MOCK_REGION.to_string()])
        );
    }

    #[test]
    fn test_captured_request_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", "application/json".parse().unwrap());
        headers.insert("x-test", "abc".parse().unwrap());
        let record = CapturedRequest::new(
            Endpoint::QueryData,
            json!({"metrics": []}),
            "kairosdb-1",
            &headers,
        );
        assert_eq!(record.server, "kairosdb-1");
        assert_eq!(
            record.headers.get("content-type").map(String::as_str),
            Some("application/json")
        );
        assert_eq!(record.headers.get("x-test").map(String::as_str), Some("abc"));
    }
}

/// Additional coverage test: FleetError Display implementation
#[test]
fn test_fleet_error_display() {
    let err = FleetError::StartupTimeout {
        name: "kairosdb-1".to_string(),
        attempts: 30,
        last_error: "connection refused".to_string(),
    };
    assert_eq!(
        format!("{}", err),
        "instance kairosdb-1 failed to become healthy after 30 attempts, last error: connection refused"
    );
    let err = FleetError::SpawnFailed {
        name: "kairosdb-2".to_string(),
        error: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
    };
    assert!(format!("{}", err).contains("failed to spawn instance kairosdb-2"));
    // Debug mirrors Display
    assert_eq!(format!("{:?}", err), format!("{}", err));
}
