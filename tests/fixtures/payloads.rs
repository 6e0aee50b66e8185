// KairosDB query payload fixtures
//
// Mirrors the kinds of payloads a metrics-proxy forwards to its backends:
// relative-range queries, absolute ranges with aggregators and tag queries.

use serde_json::{json, Value};

/// Minimal single-metric query with a relative time range
pub fn simple_query() -> Value {
    json!({
        "start_relative": {
            "value": "1",
            "unit": "hours"
        },
        "metrics": [
            {
                "name": "cpu.usage",
                "tags": {
                    "host": ["server1"]
                }
            }
        ]
    })
}

/// Absolute-range query with nested tags and an aggregator block
pub fn complex_query() -> Value {
    json!({
        "start_absolute": 1609459200000u64,
        "end_absolute": 1609545600000u64,
        "metrics": [
            {
                "name": "cpu.load",
                "tags": {
                    "host": ["server1", "server2"],
                    "dc": ["us-east"]
                },
                "aggregators": [
                    {
                        "name": "avg",
                        "sampling": {
                            "value": "1",
                            "unit": "minutes"
                        }
                    }
                ]
            }
        ]
    })
}

/// Two-metric query from the routing scenario in the driving test suite
pub fn two_metric_query() -> Value {
    json!({
        "metrics": [
            {"name": "cpu.user"},
            {"name": "cpu.system"}
        ]
    })
}

/// Tag query payload
pub fn tag_query() -> Value {
    json!({
        "start_relative": {
            "value": "1",
            "unit": "days"
        },
        "metrics": [
            {
                "name": "cpu.idle"
            }
        ]
    })
}
