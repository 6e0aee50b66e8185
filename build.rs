// Build script to generate JSON schema for configuration

use schemars::{schema_for, JsonSchema};
use serde::Deserialize;
use std::fs;
use std::path::Path;

// Re-define the Config struct with JsonSchema derive
// This is a simplified version matching the actual Config struct

/// Configuration structure
#[derive(Clone, Debug, Deserialize, JsonSchema)]
pub struct Config {
    /// Mock backend fleet to orchestrate
    pub fleet: FleetConf,
}

/// Fleet orchestration configuration
#[derive(Clone, Debug, Deserialize, JsonSchema)]
pub struct FleetConf {
    /// Instances to launch, as (identity, port) pairs
    pub instances: Vec<InstanceDef>,
    /// Delay between consecutive launches in milliseconds (default: 500)
    #[serde(default = "default_stagger_ms")]
    pub stagger_ms: u64,
    /// Interval between health poll attempts in milliseconds (default: 500)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Number of health poll attempts before giving up (default: 30)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Per-attempt health request timeout in seconds (default: 1)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Bounded wait for a child to exit during shutdown, in seconds (default: 5)
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,
    /// Path to the mock server binary (optional)
    pub server_command: Option<String>,
}

/// One mock backend instance definition
#[derive(Clone, Debug, Deserialize, JsonSchema)]
pub struct InstanceDef {
    /// Logical identity embedded into responses and capture records
    pub name: String,
    /// Port to listen on
    pub port: u16,
}

fn default_stagger_ms() -> u64 {
    500
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_max_retries() -> u32 {
    30
}

fn default_request_timeout() -> u64 {
    1
}

fn default_shutdown_timeout() -> u64 {
    5
}

fn main() {
    println!("cargo:rerun-if-changed=src/config.rs");

    // Generate JSON schema
    let schema = schema_for!(Config);
    let schema_json = serde_json::to_string_pretty(&schema).expect("Failed to serialize schema");

    // Create doc/schemas directory if it doesn't exist
    let schemas_dir = Path::new("doc/schemas");
    if !schemas_dir.exists() {
        fs::create_dir_all(schemas_dir).expect("Failed to create doc/schemas directory");
    }

    // Write schema to file
    let schema_path = schemas_dir.join("config-schema.json");
    fs::write(&schema_path, schema_json).expect("Failed to write config-schema.json");

    println!("Generated JSON schema at: {:?}", schema_path);
}
