//! kairos-mock fleet configuration
//!
//! # Example configuration
//! ```yaml
//! ---
//! fleet:
//!   instances:
//!     - name: kairosdb-1
//!       port: 8081
//!     - name: kairosdb-2
//!       port: 8082
//!   stagger_ms: 500
//!   poll_interval_ms: 500
//!   max_retries: 30
//! ```

use glob::glob;

use serde::Deserialize;
use std::path::Path;

use config::{ConfigError, Environment, File};

/// A Configuration structure
#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    /// Mock backend fleet to orchestrate
    pub fleet: FleetConf,
}

impl Config {
    /// Returns a configuration object from a yaml config file path with merged values from
    /// environment variables prefixed with "KM". When setting values in the environment variables
    /// use "__" for sublements separator.
    pub fn new(config_file: &str) -> Result<Self, ConfigError> {
        let path = Path::new(config_file)
            .canonicalize()
            .expect("Can not resolve path to the config.yaml");
        let mut s = config::Config::builder()
            // Start off by merging in the requested configuration file
            .add_source(File::with_name(path.to_str().unwrap()));

        // Read and merge conf.d config parts
        let configs_glob = format!(
            "{}/conf.d/*.yaml",
            path.parent()
                .expect("Need parent to config.yaml")
                .to_str()
                .unwrap()
        );
        tracing::trace!("Analyzing {:?} as conf.d parts", configs_glob);
        for entry in glob(configs_glob.as_str()).unwrap() {
            tracing::debug!("Add {:?} config part file", entry);
            if let Ok(path) = entry {
                s = s.add_source(File::with_name(path.to_str().unwrap()));
            }
        }

        // merge environment variables (subelements separated by "__")
        // KM_FLEET__MAX_RETRIES goes to fleet.max_retries
        s = s.add_source(
            Environment::with_prefix("KM")
                .prefix_separator("_")
                .separator("__"),
        );

        s.build()?.try_deserialize()
    }

    /// Returns a configuration object from a string representing configuration file
    #[allow(dead_code)]
    pub fn from_config_str(data: &str) -> Self {
        let s = config::Config::builder()
            .add_source(File::from_str(data, config::FileFormat::Yaml))
            .build()
            .unwrap();
        s.try_deserialize().unwrap()
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            fleet: FleetConf::default(),
        }
    }
}

/// Fleet orchestration configuration
#[derive(Clone, Debug, Deserialize)]
pub struct FleetConf {
    /// Instances to launch, as (identity, port) pairs
    #[serde(default = "default_instances")]
    pub instances: Vec<InstanceDef>,
    /// Delay between consecutive launches in milliseconds
    #[serde(default = "default_stagger_ms")]
    pub stagger_ms: u64,
    /// Interval between health poll attempts in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Number of health poll attempts before giving up on an instance
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Per-attempt health request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Bounded wait for a child to exit during shutdown, in seconds
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,
    /// Path to the mock server binary; defaults to the `kairos-mock`
    /// executable next to the orchestrator binary
    pub server_command: Option<String>,
}

impl Default for FleetConf {
    fn default() -> Self {
        FleetConf {
            instances: default_instances(),
            stagger_ms: default_stagger_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            max_retries: default_max_retries(),
            request_timeout_secs: default_request_timeout(),
            shutdown_timeout_secs: default_shutdown_timeout(),
            server_command: None,
        }
    }
}

/// One mock backend instance definition
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct InstanceDef {
    /// Logical identity embedded into responses and capture records
    pub name: String,
    /// Port to listen on
    pub port: u16,
}

fn default_instances() -> Vec<InstanceDef> {
    vec![
        InstanceDef {
            name: "kairosdb-1".to_string(),
            port: 8081,
        },
        InstanceDef {
            name: "kairosdb-2".to_string(),
            port: 8082,
        },
        InstanceDef {
            name: "kairosdb-3".to_string(),
            port: 8083,
        },
    ]
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
