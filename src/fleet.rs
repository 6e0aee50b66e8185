//! Mock backend fleet orchestration
//!
//! Launches a fixed set of mock backend instances as independent processes,
//! blocks until every one of them is verifiably healthy and tears the whole
//! fleet down again on request. Bring-up is all-or-nothing: a single instance
//! that never reports healthy aborts the launch and stops everything already
//! spawned, so tests never run against a partially-ready topology.
use crate::config::{FleetConf, InstanceDef};
use crate::types::FleetError;
use std::future::Future;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::{Child, Command};
use tokio::time::{sleep, timeout, Duration};

/// Interval between liveness checks of already-running children
const WATCH_INTERVAL: Duration = Duration::from_millis(500);

/// A running fleet of mock backend processes
pub struct Fleet {
    instances: Vec<FleetInstance>,
    conf: FleetConf,
}

struct FleetInstance {
    def: InstanceDef,
    child: Child,
}

impl Fleet {
    /// Spawn every configured instance and wait for the whole fleet to become
    /// healthy. On any failure the already-spawned children are stopped
    /// before the error is returned.
    pub async fn launch(conf: &FleetConf) -> Result<Fleet, FleetError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(conf.request_timeout_secs))
            .build()
            .expect("Cannot build reqwest client");
        let server_command = resolve_server_command(conf);

        let mut fleet = Fleet {
            instances: Vec::new(),
            conf: conf.clone(),
        };
        for def in conf.instances.iter() {
            tracing::info!("Starting {} on port {}", def.name, def.port);
            match Command::new(&server_command)
                .arg(def.port.to_string())
                .arg(&def.name)
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .kill_on_drop(true)
                .spawn()
            {
                Ok(child) => fleet.instances.push(FleetInstance {
                    def: def.clone(),
                    child,
                }),
                Err(error) => {
                    let failed = FleetError::SpawnFailed {
                        name: def.name.clone(),
                        error,
                    };
                    fleet.shutdown().await;
                    return Err(failed);
                }
            }
            // Small fixed delay between launches to avoid port-bind races
            sleep(Duration::from_millis(conf.stagger_ms)).await;
        }

        for def in conf.instances.iter() {
            if let Err(failed) = wait_ready(
                &client,
                def,
                Duration::from_millis(conf.poll_interval_ms),
                conf.max_retries,
            )
            .await
            {
                fleet.shutdown().await;
                return Err(failed);
            }
        }

        tracing::info!("All {} mock instances are ready", fleet.instances.len());
        Ok(fleet)
    }

    /// Number of running instances
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// OS process ids of the running children, in launch order
    pub fn pids(&self) -> Vec<Option<u32>> {
        self.instances.iter().map(|i| i.child.id()).collect()
    }

    /// Supervise the fleet until an unexpected child exit.
    ///
    /// Runs until a child terminates without having been told to stop; the
    /// caller bounds it externally (see [`Fleet::run`]).
    pub async fn watch(&mut self) -> FleetError {
        loop {
            for instance in self.instances.iter_mut() {
                match instance.child.try_wait() {
                    Ok(Some(status)) => {
                        return FleetError::ChildExited {
                            name: instance.def.name.clone(),
                            status,
                        }
                    }
                    Ok(None) => {}
                    Err(error) => {
                        tracing::warn!("Cannot poll {}: {}", instance.def.name, error);
                    }
                }
            }
            sleep(WATCH_INTERVAL).await;
        }
    }

    /// Run the fleet until the supplied shutdown future resolves or a child
    /// exits unexpectedly, then tear everything down.
    ///
    /// The shutdown trigger is injected by the caller (a signal future in the
    /// orchestrator binary, a oneshot channel in tests), keeping this loop
    /// independent of any signal-handling idiom.
    pub async fn run<F>(mut self, shutdown: F) -> Result<(), FleetError>
    where
        F: Future<Output = ()>,
    {
        let result = tokio::select! {
            failed = self.watch() => {
                tracing::error!("{}", failed);
                Err(failed)
            },
            _ = shutdown => {
                tracing::info!("Shutdown requested, stopping fleet");
                Ok(())
            },
        };
        self.shutdown().await;
        result
    }

    /// Stop every child and wait (bounded) for each to exit.
    ///
    /// Issuing shutdown twice is a no-op.
    pub async fn shutdown(&mut self) {
        for mut instance in self.instances.drain(..) {
            tracing::info!("Stopping {}", instance.def.name);
            if let Err(error) = instance.child.start_kill() {
                tracing::warn!("Failed to signal {}: {}", instance.def.name, error);
            }
            match timeout(
                Duration::from_secs(self.conf.shutdown_timeout_secs),
                instance.child.wait(),
            )
            .await
            {
                Ok(Ok(status)) => {
                    tracing::debug!("{} exited with {}", instance.def.name, status)
                }
                Ok(Err(error)) => {
                    tracing::warn!("Failed waiting for {}: {}", instance.def.name, error)
                }
                Err(_) => tracing::warn!(
                    "{} did not exit within {}s, leaving it to kill-on-drop",
                    instance.def.name,
                    self.conf.shutdown_timeout_secs
                ),
            }
        }
    }
}

/// Poll one instance's health endpoint until it answers 200 or the retry
/// bound is exhausted. A single success terminates polling for the instance.
pub async fn wait_ready(
    client: &reqwest::Client,
    def: &InstanceDef,
    poll_interval: Duration,
    max_retries: u32,
) -> Result<(), FleetError> {
    let url = format!("http://127.0.0.1:{}/health", def.port);
    let mut last_error = String::from("no attempts made");
    for attempt in 1..=max_retries {
        match client.get(&url).send().await {
            Ok(rsp) if rsp.status().is_success() => {
                tracing::info!("{} is ready after {} attempt(s)", def.name, attempt);
                return Ok(());
            }
            Ok(rsp) => last_error = format!("unexpected status {}", rsp.status()),
            Err(error) => last_error = format!("{}", error),
        }
        if attempt < max_retries {
            sleep(poll_interval).await;
        }
    }
    Err(FleetError::StartupTimeout {
        name: def.name.clone(),
        attempts: max_retries,
        last_error,
    })
}

/// Command used to start one mock backend process.
///
/// Defaults to the `kairos-mock` binary sitting next to the orchestrator
/// executable so a plain `cargo build` layout works without configuration.
fn resolve_server_command(conf: &FleetConf) -> PathBuf {
    match &conf.server_command {
        Some(command) => PathBuf::from(command),
        None => std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join("kairos-mock")))
            .unwrap_or_else(|| PathBuf::from("kairos-mock")),
    }
}
