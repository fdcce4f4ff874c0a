//! Table of currently running emulator instances.
//!
//! Owned by the controller and passed around explicitly so tests can build
//! isolated registries; there is no process-wide singleton.

use std::collections::HashMap;
use std::time::Duration;
use tracing::info;

use super::error::EmulatorError;
use super::instance::Emulator;
use super::kind::EmulatorKind;
use super::ports;

pub struct Registry {
    instances: HashMap<EmulatorKind, Box<dyn Emulator>>,
    port_wait_timeout: Duration,
    port_poll_interval: Duration,
}

impl Registry {
    pub fn new() -> Self {
        Self::with_port_wait(ports::PORT_WAIT_TIMEOUT, ports::PORT_POLL_INTERVAL)
    }

    /// Registry with a custom port-wait budget (tests use a short one).
    pub fn with_port_wait(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            instances: HashMap::new(),
            port_wait_timeout: timeout,
            port_poll_interval: poll_interval,
        }
    }

    /// Start an instance and record it under its kind.
    ///
    /// Starting a kind that already has a live entry is an error; silently
    /// replacing it would double-bind the port and leak a subprocess. After
    /// `instance.start()` returns, the instance's port is polled until the
    /// process is confirmed listening. On any failure nothing is recorded and
    /// the partially started instance is stopped before the error propagates.
    pub async fn start(&mut self, mut instance: Box<dyn Emulator>) -> Result<(), EmulatorError> {
        let kind = instance.kind();
        if self.is_running(kind) {
            return Err(EmulatorError::AlreadyRunning(kind));
        }

        let address = instance.address().clone();
        instance.start().await?;

        if let Err(e) = ports::wait_until_port_closed(
            address.port,
            self.port_wait_timeout,
            self.port_poll_interval,
        )
        .await
        {
            let _ = instance.stop().await;
            return Err(e);
        }

        info!(emulator = %kind, url = %address.url(), "emulator started");
        self.instances.insert(kind, instance);
        Ok(())
    }

    /// Stop and deregister a kind. No-op if it is not running.
    ///
    /// The entry is removed even when the instance's `stop` reports an
    /// error, so a dead process can never leave a permanently stuck entry.
    pub async fn stop(&mut self, kind: EmulatorKind) -> Result<(), EmulatorError> {
        let Some(mut instance) = self.instances.remove(&kind) else {
            return Ok(());
        };
        instance.stop().await
    }

    /// Stop every running kind. A failure stopping one kind never prevents
    /// stopping the others; all failures are returned to the caller.
    pub async fn stop_all(&mut self) -> Vec<(EmulatorKind, EmulatorError)> {
        let mut failures = Vec::new();
        for kind in self.list_running() {
            if let Err(e) = self.stop(kind).await {
                failures.push((kind, e));
            }
        }
        failures
    }

    pub fn is_running(&self, kind: EmulatorKind) -> bool {
        self.instances.contains_key(&kind)
    }

    pub fn list_running(&self) -> Vec<EmulatorKind> {
        EmulatorKind::ALL
            .into_iter()
            .filter(|kind| self.is_running(*kind))
            .collect()
    }

    pub fn get(&self, kind: EmulatorKind) -> Option<&dyn Emulator> {
        self.instances.get(&kind).map(|b| b.as_ref())
    }

    pub fn get_mut(&mut self, kind: EmulatorKind) -> Option<&mut (dyn Emulator + 'static)> {
        self.instances.get_mut(&kind).map(|b| b.as_mut())
    }

    pub fn get_port(&self, kind: EmulatorKind) -> Option<u16> {
        self.get(kind).map(|i| i.address().port)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
