//! The firestore emulator, wrapping its java binary.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::address::Address;
use super::binaries;
use super::error::EmulatorError;
use super::instance::{Emulator, Lifecycle};
use super::kind::EmulatorKind;
use super::rules;
use super::subprocess::JarProcess;

/// Env var current-generation SDK clients read.
pub const FIRESTORE_EMULATOR_ENV: &str = "FIRESTORE_EMULATOR_HOST";
/// Env var older-generation SDK clients read; both are exported.
pub const FIRESTORE_EMULATOR_ENV_ALT: &str = "FIREBASE_FIRESTORE_EMULATOR_ADDRESS";

pub struct FirestoreEmulator {
    address: Address,
    namespace: String,
    rules: Option<PathBuf>,
    process: JarProcess,
    watcher: Option<JoinHandle<()>>,
    rules_guard: Arc<Mutex<()>>,
    state: Lifecycle,
}

impl FirestoreEmulator {
    pub fn new(address: Address, namespace: String, rules: Option<PathBuf>) -> Self {
        let args = vec![
            "--host".to_string(),
            address.host.clone(),
            "--port".to_string(),
            address.port.to_string(),
        ];

        let process = JarProcess::new(
            EmulatorKind::Firestore,
            binaries::FIRESTORE_JAR.local_path(),
            args,
        );

        Self {
            address,
            namespace,
            rules,
            process,
            watcher: None,
            rules_guard: Arc::new(Mutex::new(())),
            state: Lifecycle::Constructed,
        }
    }
}

#[async_trait]
impl Emulator for FirestoreEmulator {
    fn kind(&self) -> EmulatorKind {
        EmulatorKind::Firestore
    }

    fn address(&self) -> &Address {
        &self.address
    }

    async fn start(&mut self) -> Result<(), EmulatorError> {
        if self.state != Lifecycle::Constructed {
            return Err(EmulatorError::AlreadyRunning(self.kind()));
        }
        self.state = Lifecycle::Starting;

        let rules_path = match self.rules.take() {
            Some(path) if path.exists() => {
                self.process.arg("--rules");
                self.process.arg(path.display().to_string());
                Some(path)
            }
            Some(path) => {
                warn!(
                    "Firestore rules file {} does not exist, starting firestore emulator without rules.",
                    path.display()
                );
                None
            }
            None => None,
        };

        if let Err(e) = self.process.spawn() {
            self.state = Lifecycle::Stopped;
            return Err(e);
        }

        if let Some(path) = rules_path {
            let url = rules::rules_url(&self.address, &self.namespace);
            match rules::spawn_rules_watcher(self.kind(), path, url, self.rules_guard.clone()) {
                Ok(handle) => self.watcher = Some(handle),
                Err(e) => warn!(emulator = %self.kind(), "could not watch rules file: {}", e),
            }
        }

        self.state = Lifecycle::Running;
        Ok(())
    }

    async fn connect(&mut self) -> Result<(), EmulatorError> {
        if self.state == Lifecycle::Running {
            info!(
                "For testing set {}={}",
                FIRESTORE_EMULATOR_ENV,
                self.address.host_port()
            );
        }
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), EmulatorError> {
        match self.state {
            Lifecycle::Running | Lifecycle::Starting => {
                self.state = Lifecycle::Stopping;
                let _guard = self.rules_guard.lock().await;
                if let Some(watcher) = self.watcher.take() {
                    watcher.abort();
                }
                let result = self.process.kill().await;
                self.state = Lifecycle::Stopped;
                result
            }
            _ => Ok(()),
        }
    }
}
