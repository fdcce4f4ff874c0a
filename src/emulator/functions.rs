//! The functions emulator: a runtime server subprocess that receives the
//! emulated backend endpoints as explicit environment configuration, so the
//! runtime's SDK initialization routes to the emulators instead of
//! production.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::{Child, Command};
use tracing::info;

use super::address::Address;
use super::database::DATABASE_EMULATOR_ENV;
use super::error::EmulatorError;
use super::firestore::{FIRESTORE_EMULATOR_ENV, FIRESTORE_EMULATOR_ENV_ALT};
use super::instance::{Emulator, Lifecycle};
use super::kind::EmulatorKind;
use super::subprocess;

const DEFAULT_RUNTIME: &str = "node index.js";

pub struct FunctionsEmulator {
    address: Address,
    project_id: String,
    source: PathBuf,
    runtime: String,
    database_peer: Option<Address>,
    firestore_peer: Option<Address>,
    child: Option<Child>,
    state: Lifecycle,
}

impl FunctionsEmulator {
    pub fn new(
        address: Address,
        project_id: String,
        source: PathBuf,
        runtime: Option<String>,
        database_peer: Option<Address>,
        firestore_peer: Option<Address>,
    ) -> Self {
        Self {
            address,
            project_id,
            source,
            runtime: runtime.unwrap_or_else(|| DEFAULT_RUNTIME.to_string()),
            database_peer,
            firestore_peer,
            child: None,
            state: Lifecycle::Constructed,
        }
    }
}

#[async_trait]
impl Emulator for FunctionsEmulator {
    fn kind(&self) -> EmulatorKind {
        EmulatorKind::Functions
    }

    fn address(&self) -> &Address {
        &self.address
    }

    async fn start(&mut self) -> Result<(), EmulatorError> {
        if self.state != Lifecycle::Constructed {
            return Err(EmulatorError::AlreadyRunning(self.kind()));
        }
        self.state = Lifecycle::Starting;

        if !self.source.is_dir() {
            self.state = Lifecycle::Stopped;
            return Err(EmulatorError::Subprocess {
                kind: self.kind(),
                message: format!(
                    "functions source directory {} does not exist",
                    self.source.display()
                ),
            });
        }

        info!(
            emulator = %self.kind(),
            source = %self.source.display(),
            runtime = %self.runtime,
            "starting functions runtime"
        );

        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(&self.runtime)
            .current_dir(&self.source)
            .env("HOST", &self.address.host)
            .env("PORT", self.address.port.to_string())
            .env("GCLOUD_PROJECT", &self.project_id)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Peer addresses are first-class configuration: the runtime's SDK
        // wrapper honors these instead of defaulting to production.
        if let Some(peer) = &self.database_peer {
            cmd.env(DATABASE_EMULATOR_ENV, peer.host_port());
        }
        if let Some(peer) = &self.firestore_peer {
            cmd.env(FIRESTORE_EMULATOR_ENV, peer.host_port());
            cmd.env(FIRESTORE_EMULATOR_ENV_ALT, peer.host_port());
        }

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                self.state = Lifecycle::Stopped;
                return Err(EmulatorError::Subprocess {
                    kind: self.kind(),
                    message: format!("failed to spawn functions runtime: {e}"),
                });
            }
        };

        subprocess::stream_output(self.kind(), &mut child);
        self.child = Some(child);
        self.state = Lifecycle::Running;
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), EmulatorError> {
        match self.state {
            Lifecycle::Running | Lifecycle::Starting => {
                self.state = Lifecycle::Stopping;
                let result = if let Some(mut child) = self.child.take() {
                    let killed = child.kill().await;
                    let _ = child.wait().await;
                    killed.map_err(|e| EmulatorError::Subprocess {
                        kind: EmulatorKind::Functions,
                        message: format!("failed to kill functions runtime: {e}"),
                    })
                } else {
                    Ok(())
                };
                self.state = Lifecycle::Stopped;
                result
            }
            _ => Ok(()),
        }
    }
}
