//! The hosting emulator: an in-process static file server. No subprocess
//! lifecycle concerns beyond bind/listen.

use async_trait::async_trait;
use axum::Router;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use tower_http::services::ServeDir;

use super::address::Address;
use super::error::EmulatorError;
use super::instance::{Emulator, Lifecycle};
use super::kind::EmulatorKind;

pub struct HostingEmulator {
    address: Address,
    public_dir: PathBuf,
    server: Option<JoinHandle<()>>,
    state: Lifecycle,
}

impl HostingEmulator {
    pub fn new(address: Address, public_dir: PathBuf) -> Self {
        Self {
            address,
            public_dir,
            server: None,
            state: Lifecycle::Constructed,
        }
    }
}

#[async_trait]
impl Emulator for HostingEmulator {
    fn kind(&self) -> EmulatorKind {
        EmulatorKind::Hosting
    }

    fn address(&self) -> &Address {
        &self.address
    }

    async fn start(&mut self) -> Result<(), EmulatorError> {
        if self.state != Lifecycle::Constructed {
            return Err(EmulatorError::AlreadyRunning(self.kind()));
        }
        self.state = Lifecycle::Starting;

        if !self.public_dir.is_dir() {
            warn!(
                "Hosting public directory {} does not exist, requests will 404.",
                self.public_dir.display()
            );
        }

        let app = Router::new().fallback_service(ServeDir::new(&self.public_dir));

        let bind_addr = format!("{}:{}", self.address.host, self.address.port);
        let listener = match TcpListener::bind(&bind_addr).await {
            Ok(listener) => listener,
            Err(e) => {
                self.state = Lifecycle::Stopped;
                return Err(EmulatorError::Subprocess {
                    kind: EmulatorKind::Hosting,
                    message: format!("failed to bind {bind_addr}: {e}"),
                });
            }
        };

        info!(
            emulator = %self.kind(),
            root = %self.public_dir.display(),
            "serving static content at http://{}",
            bind_addr
        );

        self.server = Some(tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                error!(emulator = "hosting", "static server error: {}", e);
            }
        }));

        self.state = Lifecycle::Running;
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), EmulatorError> {
        match self.state {
            Lifecycle::Running | Lifecycle::Starting => {
                self.state = Lifecycle::Stopping;
                if let Some(server) = self.server.take() {
                    server.abort();
                }
                self.state = Lifecycle::Stopped;
                Ok(())
            }
            _ => Ok(()),
        }
    }
}
