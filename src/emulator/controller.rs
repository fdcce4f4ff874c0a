//! Orchestration entry point: decides which emulators run, starts them in
//! dependency order with pre-flight port checks, cross-wires peer addresses,
//! and performs coordinated shutdown.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::address::{resolve_address, Address};
use super::database::DatabaseEmulator;
use super::error::EmulatorError;
use super::firestore::FirestoreEmulator;
use super::functions::FunctionsEmulator;
use super::hosting::HostingEmulator;
use super::instance::Emulator;
use super::kind::EmulatorKind;
use super::ports;
use super::registry::Registry;
use crate::config::ProjectConfig;

/// Rules namespace used when no project id is given.
pub const DEFAULT_NAMESPACE: &str = "fake-server";

/// Addresses of the emulators a starting instance may need to reach.
#[derive(Debug, Clone, Default)]
pub struct PeerAddresses {
    pub functions: Option<Address>,
    pub database: Option<Address>,
    pub firestore: Option<Address>,
}

/// Builds the concrete instance for a kind. The controller goes through this
/// seam so tests can substitute fakes for the real emulators.
pub trait InstanceFactory: Send + Sync {
    fn build(
        &self,
        kind: EmulatorKind,
        address: Address,
        peers: &PeerAddresses,
    ) -> Result<Box<dyn Emulator>, EmulatorError>;
}

struct DefaultFactory {
    config: ProjectConfig,
    project_root: PathBuf,
    namespace: String,
}

impl DefaultFactory {
    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        }
    }
}

impl InstanceFactory for DefaultFactory {
    fn build(
        &self,
        kind: EmulatorKind,
        address: Address,
        peers: &PeerAddresses,
    ) -> Result<Box<dyn Emulator>, EmulatorError> {
        match kind {
            EmulatorKind::Database => {
                let rules = self
                    .config
                    .database
                    .as_ref()
                    .and_then(|t| t.rules.as_ref())
                    .map(|p| self.resolve_path(p));
                Ok(Box::new(DatabaseEmulator::new(
                    address,
                    self.namespace.clone(),
                    rules,
                    peers.functions.clone(),
                )))
            }
            EmulatorKind::Firestore => {
                let rules = self
                    .config
                    .firestore
                    .as_ref()
                    .and_then(|t| t.rules.as_ref())
                    .map(|p| self.resolve_path(p));
                Ok(Box::new(FirestoreEmulator::new(
                    address,
                    self.namespace.clone(),
                    rules,
                )))
            }
            EmulatorKind::Functions => {
                let target = self.config.functions.clone().unwrap_or_default();
                let source = self.resolve_path(
                    &target.source.unwrap_or_else(|| PathBuf::from("functions")),
                );
                Ok(Box::new(FunctionsEmulator::new(
                    address,
                    self.namespace.clone(),
                    source,
                    target.runtime,
                    peers.database.clone(),
                    peers.firestore.clone(),
                )))
            }
            EmulatorKind::Hosting => {
                let target = self.config.hosting.clone().unwrap_or_default();
                let public =
                    self.resolve_path(&target.public.unwrap_or_else(|| PathBuf::from("public")));
                Ok(Box::new(HostingEmulator::new(address, public)))
            }
        }
    }
}

/// Compute the set of emulators to run: the `only`/`except` request filtered
/// down to the kinds the project actually configures. Unknown names and
/// unconfigured kinds are dropped with a warning, never an error.
pub fn filter_targets(
    config: &ProjectConfig,
    only: Option<&str>,
    except: Option<&str>,
) -> Vec<EmulatorKind> {
    let mut requested = match only {
        Some(list) => parse_kind_list(list),
        None => EmulatorKind::ALL.to_vec(),
    };

    if let Some(list) = except {
        let excluded = parse_kind_list(list);
        requested.retain(|kind| !excluded.contains(kind));
    }

    requested.retain(|kind| {
        if config.is_configured(*kind) {
            true
        } else {
            warn!(
                "Not starting the {} emulator, it is not configured in this project.",
                kind
            );
            false
        }
    });
    requested
}

fn parse_kind_list(list: &str) -> Vec<EmulatorKind> {
    let mut kinds = Vec::new();
    for name in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        match name.parse::<EmulatorKind>() {
            Ok(kind) => {
                if !kinds.contains(&kind) {
                    kinds.push(kind);
                }
            }
            Err(e) => warn!("{e}, ignoring"),
        }
    }
    kinds
}

pub struct Controller {
    config: ProjectConfig,
    registry: Arc<Mutex<Registry>>,
    factory: Box<dyn InstanceFactory>,
}

impl Controller {
    pub fn new(config: ProjectConfig, project_root: PathBuf, project_id: Option<String>) -> Self {
        let namespace = project_id.unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());
        let factory = Box::new(DefaultFactory {
            config: config.clone(),
            project_root,
            namespace,
        });
        Self::with_factory(config, factory)
    }

    /// Controller with an injected instance factory (tests).
    pub fn with_factory(config: ProjectConfig, factory: Box<dyn InstanceFactory>) -> Self {
        Self {
            config,
            registry: Arc::new(Mutex::new(Registry::new())),
            factory,
        }
    }

    /// Shared handle to the running-instance table, e.g. for the interrupt
    /// handler or for env injection into exec'd scripts.
    pub fn registry(&self) -> Arc<Mutex<Registry>> {
        self.registry.clone()
    }

    pub fn targets(&self, only: Option<&str>, except: Option<&str>) -> Vec<EmulatorKind> {
        filter_targets(&self.config, only, except)
    }

    /// Start every requested emulator, sequentially, in dependency order.
    ///
    /// Any failure aborts the whole startup and shuts down everything already
    /// running; a partial emulator set produces confusing cross-wiring and is
    /// treated as fatal.
    pub async fn start_all(&self, targets: &[EmulatorKind]) -> Result<(), EmulatorError> {
        let names: Vec<&str> = targets.iter().map(|k| k.label()).collect();
        info!("Starting emulators: {:?}", names);

        // Resolve every address up front: a config error surfaces before
        // anything starts, and later starts consume peer addresses resolved
        // here.
        let mut addresses: HashMap<EmulatorKind, Address> = HashMap::new();
        for kind in targets {
            addresses.insert(*kind, resolve_address(*kind, &self.config)?);
        }
        let peers = PeerAddresses {
            functions: addresses.get(&EmulatorKind::Functions).cloned(),
            database: addresses.get(&EmulatorKind::Database).cloned(),
            firestore: addresses.get(&EmulatorKind::Firestore).cloned(),
        };

        for kind in EmulatorKind::START_ORDER {
            let Some(address) = addresses.get(&kind) else {
                continue;
            };
            if let Err(e) = self.start_one(kind, address.clone(), &peers).await {
                self.clean_shutdown().await;
                return Err(e);
            }
        }

        // Post-start integration pass; connect tolerates peers connecting in
        // any order.
        let connected = {
            let mut registry = self.registry.lock().await;
            let mut result = Ok(());
            for kind in registry.list_running() {
                if let Some(instance) = registry.get_mut(kind) {
                    if let Err(e) = instance.connect().await {
                        result = Err(e);
                        break;
                    }
                }
            }
            result
        };
        if let Err(e) = connected {
            self.clean_shutdown().await;
            return Err(e);
        }

        Ok(())
    }

    async fn start_one(
        &self,
        kind: EmulatorKind,
        address: Address,
        peers: &PeerAddresses,
    ) -> Result<(), EmulatorError> {
        if !ports::is_port_free(address.port).await {
            warn!(
                "Port {} is not open, could not start {} emulator.",
                address.port, kind
            );
            info!(
                "To select a different port for the emulator, set \"emulators.{}.port\" in your config file.",
                kind
            );
            return Err(EmulatorError::PortOccupied {
                kind,
                port: address.port,
            });
        }

        let instance = self.factory.build(kind, address, peers)?;
        self.registry.lock().await.start(instance).await
    }

    /// Stop everything. Never fails; stop errors are logged per kind. Safe to
    /// call repeatedly and when nothing is running.
    pub async fn clean_shutdown(&self) {
        info!("Shutting down emulators.");
        let failures = self.registry.lock().await.stop_all().await;
        for (kind, err) in failures {
            warn!(
                error = err.as_label(),
                "Error stopping the {} emulator: {}", kind, err
            );
        }
    }
}
