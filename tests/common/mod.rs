// Common test utilities for emuctl integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use emuctl::emulator::controller::{InstanceFactory, PeerAddresses};
use emuctl::{Address, Emulator, EmulatorError, EmulatorKind, ProjectConfig};

/// Shared, ordered record of lifecycle calls across all fakes in a test.
pub type EventLog = Arc<Mutex<Vec<String>>>;

pub fn new_event_log() -> EventLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn events(log: &EventLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Emulator double. On `start` it binds a real TCP listener on its address so
/// the registry's readiness probe sees the port in use, exactly like a spawned
/// emulator process would.
pub struct FakeEmulator {
    kind: EmulatorKind,
    address: Address,
    log: EventLog,
    listener: Option<std::net::TcpListener>,
    fail_start: bool,
    fail_connect: bool,
    fail_stop: bool,
    skip_bind: bool,
}

impl FakeEmulator {
    pub fn new(kind: EmulatorKind, address: Address, log: EventLog) -> Self {
        Self {
            kind,
            address,
            log,
            listener: None,
            fail_start: false,
            fail_connect: false,
            fail_stop: false,
            skip_bind: false,
        }
    }

    pub fn fail_start(mut self) -> Self {
        self.fail_start = true;
        self
    }

    pub fn fail_connect(mut self) -> Self {
        self.fail_connect = true;
        self
    }

    pub fn fail_stop(mut self) -> Self {
        self.fail_stop = true;
        self
    }

    /// Start "succeeds" but the port never comes up (a wedged process).
    pub fn skip_bind(mut self) -> Self {
        self.skip_bind = true;
        self
    }

    fn record(&self, event: &str) {
        self.log.lock().unwrap().push(format!("{} {}", event, self.kind));
    }

    fn injected(&self, message: &str) -> EmulatorError {
        EmulatorError::Subprocess {
            kind: self.kind,
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl Emulator for FakeEmulator {
    fn kind(&self) -> EmulatorKind {
        self.kind
    }

    fn address(&self) -> &Address {
        &self.address
    }

    async fn start(&mut self) -> Result<(), EmulatorError> {
        self.record("start");
        if self.fail_start {
            return Err(self.injected("injected start failure"));
        }
        if !self.skip_bind {
            let listener = std::net::TcpListener::bind(("127.0.0.1", self.address.port))
                .map_err(|e| self.injected(&e.to_string()))?;
            self.listener = Some(listener);
        }
        Ok(())
    }

    async fn connect(&mut self) -> Result<(), EmulatorError> {
        self.record("connect");
        if self.fail_connect {
            return Err(self.injected("injected connect failure"));
        }
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), EmulatorError> {
        self.record("stop");
        self.listener = None;
        if self.fail_stop {
            return Err(self.injected("injected stop failure"));
        }
        Ok(())
    }
}

/// Factory handing the controller fakes instead of real emulators, with
/// per-kind failure injection. Records the peer addresses each build was
/// given so cross-wiring can be asserted.
#[derive(Default)]
pub struct FakeFactory {
    pub log: EventLog,
    pub built: Arc<Mutex<Vec<(EmulatorKind, PeerAddresses)>>>,
    pub fail_start: Option<EmulatorKind>,
    pub fail_connect: Option<EmulatorKind>,
    pub fail_stop: Option<EmulatorKind>,
}

impl FakeFactory {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            ..Default::default()
        }
    }
}

/// The peers recorded for a kind's build, if it was built.
pub fn built_peers(
    built: &Arc<Mutex<Vec<(EmulatorKind, PeerAddresses)>>>,
    kind: EmulatorKind,
) -> Option<PeerAddresses> {
    built
        .lock()
        .unwrap()
        .iter()
        .find(|(k, _)| *k == kind)
        .map(|(_, peers)| peers.clone())
}

impl InstanceFactory for FakeFactory {
    fn build(
        &self,
        kind: EmulatorKind,
        address: Address,
        peers: &PeerAddresses,
    ) -> Result<Box<dyn Emulator>, EmulatorError> {
        self.built.lock().unwrap().push((kind, peers.clone()));
        let mut fake = FakeEmulator::new(kind, address, self.log.clone());
        if self.fail_start == Some(kind) {
            fake = fake.fail_start();
        }
        if self.fail_connect == Some(kind) {
            fake = fake.fail_connect();
        }
        if self.fail_stop == Some(kind) {
            fake = fake.fail_stop();
        }
        Ok(Box::new(fake))
    }
}

/// Project config with every emulator section present and explicit port
/// overrides, so concurrent tests never collide on the default ports.
pub fn config_with_ports(ports: &[(EmulatorKind, u16)]) -> ProjectConfig {
    let mut emulators = serde_json::Map::new();
    for (kind, port) in ports {
        emulators.insert(
            kind.to_string(),
            serde_json::json!({ "host": "127.0.0.1", "port": port }),
        );
    }
    serde_json::from_value(serde_json::json!({
        "database": {},
        "firestore": {},
        "functions": {},
        "hosting": {},
        "emulators": emulators,
    }))
    .unwrap()
}

pub fn local_address(port: u16) -> Address {
    Address::new("127.0.0.1", port)
}
