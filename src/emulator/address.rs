//! Listen address resolution for each emulator kind.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::EmulatorError;
use super::kind::EmulatorKind;
use crate::config::ProjectConfig;

pub const DEFAULT_HOST: &str = "localhost";

/// A resolved (host, port) pair. Canonical for the lifetime of a running
/// instance; never mutated after start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub host: String,
    pub port: u16,
}

impl Address {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// `host:port`, the form exported to SDK clients via env vars.
    pub fn host_port(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Default listen port per emulator kind.
pub fn default_port(kind: EmulatorKind) -> u16 {
    match kind {
        EmulatorKind::Hosting => 5000,
        EmulatorKind::Functions => 5001,
        EmulatorKind::Firestore => 8080,
        EmulatorKind::Database => 9000,
    }
}

/// Derive the listen address for an emulator from the project config,
/// falling back to per-kind defaults. Pure; no side effects.
pub fn resolve_address(
    kind: EmulatorKind,
    config: &ProjectConfig,
) -> Result<Address, EmulatorError> {
    let settings = config.settings(kind);

    let host = settings
        .and_then(|s| s.host.as_deref())
        .map(normalize_host)
        .unwrap_or_else(|| DEFAULT_HOST.to_string());

    let port = match settings.and_then(|s| s.port.as_ref()) {
        None => default_port(kind),
        Some(serde_json::Value::Number(n)) => {
            let n = n.as_u64().ok_or_else(|| {
                EmulatorError::Config(format!("emulators.{kind}.port must be a positive integer"))
            })?;
            u16::try_from(n).map_err(|_| {
                EmulatorError::Config(format!("emulators.{kind}.port {n} is out of range"))
            })?
        }
        Some(serde_json::Value::String(s)) => s.trim().parse::<u16>().map_err(|_| {
            EmulatorError::Config(format!("emulators.{kind}.port {s:?} is not a valid port"))
        })?,
        Some(other) => {
            return Err(EmulatorError::Config(format!(
                "emulators.{kind}.port has unexpected value {other}"
            )))
        }
    };

    // Port 0 would let the OS pick an ephemeral port the orchestrator never
    // learns, defeating the pre-flight check and the readiness wait.
    if port == 0 {
        return Err(EmulatorError::Config(format!(
            "emulators.{kind}.port must be between 1 and 65535"
        )));
    }

    Ok(Address { host, port })
}

/// Extract a bare hostname from whatever the user configured. Tolerates a
/// full URL (or a `host:port` pair) where only a host was expected.
fn normalize_host(raw: &str) -> String {
    let normalized = if raw.starts_with("http") {
        raw.to_string()
    } else {
        format!("http://{raw}")
    };

    url::Url::parse(&normalized)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| DEFAULT_HOST.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_addresses() {
        let config = ProjectConfig::default();
        let cases = [
            (EmulatorKind::Hosting, 5000),
            (EmulatorKind::Functions, 5001),
            (EmulatorKind::Firestore, 8080),
            (EmulatorKind::Database, 9000),
        ];
        for (kind, port) in cases {
            let addr = resolve_address(kind, &config).unwrap();
            assert_eq!(addr.host, "localhost");
            assert_eq!(addr.port, port);
        }
    }

    fn config_with(kind: EmulatorKind, host: Option<&str>, port: Option<serde_json::Value>) -> ProjectConfig {
        let mut config = ProjectConfig::default();
        config.emulators.insert(
            kind.label().to_string(),
            crate::config::EmulatorSettings {
                host: host.map(str::to_string),
                port,
            },
        );
        config
    }

    #[test]
    fn test_host_normalization() {
        for raw in ["myhost", "http://myhost", "http://myhost:1234/path"] {
            let config = config_with(EmulatorKind::Database, Some(raw), None);
            let addr = resolve_address(EmulatorKind::Database, &config).unwrap();
            assert_eq!(addr.host, "myhost", "input {raw:?}");
        }

        // host:port input keeps only the host component
        let config = config_with(EmulatorKind::Database, Some("0.0.0.0:9000"), None);
        let addr = resolve_address(EmulatorKind::Database, &config).unwrap();
        assert_eq!(addr.host, "0.0.0.0");
        assert_eq!(addr.port, 9000); // port still comes from defaults/overrides
    }

    #[test]
    fn test_numeric_string_port() {
        let config = config_with(
            EmulatorKind::Firestore,
            None,
            Some(serde_json::Value::String("8081".to_string())),
        );
        let addr = resolve_address(EmulatorKind::Firestore, &config).unwrap();
        assert_eq!(addr.port, 8081);
    }

    #[test]
    fn test_non_numeric_port_is_config_error() {
        let config = config_with(
            EmulatorKind::Firestore,
            None,
            Some(serde_json::Value::String("eight".to_string())),
        );
        let err = resolve_address(EmulatorKind::Firestore, &config).unwrap_err();
        assert!(matches!(err, EmulatorError::Config(_)));
    }

    #[test]
    fn test_zero_port_is_config_error() {
        for value in [serde_json::json!(0), serde_json::json!("0")] {
            let config = config_with(EmulatorKind::Database, None, Some(value));
            let err = resolve_address(EmulatorKind::Database, &config).unwrap_err();
            assert!(matches!(err, EmulatorError::Config(_)));
        }
    }

    #[test]
    fn test_out_of_range_port_is_config_error() {
        let config = config_with(
            EmulatorKind::Database,
            None,
            Some(serde_json::json!(70000)),
        );
        let err = resolve_address(EmulatorKind::Database, &config).unwrap_err();
        assert!(matches!(err, EmulatorError::Config(_)));
    }

    #[test]
    fn test_host_port_format() {
        let addr = Address::new("localhost", 9000);
        assert_eq!(addr.host_port(), "localhost:9000");
        assert_eq!(addr.url(), "http://localhost:9000");
    }
}
