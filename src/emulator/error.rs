use thiserror::Error;

use super::kind::EmulatorKind;

/// Errors produced by the emulator lifecycle core.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum EmulatorError {
    /// Malformed address configuration (e.g. a non-numeric port).
    #[error("invalid emulator configuration: {0}")]
    Config(String),

    /// The pre-flight check found the target port already bound.
    #[error("port {port} is not open, could not start the {kind} emulator")]
    PortOccupied { kind: EmulatorKind, port: u16 },

    /// A started emulator did not bind its port within the timeout.
    #[error("TIMEOUT: port {port} was not active within {timeout_ms}ms")]
    PortTimeout { port: u16, timeout_ms: u64 },

    /// An emulator of this kind is already running.
    #[error("the {0} emulator is already running")]
    AlreadyRunning(EmulatorKind),

    /// The wrapped process failed to spawn or exited unexpectedly.
    #[error("{kind} emulator process error: {message}")]
    Subprocess { kind: EmulatorKind, message: String },

    /// Pushing new rules content to a running emulator failed.
    #[error("failed to update {kind} rules: {message}")]
    RulesUpdate { kind: EmulatorKind, message: String },
}

impl EmulatorError {
    /// Short stable label for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            EmulatorError::Config(_) => "config",
            EmulatorError::PortOccupied { .. } => "port_occupied",
            EmulatorError::PortTimeout { .. } => "port_timeout",
            EmulatorError::AlreadyRunning(_) => "already_running",
            EmulatorError::Subprocess { .. } => "subprocess",
            EmulatorError::RulesUpdate { .. } => "rules_update",
        }
    }
}
