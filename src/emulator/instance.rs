use async_trait::async_trait;

use super::address::Address;
use super::error::EmulatorError;
use super::kind::EmulatorKind;

/// Instance lifecycle. `Starting -> Stopped` is the failure short-circuit
/// (start failed, partial resources already released).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Constructed,
    Starting,
    Running,
    Stopping,
    Stopped,
}

/// One startable emulator.
///
/// `start` may be called at most once per instance and must leave no orphaned
/// subprocess or socket on failure. `connect` is idempotent post-start
/// integration. `stop` is idempotent; stopping an instance that never started
/// is a no-op success.
#[async_trait]
pub trait Emulator: Send + Sync {
    fn kind(&self) -> EmulatorKind;

    fn address(&self) -> &Address;

    async fn start(&mut self) -> Result<(), EmulatorError>;

    async fn connect(&mut self) -> Result<(), EmulatorError> {
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), EmulatorError>;
}
