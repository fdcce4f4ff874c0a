//! TCP port probing.
//!
//! Spawned emulator processes have a startup latency before they bind their
//! port, so the orchestrator polls until the bind is observed instead of
//! assuming success right after spawn.

use std::time::Duration;
use tokio::net::TcpListener;
use tokio::time::sleep;

use super::error::EmulatorError;

pub const PORT_WAIT_TIMEOUT: Duration = Duration::from_secs(30);
pub const PORT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Whether the port can currently be bound locally. Bind errors are treated
/// as "not free".
pub async fn is_port_free(port: u16) -> bool {
    TcpListener::bind(("127.0.0.1", port)).await.is_ok()
}

/// Poll until something is listening on the port (i.e. the process we just
/// launched has bound it), or fail with a timeout error naming the port.
pub async fn wait_until_port_closed(
    port: u16,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<(), EmulatorError> {
    let mut elapsed = Duration::ZERO;
    while elapsed < timeout {
        if !is_port_free(port).await {
            return Ok(());
        }
        sleep(poll_interval).await;
        elapsed += poll_interval;
    }

    Err(EmulatorError::PortTimeout {
        port,
        timeout_ms: timeout.as_millis() as u64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bound_port_is_not_free() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        assert!(!is_port_free(port).await);
        drop(listener);
        assert!(is_port_free(port).await);
    }

    #[tokio::test]
    async fn test_wait_succeeds_once_port_is_bound() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        wait_until_port_closed(port, Duration::from_millis(500), Duration::from_millis(50))
            .await
            .unwrap();
    }
}
