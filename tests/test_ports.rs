use std::time::{Duration, Instant};

use emuctl::emulator::ports::{is_port_free, wait_until_port_closed};
use emuctl::EmulatorError;

#[tokio::test]
async fn test_probe_sees_bound_port_as_busy() {
    let listener = std::net::TcpListener::bind(("127.0.0.1", 0)).unwrap();
    let port = listener.local_addr().unwrap().port();

    assert!(!is_port_free(port).await);
    drop(listener);
    assert!(is_port_free(port).await);
}

#[tokio::test]
async fn test_wait_returns_once_port_is_taken() {
    let listener = std::net::TcpListener::bind(("127.0.0.1", 0)).unwrap();
    let port = listener.local_addr().unwrap().port();

    wait_until_port_closed(port, Duration::from_millis(500), Duration::from_millis(50))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_wait_times_out_after_the_full_budget() {
    // Grab an ephemeral port and free it again, so nothing ever listens there.
    let port = {
        let listener = std::net::TcpListener::bind(("127.0.0.1", 0)).unwrap();
        listener.local_addr().unwrap().port()
    };

    let started = Instant::now();
    let err = wait_until_port_closed(port, Duration::from_millis(500), Duration::from_millis(100))
        .await
        .unwrap_err();
    let elapsed = started.elapsed();

    assert!(matches!(
        err,
        EmulatorError::PortTimeout {
            timeout_ms: 500,
            ..
        }
    ));
    // Polled for the whole budget, not forever.
    assert!(elapsed >= Duration::from_millis(400), "gave up too early: {elapsed:?}");
    assert!(elapsed < Duration::from_secs(5), "overshot the budget: {elapsed:?}");
}

#[tokio::test]
async fn test_wait_notices_a_late_listener() {
    let reserved = std::net::TcpListener::bind(("127.0.0.1", 0)).unwrap();
    let port = reserved.local_addr().unwrap().port();
    drop(reserved);

    // Bind the port partway through the polling window. Retry the bind:
    // the probe itself briefly holds the port on each poll.
    let binder = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        loop {
            if let Ok(listener) = std::net::TcpListener::bind(("127.0.0.1", port)) {
                return listener;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    });

    wait_until_port_closed(port, Duration::from_secs(5), Duration::from_millis(50))
        .await
        .unwrap();
    drop(binder.await.unwrap());
}
