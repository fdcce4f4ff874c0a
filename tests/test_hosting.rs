use std::time::Duration;

use emuctl::emulator::hosting::HostingEmulator;
use emuctl::emulator::ports::wait_until_port_closed;
use emuctl::{Address, Emulator, EmulatorError, EmulatorKind};
use tempfile::TempDir;

fn hosting_on(port: u16, public: &TempDir) -> HostingEmulator {
    HostingEmulator::new(
        Address::new("127.0.0.1", port),
        public.path().to_path_buf(),
    )
}

#[tokio::test]
async fn test_serves_static_content() {
    let public = TempDir::new().unwrap();
    std::fs::write(public.path().join("index.html"), "<h1>hello</h1>").unwrap();

    let mut hosting = hosting_on(42300, &public);
    hosting.start().await.unwrap();
    wait_until_port_closed(42300, Duration::from_secs(5), Duration::from_millis(50))
        .await
        .unwrap();

    let body = reqwest::get("http://127.0.0.1:42300/index.html")
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(body, "<h1>hello</h1>");

    hosting.stop().await.unwrap();
}

#[tokio::test]
async fn test_stop_twice_is_idempotent() {
    let public = TempDir::new().unwrap();
    let mut hosting = hosting_on(42310, &public);

    hosting.start().await.unwrap();
    hosting.stop().await.unwrap();
    hosting.stop().await.unwrap();

    // Stopping an instance that never started is also a no-op.
    let mut never_started = hosting_on(42311, &public);
    never_started.stop().await.unwrap();
}

#[tokio::test]
async fn test_start_twice_is_rejected() {
    let public = TempDir::new().unwrap();
    let mut hosting = hosting_on(42320, &public);

    hosting.start().await.unwrap();
    let err = hosting.start().await.unwrap_err();
    assert!(matches!(
        err,
        EmulatorError::AlreadyRunning(EmulatorKind::Hosting)
    ));
    hosting.stop().await.unwrap();
}

#[tokio::test]
async fn test_bind_failure_surfaces_as_error() {
    let public = TempDir::new().unwrap();
    let _blocker = std::net::TcpListener::bind(("127.0.0.1", 42330)).unwrap();

    let mut hosting = hosting_on(42330, &public);
    let err = hosting.start().await.unwrap_err();
    assert!(matches!(err, EmulatorError::Subprocess { .. }));

    // A failed start leaves the instance stopped and stop stays a no-op.
    hosting.stop().await.unwrap();
}
