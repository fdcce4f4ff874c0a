//! Security rules push and hot-reload.
//!
//! The jar-backed emulators expose a management endpoint that accepts new
//! rules content at runtime. A watcher task re-reads the rules file on change
//! and pushes it; a failed push is a warning, never a crash, and pushes are
//! serialized against the owning instance's start/stop transitions via a
//! shared guard.

use notify::{RecursiveMode, Watcher};
use reqwest::header::AUTHORIZATION;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::address::Address;
use super::error::EmulatorError;
use super::kind::EmulatorKind;

/// Fixed development credential accepted by the emulators.
const OWNER_TOKEN: &str = "Bearer owner";

const DEBOUNCE: Duration = Duration::from_millis(500);

/// Management endpoint for replacing the active rules of a running emulator.
pub fn rules_url(address: &Address, namespace: &str) -> String {
    format!(
        "http://{}:{}/.settings/rules.json?ns={}",
        address.host, address.port, namespace
    )
}

/// PUT new rules content to a running emulator's management endpoint.
pub async fn push_rules(
    client: &reqwest::Client,
    kind: EmulatorKind,
    url: &str,
    content: String,
) -> Result<(), EmulatorError> {
    let resp = client
        .put(url)
        .header(AUTHORIZATION, OWNER_TOKEN)
        .body(content)
        .send()
        .await
        .map_err(|e| EmulatorError::RulesUpdate {
            kind,
            message: e.to_string(),
        })?;

    if !resp.status().is_success() {
        return Err(EmulatorError::RulesUpdate {
            kind,
            message: format!("management endpoint returned {}", resp.status()),
        });
    }
    Ok(())
}

/// Watch a rules file and push its content on change.
///
/// The guard serializes pushes against the instance's own start/stop; it is
/// held only for the duration of the PUT. The returned handle is aborted by
/// the owning instance on stop.
pub fn spawn_rules_watcher(
    kind: EmulatorKind,
    rules_path: PathBuf,
    url: String,
    guard: Arc<Mutex<()>>,
) -> Result<JoinHandle<()>, notify::Error> {
    let (tx, mut rx) = tokio::sync::mpsc::channel(100);
    let mut watcher =
        notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
            let _ = tx.blocking_send(res);
        })?;
    watcher.watch(&rules_path, RecursiveMode::NonRecursive)?;

    let handle = tokio::spawn(async move {
        let _watcher = watcher; // keep the watcher alive
        let client = reqwest::Client::new();
        let mut debounce_timer: Option<std::pin::Pin<Box<tokio::time::Sleep>>> = None;

        loop {
            tokio::select! {
                Some(res) = rx.recv() => {
                    match res {
                        Ok(event) => {
                            if event.kind.is_modify() || event.kind.is_create() {
                                debounce_timer = Some(Box::pin(tokio::time::sleep(DEBOUNCE)));
                            }
                        }
                        Err(e) => error!(emulator = %kind, "rules watch error: {}", e),
                    }
                }
                _ = async {
                    match debounce_timer.as_mut() {
                        Some(timer) => timer.await,
                        None => std::future::pending().await,
                    }
                } => {
                    debounce_timer = None;
                    info!(emulator = %kind, "change detected, updating rules...");

                    let content = match tokio::fs::read_to_string(&rules_path).await {
                        Ok(c) => c,
                        Err(e) => {
                            warn!(emulator = %kind, "failed to read rules file {}: {}", rules_path.display(), e);
                            continue;
                        }
                    };

                    let _lock = guard.lock().await;
                    match push_rules(&client, kind, &url, content).await {
                        Ok(()) => info!(emulator = %kind, "rules updated"),
                        Err(e) => warn!(emulator = %kind, "failed to update rules: {}", e),
                    }
                }
            }
        }
    });

    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rules_url_format() {
        let addr = Address::new("localhost", 9000);
        assert_eq!(
            rules_url(&addr, "fake-server"),
            "http://localhost:9000/.settings/rules.json?ns=fake-server"
        );
    }
}
