//! Child process plumbing shared by the subprocess-backed emulators.

use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tracing::{info, warn};

use super::error::EmulatorError;
use super::kind::EmulatorKind;

/// Re-log a child's stdout as info and stderr as warnings, tagged with the
/// owning emulator kind.
pub fn stream_output(kind: EmulatorKind, child: &mut Child) {
    if let Some(stdout) = child.stdout.take() {
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                info!(target: "emulator", emulator = %kind, "{}", line);
            }
        });
    }

    if let Some(stderr) = child.stderr.take() {
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                warn!(target: "emulator", emulator = %kind, "{}", line);
            }
        });
    }
}

/// A java-backed emulator process wrapping a downloaded jar.
pub struct JarProcess {
    kind: EmulatorKind,
    jar: PathBuf,
    args: Vec<String>,
    child: Option<Child>,
}

impl JarProcess {
    pub fn new(kind: EmulatorKind, jar: PathBuf, args: Vec<String>) -> Self {
        Self {
            kind,
            jar,
            args,
            child: None,
        }
    }

    /// Append an argument before spawning (e.g. a rules flag that is only
    /// known to be valid at start time).
    pub fn arg(&mut self, arg: impl Into<String>) {
        self.args.push(arg.into());
    }

    #[cfg(test)]
    pub(crate) fn args(&self) -> &[String] {
        &self.args
    }

    /// Spawn `java -jar` with the configured arguments, streaming its output
    /// through tracing. Fails with a remediation hint when the jar has not
    /// been downloaded yet.
    pub fn spawn(&mut self) -> Result<(), EmulatorError> {
        if !self.jar.exists() {
            return Err(EmulatorError::Subprocess {
                kind: self.kind,
                message: format!(
                    "emulator binary not found at {}, run `emuctl setup` to download it",
                    self.jar.display()
                ),
            });
        }

        info!(emulator = %self.kind, jar = %self.jar.display(), "starting emulator process");

        let mut cmd = Command::new("java");
        cmd.arg("-Duser.language=en")
            .arg("-jar")
            .arg(&self.jar)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| EmulatorError::Subprocess {
            kind: self.kind,
            message: format!("failed to spawn java: {e}"),
        })?;

        stream_output(self.kind, &mut child);
        self.child = Some(child);
        Ok(())
    }

    /// Kill the process and reap it. Idempotent.
    pub async fn kill(&mut self) -> Result<(), EmulatorError> {
        if let Some(mut child) = self.child.take() {
            info!(emulator = %self.kind, "stopping emulator process");
            child.kill().await.map_err(|e| EmulatorError::Subprocess {
                kind: self.kind,
                message: format!("failed to kill process: {e}"),
            })?;
            let _ = child.wait().await;
        }
        Ok(())
    }
}
