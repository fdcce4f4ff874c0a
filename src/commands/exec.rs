//! Start the emulators, run a script against them, then shut everything down.
//!
//! The script runs through the shell with the emulator endpoints exported in
//! its environment, so client SDKs inside the script pick them up without any
//! extra wiring. The script's exit code becomes ours.

use anyhow::{bail, Context, Result};
use tokio::process::Command;
use tracing::info;

use crate::cli::ExecArgs;
use crate::commands::start::build_controller;
use crate::emulator::database::DATABASE_EMULATOR_ENV;
use crate::emulator::firestore::{FIRESTORE_EMULATOR_ENV, FIRESTORE_EMULATOR_ENV_ALT};
use crate::emulator::{Controller, EmulatorKind};

pub async fn cmd_exec(args: ExecArgs) -> Result<i32> {
    let controller = build_controller(&args.start)?;

    let targets = controller.targets(args.start.only.as_deref(), args.start.except.as_deref());
    if targets.is_empty() {
        bail!("No emulators to start. Check --only/--except and the project config.");
    }

    controller.start_all(&targets).await?;

    let env = emulator_env(&controller).await;
    info!(script = %args.script, "running script against emulators");
    let status = Command::new("sh")
        .arg("-c")
        .arg(&args.script)
        .envs(env)
        .status()
        .await;

    // The emulators come down whether or not the script ran.
    controller.clean_shutdown().await;

    let status = status.context("running script")?;
    let code = status.code().unwrap_or(1);
    info!(code, "script finished");
    Ok(code)
}

/// Endpoint env vars for every running emulator the SDKs know how to use.
async fn emulator_env(controller: &Controller) -> Vec<(String, String)> {
    let registry = controller.registry();
    let registry = registry.lock().await;
    let mut env = Vec::new();

    if let Some(instance) = registry.get(EmulatorKind::Database) {
        env.push((
            DATABASE_EMULATOR_ENV.to_string(),
            instance.address().host_port(),
        ));
    }
    if let Some(instance) = registry.get(EmulatorKind::Firestore) {
        let host_port = instance.address().host_port();
        env.push((FIRESTORE_EMULATOR_ENV.to_string(), host_port.clone()));
        env.push((FIRESTORE_EMULATOR_ENV_ALT.to_string(), host_port));
    }
    env
}
