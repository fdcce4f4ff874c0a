//! Run the configured emulators until interrupted.

use anyhow::{bail, Result};
use tracing::info;

use crate::cli::StartArgs;
use crate::config;
use crate::emulator::Controller;

pub async fn cmd_start(args: StartArgs) -> Result<()> {
    let controller = build_controller(&args)?;

    let targets = controller.targets(args.only.as_deref(), args.except.as_deref());
    if targets.is_empty() {
        bail!("No emulators to start. Check --only/--except and the project config.");
    }

    controller.start_all(&targets).await?;

    info!("All emulators started. Press Ctrl-C to stop.");
    tokio::signal::ctrl_c().await?;

    controller.clean_shutdown().await;
    Ok(())
}

/// Build a controller from the shared start flags. Also used by `exec`.
pub(crate) fn build_controller(args: &StartArgs) -> Result<Controller> {
    let (config, project_root) = config::load_or_default(&args.config)?;
    Ok(Controller::new(config, project_root, args.project.clone()))
}
