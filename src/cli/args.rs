use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "emuctl", version, about = "Local backend emulator orchestrator")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the local emulators and run until interrupted
    Start(StartArgs),
    /// Start the local emulators, run a script, then shut down
    Exec(ExecArgs),
    /// Download the emulator binaries into the local cache
    Setup(SetupArgs),
}

#[derive(Args, Debug, Clone)]
pub struct StartArgs {
    /// Only run specific emulators (comma-separated list of
    /// database, firestore, functions, hosting)
    #[arg(long)]
    pub only: Option<String>,

    /// Run all configured emulators except these (comma-separated)
    #[arg(long)]
    pub except: Option<String>,

    /// Project configuration file
    #[arg(long, default_value = "emuctl.json")]
    pub config: PathBuf,

    /// Project id, used as the rules namespace
    #[arg(long)]
    pub project: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ExecArgs {
    /// Script to run against the emulators (passed to the shell)
    pub script: String,

    #[command(flatten)]
    pub start: StartArgs,
}

#[derive(Args, Debug, Clone)]
pub struct SetupArgs {
    /// Re-download binaries even if they are already cached
    #[arg(long)]
    pub force: bool,
}
