use anyhow::Result;
use clap::Parser;
use emuctl::cli::Commands;
use emuctl::{cli, commands};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // Only use colors when outputting to a TTY (not when piped to a file)
    let use_color = atty::is(atty::Stream::Stdout);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_target(true)
        .with_ansi(use_color)
        .init();

    let result = match cli.cmd {
        Commands::Start(args) => commands::cmd_start(args).await,
        Commands::Exec(args) => match commands::cmd_exec(args).await {
            // The wrapped script's exit code becomes our exit code
            Ok(code) if code != 0 => std::process::exit(code),
            Ok(_) => Ok(()),
            Err(e) => Err(e),
        },
        Commands::Setup(args) => commands::cmd_setup(args).await,
    };

    if let Err(e) = &result {
        error!("Error: {:#}", e);
        std::process::exit(1);
    }

    result
}
