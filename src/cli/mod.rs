pub mod args;

pub use args::{Cli, Commands, ExecArgs, SetupArgs, StartArgs};
