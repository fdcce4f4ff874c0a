pub mod cli;
pub mod commands;
pub mod config;
pub mod emulator;
pub mod paths;

// Re-export core types for convenience
pub use config::ProjectConfig;
pub use emulator::{Address, Emulator, EmulatorError, EmulatorKind, Registry};
