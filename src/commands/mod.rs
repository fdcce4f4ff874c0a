pub mod exec;
pub mod setup;
pub mod start;

// Re-export command functions
pub use exec::cmd_exec;
pub use setup::cmd_setup;
pub use start::cmd_start;
