pub mod address;
pub mod binaries;
pub mod controller;
pub mod database;
pub mod error;
pub mod firestore;
pub mod functions;
pub mod hosting;
pub mod instance;
pub mod kind;
pub mod ports;
pub mod registry;
pub mod rules;
pub mod subprocess;

// Re-export the core types
pub use address::{resolve_address, Address};
pub use controller::{filter_targets, Controller, InstanceFactory, PeerAddresses};
pub use error::EmulatorError;
pub use instance::{Emulator, Lifecycle};
pub use kind::EmulatorKind;
pub use registry::Registry;
