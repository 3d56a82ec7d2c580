//! Beacon - status signals for concurrent coding agents
//!
//! Each shell session publishes a short "I am doing X" message keyed by its
//! process identity, optionally with the terminal context it was issued from.
//! State lives as one file per key in a flat cache directory.

pub mod beacon;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod file;
pub mod logging;
pub mod render;
pub mod store;
pub mod types;

pub use beacon::Beacon;
pub use error::{BeaconError, Result};
pub use store::{FileStore, StateStore};
pub use types::{IdentityKey, StateEntry};
