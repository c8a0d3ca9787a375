//! Library entry point for the radar crate.
//!
//! A client for the Jikan catalog service that survives rate limiting and
//! flaky networks and keeps results in line with the latest query.

pub mod app;
pub mod catalog;
pub mod config;
pub mod fetch;
pub mod fs;
pub mod log;
pub mod net;
pub mod orchestrator;
pub mod utils;

pub use utils::*;

/// Default capacity of the actors' message channels.
pub const BUFFER_SIZE: usize = 128;
