//! Configuration model for conductor.
//!
//! This module defines the Config struct that represents `conductor.yaml`.
//! It supports forward-compatible YAML parsing (unknown fields are kept in
//! `extra`), sensible defaults for optional fields, and validation of config
//! values. Without a config file the built-in agent set is used.

mod model;
mod operations;


// Re-export public API
pub use model::{AgentEntry, Config, DEFAULT_CONFIG_FILE, Defaults, builtin_agents};
