//! Storage infrastructure: configuration file persistence.
//!
//! The `config` sub-module handles:
//!
//! - Reading the TOML configuration file from the platform-appropriate directory.
//! - Writing changes back to disk when the user modifies settings.
//! - Providing sensible defaults when the file does not exist yet (first run).
//! - Turning the stored settings into the runtime `StepConfig` and
//!   `SessionConfig` values.

pub mod config;
