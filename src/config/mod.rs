// src/config/mod.rs

//! Configuration loading and validation for provrun.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate watcher and environment entries (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{DEFAULT_CONFIG_FILE, load_and_validate, load_from_path, resolve_config_path};
pub use model::{ConfigFile, RawConfigFile, RunSection, WatchConfig};
