//! # Storage Layer
//!
//! Persistence for taskman.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Tasks | JSON document (`tasks` + `metadata`) | `tasks_cli.json` (configurable) |
//! | Config | TOML | `~/.config/taskman/config.toml` |
//!
//! ## Concurrency
//!
//! None. Writes go straight to the target file and the last writer wins.
//! Before each save the target directory is scanned and the write is refused
//! once it holds too many files with the storage extension.
//!
//! ## Key Types
//!
//! - [`TaskFile`] - Read/write the task collection
//! - [`Config`] - User configuration

mod json_file;
mod config;

pub use json_file::{StorageError, TaskFile, DEFAULT_MAX_FILES};
pub use config::{Config, ConfigError, CONFIG_ENV};
