//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Commands
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Task | Create and update tasks | `add`, `list`, `show`, `start`, `complete`, `cancel`, `priority`, `assign`, `delete` |
//! | Reports | Aggregates | `stats`, `report --date 2025-01-31` |
//! | Data | Files | `export tasks.xml`, `csv tasks`, `save backup.json`, `load backup.json` |
//! | Other | | `remind <id> <email>`, `interactive` |
//!
//! Every command loads the storage file first, and commands that change a
//! task write it back before returning.
//!
//! ## Output Formats
//!
//! All commands support the `--format` flag:
//! - `text` (default) - Human-readable, colored unless `--no-color`
//! - `json` - Machine-parseable JSON
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output. It also raises the log
//! filter to `taskman=debug` unless `RUST_LOG` is set:
//! ```bash
//! taskman --verbose list
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod output;
mod task;
mod report_cmd;
mod data_cmd;
mod notify_cmd;
mod shell;

pub use app::{Cli, Commands, run};
pub use output::{Output, OutputFormat};
pub use shell::ShellCommand;
