//! taskman - a personal task tracker
//!
//! Tasks live in memory inside a [`TaskManager`] and are persisted to a
//! single JSON file. On top of that sit aggregate statistics, one-shot
//! exports (JSON, XML, xlsx), daily reports with CSV export, and simulated
//! email reminders.

pub mod domain;
pub mod storage;
pub mod export;
pub mod report;
pub mod notify;
pub mod manager;
pub mod cli;

pub use domain::{Priority, Statistics, Status, Task, TaskError, TaskId};
pub use export::{ExportError, ExportFormat, ExportService};
pub use manager::TaskManager;
pub use report::{ReportError, ReportService};
pub use storage::StorageError;
