//! Domain models for taskman
//!
//! Contains the core business logic without any I/O concerns.

mod id;
mod task;
mod stats;

pub use id::{ClockIds, IdSource, SequentialIds, TaskId, TaskKey};
pub use task::{Priority, Status, Task, TaskError, MAX_TITLE_LEN};
pub use stats::{percentage, PriorityDistribution, Statistics, StatusDistribution, NO_TASKS_MESSAGE};

pub(crate) use task::{format_timestamp, now};
