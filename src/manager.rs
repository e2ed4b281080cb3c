//! In-memory task collection backed by a JSON storage file
//!
//! [`TaskManager`] owns the task list, the id source, the storage handle and
//! an [`ExportService`]. Persistence is explicit: nothing is written until
//! [`TaskManager::save_to_file`] is called.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::domain::{
    now, ClockIds, IdSource, Priority, Statistics, Status, Task, TaskError, TaskId, TaskKey,
};
use crate::export::{ExportError, ExportRecord, ExportService};
use crate::storage::{Config, StorageError, TaskFile};

pub struct TaskManager {
    tasks: Vec<Task>,
    storage: TaskFile,
    ids: Box<dyn IdSource>,
    exporter: ExportService,
}

impl fmt::Debug for TaskManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskManager")
            .field("tasks", &self.tasks.len())
            .field("storage", &self.storage)
            .finish_non_exhaustive()
    }
}

impl TaskManager {
    /// Creates an empty manager persisting to `storage_file`
    pub fn new(storage_file: impl Into<PathBuf>) -> Self {
        Self::with_ids(storage_file, ClockIds::new())
    }

    /// Creates an empty manager with a custom id source
    pub fn with_ids(storage_file: impl Into<PathBuf>, ids: impl IdSource + 'static) -> Self {
        Self {
            tasks: Vec::new(),
            storage: TaskFile::new(storage_file),
            ids: Box::new(ids),
            exporter: ExportService::new(),
        }
    }

    /// Creates an empty manager from user configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.storage_file).with_max_files(config.max_storage_files)
    }

    /// Sets the ceiling on storage files checked before each save
    pub fn with_max_files(mut self, max_files: usize) -> Self {
        self.storage = self.storage.with_max_files(max_files);
        self
    }

    pub fn storage_path(&self) -> &Path {
        self.storage.path()
    }

    /// Creates a task and returns its id
    pub fn add_task(
        &mut self,
        title: &str,
        description: &str,
        priority: Priority,
    ) -> Result<TaskId, TaskError> {
        let id = self.ids.next_id().ok_or(TaskError::IdsExhausted)?;
        let task = Task::new(id, title, description, priority)?;
        tracing::debug!(id = %id, title = task.title(), "task added");
        self.tasks.push(task);
        Ok(id)
    }

    /// Looks a task up by anything that resolves to an id
    ///
    /// Keys that don't parse as an id return `None`.
    pub fn get_task<K: TaskKey + ?Sized>(&self, key: &K) -> Option<&Task> {
        let id = key.task_id()?;
        self.tasks.iter().find(|t| t.id() == id)
    }

    pub fn get_task_mut<K: TaskKey + ?Sized>(&mut self, key: &K) -> Option<&mut Task> {
        let id = key.task_id()?;
        self.tasks.iter_mut().find(|t| t.id() == id)
    }

    pub fn tasks_by_status(&self, status: Status) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.status() == status).collect()
    }

    pub fn tasks_by_priority(&self, priority: Priority) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.priority() == priority).collect()
    }

    /// Removes a task, returning whether one was found
    pub fn delete_task<K: TaskKey + ?Sized>(&mut self, key: &K) -> bool {
        let Some(id) = key.task_id() else {
            return false;
        };
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id() != id);
        let removed = self.tasks.len() != before;
        if removed {
            tracing::debug!(id = %id, "task deleted");
        }
        removed
    }

    /// Writes all tasks to `target`, or the default storage file
    pub fn save_to_file(&self, target: Option<&Path>) -> Result<(), StorageError> {
        self.storage.write(target, &self.tasks)
    }

    /// Replaces the collection with the contents of `source`
    ///
    /// A missing file leaves an empty collection. On error the current
    /// collection is kept as is.
    pub fn load_from_file(&mut self, source: Option<&Path>) -> Result<(), StorageError> {
        let tasks = self.storage.read(source)?.unwrap_or_default();
        for task in &tasks {
            self.ids.observe(task.id());
        }
        self.tasks = tasks;
        Ok(())
    }

    pub fn statistics(&self) -> Statistics {
        Statistics::from_tasks(&self.tasks, now())
    }

    /// Exports the current tasks and returns the path written
    pub fn export_tasks(
        &mut self,
        filename: &str,
        format: &str,
        include_statistics: bool,
    ) -> Result<PathBuf, ExportError> {
        self.exporter
            .export_tasks(&self.tasks, filename, format, include_statistics)
    }

    pub fn export_history(&self) -> &[ExportRecord] {
        self.exporter.history()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Owned copy of the collection
    pub fn snapshot(&self) -> Vec<Task> {
        self.tasks.clone()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.tasks.iter()
    }
}

impl<'a> IntoIterator for &'a TaskManager {
    type Item = &'a Task;
    type IntoIter = std::slice::Iter<'a, Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.tasks.iter()
    }
}
