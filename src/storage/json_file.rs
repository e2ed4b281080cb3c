//! JSON container storage for tasks
//!
//! Tasks are stored as a single pretty-printed JSON document:
//! `{"tasks": [...], "metadata": {"total_tasks": N, "saved_at": "..."}}`.
//! Writes go straight to the target path. There is no locking, so the last
//! writer wins.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::domain::{format_timestamp, now, Task, TaskError};

/// Default ceiling on storage files in one directory
pub const DEFAULT_MAX_FILES: usize = 150;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Too many {extension} files in {}: {count} (limit: {limit})", .dir.display())]
    TooManyFiles {
        dir: PathBuf,
        extension: String,
        count: usize,
        limit: usize,
    },

    #[error("Permission denied: cannot access {}", .path.display())]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Filesystem error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid JSON in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid storage format in {}: {reason}", .path.display())]
    Structure { path: PathBuf, reason: &'static str },

    #[error("Invalid task at index {index}: {source}")]
    InvalidEntry {
        index: usize,
        #[source]
        source: TaskError,
    },

    #[error("Failed to serialize tasks: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl StorageError {
    fn from_io(path: &Path, source: io::Error) -> Self {
        let path = path.to_path_buf();
        if source.kind() == io::ErrorKind::PermissionDenied {
            StorageError::PermissionDenied { path, source }
        } else {
            StorageError::Io { path, source }
        }
    }
}

#[derive(Serialize)]
struct SaveMetadata {
    total_tasks: usize,
    saved_at: String,
}

#[derive(Serialize)]
struct StorageDocument<'a> {
    tasks: &'a [Task],
    metadata: SaveMetadata,
}

/// JSON file holding the task collection
#[derive(Debug, Clone)]
pub struct TaskFile {
    path: PathBuf,
    max_files: usize,
}

impl TaskFile {
    /// Creates a store at the given path with the default file ceiling
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_files: DEFAULT_MAX_FILES,
        }
    }

    pub fn with_max_files(mut self, max_files: usize) -> Self {
        self.max_files = max_files;
        self
    }

    /// Returns the default storage path
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn max_files(&self) -> usize {
        self.max_files
    }

    /// Writes all tasks to `target` (or the default path)
    pub fn write(&self, target: Option<&Path>, tasks: &[Task]) -> Result<(), StorageError> {
        let target = target.unwrap_or(&self.path);
        self.check_file_limit(target)?;

        if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StorageError::from_io(parent, e))?;
        }

        let document = StorageDocument {
            tasks,
            metadata: SaveMetadata {
                total_tasks: tasks.len(),
                saved_at: format_timestamp(&now()),
            },
        };
        let content = serde_json::to_string_pretty(&document).map_err(StorageError::Serialize)?;

        fs::write(target, content).map_err(|e| StorageError::from_io(target, e))?;

        tracing::debug!(path = %target.display(), count = tasks.len(), "saved tasks");
        Ok(())
    }

    /// Reads all tasks from `source` (or the default path)
    ///
    /// Returns `Ok(None)` if the file does not exist.
    pub fn read(&self, source: Option<&Path>) -> Result<Option<Vec<Task>>, StorageError> {
        let source = source.unwrap_or(&self.path);

        let content = match fs::read_to_string(source) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %source.display(), "storage file missing, starting empty");
                return Ok(None);
            }
            Err(e) => return Err(StorageError::from_io(source, e)),
        };

        let document: Value = serde_json::from_str(&content).map_err(|e| StorageError::Parse {
            path: source.to_path_buf(),
            source: e,
        })?;

        let document = document.as_object().ok_or_else(|| StorageError::Structure {
            path: source.to_path_buf(),
            reason: "top level must be an object",
        })?;

        let entries = match document.get("tasks") {
            None => return Ok(Some(Vec::new())),
            Some(Value::Array(entries)) => entries,
            Some(_) => {
                return Err(StorageError::Structure {
                    path: source.to_path_buf(),
                    reason: "'tasks' must be an array",
                })
            }
        };

        let tasks = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                Task::from_portable(entry).map_err(|source| StorageError::InvalidEntry { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(path = %source.display(), count = tasks.len(), "loaded tasks");
        Ok(Some(tasks))
    }

    /// Refuses to write when the target directory already holds too many
    /// files with the same extension
    ///
    /// Advisory only: listing errors are ignored and the count is racy.
    fn check_file_limit(&self, target: &Path) -> Result<(), StorageError> {
        let Some(extension) = target.extension() else {
            return Ok(());
        };
        let dir = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "skipping file count check");
                return Ok(());
            }
        };

        let count = entries
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_file() && e.path().extension() == Some(extension))
            .count();

        if count >= self.max_files {
            return Err(StorageError::TooManyFiles {
                dir: dir.to_path_buf(),
                extension: extension.to_string_lossy().into_owned(),
                count,
                limit: self.max_files,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Priority, Status, TaskId};
    use tempfile::TempDir;

    fn make_task(id: u64) -> Task {
        Task::new(TaskId::new(id), &format!("Task {}", id), "desc", Priority::High).unwrap()
    }

    #[test]
    fn read_missing_file() {
        let dir = TempDir::new().unwrap();
        let store = TaskFile::new(dir.path().join("tasks.json"));

        assert!(store.read(None).unwrap().is_none());
    }

    #[test]
    fn write_and_read_tasks() {
        let dir = TempDir::new().unwrap();
        let store = TaskFile::new(dir.path().join("tasks.json"));

        let mut done = make_task(2);
        done.mark_completed().unwrap();
        store.write(None, &[make_task(1), done]).unwrap();

        let loaded = store.read(None).unwrap().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].id(), TaskId::new(1));
        assert_eq!(loaded[1].status(), Status::Done);
        assert!(loaded[1].completed_at().is_some());
    }

    #[test]
    fn written_document_has_metadata() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tasks.json");
        let store = TaskFile::new(&path);

        store.write(None, &[make_task(1)]).unwrap();

        let doc: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(doc["metadata"]["total_tasks"], 1);
        assert!(doc["metadata"]["saved_at"].is_string());
        assert_eq!(doc["tasks"][0]["priority"], "high");
    }

    #[test]
    fn write_to_explicit_target() {
        let dir = TempDir::new().unwrap();
        let store = TaskFile::new(dir.path().join("tasks.json"));
        let other = dir.path().join("backup.json");

        store.write(Some(&other), &[make_task(1)]).unwrap();

        assert!(other.exists());
        assert!(!store.path().exists());
        assert_eq!(store.read(Some(&other)).unwrap().unwrap().len(), 1);
    }

    #[test]
    fn creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let store = TaskFile::new(dir.path().join("nested").join("dir").join("tasks.json"));

        store.write(None, &[make_task(1)]).unwrap();

        assert!(store.path().exists());
    }

    #[test]
    fn refuses_write_at_file_limit() {
        let dir = TempDir::new().unwrap();
        for i in 0..3 {
            fs::write(dir.path().join(format!("file_{}.json", i)), "{}").unwrap();
        }
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let store = TaskFile::new(dir.path().join("tasks.json")).with_max_files(3);
        let err = store.write(None, &[make_task(1)]).unwrap_err();

        assert!(matches!(err, StorageError::TooManyFiles { count: 3, limit: 3, .. }));
        assert!(!store.path().exists());
    }

    #[test]
    fn writes_below_file_limit() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("file_0.json"), "{}").unwrap();

        let store = TaskFile::new(dir.path().join("tasks.json")).with_max_files(2);
        store.write(None, &[make_task(1)]).unwrap();
    }

    #[test]
    fn rejects_non_object_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tasks.json");
        fs::write(&path, "[]").unwrap();

        let err = TaskFile::new(&path).read(None).unwrap_err();
        assert!(matches!(err, StorageError::Structure { .. }));
    }

    #[test]
    fn rejects_non_array_tasks() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tasks.json");
        fs::write(&path, r#"{"tasks": {"id": 1}}"#).unwrap();

        let err = TaskFile::new(&path).read(None).unwrap_err();
        assert!(matches!(err, StorageError::Structure { .. }));
    }

    #[test]
    fn missing_tasks_key_reads_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tasks.json");
        fs::write(&path, r#"{"metadata": {}}"#).unwrap();

        assert!(TaskFile::new(&path).read(None).unwrap().unwrap().is_empty());
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tasks.json");
        fs::write(&path, "{ not json").unwrap();

        let err = TaskFile::new(&path).read(None).unwrap_err();
        assert!(matches!(err, StorageError::Parse { .. }));
    }

    #[test]
    fn bad_entry_reports_index() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tasks.json");
        let good = make_task(1).to_portable();
        let doc = serde_json::json!({ "tasks": [good, {"id": 2, "title": "x"}] });
        fs::write(&path, doc.to_string()).unwrap();

        let err = TaskFile::new(&path).read(None).unwrap_err();
        match err {
            StorageError::InvalidEntry { index, source } => {
                assert_eq!(index, 1);
                assert_eq!(source, TaskError::MissingField("priority"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unicode_is_preserved() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tasks.json");
        let store = TaskFile::new(&path);

        let task = Task::new(TaskId::new(1), "Tâche terminée", "Données", Priority::Low).unwrap();
        store.write(None, &[task]).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("Tâche terminée"));
    }
}
