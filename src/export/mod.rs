//! # Export
//!
//! One-shot serialization of a task snapshot to JSON, XML or xlsx,
//! independent of the primary JSON storage file.
//!
//! The filename's extension wins over the requested format: asking for
//! `json` with `report.xml` writes XML. A filename without a known export
//! extension gets the requested format's extension appended.
//!
//! Every attempt that gets past argument validation is recorded in the
//! service's [`ExportRecord`] history, successful or not.

mod json;
mod xml;
mod xlsx;

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::domain::{now, Statistics, Task};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Filename cannot be empty")]
    EmptyFilename,

    #[error("Unsupported export format: '{0}' (supported: json, xml, xlsx, excel)")]
    UnsupportedFormat(String),

    #[error("Spreadsheet export unavailable: {0}")]
    Unavailable(&'static str),

    #[error("Permission denied: cannot write {}", .path.display())]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to encode {format} export: {message}")]
    Encode {
        format: ExportFormat,
        message: String,
    },
}

impl ExportError {
    pub(crate) fn from_io(path: &Path, source: io::Error) -> Self {
        let path = path.to_path_buf();
        if source.kind() == io::ErrorKind::PermissionDenied {
            ExportError::PermissionDenied { path, source }
        } else {
            ExportError::Io { path, source }
        }
    }

    pub(crate) fn encode(format: ExportFormat, err: impl fmt::Display) -> Self {
        ExportError::Encode {
            format,
            message: err.to_string(),
        }
    }
}

/// Output format of an export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Xml,
    Xlsx,
}

impl ExportFormat {
    /// Names accepted by [`ExportFormat::from_str`]; `excel` is an alias of `xlsx`
    pub const SUPPORTED: [&'static str; 4] = ["json", "xml", "xlsx", "excel"];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Xml => "xml",
            ExportFormat::Xlsx => "xlsx",
        }
    }

    /// File extension, without the dot
    pub fn extension(&self) -> &'static str {
        self.as_str()
    }

    /// Detects the format from a path's extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(ExportFormat::Json),
            "xml" => Some(ExportFormat::Xml),
            "xlsx" => Some(ExportFormat::Xlsx),
            _ => None,
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "xml" => Ok(ExportFormat::Xml),
            "xlsx" | "excel" => Ok(ExportFormat::Xlsx),
            _ => Err(ExportError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Returns true if `format` names a supported export format
pub fn is_format_supported(format: &str) -> bool {
    format.parse::<ExportFormat>().is_ok()
}

/// Works out the actual format and output path for an export request
pub fn resolve_target(filename: &str, requested: ExportFormat) -> (ExportFormat, PathBuf) {
    let path = PathBuf::from(filename);
    match ExportFormat::from_path(&path) {
        Some(format) => (format, path),
        None => (requested, PathBuf::from(format!("{}.{}", filename, requested.extension()))),
    }
}

/// Metadata written alongside exported tasks
#[derive(Debug, Clone, Serialize)]
pub(crate) struct ExportMetadata {
    pub total_tasks: usize,
    pub exported_at: DateTime<Utc>,
    pub format: ExportFormat,
}

/// Everything a writer needs for one export
pub(crate) struct ExportPayload<'a> {
    pub tasks: &'a [Task],
    pub metadata: ExportMetadata,
    pub statistics: Option<Statistics>,
}

/// One entry in the export history
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRecord {
    pub filename: PathBuf,
    pub format: ExportFormat,
    pub task_count: usize,
    pub include_statistics: bool,
    pub exported_at: DateTime<Utc>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Exports task snapshots and keeps a history of attempts
#[derive(Debug, Default)]
pub struct ExportService {
    history: Vec<ExportRecord>,
}

impl ExportService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of the supported formats
    pub fn supported_formats(&self) -> &'static [&'static str] {
        &ExportFormat::SUPPORTED
    }

    pub fn is_format_supported(&self, format: &str) -> bool {
        is_format_supported(format)
    }

    /// Exports `tasks` to `filename` and returns the path actually written
    pub fn export_tasks(
        &mut self,
        tasks: &[Task],
        filename: &str,
        format: &str,
        include_statistics: bool,
    ) -> Result<PathBuf, ExportError> {
        if filename.trim().is_empty() {
            return Err(ExportError::EmptyFilename);
        }
        let requested: ExportFormat = format.parse()?;
        let (format, path) = resolve_target(filename.trim(), requested);
        if format != requested {
            tracing::debug!(
                requested = %requested,
                actual = %format,
                "filename extension overrides requested export format"
            );
        }

        let exported_at = now();
        let payload = ExportPayload {
            tasks,
            metadata: ExportMetadata {
                total_tasks: tasks.len(),
                exported_at,
                format,
            },
            statistics: include_statistics.then(|| Statistics::from_tasks(tasks, exported_at)),
        };

        let result = match format {
            ExportFormat::Json => json::write(&path, &payload),
            ExportFormat::Xml => xml::write(&path, &payload),
            ExportFormat::Xlsx => xlsx::write(&path, &payload),
        };

        self.history.push(ExportRecord {
            filename: path.clone(),
            format,
            task_count: tasks.len(),
            include_statistics,
            exported_at,
            success: result.is_ok(),
            error: result.as_ref().err().map(|e| e.to_string()),
        });

        match result {
            Ok(()) => {
                tracing::debug!(path = %path.display(), format = %format, count = tasks.len(), "export complete");
                Ok(path)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), format = %format, error = %e, "export failed");
                Err(e)
            }
        }
    }

    /// Returns the export history, oldest first
    pub fn history(&self) -> &[ExportRecord] {
        &self.history
    }

    /// Returns an owned copy of the export history
    pub fn history_snapshot(&self) -> Vec<ExportRecord> {
        self.history.clone()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}
