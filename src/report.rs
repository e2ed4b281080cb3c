//! Daily reports and CSV export
//!
//! A narrower companion to [`crate::export`]: one report scoped to a single
//! UTC date, and a flat CSV dump of the task list.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::domain::{
    format_timestamp, now, percentage, PriorityDistribution, StatusDistribution, Task,
};

/// Columns written by [`ReportService::export_tasks_csv`], in order
pub const CSV_FIELDS: [&str; 8] = [
    "id",
    "title",
    "description",
    "priority",
    "status",
    "created_at",
    "completed_at",
    "project_id",
];

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("No tasks to report on")]
    NoTasks,

    #[error("Filename cannot be empty")]
    EmptyFilename,

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

    #[error("Failed to encode CSV: {0}")]
    Csv(#[from] csv::Error),
}

impl ReportError {
    fn from_io(path: &Path, source: io::Error) -> Self {
        let path = path.to_path_buf();
        if source.kind() == io::ErrorKind::PermissionDenied {
            ReportError::PermissionDenied { path, source }
        } else {
            ReportError::Io { path, source }
        }
    }

    /// I/O failures inside the CSV writer keep the target path
    fn from_csv(path: &Path, err: csv::Error) -> Self {
        if !err.is_io_error() {
            return ReportError::Csv(err);
        }
        match err.into_kind() {
            csv::ErrorKind::Io(source) => Self::from_io(path, source),
            _ => Self::from_io(path, io::Error::other("CSV writer failed")),
        }
    }
}

/// Activity for one day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyReport {
    pub report_date: NaiveDate,
    pub total_tasks: usize,
    /// Tasks created or completed on `report_date`
    pub tasks_for_date: usize,
    pub completed_today: usize,
    pub created_today: usize,
    pub completion_rate_today: f64,
    pub priority_breakdown: PriorityDistribution,
    pub status_breakdown: StatusDistribution,
    pub generated_at: DateTime<Utc>,
    pub summary: String,
}

/// What a CSV export of a task list would contain
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportSummary {
    pub total_tasks: usize,
    /// False when there is nothing to export
    pub exportable: bool,
    pub format: &'static str,
    pub encoding: &'static str,
    pub estimated_size_bytes: usize,
    pub fields_included: Vec<&'static str>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ReportService;

impl ReportService {
    pub fn new() -> Self {
        Self
    }

    /// Builds the report for `date`, or today (UTC) when `None`
    pub fn generate_daily_report(
        &self,
        tasks: &[Task],
        date: Option<NaiveDate>,
    ) -> Result<DailyReport, ReportError> {
        if tasks.is_empty() {
            return Err(ReportError::NoTasks);
        }

        let generated_at = now();
        let report_date = date.unwrap_or_else(|| generated_at.date_naive());

        let created_on = |t: &Task| t.created_at().date_naive() == report_date;
        let completed_on = |t: &Task| t.completed_at().is_some_and(|c| c.date_naive() == report_date);

        let for_date: Vec<&Task> = tasks
            .iter()
            .filter(|&t| created_on(t) || completed_on(t))
            .collect();
        let created_today = for_date.iter().filter(|&&t| created_on(t)).count();
        let completed_today = for_date.iter().filter(|&&t| completed_on(t)).count();
        let completion_rate_today = percentage(completed_today, for_date.len());

        let summary = format!(
            "{}: {} task(s) active, {} created, {} completed ({}%)",
            report_date,
            for_date.len(),
            created_today,
            completed_today,
            completion_rate_today
        );

        Ok(DailyReport {
            report_date,
            total_tasks: tasks.len(),
            tasks_for_date: for_date.len(),
            completed_today,
            created_today,
            completion_rate_today,
            priority_breakdown: PriorityDistribution::from_tasks(for_date.iter().copied()),
            status_breakdown: StatusDistribution::from_tasks(for_date.iter().copied()),
            generated_at,
            summary,
        })
    }

    /// Writes `tasks` as CSV and returns the path written
    ///
    /// `.csv` is appended when the filename lacks it.
    pub fn export_tasks_csv(&self, tasks: &[Task], filename: &str) -> Result<PathBuf, ReportError> {
        if tasks.is_empty() {
            return Err(ReportError::NoTasks);
        }
        let filename = filename.trim();
        if filename.is_empty() {
            return Err(ReportError::EmptyFilename);
        }

        let path = if filename.to_ascii_lowercase().ends_with(".csv") {
            PathBuf::from(filename)
        } else {
            PathBuf::from(format!("{}.csv", filename))
        };

        let file = File::create(&path).map_err(|e| ReportError::from_io(&path, e))?;
        let mut writer = csv::Writer::from_writer(file);
        write_rows(&mut writer, tasks).map_err(|e| ReportError::from_csv(&path, e))?;
        writer.flush().map_err(|e| ReportError::from_io(&path, e))?;

        tracing::debug!(path = %path.display(), count = tasks.len(), "csv export complete");
        Ok(path)
    }

    /// Describes the CSV export of `tasks` without touching the filesystem
    pub fn export_summary(&self, tasks: &[Task]) -> Result<ExportSummary, ReportError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        write_rows(&mut writer, tasks)?;
        let bytes = writer
            .into_inner()
            .map_err(|e| ReportError::Csv(csv::Error::from(e.into_error())))?;

        Ok(ExportSummary {
            total_tasks: tasks.len(),
            exportable: !tasks.is_empty(),
            format: "CSV",
            encoding: "UTF-8",
            estimated_size_bytes: bytes.len(),
            fields_included: CSV_FIELDS.to_vec(),
        })
    }
}

fn write_rows<W: io::Write>(writer: &mut csv::Writer<W>, tasks: &[Task]) -> csv::Result<()> {
    writer.write_record(CSV_FIELDS)?;
    for task in tasks {
        writer.write_record([
            task.id().to_string(),
            task.title().to_string(),
            task.description().to_string(),
            task.priority().as_str().to_string(),
            task.status().as_str().to_string(),
            format_timestamp(&task.created_at()),
            task.completed_at()
                .map(|c| format_timestamp(&c))
                .unwrap_or_default(),
            task.project_id().map(|p| p.to_string()).unwrap_or_default(),
        ])?;
    }
    Ok(())
}
