//! Spreadsheet export writer
//!
//! Only available with the `xlsx` cargo feature. Without it every xlsx
//! export fails with [`ExportError::Unavailable`].

use std::path::Path;

use super::{ExportError, ExportPayload};

#[cfg(not(feature = "xlsx"))]
pub(super) fn write(_path: &Path, _payload: &ExportPayload<'_>) -> Result<(), ExportError> {
    Err(ExportError::Unavailable(
        "taskman was built without the `xlsx` feature",
    ))
}

#[cfg(feature = "xlsx")]
pub(super) fn write(path: &Path, payload: &ExportPayload<'_>) -> Result<(), ExportError> {
    use rust_xlsxwriter::{Format, Workbook, XlsxError};

    use super::ExportFormat;
    use crate::domain::format_timestamp;

    const HEADERS: [&str; 8] = [
        "ID",
        "Title",
        "Description",
        "Priority",
        "Status",
        "Created At",
        "Completed At",
        "Project ID",
    ];

    let encode = |e: XlsxError| ExportError::encode(ExportFormat::Xlsx, e);
    let bold = Format::new().set_bold();
    let mut workbook = Workbook::new();

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Tasks").map_err(encode)?;

        for (col, header) in (0u16..).zip(HEADERS) {
            sheet.write_string_with_format(0, col, header, &bold).map_err(encode)?;
        }

        for (row, task) in (1u32..).zip(payload.tasks) {
            sheet.write_number(row, 0, task.id().value() as f64).map_err(encode)?;
            sheet.write_string(row, 1, task.title()).map_err(encode)?;
            sheet.write_string(row, 2, task.description()).map_err(encode)?;
            sheet.write_string(row, 3, task.priority().label()).map_err(encode)?;
            sheet.write_string(row, 4, task.status().label()).map_err(encode)?;
            sheet
                .write_string(row, 5, format_timestamp(&task.created_at()))
                .map_err(encode)?;
            if let Some(completed_at) = task.completed_at() {
                sheet
                    .write_string(row, 6, format_timestamp(&completed_at))
                    .map_err(encode)?;
            }
            if let Some(project_id) = task.project_id() {
                sheet.write_number(row, 7, project_id).map_err(encode)?;
            }
        }

        sheet.autofit();
    }

    if let Some(stats) = &payload.statistics {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Statistics").map_err(encode)?;

        let general: [(&str, f64); 6] = [
            ("Total tasks", stats.total_tasks as f64),
            ("Completed tasks", stats.completed_tasks as f64),
            ("Pending tasks", stats.pending_tasks as f64),
            ("In progress tasks", stats.in_progress_tasks as f64),
            ("Cancelled tasks", stats.cancelled_tasks as f64),
            ("Completion rate (%)", stats.completion_rate),
        ];

        sheet.write_string_with_format(0, 0, "General statistics", &bold).map_err(encode)?;
        let mut row = 1u32;
        for (label, value) in general {
            sheet.write_string(row, 0, label).map_err(encode)?;
            sheet.write_number(row, 1, value).map_err(encode)?;
            row += 1;
        }

        row += 1;
        sheet.write_string_with_format(row, 0, "Priority", &bold).map_err(encode)?;
        sheet.write_string_with_format(row, 1, "Count", &bold).map_err(encode)?;
        for (priority, count) in stats.priority_distribution.iter() {
            row += 1;
            sheet.write_string(row, 0, priority.label()).map_err(encode)?;
            sheet.write_number(row, 1, count as f64).map_err(encode)?;
        }

        row += 2;
        sheet.write_string_with_format(row, 0, "Status", &bold).map_err(encode)?;
        sheet.write_string_with_format(row, 1, "Count", &bold).map_err(encode)?;
        for (status, count) in stats.status_distribution.iter() {
            row += 1;
            sheet.write_string(row, 0, status.label()).map_err(encode)?;
            sheet.write_number(row, 1, count as f64).map_err(encode)?;
        }

        sheet.autofit();
    }

    workbook.save(path).map_err(|e| match e {
        XlsxError::IoError(io) => ExportError::from_io(path, io),
        other => encode(other),
    })
}

#[cfg(all(test, feature = "xlsx"))]
mod tests {
    use super::*;
    use crate::domain::{now, Priority, Statistics, Task, TaskId};
    use crate::export::{ExportFormat, ExportMetadata};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn writes_workbook() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tasks.xlsx");
        let tasks = vec![Task::new(TaskId::new(1), "Sheet task", "", Priority::High).unwrap()];
        let exported_at = now();
        let payload = ExportPayload {
            tasks: &tasks,
            metadata: ExportMetadata {
                total_tasks: 1,
                exported_at,
                format: ExportFormat::Xlsx,
            },
            statistics: Some(Statistics::from_tasks(&tasks, exported_at)),
        };

        write(&path, &payload).unwrap();

        // xlsx files are zip archives
        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }
}
