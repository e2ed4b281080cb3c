//! JSON export writer

use std::fs;
use std::path::Path;

use serde::Serialize;

use super::{ExportError, ExportFormat, ExportMetadata, ExportPayload};
use crate::domain::{Statistics, Task};

#[derive(Serialize)]
struct JsonExport<'a> {
    tasks: &'a [Task],
    metadata: &'a ExportMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    statistics: Option<&'a Statistics>,
}

/// Writes `{tasks, metadata, statistics?}`, pretty-printed
pub(super) fn write(path: &Path, payload: &ExportPayload<'_>) -> Result<(), ExportError> {
    let document = JsonExport {
        tasks: payload.tasks,
        metadata: &payload.metadata,
        statistics: payload.statistics.as_ref(),
    };

    let content = serde_json::to_string_pretty(&document)
        .map_err(|e| ExportError::encode(ExportFormat::Json, e))?;

    fs::write(path, content).map_err(|e| ExportError::from_io(path, e))
}
