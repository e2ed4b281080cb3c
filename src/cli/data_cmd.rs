//! Export, save and load commands

use std::path::Path;

use anyhow::{Context, Result};

use super::output::Output;
use super::task::persist;
use crate::manager::TaskManager;

pub fn export(
    manager: &mut TaskManager,
    output: &Output,
    filename: &str,
    format: &str,
    include_statistics: bool,
) -> Result<()> {
    output.verbose_ctx(
        "export",
        &format!("format={}, statistics={}", format, include_statistics),
    );

    let path = manager
        .export_tasks(filename, format, include_statistics)
        .context("Export failed")?;

    if output.is_json() {
        let record = manager.export_history().last();
        output.data(&record);
    } else {
        output.success(&format!("Exported {} task(s) to {}", manager.len(), path.display()));
        if include_statistics {
            output.info("Statistics included");
        }
    }
    Ok(())
}

pub fn save(manager: &TaskManager, output: &Output, target: Option<&Path>) -> Result<()> {
    let path = target.unwrap_or_else(|| manager.storage_path());
    manager
        .save_to_file(target)
        .with_context(|| format!("Failed to save tasks to {}", path.display()))?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "path": path.display().to_string(),
            "task_count": manager.len(),
        }));
    } else {
        output.success(&format!("Saved {} task(s) to {}", manager.len(), path.display()));
    }
    Ok(())
}

/// Replaces the current tasks with those in `source` and persists them
pub fn load(manager: &mut TaskManager, output: &Output, source: &Path) -> Result<()> {
    if !source.exists() {
        anyhow::bail!("File not found: {}", source.display());
    }

    let previous = manager.len();
    manager
        .load_from_file(Some(source))
        .with_context(|| format!("Failed to load tasks from {}", source.display()))?;
    persist(manager, output)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "path": source.display().to_string(),
            "task_count": manager.len(),
            "replaced": previous,
        }));
    } else {
        output.success(&format!("Loaded tasks from {}", source.display()));
        output.info(&format!(
            "{} task(s) loaded, replacing {} previous task(s)",
            manager.len(),
            previous
        ));
    }
    Ok(())
}
