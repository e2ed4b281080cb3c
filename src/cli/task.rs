//! Task CLI commands

use anyhow::{Context, Result};
use clap::Subcommand;

use super::output::{status_symbol, Output};
use crate::domain::{Priority, Status, Task, TaskError};
use crate::manager::TaskManager;

#[derive(Subcommand)]
pub enum TaskCommands {
    /// Add a task
    ///
    /// Examples:
    ///   taskman add "Fix typo"
    ///   taskman add "Build API" "REST endpoints for tasks" --priority high
    Add {
        /// Task title (1-100 characters, no '<' or '>')
        title: String,

        /// Optional longer description
        #[arg(default_value = "")]
        description: String,

        /// Priority: low, medium, high or urgent
        #[arg(long, short, default_value = "medium")]
        priority: Priority,
    },

    /// List tasks
    List {
        /// Only tasks with this status (todo, in_progress, done, cancelled)
        #[arg(long, short)]
        status: Option<Status>,

        /// Only tasks with this priority
        #[arg(long, short)]
        priority: Option<Priority>,

        /// Show at most this many tasks
        #[arg(long, short)]
        limit: Option<usize>,
    },

    /// Show task details
    Show {
        /// Task ID
        id: String,
    },

    /// Mark task as in progress
    Start {
        /// Task ID
        id: String,
    },

    /// Mark task as done
    Complete {
        /// Task ID
        id: String,
    },

    /// Cancel a task
    Cancel {
        /// Task ID
        id: String,
    },

    /// Change a task's priority
    Priority {
        /// Task ID
        id: String,

        /// New priority
        level: Priority,
    },

    /// Assign a task to a project
    Assign {
        /// Task ID
        id: String,

        /// Project ID
        project: f64,
    },

    /// Delete a task
    Delete {
        /// Task ID
        id: String,
    },
}

/// Filters applied by `list`
#[derive(Debug, Default, Clone, Copy)]
pub struct ListFilter {
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    pub limit: Option<usize>,
}

pub fn run(cmd: TaskCommands, manager: &mut TaskManager, output: &Output) -> Result<()> {
    match cmd {
        TaskCommands::Add {
            title,
            description,
            priority,
        } => add_task(manager, output, &title, &description, priority),
        TaskCommands::List {
            status,
            priority,
            limit,
        } => {
            list_tasks(
                manager,
                output,
                ListFilter {
                    status,
                    priority,
                    limit,
                },
            );
            Ok(())
        }
        TaskCommands::Show { id } => show_task(manager, output, &id),
        TaskCommands::Start { id } => start_task(manager, output, &id),
        TaskCommands::Complete { id } => complete_task(manager, output, &id),
        TaskCommands::Cancel { id } => cancel_task(manager, output, &id),
        TaskCommands::Priority { id, level } => set_priority(manager, output, &id, level),
        TaskCommands::Assign { id, project } => assign_project(manager, output, &id, project),
        TaskCommands::Delete { id } => delete_task(manager, output, &id),
    }
}

fn find_task<'a>(manager: &'a TaskManager, id: &str) -> Result<&'a Task> {
    manager
        .get_task(id)
        .ok_or_else(|| anyhow::anyhow!("Task not found: {}", id))
}

fn find_task_mut<'a>(manager: &'a mut TaskManager, id: &str) -> Result<&'a mut Task> {
    manager
        .get_task_mut(id)
        .ok_or_else(|| anyhow::anyhow!("Task not found: {}", id))
}

/// Persists the collection to the default storage file
pub(super) fn persist(manager: &TaskManager, output: &Output) -> Result<()> {
    manager
        .save_to_file(None)
        .with_context(|| format!("Failed to save tasks to {}", manager.storage_path().display()))?;
    output.verbose_ctx(
        "storage",
        &format!("Saved {} task(s) to {}", manager.len(), manager.storage_path().display()),
    );
    Ok(())
}

pub(super) fn add_task(
    manager: &mut TaskManager,
    output: &Output,
    title: &str,
    description: &str,
    priority: Priority,
) -> Result<()> {
    let id = manager.add_task(title, description, priority)?;
    persist(manager, output)?;

    let task = find_task(manager, &id.to_string())?;
    if output.is_json() {
        output.data(task);
    } else {
        output.success(&format!("Created task {}: {}", task.id(), task.title()));
        if !task.description().is_empty() {
            output.info(&format!("Description: {}", task.description()));
        }
        output.info(&format!("Priority: {}", output.priority(task.priority())));
    }

    Ok(())
}

pub(super) fn list_tasks(manager: &TaskManager, output: &Output, filter: ListFilter) {
    let tasks: Vec<&Task> = manager
        .iter()
        .filter(|t| filter.status.map_or(true, |s| t.status() == s))
        .filter(|t| filter.priority.map_or(true, |p| t.priority() == p))
        .take(filter.limit.unwrap_or(usize::MAX))
        .collect();

    output.verbose_ctx(
        "list",
        &format!("{} of {} task(s) match {:?}", tasks.len(), manager.len(), filter),
    );

    if output.is_json() {
        output.data(&tasks);
        return;
    }

    if tasks.is_empty() {
        output.warning("No tasks found");
        return;
    }

    println!("  {:<18} {:<8} {:<12} TITLE", "ID", "PRIORITY", "STATUS");
    println!("{}", "-".repeat(70));
    for task in &tasks {
        let label = task.priority().label();
        println!(
            "{} {:<18} {}{} {:<12} {}",
            status_symbol(task.status()),
            task.id(),
            output.priority(task.priority()),
            " ".repeat(8usize.saturating_sub(label.len())),
            task.status().as_str(),
            task.title()
        );
    }
    println!();
    println!("{} task(s)", tasks.len());
}

fn show_task(manager: &TaskManager, output: &Output, id: &str) -> Result<()> {
    let task = find_task(manager, id)?;

    if output.is_json() {
        output.data(task);
        return Ok(());
    }

    println!("{} {}", status_symbol(task.status()), output.bold(task.title()));
    println!("ID: {}", task.id());
    if !task.description().is_empty() {
        println!("Description: {}", task.description());
    }
    println!("Priority: {}", output.priority(task.priority()));
    println!("Status: {}", task.status().label());
    println!("Created: {}", task.created_at().format("%Y-%m-%d %H:%M:%S"));
    if let Some(completed) = task.completed_at() {
        println!("Completed: {}", completed.format("%Y-%m-%d %H:%M:%S"));
    }
    if let Some(project) = task.project_id() {
        println!("Project: {}", project);
    }

    Ok(())
}

pub(super) fn start_task(manager: &mut TaskManager, output: &Output, id: &str) -> Result<()> {
    let task = find_task_mut(manager, id)?;
    task.start()?;
    let message = format!("Started task: '{}'", task.title());
    report_change(manager, output, id, &message)
}

pub(super) fn complete_task(manager: &mut TaskManager, output: &Output, id: &str) -> Result<()> {
    let task = find_task_mut(manager, id)?;
    match task.mark_completed() {
        Ok(()) => {}
        Err(TaskError::AlreadyCompleted) => {
            output.warning(&format!("Task '{}' is already completed", task.title()));
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    }
    let message = format!("Completed task: '{}'", task.title());
    report_change(manager, output, id, &message)
}

pub(super) fn cancel_task(manager: &mut TaskManager, output: &Output, id: &str) -> Result<()> {
    let task = find_task_mut(manager, id)?;
    task.cancel()?;
    let message = format!("Cancelled task: '{}'", task.title());
    report_change(manager, output, id, &message)
}

fn set_priority(manager: &mut TaskManager, output: &Output, id: &str, level: Priority) -> Result<()> {
    let task = find_task_mut(manager, id)?;
    task.update_priority(level)?;
    let message = format!("Priority of '{}' set to {}", task.title(), level.label());
    report_change(manager, output, id, &message)
}

fn assign_project(manager: &mut TaskManager, output: &Output, id: &str, project: f64) -> Result<()> {
    let task = find_task_mut(manager, id)?;
    task.assign_to_project(project)?;
    let message = format!("Assigned '{}' to project {}", task.title(), project);
    report_change(manager, output, id, &message)
}

pub(super) fn delete_task(manager: &mut TaskManager, output: &Output, id: &str) -> Result<()> {
    let title = find_task(manager, id)?.title().to_string();
    if !manager.delete_task(id) {
        anyhow::bail!("Task not found: {}", id);
    }
    persist(manager, output)?;

    if output.is_json() {
        output.data(&serde_json::json!({ "id": id.trim(), "deleted": true }));
    } else {
        output.success(&format!("Deleted task: '{}'", title));
    }
    Ok(())
}

/// Saves after a single-task mutation and prints the result
fn report_change(manager: &TaskManager, output: &Output, id: &str, message: &str) -> Result<()> {
    persist(manager, output)?;
    if output.is_json() {
        output.data(find_task(manager, id)?);
    } else {
        output.success(message);
    }
    Ok(())
}
