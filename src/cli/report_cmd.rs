//! Statistics, daily report and CSV commands

use anyhow::{Context, Result};
use chrono::NaiveDate;
use crossterm::style::Color;

use super::output::Output;
use crate::domain::NO_TASKS_MESSAGE;
use crate::manager::TaskManager;
use crate::report::ReportService;

pub fn stats(manager: &TaskManager, output: &Output) {
    let stats = manager.statistics();

    if output.is_json() {
        output.data(&stats);
        return;
    }

    println!("{}", output.bold("Task statistics"));
    println!("{}", "=".repeat(50));
    println!("Total tasks:       {}", stats.total_tasks);
    println!("Completed:         {}", output.paint(&stats.completed_tasks.to_string(), Color::Green));
    println!("Pending:           {}", output.paint(&stats.pending_tasks.to_string(), Color::Yellow));
    println!("In progress:       {}", output.paint(&stats.in_progress_tasks.to_string(), Color::Blue));
    println!("Cancelled:         {}", output.paint(&stats.cancelled_tasks.to_string(), Color::Red));
    println!("Completion rate:   {}%", stats.completion_rate);

    if stats.total_tasks > 0 {
        println!();
        println!("By priority:");
        for (priority, count) in stats.priority_distribution.iter() {
            println!("  {:<8} {}", priority.label(), count);
        }

        println!();
        println!("By status:");
        for (status, count) in stats.status_distribution.iter() {
            println!("  {:<12} {}", status.label(), count);
        }
    }

    println!();
    if stats.message == NO_TASKS_MESSAGE {
        output.warning(&stats.message);
    } else {
        output.info(&stats.message);
    }
    output.verbose_ctx("stats", &format!("Generated at {}", stats.generated_at));
}

pub fn daily_report(manager: &TaskManager, output: &Output, date: Option<NaiveDate>) -> Result<()> {
    let report = ReportService::new().generate_daily_report(manager.tasks(), date)?;

    if output.is_json() {
        output.data(&report);
        return Ok(());
    }

    println!("{}", output.bold(&format!("Daily report for {}", report.report_date)));
    println!("{}", "=".repeat(50));
    println!("Tasks overall:     {}", report.total_tasks);
    println!("Active that day:   {}", report.tasks_for_date);
    println!("Created:           {}", report.created_today);
    println!("Completed:         {}", report.completed_today);
    println!("Completion rate:   {}%", report.completion_rate_today);

    if report.tasks_for_date > 0 {
        println!();
        println!("By priority:");
        for (priority, count) in report.priority_breakdown.iter() {
            println!("  {:<8} {}", priority.label(), count);
        }
        println!();
        println!("By status:");
        for (status, count) in report.status_breakdown.iter() {
            println!("  {:<12} {}", status.label(), count);
        }
    }

    println!();
    output.info(&report.summary);
    Ok(())
}

pub fn export_csv(manager: &TaskManager, output: &Output, filename: &str) -> Result<()> {
    let service = ReportService::new();

    if let Ok(summary) = service.export_summary(manager.tasks()) {
        output.verbose_ctx(
            "csv",
            &format!(
                "{} task(s), about {} bytes, fields: {}",
                summary.total_tasks,
                summary.estimated_size_bytes,
                summary.fields_included.join(",")
            ),
        );
    }

    let path = service
        .export_tasks_csv(manager.tasks(), filename)
        .context("CSV export failed")?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "path": path.display().to_string(),
            "task_count": manager.len(),
        }));
    } else {
        output.success(&format!("Exported {} task(s) to {}", manager.len(), path.display()));
    }
    Ok(())
}
