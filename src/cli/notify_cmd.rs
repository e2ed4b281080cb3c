//! Email reminder command
//!
//! Delivery is simulated; the message that would have been sent is printed.

use anyhow::Result;
use chrono::NaiveDate;

use super::output::Output;
use crate::domain::Status;
use crate::manager::TaskManager;
use crate::notify::Notifier;

pub fn remind(
    manager: &TaskManager,
    output: &Output,
    id: &str,
    email: &str,
    due: Option<NaiveDate>,
) -> Result<()> {
    let task = manager
        .get_task(id)
        .ok_or_else(|| anyhow::anyhow!("Task not found: {}", id))?;

    let mut notifier = Notifier::default();
    output.verbose_ctx(
        "remind",
        &format!("Using {}:{}", notifier.smtp_server(), notifier.port()),
    );

    let sent = if task.status() == Status::Done {
        notifier.send_completion_notification(email, task.title())?
    } else {
        notifier.send_task_reminder(email, task.title(), due)?
    };

    if output.is_json() {
        output.data(sent);
    } else {
        output.success(&format!("Email sent to {}", sent.to));
        output.info(&format!("Subject: {}", sent.subject));
        output.info(&sent.body);
    }
    Ok(())
}
