//! Aggregate statistics over a set of tasks
//!
//! Both the manager and the export service report statistics; they share
//! [`Statistics::from_tasks`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::task::{Priority, Status, Task};

/// Message used when there is nothing to report on
pub const NO_TASKS_MESSAGE: &str = "No tasks found";

/// Count of tasks per priority
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityDistribution {
    pub urgent: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl PriorityDistribution {
    pub fn from_tasks<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        let mut dist = Self::default();
        for task in tasks {
            *dist.slot(task.priority()) += 1;
        }
        dist
    }

    pub fn get(&self, priority: Priority) -> usize {
        match priority {
            Priority::Urgent => self.urgent,
            Priority::High => self.high,
            Priority::Medium => self.medium,
            Priority::Low => self.low,
        }
    }

    fn slot(&mut self, priority: Priority) -> &mut usize {
        match priority {
            Priority::Urgent => &mut self.urgent,
            Priority::High => &mut self.high,
            Priority::Medium => &mut self.medium,
            Priority::Low => &mut self.low,
        }
    }

    /// Iterates from most to least urgent
    pub fn iter(&self) -> impl Iterator<Item = (Priority, usize)> + '_ {
        Priority::ALL.into_iter().rev().map(move |p| (p, self.get(p)))
    }
}

/// Count of tasks per status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDistribution {
    pub todo: usize,
    pub in_progress: usize,
    pub done: usize,
    pub cancelled: usize,
}

impl StatusDistribution {
    pub fn from_tasks<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        let mut dist = Self::default();
        for task in tasks {
            *dist.slot(task.status()) += 1;
        }
        dist
    }

    pub fn get(&self, status: Status) -> usize {
        match status {
            Status::Todo => self.todo,
            Status::InProgress => self.in_progress,
            Status::Done => self.done,
            Status::Cancelled => self.cancelled,
        }
    }

    fn slot(&mut self, status: Status) -> &mut usize {
        match status {
            Status::Todo => &mut self.todo,
            Status::InProgress => &mut self.in_progress,
            Status::Done => &mut self.done,
            Status::Cancelled => &mut self.cancelled,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Status, usize)> + '_ {
        Status::ALL.into_iter().map(move |s| (s, self.get(s)))
    }
}

/// Snapshot of aggregate task statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub pending_tasks: usize,
    pub in_progress_tasks: usize,
    pub cancelled_tasks: usize,
    /// Percentage of done tasks, rounded to two decimals
    pub completion_rate: f64,
    pub priority_distribution: PriorityDistribution,
    pub status_distribution: StatusDistribution,
    pub message: String,
    pub generated_at: DateTime<Utc>,
}

impl Statistics {
    pub fn from_tasks(tasks: &[Task], generated_at: DateTime<Utc>) -> Self {
        let status_distribution = StatusDistribution::from_tasks(tasks);
        let priority_distribution = PriorityDistribution::from_tasks(tasks);
        let total = tasks.len();
        let completion_rate = percentage(status_distribution.done, total);

        let message = if total == 0 {
            NO_TASKS_MESSAGE.to_string()
        } else {
            format!(
                "{} of {} tasks completed ({}%)",
                status_distribution.done, total, completion_rate
            )
        };

        Self {
            total_tasks: total,
            completed_tasks: status_distribution.done,
            pending_tasks: status_distribution.todo,
            in_progress_tasks: status_distribution.in_progress,
            cancelled_tasks: status_distribution.cancelled,
            completion_rate,
            priority_distribution,
            status_distribution,
            message,
            generated_at,
        }
    }
}

/// `part / total * 100`, rounded to two decimals; zero when `total` is zero
pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round2(part as f64 / total as f64 * 100.0)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
