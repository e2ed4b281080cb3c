//! Task domain model
//!
//! A task is a single unit of work with a priority, a lifecycle status and
//! timestamps. Construction validates the title; after that the status only
//! moves through the transition methods, which keeps `completed_at` in sync
//! with `Status::Done`.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Map, Value};
use thiserror::Error;

use super::id::TaskId;

/// Maximum title length, in characters, after trimming
pub const MAX_TITLE_LEN: usize = 100;

#[derive(Debug, Error, PartialEq)]
pub enum TaskError {
    #[error("Title cannot be empty")]
    EmptyTitle,

    #[error("Title too long: {0} characters (maximum: {MAX_TITLE_LEN})")]
    TitleTooLong(usize),

    #[error("Title cannot contain '<' or '>'")]
    ForbiddenCharacters,

    #[error("Invalid priority: '{0}' (expected low, medium, high or urgent)")]
    InvalidPriority(String),

    #[error("Invalid status: '{0}' (expected todo, in_progress, done or cancelled)")]
    InvalidStatus(String),

    #[error("Task is already completed")]
    AlreadyCompleted,

    #[error("Cannot change the priority of a completed task")]
    PriorityLocked,

    #[error("Invalid project ID: {0}")]
    InvalidProjectId(f64),

    #[error("Task data must be a JSON object")]
    NotARecord,

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid value for field: {0}")]
    InvalidField(&'static str),

    #[error("No task IDs left to assign")]
    IdsExhausted,
}

/// Urgency of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Urgent,
    ];

    /// Returns the lowercase wire value
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }

    /// Returns the uppercase display label
    pub fn label(&self) -> &'static str {
        match self {
            Priority::Low => "LOW",
            Priority::Medium => "MEDIUM",
            Priority::High => "HIGH",
            Priority::Urgent => "URGENT",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "urgent" => Ok(Priority::Urgent),
            _ => Err(TaskError::InvalidPriority(s.to_string())),
        }
    }
}

/// Lifecycle state of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Todo,
    InProgress,
    Done,
    Cancelled,
}

impl Status {
    pub const ALL: [Status; 4] = [
        Status::Todo,
        Status::InProgress,
        Status::Done,
        Status::Cancelled,
    ];

    /// Returns the snake_case wire value
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Todo => "todo",
            Status::InProgress => "in_progress",
            Status::Done => "done",
            Status::Cancelled => "cancelled",
        }
    }

    /// Returns the uppercase display label
    pub fn label(&self) -> &'static str {
        match self {
            Status::Todo => "TODO",
            Status::InProgress => "IN_PROGRESS",
            Status::Done => "DONE",
            Status::Cancelled => "CANCELLED",
        }
    }

    /// Returns true if this status represents completion
    pub fn is_complete(&self) -> bool {
        matches!(self, Status::Done)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "todo" => Ok(Status::Todo),
            "in_progress" => Ok(Status::InProgress),
            "done" => Ok(Status::Done),
            "cancelled" => Ok(Status::Cancelled),
            _ => Err(TaskError::InvalidStatus(s.to_string())),
        }
    }
}

/// Current time, truncated to the precision we persist
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parses RFC 3339, falling back to a naive ISO-8601 timestamp taken as UTC
pub(crate) fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

fn validate_title(title: &str) -> Result<String, TaskError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(TaskError::EmptyTitle);
    }
    let len = title.chars().count();
    if len > MAX_TITLE_LEN {
        return Err(TaskError::TitleTooLong(len));
    }
    if title.contains(['<', '>']) {
        return Err(TaskError::ForbiddenCharacters);
    }
    Ok(title.to_string())
}

/// A single trackable unit of work
///
/// Equality and hashing only look at the id.
#[derive(Debug, Clone)]
pub struct Task {
    id: TaskId,
    title: String,
    description: String,
    priority: Priority,
    status: Status,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    project_id: Option<f64>,
}

impl Task {
    /// Creates a new task in the `todo` state
    pub fn new(
        id: TaskId,
        title: &str,
        description: &str,
        priority: Priority,
    ) -> Result<Self, TaskError> {
        let title = validate_title(title)?;
        Ok(Self {
            id,
            title,
            description: description.trim().to_string(),
            priority,
            status: Status::Todo,
            created_at: now(),
            completed_at: None,
            project_id: None,
        })
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn project_id(&self) -> Option<f64> {
        self.project_id
    }

    /// Transitions to done and stamps `completed_at`
    pub fn mark_completed(&mut self) -> Result<(), TaskError> {
        if self.status.is_complete() {
            return Err(TaskError::AlreadyCompleted);
        }
        self.status = Status::Done;
        self.completed_at = Some(now());
        Ok(())
    }

    /// Transitions to in_progress
    pub fn start(&mut self) -> Result<(), TaskError> {
        if self.status.is_complete() {
            return Err(TaskError::AlreadyCompleted);
        }
        self.status = Status::InProgress;
        Ok(())
    }

    /// Transitions to cancelled
    pub fn cancel(&mut self) -> Result<(), TaskError> {
        if self.status.is_complete() {
            return Err(TaskError::AlreadyCompleted);
        }
        self.status = Status::Cancelled;
        Ok(())
    }

    /// Changes the priority; completed tasks keep theirs
    pub fn update_priority(&mut self, priority: Priority) -> Result<(), TaskError> {
        if self.status.is_complete() {
            return Err(TaskError::PriorityLocked);
        }
        self.priority = priority;
        Ok(())
    }

    pub fn assign_to_project(&mut self, project_id: f64) -> Result<(), TaskError> {
        if !project_id.is_finite() {
            return Err(TaskError::InvalidProjectId(project_id));
        }
        self.project_id = Some(project_id);
        Ok(())
    }

    /// Converts to the field-complete JSON representation used on disk
    pub fn to_portable(&self) -> Value {
        json!({
            "id": self.id,
            "title": self.title,
            "description": self.description,
            "priority": self.priority.as_str(),
            "status": self.status.as_str(),
            "created_at": format_timestamp(&self.created_at),
            "completed_at": self.completed_at.as_ref().map(format_timestamp),
            "project_id": self.project_id,
        })
    }

    /// Rebuilds a task from its JSON representation
    ///
    /// Stored data is trusted: the title is not re-validated.
    pub fn from_portable(data: &Value) -> Result<Self, TaskError> {
        let record = data.as_object().ok_or(TaskError::NotARecord)?;

        for field in ["id", "title", "priority", "status", "created_at"] {
            if !record.contains_key(field) {
                return Err(TaskError::MissingField(field));
            }
        }

        let id = match &record["id"] {
            Value::Number(n) => n
                .as_u64()
                .map(TaskId::new)
                .or_else(|| n.as_f64().and_then(TaskId::from_f64)),
            _ => None,
        }
        .ok_or(TaskError::InvalidField("id"))?;

        let title = string_field(record, "title")?;
        let priority: Priority = string_field(record, "priority")?.parse()?;
        let status: Status = string_field(record, "status")?.parse()?;
        let created_at = parse_timestamp(string_field(record, "created_at")?)
            .ok_or(TaskError::InvalidField("created_at"))?;

        let description = match record.get("description") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(_) => return Err(TaskError::InvalidField("description")),
        };

        let completed_at = match record.get("completed_at") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => {
                Some(parse_timestamp(s).ok_or(TaskError::InvalidField("completed_at"))?)
            }
            Some(_) => return Err(TaskError::InvalidField("completed_at")),
        };

        let project_id = match record.get("project_id") {
            None | Some(Value::Null) => None,
            Some(Value::Number(n)) => n.as_f64(),
            Some(_) => return Err(TaskError::InvalidField("project_id")),
        };

        Ok(Self {
            id,
            title: title.to_string(),
            description,
            priority,
            status,
            created_at,
            completed_at,
            project_id,
        })
    }
}

fn string_field<'a>(record: &'a Map<String, Value>, field: &'static str) -> Result<&'a str, TaskError> {
    record
        .get(field)
        .and_then(Value::as_str)
        .ok_or(TaskError::InvalidField(field))
}

impl PartialEq for Task {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Task {}

impl Hash for Task {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Serialize for Task {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_portable().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Task {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Task::from_portable(&value).map_err(serde::de::Error::custom)
    }
}
