//! Simulated email notifications
//!
//! Nothing leaves the process: every "sent" message lands in the notifier's
//! outbox, where the CLI prints it and tests inspect it.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::domain::now;

/// RFC 5321 upper bound on a full address
pub const MAX_EMAIL_LEN: usize = 320;

pub const DEFAULT_SMTP_SERVER: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;

#[derive(Debug, Error, PartialEq)]
pub enum NotifyError {
    #[error("Email cannot be empty")]
    EmptyEmail,

    #[error("Email too long: {0} characters (Maximum: {MAX_EMAIL_LEN})")]
    EmailTooLong(usize),

    #[error("Email contains invalid characters")]
    InvalidCharacters,

    #[error("Invalid email: missing '@'")]
    MissingAt,

    #[error("Invalid email: missing local part before '@'")]
    MissingLocalPart,

    #[error("Invalid email: missing domain after '@'")]
    MissingDomain,

    #[error("Invalid email: domain has no extension")]
    MissingExtension,

    #[error("Task title cannot be empty")]
    EmptyTitle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailKind {
    Reminder,
    Completion,
}

/// One message recorded in the outbox
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub kind: EmailKind,
    pub sent_at: DateTime<Utc>,
}

/// Checks an address and returns it trimmed
pub fn validate_email(email: &str) -> Result<&str, NotifyError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(NotifyError::EmptyEmail);
    }
    let len = email.chars().count();
    if len > MAX_EMAIL_LEN {
        return Err(NotifyError::EmailTooLong(len));
    }
    if email.chars().any(|c| c.is_whitespace() || c == '<' || c == '>') {
        return Err(NotifyError::InvalidCharacters);
    }
    let (local, domain) = email.split_once('@').ok_or(NotifyError::MissingAt)?;
    if local.is_empty() {
        return Err(NotifyError::MissingLocalPart);
    }
    if domain.is_empty() {
        return Err(NotifyError::MissingDomain);
    }
    if !domain.contains('.') {
        return Err(NotifyError::MissingExtension);
    }
    Ok(email)
}

fn validate_title(title: &str) -> Result<&str, NotifyError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(NotifyError::EmptyTitle);
    }
    Ok(title)
}

#[derive(Debug)]
pub struct Notifier {
    smtp_server: String,
    port: u16,
    outbox: Vec<SentEmail>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_SMTP_SERVER, DEFAULT_SMTP_PORT)
    }
}

impl Notifier {
    pub fn new(smtp_server: impl Into<String>, port: u16) -> Self {
        Self {
            smtp_server: smtp_server.into(),
            port,
            outbox: Vec::new(),
        }
    }

    pub fn smtp_server(&self) -> &str {
        &self.smtp_server
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn send_task_reminder(
        &mut self,
        email: &str,
        title: &str,
        due: Option<NaiveDate>,
    ) -> Result<&SentEmail, NotifyError> {
        let to = validate_email(email)?;
        let title = validate_title(title)?;

        let due_line = match due {
            Some(date) => format!("It is due on {}.", date),
            None => "It has no due date.".to_string(),
        };
        let message = SentEmail {
            to: to.to_string(),
            subject: format!("Reminder: {}", title),
            body: format!("This is a reminder about your task \"{}\". {}", title, due_line),
            kind: EmailKind::Reminder,
            sent_at: now(),
        };
        Ok(self.deliver(message))
    }

    pub fn send_completion_notification(
        &mut self,
        email: &str,
        title: &str,
    ) -> Result<&SentEmail, NotifyError> {
        let to = validate_email(email)?;
        let title = validate_title(title)?;

        let message = SentEmail {
            to: to.to_string(),
            subject: format!("Task completed: {}", title),
            body: format!("Your task \"{}\" has been marked as done.", title),
            kind: EmailKind::Completion,
            sent_at: now(),
        };
        Ok(self.deliver(message))
    }

    fn deliver(&mut self, message: SentEmail) -> &SentEmail {
        tracing::debug!(
            server = %self.smtp_server,
            port = self.port,
            to = %message.to,
            kind = ?message.kind,
            "simulated email delivery"
        );
        self.outbox.push(message);
        &self.outbox[self.outbox.len() - 1]
    }

    /// Messages sent so far, oldest first
    pub fn sent_emails(&self) -> &[SentEmail] {
        &self.outbox
    }

    pub fn clear_sent_emails(&mut self) {
        self.outbox.clear();
    }
}
