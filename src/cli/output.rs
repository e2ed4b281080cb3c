//! Output formatting for CLI commands

use crossterm::style::{Color, Stylize};
use serde::Serialize;

use crate::domain::{Priority, Status};

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Output helper for consistent formatting
pub struct Output {
    format: OutputFormat,
    verbose: bool,
    color: bool,
}

impl Output {
    pub fn new(format: OutputFormat, verbose: bool, color: bool) -> Self {
        Self {
            format,
            verbose,
            color,
        }
    }

    /// Prints a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Text => println!("{}", self.paint(&format!("✓ {}", message), Color::Green)),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({
                        "success": true,
                        "message": message
                    })
                );
            }
        }
    }

    /// Prints an error message
    pub fn error(&self, message: &str) {
        match self.format {
            OutputFormat::Text => eprintln!("{}", self.paint(&format!("✗ {}", message), Color::Red)),
            OutputFormat::Json => {
                eprintln!(
                    "{}",
                    serde_json::json!({
                        "success": false,
                        "error": message
                    })
                );
            }
        }
    }

    /// Prints an informational line (text only)
    pub fn info(&self, message: &str) {
        if self.is_text() {
            println!("{}", self.paint(&format!("ℹ {}", message), Color::Blue));
        }
    }

    /// Prints a warning (text only)
    pub fn warning(&self, message: &str) {
        if self.is_text() {
            println!("{}", self.paint(&format!("⚠ {}", message), Color::Yellow));
        }
    }

    /// Prints structured data
    pub fn data<T: Serialize>(&self, data: &T) {
        match self.format {
            OutputFormat::Text => {
                if let Ok(json) = serde_json::to_string_pretty(data) {
                    println!("{}", json);
                }
            }
            OutputFormat::Json => {
                if let Ok(json) = serde_json::to_string(data) {
                    println!("{}", json);
                }
            }
        }
    }

    /// Prints a blank line (text only)
    pub fn blank(&self) {
        if self.is_text() {
            println!();
        }
    }

    /// Returns true if using JSON format
    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Returns true if using text format
    pub fn is_text(&self) -> bool {
        self.format == OutputFormat::Text
    }

    /// Prints a verbose debug message (only when --verbose is set)
    pub fn verbose(&self, message: &str) {
        if self.verbose {
            eprintln!("[verbose] {}", message);
        }
    }

    /// Prints a verbose debug message with context (only when --verbose is set)
    pub fn verbose_ctx(&self, context: &str, message: &str) {
        if self.verbose {
            eprintln!("[verbose:{}] {}", context, message);
        }
    }

    /// Colors `text` unless color is disabled
    pub fn paint(&self, text: &str, color: Color) -> String {
        if self.color {
            text.with(color).to_string()
        } else {
            text.to_string()
        }
    }

    /// Bold `text` unless color is disabled
    pub fn bold(&self, text: &str) -> String {
        if self.color {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn priority(&self, priority: Priority) -> String {
        self.paint(priority.label(), priority_color(priority))
    }
}

fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::Low => Color::Green,
        Priority::Medium => Color::Yellow,
        Priority::High => Color::Magenta,
        Priority::Urgent => Color::Red,
    }
}

/// One-character marker shown in task listings
pub fn status_symbol(status: Status) -> &'static str {
    match status {
        Status::Todo => "○",
        Status::InProgress => "◐",
        Status::Done => "●",
        Status::Cancelled => "✗",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_output_without_color() {
        let output = Output::new(OutputFormat::Text, false, false);
        assert_eq!(output.paint("hello", Color::Red), "hello");
        assert_eq!(output.priority(Priority::Urgent), "URGENT");
    }

    #[test]
    fn colored_output_keeps_text() {
        let output = Output::new(OutputFormat::Text, false, true);
        assert!(output.paint("hello", Color::Red).contains("hello"));
        assert!(output.bold("title").contains("title"));
    }

    #[test]
    fn status_symbols() {
        assert_eq!(status_symbol(Status::Todo), "○");
        assert_eq!(status_symbol(Status::Done), "●");
    }
}
