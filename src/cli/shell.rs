//! Interactive shell
//!
//! A line-oriented loop over the same task commands as the CLI. Errors are
//! printed and the loop continues; end of input behaves like `quit`.

use std::io::{self, BufRead, Write};

use anyhow::Result;

use super::output::Output;
use super::{report_cmd, task};
use crate::domain::Priority;
use crate::manager::TaskManager;

const PROMPT: &str = "taskman> ";

const HELP: &[(&str, &str)] = &[
    ("list", "List all tasks"),
    ("add \"title\" [\"description\"]", "Add a task"),
    ("start <ID>", "Mark a task as in progress"),
    ("complete <ID>", "Mark a task as done"),
    ("cancel <ID>", "Cancel a task"),
    ("delete <ID>", "Delete a task"),
    ("stats", "Show statistics"),
    ("save", "Save tasks"),
    ("help", "Show this help"),
    ("quit | exit | q", "Leave the shell"),
];

/// One parsed shell line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Empty,
    Help,
    Quit,
    List,
    Stats,
    Save,
    Add { title: String, description: String },
    Start(String),
    Complete(String),
    Cancel(String),
    Delete(String),
    /// Known command with bad arguments; carries the usage line
    Usage(&'static str),
    Unknown(String),
}

impl ShellCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return ShellCommand::Empty;
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let id_arg = |usage: &'static str, make: fn(String) -> ShellCommand| {
            if rest.is_empty() {
                ShellCommand::Usage(usage)
            } else {
                make(rest.to_string())
            }
        };

        match word.to_ascii_lowercase().as_str() {
            "quit" | "exit" | "q" => ShellCommand::Quit,
            "help" => ShellCommand::Help,
            "list" => ShellCommand::List,
            "stats" => ShellCommand::Stats,
            "save" => ShellCommand::Save,
            "add" => parse_add(rest),
            "start" => id_arg("start <ID>", ShellCommand::Start),
            "complete" => id_arg("complete <ID>", ShellCommand::Complete),
            "cancel" => id_arg("cancel <ID>", ShellCommand::Cancel),
            "delete" => id_arg("delete <ID>", ShellCommand::Delete),
            _ => ShellCommand::Unknown(line.to_string()),
        }
    }
}

/// `add "title" ["description"]`, or an unquoted title
fn parse_add(rest: &str) -> ShellCommand {
    const USAGE: &str = "add \"title\" [\"description\"]";

    if rest.is_empty() {
        return ShellCommand::Usage(USAGE);
    }
    if !rest.starts_with('"') {
        return ShellCommand::Add {
            title: rest.to_string(),
            description: String::new(),
        };
    }

    let parts: Vec<&str> = rest.split('"').collect();
    if parts.len() < 3 {
        return ShellCommand::Usage(USAGE);
    }
    ShellCommand::Add {
        title: parts[1].to_string(),
        description: parts.get(3).map(|d| d.to_string()).unwrap_or_default(),
    }
}

/// Runs the shell until `quit` or end of input
pub fn run<R: BufRead>(manager: &mut TaskManager, output: &Output, input: R) -> Result<()> {
    if output.is_text() {
        println!("{}", output.bold("taskman interactive mode"));
        println!("Type 'help' for commands, 'quit' to leave.");
        println!();
    }

    let mut lines = input.lines();
    loop {
        if output.is_text() {
            print!("{}", PROMPT);
            io::stdout().flush()?;
        }

        let Some(line) = lines.next() else {
            break;
        };
        let command = ShellCommand::parse(&line?);
        output.verbose_ctx("shell", &format!("{:?}", command));

        if command == ShellCommand::Quit {
            break;
        }
        if let Err(e) = execute(manager, output, command) {
            output.error(&format!("{:#}", e));
        }
    }

    output.info("Goodbye!");
    Ok(())
}

fn execute(manager: &mut TaskManager, output: &Output, command: ShellCommand) -> Result<()> {
    match command {
        ShellCommand::Empty | ShellCommand::Quit => Ok(()),
        ShellCommand::Help => {
            print_help(output);
            Ok(())
        }
        ShellCommand::List => {
            task::list_tasks(manager, output, task::ListFilter::default());
            Ok(())
        }
        ShellCommand::Stats => {
            report_cmd::stats(manager, output);
            Ok(())
        }
        ShellCommand::Save => {
            task::persist(manager, output)?;
            output.success(&format!("Saved to {}", manager.storage_path().display()));
            Ok(())
        }
        ShellCommand::Add { title, description } => {
            task::add_task(manager, output, &title, &description, Priority::default())
        }
        ShellCommand::Start(id) => task::start_task(manager, output, &id),
        ShellCommand::Complete(id) => task::complete_task(manager, output, &id),
        ShellCommand::Cancel(id) => task::cancel_task(manager, output, &id),
        ShellCommand::Delete(id) => task::delete_task(manager, output, &id),
        ShellCommand::Usage(usage) => anyhow::bail!("Usage: {}", usage),
        ShellCommand::Unknown(line) => {
            anyhow::bail!("Unknown command: {} (type 'help' for commands)", line)
        }
    }
}

fn print_help(output: &Output) {
    if output.is_json() {
        let commands: Vec<_> = HELP
            .iter()
            .map(|(usage, about)| serde_json::json!({ "command": usage, "description": about }))
            .collect();
        output.data(&commands);
        return;
    }

    println!("{}", output.bold("Commands:"));
    for (usage, about) in HELP {
        println!("  {:<30} {}", usage, about);
    }
}
