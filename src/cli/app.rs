//! Main CLI application structure

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use super::output::{Output, OutputFormat};
use super::{data_cmd, notify_cmd, report_cmd, shell, task};
use crate::manager::TaskManager;
use crate::storage::Config;

#[derive(Parser)]
#[command(name = "taskman")]
#[command(author, version, about = "Personal task tracker with JSON storage and exports")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Task storage file (overrides the config file)
    #[arg(long, short = 'f', global = true, env = "TASKMAN_FILE")]
    pub file: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(flatten)]
    Task(task::TaskCommands),

    /// Show task statistics
    Stats,

    /// Show activity for one day
    Report {
        /// Day to report on (YYYY-MM-DD, UTC); defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Export tasks to JSON, XML or xlsx
    ///
    /// The file extension wins over --type: `tasks.xml` is always XML.
    Export {
        /// Output file
        #[arg(value_name = "FILE")]
        path: String,

        /// Format: json, xml, xlsx or excel (defaults to the config value)
        #[arg(long = "type", short = 't')]
        export_type: Option<String>,

        /// Leave statistics out of the export
        #[arg(long)]
        no_stats: bool,
    },

    /// Export tasks to CSV
    Csv {
        /// Output file (.csv is appended if missing)
        #[arg(value_name = "FILE")]
        path: String,
    },

    /// Save tasks, to the storage file or another path
    Save {
        /// Target file (defaults to the storage file)
        #[arg(value_name = "FILE")]
        path: Option<PathBuf>,
    },

    /// Replace the stored tasks with the contents of another file
    Load {
        /// Source file
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },

    /// Email a reminder about a task (simulated)
    Remind {
        /// Task ID
        id: String,

        /// Recipient address
        email: String,

        /// Due date to mention (YYYY-MM-DD)
        #[arg(long)]
        due: Option<NaiveDate>,
    },

    /// Start the interactive shell
    Interactive,
}

/// Installs the tracing subscriber; diagnostics go to stderr
fn init_logging(verbose: bool) {
    let default = if verbose { "taskman=debug" } else { "taskman=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(file) = cli.file {
        config.storage_file = file;
    }

    let output = Output::new(cli.format, cli.verbose, config.color && !cli.no_color);
    output.verbose_ctx("config", &format!("Storage file: {}", config.storage_file.display()));

    let mut manager = TaskManager::from_config(&config);
    manager
        .load_from_file(None)
        .with_context(|| format!("Failed to load tasks from {}", config.storage_file.display()))?;
    output.verbose_ctx("storage", &format!("Loaded {} task(s)", manager.len()));

    match cli.command {
        Commands::Task(cmd) => task::run(cmd, &mut manager, &output)?,

        Commands::Stats => report_cmd::stats(&manager, &output),
        Commands::Report { date } => report_cmd::daily_report(&manager, &output, date)?,

        Commands::Export {
            path,
            export_type,
            no_stats,
        } => {
            let format = export_type.unwrap_or_else(|| config.default_export_format.clone());
            let include_statistics = config.include_statistics && !no_stats;
            data_cmd::export(&mut manager, &output, &path, &format, include_statistics)?
        }
        Commands::Csv { path } => report_cmd::export_csv(&manager, &output, &path)?,

        Commands::Save { path } => data_cmd::save(&manager, &output, path.as_deref())?,
        Commands::Load { path } => data_cmd::load(&mut manager, &output, &path)?,

        Commands::Remind { id, email, due } => {
            notify_cmd::remind(&manager, &output, &id, &email, due)?
        }

        Commands::Interactive => {
            let stdin = std::io::stdin();
            shell::run(&mut manager, &output, stdin.lock())?
        }
    }

    output.verbose("Command completed successfully");
    Ok(())
}
