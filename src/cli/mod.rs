//! CLI command definitions for task-tracker
//!
//! This module defines the CLI structure using clap's derive macros and
//! runs parsed commands against a [`TaskService`].

use crate::error::{StoreError, ValidationError};
use crate::format::{OutputFormat, format_task, format_tasks};
use crate::service::TaskService;
use crate::types::TaskStatus;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use tracing::debug;

/// Track tasks in a local JSON file
#[derive(Parser, Debug)]
#[command(name = "task-tracker", author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (skips project and user config)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the task store file (overrides config)
    #[arg(short, long, global = true)]
    pub store: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Add a new task
    Add {
        #[arg(value_parser = parse_description)]
        description: String,
    },

    /// Replace the description of a task
    Update {
        #[arg(value_parser = parse_task_id)]
        id: u64,
        #[arg(value_parser = parse_description)]
        description: String,
    },

    /// Delete a task
    Delete {
        #[arg(value_parser = parse_task_id)]
        id: u64,
    },

    /// Move a task back to todo
    MarkTodo {
        #[arg(value_parser = parse_task_id)]
        id: u64,
    },

    /// Mark a task as in progress
    MarkInProgress {
        #[arg(value_parser = parse_task_id)]
        id: u64,
    },

    /// Mark a task as done
    MarkDone {
        #[arg(value_parser = parse_task_id)]
        id: u64,
    },

    /// List tasks, optionally only those with the given status
    List {
        /// todo, in-progress or done
        #[arg(value_parser = parse_status)]
        status: Option<TaskStatus>,

        /// Output format: table, markdown or json (default from config)
        #[arg(short, long, value_parser = parse_format)]
        format: Option<OutputFormat>,
    },

    /// Show a single task
    Show {
        #[arg(value_parser = parse_task_id)]
        id: u64,

        /// Output format: table, markdown or json (default from config)
        #[arg(short, long, value_parser = parse_format)]
        format: Option<OutputFormat>,
    },
}

/// Task ids are positive integers; 0 is never a stored id.
pub fn parse_task_id(s: &str) -> Result<u64, ValidationError> {
    match s.trim().parse::<u64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ValidationError::InvalidId(s.to_string())),
    }
}

/// Blank descriptions are rejected; anything else is stored as given.
pub fn parse_description(s: &str) -> Result<String, ValidationError> {
    if s.trim().is_empty() {
        return Err(ValidationError::EmptyDescription);
    }
    Ok(s.to_string())
}

pub fn parse_status(s: &str) -> Result<TaskStatus, ValidationError> {
    s.parse()
}

pub fn parse_format(s: &str) -> Result<OutputFormat, ValidationError> {
    OutputFormat::from_str(s).ok_or_else(|| ValidationError::UnknownFormat(s.to_string()))
}

/// Execute `command`, writing user-facing output to `out`.
///
/// `default_format` applies when the command has no `--format`.
pub fn run<W: Write>(
    service: &TaskService,
    command: Command,
    default_format: OutputFormat,
    out: &mut W,
) -> Result<()> {
    debug!(?command, "Running command");

    match command {
        Command::Add { description } => {
            let id = service.add(&description).context("Failed to add task")?;
            writeln!(out, "Task added successfully (ID: {})", id)?;
        }
        Command::Update { id, description } => {
            service
                .set_description(id, &description)
                .with_context(|| format!("Failed to update task {}", id))?;
            writeln!(out, "Task {} updated", id)?;
        }
        Command::Delete { id } => {
            let deleted = service
                .remove(id)
                .with_context(|| format!("Failed to delete task {}", id))?;
            if deleted {
                writeln!(out, "Task {} deleted", id)?;
            } else {
                writeln!(out, "Task {} not found, nothing deleted", id)?;
            }
        }
        Command::MarkTodo { id } => mark(service, id, TaskStatus::Todo, out)?,
        Command::MarkInProgress { id } => mark(service, id, TaskStatus::InProgress, out)?,
        Command::MarkDone { id } => mark(service, id, TaskStatus::Done, out)?,
        Command::List { status, format } => {
            let tasks = match status {
                Some(status) => service.list_by_status(status.as_str()),
                None => service.list_all(),
            }
            .context("Failed to list tasks")?;
            let rendered = format_tasks(&tasks, format.unwrap_or(default_format))?;
            write!(out, "{}", rendered)?;
        }
        Command::Show { id, format } => {
            let task = service
                .get(id)
                .and_then(|task| task.ok_or(StoreError::NotFound { id }))
                .with_context(|| format!("Failed to show task {}", id))?;
            let rendered = format_task(&task, format.unwrap_or(default_format))?;
            write!(out, "{}", rendered)?;
        }
    }

    Ok(())
}

fn mark<W: Write>(service: &TaskService, id: u64, status: TaskStatus, out: &mut W) -> Result<()> {
    service
        .set_status(id, status.as_str())
        .with_context(|| format!("Failed to mark task {} as {}", id, status))?;
    writeln!(out, "Task {} marked as {}", id, status)?;
    Ok(())
}
