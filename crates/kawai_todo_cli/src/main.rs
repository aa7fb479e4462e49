//! Command-line front end for the kawai-todo list.
//!
//! # Responsibility
//! - Resolve configuration and start file logging.
//! - Drive one `ToDoSession` action per invocation and print the list.

mod commands;

use clap::{Parser, Subcommand};
use kawai_todo_core::{init_logging, AppConfig};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "kawai_todo", version, about = "Keep a short local to-do list")]
struct Cli {
    /// SQLite file to use instead of `KAWAI_TODO_DB_PATH`.
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub(crate) enum Command {
    /// Show all items, newest first.
    List,
    /// Add a new item.
    Add {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Mark an item as completed.
    Done { id: String },
    /// Mark an item as not completed.
    Undo { id: String },
    /// Replace an item's text.
    Edit {
        id: String,
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Delete an item.
    Rm { id: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = AppConfig::from_env();
    if let Some(db_path) = cli.db {
        config.db_path = db_path;
    }

    if let Err(err) = init_logging(config.log_level, &config.log_dir) {
        eprintln!("warning: file logging disabled: {err}");
    }

    let command = cli.command.unwrap_or(Command::List);
    let mut stdout = std::io::stdout().lock();
    match commands::run(&config, command, &mut stdout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}
