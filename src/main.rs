//! # tc - Todo Calendar
//!
//! A terminal todo list with a calendar overlay.
//!
//! ## Key Features
//!
//! - **Tasks**: name (2-32 characters), priority (high / medium / low), color category and an
//!   optional deadline
//! - **Calendar**: every day shows one colored dot per category due that day
//! - **Daily view**: tasks due on the selected day, most urgent first
//! - **Local storage**: the whole list is one JSON snapshot, rewritten after every change
//!
//! ## Quick Start
//!
//! ```bash
//! # Launch the calendar UI
//! tc
//!
//! # Add a task from the shell
//! tc add "Submit essay" --priority high --color red --deadline "friday 17:00"
//!
//! # What is due today?
//! tc day
//!
//! # Month overview
//! tc calendar --month 2024-05
//! ```
//!
//! Data is stored in `~/.todo-calendar/TodoApp.json`. Use `--db` or `TODO_CALENDAR_DB`
//! to point somewhere else. Set `RUST_LOG=debug` to see what the store is doing.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use log::debug;

pub mod cli;
pub mod cmd;
pub mod dates;
pub mod error;
pub mod fields;
pub mod store;
pub mod task;
pub mod views;
pub mod tui {
    pub mod app;
    pub mod colors;
    pub mod enums;
    pub mod input;
    pub mod run;
    pub mod task_form;
    pub mod utils;
}

use cli::Cli;
use cmd::*;
use error::Result;
use store::TodoStore;

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let db = cli.db;
    let today = local_today();

    match cli.command.unwrap_or(Commands::Ui) {
        Commands::Completions { shell } => {
            cmd_completions(shell);
            Ok(())
        }
        Commands::Ui => cmd_ui(open_store(db)?),
        Commands::Add { name, priority, color, deadline } => {
            cmd_add(&mut open_store(db)?, name, priority, color, deadline, today)
        }
        Commands::List { open } => {
            cmd_list(&open_store(db)?, open, today);
            Ok(())
        }
        Commands::Day { date } => cmd_day(&open_store(db)?, date, today),
        Commands::Calendar { month } => cmd_calendar(&open_store(db)?, month, today),
        Commands::Done { id } => cmd_set_done(&mut open_store(db)?, &id, true),
        Commands::Undo { id } => cmd_set_done(&mut open_store(db)?, &id, false),
        Commands::Toggle { id } => cmd_toggle(&mut open_store(db)?, &id),
        Commands::Delete { id } => cmd_delete(&mut open_store(db)?, &id),
        Commands::Clear => cmd_clear(&mut open_store(db)?),
    }
}

/// Open the snapshot named by `--db` / `TODO_CALENDAR_DB`, or the default under `$HOME`.
fn open_store(db: Option<PathBuf>) -> Result<TodoStore> {
    let db_path = db.unwrap_or_else(|| {
        let home = std::env::var_os("HOME");
        default_db_path(home.as_deref().map(Path::new))
    });
    debug!("using snapshot {}", db_path.display());
    TodoStore::open(db_path)
}
