use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Terminal todo list with a calendar overlay.
/// Tasks are stored in ~/.todo-calendar/TodoApp.json or a path passed via --db.
#[derive(Parser)]
#[command(name = "tc", version, about = "Todo list with a calendar view")]
pub struct Cli {
    /// Path to the JSON snapshot file.
    #[arg(long, global = true, env = "TODO_CALENDAR_DB")]
    pub db: Option<PathBuf>,

    /// Defaults to `ui` when omitted.
    #[command(subcommand)]
    pub command: Option<Commands>,
}
