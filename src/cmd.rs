//! Command implementations for the CLI interface.
//!
//! Each subcommand maps onto one `TodoStore` operation or one view, so the
//! command line and the TUI share the same semantics.

use std::fmt::Write as _;
use std::path::Path;

use chrono::{Datelike, Local, NaiveDate};
use clap::{CommandFactory, Subcommand};
use clap_complete::{generate, Shell};
use crossterm::style::{Color, Stylize};

use crate::cli::Cli;
use crate::dates::{format_deadline, parse_day_input, parse_deadline_input};
use crate::error::{Result, TodoError};
use crate::fields::{Category, Priority};
use crate::store::TodoStore;
use crate::task::{NewTask, Task};
use crate::views::{colors_on_day, month_grid, open_count, tasks_on_day};

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive calendar UI.
    Ui,

    /// Add a new task.
    Add {
        /// Task name, 2 to 32 characters.
        name: String,
        /// Priority: high | medium | low (or 1 | 2 | 3).
        #[arg(long, short, value_enum, default_value_t = Priority::High)]
        priority: Priority,
        /// Category color: red | lightgreen | skyblue | orange.
        #[arg(long, short, value_enum, default_value_t = Category::Red)]
        color: Category,
        /// Deadline: "YYYY-MM-DD HH:MM", "YYYY-MM-DD", "tomorrow 9:00", "in 3d", "friday".
        #[arg(long, short)]
        deadline: Option<String>,
    },

    /// List every task in stored order.
    List {
        /// Hide completed tasks.
        #[arg(long)]
        open: bool,
    },

    /// Show tasks due on one day, most urgent first.
    Day {
        /// Day to show: YYYY-MM-DD, "today", "tomorrow", a weekday. Defaults to today.
        date: Option<String>,
    },

    /// Show a month calendar with a colored dot per category due each day.
    Calendar {
        /// Month to show as YYYY-MM. Defaults to the current month.
        #[arg(long)]
        month: Option<String>,
    },

    /// Mark a task done.
    Done {
        /// Task id, id prefix or exact name.
        id: String,
    },

    /// Mark a task not done.
    Undo {
        /// Task id, id prefix or exact name.
        id: String,
    },

    /// Flip a task between done and not done.
    Toggle {
        /// Task id, id prefix or exact name.
        id: String,
    },

    /// Delete a task.
    Delete {
        /// Task id, id prefix or exact name.
        id: String,
    },

    /// Delete all completed tasks.
    Clear,

    /// Generate shell completion script.
    Completions {
        /// Target shell.
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Launch the TUI on the given snapshot.
pub fn cmd_ui(store: TodoStore) -> Result<()> {
    let path = store.path().to_path_buf();
    crate::tui::run::run_tui(store).map_err(|e| TodoError::io(path, e))
}

pub fn cmd_add(
    store: &mut TodoStore,
    name: String,
    priority: Priority,
    color: Category,
    deadline: Option<String>,
    today: NaiveDate,
) -> Result<()> {
    let deadline = match deadline {
        Some(text) => parse_deadline_input(&text, today)?,
        None => None,
    };
    let input = NewTask::new(name).priority(priority).color(color).deadline(deadline);
    let task = store.add(input)?;
    println!("Added {} {}", task.short_id(), task.name);
    Ok(())
}

pub fn cmd_list(store: &TodoStore, open: bool, today: NaiveDate) {
    let tasks: Vec<&Task> = store.tasks().iter().filter(|t| !open || !t.is_done).collect();
    if tasks.is_empty() {
        println!("No tasks.");
        return;
    }
    print_table(&tasks, today);
    println!(
        "\n{} task(s), {} open",
        store.len(),
        open_count(store.tasks())
    );
}

pub fn cmd_day(store: &TodoStore, date: Option<String>, today: NaiveDate) -> Result<()> {
    let day = match date {
        Some(text) => parse_day_input(&text, today)?,
        None => today,
    };
    println!("{}", day.format("%Y-%m-%d (%a)"));
    let daily = tasks_on_day(store.tasks(), day);
    if daily.is_empty() {
        println!("No tasks scheduled for this day.");
    } else {
        print_table(&daily, today);
    }
    Ok(())
}

pub fn cmd_calendar(store: &TodoStore, month: Option<String>, today: NaiveDate) -> Result<()> {
    let anchor = match month {
        Some(text) => parse_month(&text)?,
        None => today,
    };
    print!("{}", render_calendar(store.tasks(), anchor, today, true));
    Ok(())
}

pub fn cmd_set_done(store: &mut TodoStore, id: &str, value: bool) -> Result<()> {
    let id = store.resolve(id)?;
    if let Some(task) = store.set_done(id, value)? {
        println!("{} {}", if task.is_done { "Completed" } else { "Reopened" }, task.name);
    }
    Ok(())
}

pub fn cmd_toggle(store: &mut TodoStore, id: &str) -> Result<()> {
    let id = store.resolve(id)?;
    if let Some(task) = store.toggle(id)? {
        println!("{} {}", if task.is_done { "Completed" } else { "Reopened" }, task.name);
    }
    Ok(())
}

pub fn cmd_delete(store: &mut TodoStore, id: &str) -> Result<()> {
    let id = store.resolve(id)?;
    if let Some(task) = store.remove(id)? {
        println!("Deleted {}", task.name);
    }
    Ok(())
}

pub fn cmd_clear(store: &mut TodoStore) -> Result<()> {
    let removed = store.remove_completed()?;
    println!("Removed {removed} completed task(s)");
    Ok(())
}

pub fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut std::io::stdout());
}

/// Default snapshot location: `$HOME/.todo-calendar/TodoApp.json`.
pub fn default_db_path(home: Option<&Path>) -> std::path::PathBuf {
    home.unwrap_or_else(|| Path::new("."))
        .join(".todo-calendar")
        .join(crate::store::snapshot_file_name())
}

/// Parse `YYYY-MM` into the first day of that month.
pub fn parse_month(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")
        .map_err(|_| TodoError::InvalidDate(s.trim().to_string()))
}

fn dot(color: Category, styled: bool) -> String {
    if styled {
        let (r, g, b) = color.rgb();
        "●".with(Color::Rgb { r, g, b }).to_string()
    } else {
        color.as_str()[..1].to_uppercase()
    }
}

/// Render a month grid. Each day cell shows the day number followed by one
/// dot per distinct category due that day. `styled` selects ANSI dots over
/// plain letters.
pub fn render_calendar(tasks: &[Task], anchor: NaiveDate, today: NaiveDate, styled: bool) -> String {
    const CELL: usize = 7;
    let mut out = String::new();
    let _ = writeln!(out, "{:^width$}", anchor.format("%B %Y").to_string(), width = CELL * 7);
    for name in ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"] {
        let _ = write!(out, "{name:<width$}", width = CELL);
    }
    out.push('\n');

    for week in month_grid(anchor) {
        for cell in week {
            let Some(day) = cell else {
                out.push_str(&" ".repeat(CELL));
                continue;
            };
            let colors = colors_on_day(tasks, day);
            let number = format!("{:>2}", day.day());
            let number = if styled && day == today {
                number.reverse().to_string()
            } else {
                number
            };
            out.push_str(&number);
            for c in &colors {
                out.push_str(&dot(*c, styled));
            }
            out.push_str(&" ".repeat(CELL.saturating_sub(2 + colors.len())));
        }
        out.push('\n');
    }
    out
}

/// Print tasks in a formatted table.
pub fn print_table(tasks: &[&Task], today: NaiveDate) {
    println!(
        "{:<9} {:<4} {:<7} {:<11} {:<26} {}",
        "ID", "Done", "Pri", "Color", "Deadline", "Name"
    );
    for t in tasks {
        println!(
            "{:<9} {:<4} {:<7} {:<11} {:<26} {}",
            t.short_id(),
            if t.is_done { "[x]" } else { "[ ]" },
            t.priority.label(),
            t.color.as_str(),
            format_deadline(t.deadline, today),
            t.name
        );
    }
}

/// Today's date in local time.
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}
