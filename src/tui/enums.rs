//! Enumerations for TUI state management.

use uuid::Uuid;

/// Which screen is in front.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AppState {
    Main,
    AddTask,
    Help,
    Confirm,
}

/// Pane receiving navigation keys on the main screen.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Focus {
    Calendar,
    Daily,
    All,
}

impl Focus {
    /// Next pane in Tab order.
    pub fn next(self) -> Self {
        match self {
            Focus::Calendar => Focus::Daily,
            Focus::Daily => Focus::All,
            Focus::All => Focus::Calendar,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Focus::Calendar => Focus::All,
            Focus::Daily => Focus::Calendar,
            Focus::All => Focus::Daily,
        }
    }
}

/// Destructive action waiting for a y/n answer.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ConfirmAction {
    Delete { id: Uuid, name: String },
    ClearCompleted { count: usize },
}

impl ConfirmAction {
    pub fn describe(&self) -> String {
        match self {
            ConfirmAction::Delete { name, .. } => format!("Delete task '{name}'"),
            ConfirmAction::ClearCompleted { count } => {
                format!("Delete {count} completed task(s)")
            }
        }
    }
}
